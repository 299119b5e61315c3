use crate::model::{FieldOption, FieldSchema, FieldType, FieldValue, FormValues};
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

/// Visible rows of a textarea control.
pub const TEXTAREA_ROWS: usize = 4;
pub const DROPDOWN_PLACEHOLDER: &str = "Select an option";
pub const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";

/// Normalized edit produced by a control: `onChange(fieldId, newValue)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field_id: String,
    pub value: FieldValue,
}

impl FieldChange {
    fn new(field: &FieldSchema, value: FieldValue) -> Self {
        Self {
            field_id: field.field_id.clone(),
            value,
        }
    }
}

/// Typed zero value for a field that has no stored value yet.
pub fn materialize_default(field: &FieldSchema) -> FieldValue {
    match field.kind {
        FieldType::Checkbox => FieldValue::Bool(false),
        _ => FieldValue::Text(String::new()),
    }
}

/// Value a control shows: the stored value, or the typed zero when the
/// stored value is missing, `""` or `false`. Never written back.
pub fn render_value(field: &FieldSchema, values: &FormValues) -> FieldValue {
    match values.get(&field.field_id) {
        Some(FieldValue::Text(s)) if s.is_empty() => materialize_default(field),
        Some(FieldValue::Bool(false)) | None => materialize_default(field),
        Some(v) => v.clone(),
    }
}

/// Check or uncheck one option of a multi-select checkbox.
/// Remaining entries keep their order; new ones go to the end.
pub fn toggle_option(current: &FieldValue, option: &str, checked: bool) -> Vec<String> {
    let mut selected: Vec<String> = current.as_list().map(<[String]>::to_vec).unwrap_or_default();
    let pos = selected.iter().position(|v| v == option);
    match (checked, pos) {
        (true, None) => selected.push(option.to_string()),
        (false, Some(i)) => {
            selected.remove(i);
        }
        _ => {}
    }
    selected
}

fn option_index(options: &[FieldOption], value: &FieldValue) -> Option<usize> {
    let v = value.as_text()?;
    options.iter().position(|o| o.value == v)
}

fn step(cur: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (cur, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    })
}

fn edit_text(field: &FieldSchema, value: &FieldValue, key: KeyEvent) -> Option<String> {
    let mut s = value.as_text().unwrap_or_default().to_string();
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            // Input-level cap, like the browser's maxlength attribute
            if let Some(max) = field.max_length {
                if s.chars().count() >= max {
                    return None;
                }
            }
            s.push(c);
            Some(s)
        }
        KeyCode::Backspace => s.pop().map(|_| s),
        _ => None,
    }
}

/// Turn one key press on a focused control into at most one change.
///
/// `cursor` is the option cursor for multi-select checkboxes; the other
/// controls leave it pointing at their current selection.
pub fn handle_key(
    field: &FieldSchema,
    value: &FieldValue,
    cursor: &mut usize,
    key: KeyEvent,
) -> Option<FieldChange> {
    let options = field.option_list();
    match &field.kind {
        FieldType::Text
        | FieldType::Email
        | FieldType::Tel
        | FieldType::Date
        | FieldType::TextArea => {
            edit_text(field, value, key).map(|s| FieldChange::new(field, FieldValue::Text(s)))
        }
        FieldType::Dropdown => {
            let forward = match key.code {
                KeyCode::Right | KeyCode::Char(' ') => true,
                KeyCode::Left => false,
                _ => return None,
            };
            // Slot 0 is the empty placeholder option
            let cur = option_index(options, value).map(|i| i + 1).unwrap_or(0);
            let next = step(Some(cur), options.len() + 1, forward)?;
            if next == cur {
                return None;
            }
            let chosen = if next == 0 {
                String::new()
            } else {
                options[next - 1].value.clone()
            };
            Some(FieldChange::new(field, FieldValue::Text(chosen)))
        }
        FieldType::Radio => {
            let forward = match key.code {
                KeyCode::Right => true,
                KeyCode::Left => false,
                _ => return None,
            };
            let cur = option_index(options, value);
            let next = step(cur, options.len(), forward)?;
            *cursor = next;
            if Some(next) == cur {
                return None;
            }
            Some(FieldChange::new(
                field,
                FieldValue::Text(options[next].value.clone()),
            ))
        }
        FieldType::Checkbox if field.options.is_some() => match key.code {
            KeyCode::Right => {
                *cursor = step(Some(*cursor), options.len(), true).unwrap_or(0);
                None
            }
            KeyCode::Left => {
                *cursor = step(Some(*cursor), options.len(), false).unwrap_or(0);
                None
            }
            KeyCode::Char(' ') => {
                let opt = options.get(*cursor)?;
                let checked = !value
                    .as_list()
                    .map(|l| l.iter().any(|v| v == &opt.value))
                    .unwrap_or(false);
                let next = toggle_option(value, &opt.value, checked);
                Some(FieldChange::new(field, FieldValue::List(next)))
            }
            _ => None,
        },
        FieldType::Checkbox => match key.code {
            KeyCode::Char(' ') => {
                let checked = value.as_bool().unwrap_or(false);
                Some(FieldChange::new(field, FieldValue::Bool(!checked)))
            }
            _ => None,
        },
        FieldType::Unsupported(_) => None,
    }
}

fn input_line(
    field: &FieldSchema,
    text: &str,
    focused: bool,
    cursor_on: bool,
    theme: &Theme,
) -> Line<'static> {
    let placeholder = field.placeholder.clone().or_else(|| {
        (field.kind == FieldType::Date).then(|| DATE_PLACEHOLDER.to_string())
    });
    let mut spans = vec![Span::raw("  > ")];
    if text.is_empty() {
        if let Some(p) = placeholder {
            spans.push(Span::styled(p, theme.text_muted()));
        }
    } else {
        let style = if focused {
            theme.text_editing_bold()
        } else {
            Style::default()
        };
        spans.push(Span::styled(text.to_string(), style));
    }
    if focused && cursor_on {
        spans.push(Span::raw("▏"));
    }
    Line::from(spans)
}

fn textarea_lines(
    field: &FieldSchema,
    text: &str,
    focused: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let style = if focused {
        theme.text_active_bold()
    } else {
        Style::default()
    };
    let mut rows: Vec<Line<'static>> = Vec::new();
    if text.is_empty() {
        if let Some(p) = &field.placeholder {
            rows.push(Line::from(vec![
                Span::raw("  │ "),
                Span::styled(p.clone(), theme.text_muted()),
            ]));
        }
    } else {
        let all: Vec<&str> = text.split('\n').collect();
        // Fixed height: keep the tail visible
        let start = all.len().saturating_sub(TEXTAREA_ROWS);
        for l in &all[start..] {
            rows.push(Line::from(vec![
                Span::raw("  │ "),
                Span::styled(l.to_string(), style),
            ]));
        }
    }
    while rows.len() < TEXTAREA_ROWS {
        rows.push(Line::from("  │"));
    }
    rows
}

/// Render one field: label, control and error message.
pub fn field_lines(
    field: &FieldSchema,
    value: &FieldValue,
    error: Option<&str>,
    focused: bool,
    cursor: usize,
    cursor_on: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let sel = if focused { '›' } else { ' ' };
    let label_style = if focused {
        theme.text_active_bold()
    } else {
        Style::default()
    };
    let mut label_spans = vec![
        Span::raw(format!("{sel} ")),
        Span::styled(field.label.clone(), label_style),
    ];
    if field.required {
        label_spans.push(Span::styled(" *", theme.text_error()));
    }
    let options = field.option_list();
    match &field.kind {
        FieldType::Text | FieldType::Email | FieldType::Tel | FieldType::Date => {
            lines.push(Line::from(label_spans));
            lines.push(input_line(
                field,
                value.as_text().unwrap_or_default(),
                focused,
                cursor_on,
                theme,
            ));
        }
        FieldType::TextArea => {
            lines.push(Line::from(label_spans));
            lines.extend(textarea_lines(
                field,
                value.as_text().unwrap_or_default(),
                focused,
                theme,
            ));
        }
        FieldType::Dropdown => {
            lines.push(Line::from(label_spans));
            let summary = option_index(options, value)
                .map(|i| options[i].label.clone())
                .unwrap_or_else(|| DROPDOWN_PLACEHOLDER.to_string());
            let style = if option_index(options, value).is_none() {
                theme.text_muted()
            } else if focused {
                theme.text_editing_bold()
            } else {
                Style::default()
            };
            let mut spans = vec![Span::raw("  ▾ "), Span::styled(summary, style)];
            if focused {
                spans.push(Span::styled("   ◂ ▸", theme.text_muted()));
            }
            lines.push(Line::from(spans));
        }
        FieldType::Radio => {
            lines.push(Line::from(label_spans));
            let cur = option_index(options, value);
            for (oi, opt) in options.iter().enumerate() {
                let mark = if Some(oi) == cur { "(•)" } else { "( )" };
                let st = if focused && Some(oi) == cur {
                    theme.list_cursor_style()
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!("{mark} {}", opt.label), st),
                ]));
            }
        }
        FieldType::Checkbox if field.options.is_some() => {
            lines.push(Line::from(label_spans));
            let selected = value.as_list().unwrap_or_default();
            for (oi, opt) in options.iter().enumerate() {
                let chk = if selected.iter().any(|v| v == &opt.value) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let st = if focused && oi == cursor {
                    theme.list_cursor_style()
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!("{chk} {}", opt.label), st),
                ]));
            }
        }
        FieldType::Checkbox => {
            // Label sits beside the box instead of above it
            let chk = if value.as_bool().unwrap_or(false) {
                "[x] "
            } else {
                "[ ] "
            };
            let box_style = if focused {
                theme.text_editing_bold()
            } else {
                Style::default()
            };
            label_spans.insert(1, Span::styled(chk, box_style));
            lines.push(Line::from(label_spans));
        }
        FieldType::Unsupported(raw) => {
            lines.push(Line::from(label_spans));
            lines.push(Line::from(Span::styled(
                format!("  Unsupported field type: {raw}"),
                theme.text_muted(),
            )));
        }
    }
    if let Some(err) = error {
        lines.push(Line::from(Span::styled(
            format!("  ! {err}"),
            theme.text_error(),
        )));
    }
    lines
}
