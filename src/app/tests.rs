use super::*;
use crate::engine::Phase;
use crate::model::FieldValue;
use serde_json::json;

fn login(st: &mut AppState, roll: &str, name: &str) -> Vec<Effect> {
    let _ = update(
        st,
        AppMsg::LoginEdit {
            field: LoginField::RollNumber,
            value: roll.into(),
        },
    );
    let _ = update(
        st,
        AppMsg::LoginEdit {
            field: LoginField::Name,
            value: name.into(),
        },
    );
    update(st, AppMsg::LoginSubmit)
}

fn user(roll: &str) -> User {
    User {
        roll_number: roll.into(),
        name: "Ann".into(),
    }
}

fn one_section_schema() -> FormSchema {
    serde_json::from_value(json!({
        "formTitle": "Signup",
        "sections": [{
            "title": "About you",
            "fields": [{"fieldId": "name", "type": "text", "label": "Name", "required": true}]
        }]
    }))
    .unwrap()
}

fn form_screen(st: &AppState) -> &FormScreen {
    match &st.screen {
        Screen::Form(fs) => fs,
        Screen::Login(_) => panic!("expected form screen"),
    }
}

/// Logs in as R1 and delivers the one-section schema.
fn ready_state() -> AppState {
    let mut st = AppState::default();
    let _ = login(&mut st, "R1", "Ann");
    let _ = update(
        &mut st,
        AppMsg::UserCreated {
            user: user("R1"),
            outcome: Ok("User created successfully".into()),
        },
    );
    let _ = update(
        &mut st,
        AppMsg::FormLoaded {
            roll_number: "R1".into(),
            outcome: Ok(one_section_schema()),
        },
    );
    st
}

#[test]
fn login_validation_blocks_registration() {
    let mut st = AppState::default();
    let effects = login(&mut st, "  ", "");
    assert!(effects.is_empty());
    match &st.screen {
        Screen::Login(ls) => {
            assert_eq!(ls.roll_error.as_deref(), Some("Roll Number is required"));
            assert_eq!(ls.name_error.as_deref(), Some("Name is required"));
            assert!(!ls.loading);
        }
        Screen::Form(_) => panic!("should stay on login"),
    }
}

#[test]
fn login_submit_is_single_flight() {
    let mut st = AppState::default();
    let effects = login(&mut st, "R1", "Ann");
    assert!(matches!(
        effects.as_slice(),
        [Effect::CreateUser { user }] if user.roll_number == "R1"
    ));
    assert!(update(&mut st, AppMsg::LoginSubmit).is_empty());
}

#[test]
fn registration_success_opens_form_and_fetches_once() {
    let mut st = AppState::default();
    let _ = login(&mut st, "R1", "Ann");
    let effects = update(
        &mut st,
        AppMsg::UserCreated {
            user: user("R1"),
            outcome: Ok("ok".into()),
        },
    );
    let fetches: Vec<&String> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::FetchForm { roll_number } => Some(roll_number),
            _ => None,
        })
        .collect();
    assert_eq!(fetches, vec!["R1"]);
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::ShowToast { text, level: ToastLevel::Success, .. } if text == "ok"
    )));
    assert!(matches!(form_screen(&st).engine.phase(), Phase::Loading));
}

#[test]
fn registration_failure_shows_message_on_login() {
    let mut st = AppState::default();
    let _ = login(&mut st, "R1", "Ann");
    let effects = update(
        &mut st,
        AppMsg::UserCreated {
            user: user("R1"),
            outcome: Err("Roll number already registered".into()),
        },
    );
    assert!(effects.is_empty());
    match &st.screen {
        Screen::Login(ls) => {
            assert!(!ls.loading);
            assert_eq!(
                ls.api_error.as_deref(),
                Some("Roll number already registered")
            );
        }
        Screen::Form(_) => panic!("should stay on login"),
    }
}

#[test]
fn submit_blocked_until_required_field_filled() {
    let mut st = ready_state();
    assert!(update(&mut st, AppMsg::Submit).is_empty());
    let session = form_screen(&st).engine.session().unwrap();
    assert_eq!(session.store().error_for("name"), Some("Name is required"));

    let _ = update(
        &mut st,
        AppMsg::FieldChanged(FieldChange {
            field_id: "name".into(),
            value: FieldValue::Text("Ann".into()),
        }),
    );
    let effects = update(&mut st, AppMsg::Submit);
    assert_eq!(effects.len(), 1);
    match &effects[0] {
        Effect::SubmitForm { values } => {
            assert_eq!(values.len(), 1);
            assert_eq!(values.get("name"), Some(&FieldValue::Text("Ann".into())));
        }
        _ => panic!("expected SubmitForm"),
    }
}

#[test]
fn form_result_for_other_identity_is_dropped() {
    let mut st = AppState::default();
    let _ = login(&mut st, "R1", "Ann");
    let _ = update(
        &mut st,
        AppMsg::UserCreated {
            user: user("R1"),
            outcome: Ok("ok".into()),
        },
    );
    let _ = update(
        &mut st,
        AppMsg::FormLoaded {
            roll_number: "R2".into(),
            outcome: Ok(one_section_schema()),
        },
    );
    assert!(matches!(form_screen(&st).engine.phase(), Phase::Loading));
}

#[test]
fn failed_fetch_then_logout_returns_to_blank_login() {
    let mut st = AppState::default();
    let _ = login(&mut st, "R1", "Ann");
    let _ = update(
        &mut st,
        AppMsg::UserCreated {
            user: user("R1"),
            outcome: Ok("ok".into()),
        },
    );
    let _ = update(
        &mut st,
        AppMsg::FormLoaded {
            roll_number: "R1".into(),
            outcome: Err("status 500".into()),
        },
    );
    assert!(matches!(form_screen(&st).engine.phase(), Phase::Failed(_)));
    let _ = update(&mut st, AppMsg::Logout);
    match &st.screen {
        Screen::Login(ls) => {
            assert!(ls.roll_number.is_empty());
            assert!(ls.api_error.is_none());
        }
        Screen::Form(_) => panic!("expected login"),
    }
    // a late result after logout changes nothing
    let _ = update(
        &mut st,
        AppMsg::FormLoaded {
            roll_number: "R1".into(),
            outcome: Ok(one_section_schema()),
        },
    );
    assert!(matches!(st.screen, Screen::Login(_)));
}

#[test]
fn toggle_debug_flips_pane() {
    let mut st = AppState::default();
    let before = st.show_debug;
    let _ = update(&mut st, AppMsg::ToggleDebug);
    assert_eq!(st.show_debug, !before);
}

#[test]
fn duplicate_form_result_keeps_focus() {
    let mut st = ready_state();
    if let Screen::Form(fs) = &mut st.screen {
        fs.focus.index = 1;
    }
    let _ = update(
        &mut st,
        AppMsg::FormLoaded {
            roll_number: "R1".into(),
            outcome: Ok(one_section_schema()),
        },
    );
    let fs = form_screen(&st);
    assert_eq!(fs.focus.index, 1);
    assert!(matches!(fs.engine.phase(), Phase::Ready(_)));
}
