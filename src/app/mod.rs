use crate::engine::{FormEngine, StepOutcome};
use crate::model::{FormSchema, FormValues, User};
use crate::ui::{AppState, Screen, ToastLevel};
use crate::widgets::field::FieldChange;
use crate::widgets::form_screen::FormScreen;
use crate::widgets::login::{LoginField, LoginState};

pub enum AppMsg {
    LoginEdit {
        field: LoginField,
        value: String,
    },
    LoginSubmit,
    UserCreated {
        user: User,
        outcome: Result<String, String>,
    },
    FormLoaded {
        roll_number: String,
        outcome: Result<FormSchema, String>,
    },
    FieldChanged(FieldChange),
    Next,
    Prev,
    Submit,
    Logout,
    ToggleDebug,
}

pub enum Effect {
    CreateUser {
        user: User,
    },
    FetchForm {
        roll_number: String,
    },
    SubmitForm {
        values: FormValues,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        LoginEdit { field, value } => {
            if let Screen::Login(ls) = &mut state.screen {
                ls.edit(field, value);
            }
        }
        LoginSubmit => {
            let Screen::Login(ls) = &mut state.screen else {
                return effects;
            };
            // One registration call at a time
            if ls.loading {
                return effects;
            }
            ls.api_error = None;
            if !ls.validate() {
                return effects;
            }
            ls.loading = true;
            let user = ls.user();
            state.dbg(format!("create user {}", user.roll_number));
            effects.push(Effect::CreateUser { user });
        }
        UserCreated { user, outcome } => {
            let Screen::Login(ls) = &mut state.screen else {
                state.dbg("registration result ignored: not on login");
                return effects;
            };
            if !ls.loading {
                return effects;
            }
            ls.loading = false;
            match outcome {
                Ok(message) => {
                    state.dbg(format!("logged in {}: {message}", user.roll_number));
                    effects.push(Effect::ShowToast {
                        text: message,
                        level: ToastLevel::Success,
                        seconds: 3,
                    });
                    let mut engine = FormEngine::new(user);
                    if engine.begin_fetch() {
                        effects.push(Effect::FetchForm {
                            roll_number: engine.user().roll_number.clone(),
                        });
                    }
                    state.screen = Screen::Form(Box::new(FormScreen::new(engine)));
                }
                Err(message) => {
                    ls.api_error = Some(message.clone());
                    state.dbg(format!("registration failed: {message}"));
                }
            }
        }
        FormLoaded {
            roll_number,
            outcome,
        } => {
            let note = match &outcome {
                Ok(schema) => format!("form loaded: {}", schema.form_title),
                Err(e) => format!("form load failed: {e}"),
            };
            // Results for a session that was logged out, or is no longer loading, are dropped
            let applied = match &mut state.screen {
                Screen::Form(fs) if fs.engine.user().roll_number == roll_number => {
                    let applied = fs.engine.schema_loaded(outcome);
                    if applied {
                        fs.focus.reset();
                    }
                    applied
                }
                _ => false,
            };
            if applied {
                state.dbg(note);
            } else {
                state.dbg(format!("form for {roll_number} ignored: no loading session"));
            }
        }
        FieldChanged(change) => {
            if let Screen::Form(fs) = &mut state.screen {
                fs.engine.change_field(&change.field_id, change.value);
            }
        }
        Next => {
            let Screen::Form(fs) = &mut state.screen else {
                return effects;
            };
            match fs.engine.next() {
                StepOutcome::Advanced { to } => {
                    fs.focus.reset();
                    state.dbg(format!("section {}", to + 1));
                }
                StepOutcome::Blocked { errors } => {
                    state.dbg(format!("next blocked: {errors} invalid field(s)"));
                }
                StepOutcome::AtEnd => {}
            }
        }
        Prev => {
            if let Screen::Form(fs) = &mut state.screen {
                if fs.engine.prev() {
                    fs.focus.reset();
                }
            }
        }
        Submit => {
            let Screen::Form(fs) = &mut state.screen else {
                return effects;
            };
            match fs.engine.submit() {
                Some(values) => effects.push(Effect::SubmitForm { values }),
                None => state.dbg("submit blocked by validation"),
            }
        }
        Logout => {
            if let Screen::Form(fs) = &state.screen {
                let roll = fs.engine.user().roll_number.clone();
                state.dbg(format!("logout {roll}"));
                effects.push(Effect::ShowToast {
                    text: "Logged out".into(),
                    level: ToastLevel::Info,
                    seconds: 2,
                });
            }
            state.screen = Screen::Login(LoginState::default());
        }
        ToggleDebug => {
            state.show_debug = !state.show_debug;
        }
    }
    effects
}

#[cfg(test)]
mod tests;
