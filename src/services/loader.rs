use crate::app::AppMsg;
use crate::model::{FormSchema, User};
use crate::services::api::ApiClient;
use std::sync::mpsc::Sender;
use std::thread;

/// Results posted back from worker threads to the UI loop.
pub enum LoadMsg {
    UserCreated {
        user: User,
        outcome: Result<String, String>,
    },
    FormLoaded {
        roll_number: String,
        outcome: Result<FormSchema, String>,
    },
}

impl From<LoadMsg> for AppMsg {
    fn from(msg: LoadMsg) -> Self {
        match msg {
            LoadMsg::UserCreated { user, outcome } => AppMsg::UserCreated { user, outcome },
            LoadMsg::FormLoaded {
                roll_number,
                outcome,
            } => AppMsg::FormLoaded {
                roll_number,
                outcome,
            },
        }
    }
}

pub fn spawn_create_user(api: ApiClient, user: User, tx: Sender<LoadMsg>) {
    thread::spawn(move || {
        let outcome = api.create_user(&user);
        let _ = tx.send(LoadMsg::UserCreated { user, outcome });
    });
}

pub fn spawn_fetch_form(api: ApiClient, roll_number: String, tx: Sender<LoadMsg>) {
    thread::spawn(move || {
        let outcome = api.get_form(&roll_number).map_err(|e| {
            tracing::warn!(roll_number = %roll_number, error = %e, "get-form failed");
            format!("{e}")
        });
        let _ = tx.send(LoadMsg::FormLoaded {
            roll_number,
            outcome,
        });
    });
}

#[cfg(test)]
mod loader_tests;
