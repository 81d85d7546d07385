use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::dto::User;
use crate::styling::types::StylingResult;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Home,
    Login,
    Signup,
    Dashboard,
    Result,
    History,
}

impl View {
    fn needs_user(self) -> bool {
        matches!(self, View::Dashboard | View::Result | View::History)
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Login(User),
    Logout,
    Navigate(View),
    SetResult(StylingResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub view: View,
    pub user: Option<User>,
    pub last_result: Option<StylingResult>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            view: View::Home,
            user: None,
            last_result: None,
        }
    }
}

impl SessionState {
    /// Startup state: a stored user resumes on the dashboard.
    pub fn restore(user: Option<User>) -> Self {
        match user {
            Some(user) => Self {
                view: View::Dashboard,
                user: Some(user),
                last_result: None,
            },
            None => Self::default(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            view: self.view,
            signed_in: self.user.is_some(),
            last_result_id: self.last_result.as_ref().map(|r| r.id),
        }
    }
}

pub fn reduce(state: SessionState, action: Action) -> SessionState {
    match action {
        Action::Login(user) => SessionState {
            view: View::Dashboard,
            user: Some(user),
            last_result: None,
        },
        Action::Logout => SessionState::default(),
        Action::SetResult(result) => SessionState {
            view: View::Result,
            last_result: Some(result),
            ..state
        },
        Action::Navigate(target) => {
            let view = if target.needs_user() && state.user.is_none() {
                View::Login
            } else if target == View::Result && state.last_result.is_none() {
                View::Dashboard
            } else {
                target
            };
            SessionState { view, ..state }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Public view of the session; identity stays behind `/me`.
pub struct SessionSummary {
    pub view: View,
    pub signed_in: bool,
    pub last_result_id: Option<Uuid>,
}
