//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::Screen;
use crate::store::PoemStats;
use crate::view::View;

fn default_rating() -> u8 {
    4
}

/// Every user action the page can send. Handled identically over HTTP and WS.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Navigate {
        screen: Screen,
    },
    SelectPoem {
        index: usize,
    },
    StartChallenge,
    ChangePoem,
    SubmitAnswer {
        answer: String,
    },
    RevealAnswer,
    ShowScore,
    Create {
        #[serde(default)]
        themes: Vec<String>,
        #[serde(default)]
        style: String,
        #[serde(default)]
        keywords: String,
    },
    RateCreation {
        #[serde(default = "default_rating")]
        rating: u8,
    },
    SubmitFeedback {
        #[serde(default)]
        text: String,
    },
}

/// Connection-level WS messages that are not user actions.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlWsMessage {
    Ping,
    Refresh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A one-shot, user-visible message produced by an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }
    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }
    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Hello {
        #[serde(rename = "sessionId")]
        session_id: String,
        view: View,
    },
    Pong,
    View {
        #[serde(skip_serializing_if = "Option::is_none")]
        notice: Option<Notice>,
        view: View,
    },
    CreationProgress {
        percent: u32,
        stage: &'static str,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub session_id: String,
    pub view: View,
}

#[derive(Debug, Serialize)]
pub struct ActionOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub view: View,
}

#[derive(Debug, Serialize)]
pub struct PoemSummary {
    pub index: usize,
    pub title: String,
    pub author: String,
    pub dynasty: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOut {
    #[serde(flatten)]
    pub stats: PoemStats,
    pub rejected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse_from_tagged_json() {
        let a: Action = serde_json::from_str(r#"{"type":"submit_answer","answer":"床前明月光"}"#).expect("parse");
        assert_eq!(a, Action::SubmitAnswer { answer: "床前明月光".into() });

        let a: Action = serde_json::from_str(r#"{"type":"navigate","screen":"report"}"#).expect("parse");
        assert_eq!(a, Action::Navigate { screen: Screen::Report });

        let a: Action = serde_json::from_str(r#"{"type":"rate_creation"}"#).expect("parse");
        assert_eq!(a, Action::RateCreation { rating: 4 });

        let a: Action = serde_json::from_str(r#"{"type":"start_challenge"}"#).expect("parse");
        assert_eq!(a, Action::StartChallenge);
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(serde_json::from_str::<Action>(r#"{"type":"teleport"}"#).is_err());
    }

    #[test]
    fn control_messages_do_not_parse_as_actions() {
        assert!(serde_json::from_str::<ControlWsMessage>(r#"{"type":"ping"}"#).is_ok());
        assert!(serde_json::from_str::<Action>(r#"{"type":"ping"}"#).is_err());
    }
}
