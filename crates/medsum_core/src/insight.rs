//! crates/medsum_core/src/insight.rs
//!
//! The two insight read paths a client can poll: the per-document state
//! machine and the coarser per-user aggregate.

use crate::domain::Insight;

pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_NONE: &str = "none";

/// What a client sees when polling one document's insight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightState {
    /// No insight row exists yet.
    Processing,
    Completed { html: String },
    Failed { error_message: Option<String> },
    /// A stored status this service does not interpret. Reported verbatim.
    Other(String),
}

impl InsightState {
    pub fn from_row(row: Option<Insight>) -> Self {
        let Some(insight) = row else {
            return InsightState::Processing;
        };
        match insight.status.as_str() {
            STATUS_COMPLETED => InsightState::Completed {
                html: insight.html_insights,
            },
            STATUS_FAILED => InsightState::Failed {
                error_message: insight.error_message,
            },
            _ => InsightState::Other(insight.status),
        }
    }

    pub fn status(&self) -> &str {
        match self {
            InsightState::Processing => STATUS_PROCESSING,
            InsightState::Completed { .. } => STATUS_COMPLETED,
            InsightState::Failed { .. } => STATUS_FAILED,
            InsightState::Other(status) => status,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            InsightState::Completed { html } => Some(html),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            InsightState::Failed { error_message } => error_message.as_deref(),
            _ => None,
        }
    }
}

/// Aggregate insight stored directly on the user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientInsightState {
    Completed { html: String },
    None,
}

impl PatientInsightState {
    pub fn from_blob(blob: Option<String>) -> Self {
        match blob {
            Some(html) if !html.is_empty() => PatientInsightState::Completed { html },
            _ => PatientInsightState::None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            PatientInsightState::Completed { .. } => STATUS_COMPLETED,
            PatientInsightState::None => STATUS_NONE,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            PatientInsightState::Completed { html } => Some(html),
            PatientInsightState::None => None,
        }
    }
}
