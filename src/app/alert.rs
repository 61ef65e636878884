use crate::common::error::CatalogError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

/// A user-facing message. Every failure in the core ends up as one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub text: String,
    /// Blocking alerts stop the action before anything is sent
    pub blocking: bool,
}

impl Alert {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            text: text.into(),
            blocking: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            text: text.into(),
            blocking: false,
        }
    }

    pub fn blocking(text: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            text: text.into(),
            blocking: true,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == AlertKind::Error
    }
}

impl From<&CatalogError> for Alert {
    fn from(err: &CatalogError) -> Self {
        match err {
            CatalogError::Validation(message) => Alert::blocking(message.clone()),
            CatalogError::Api { status, message } if message.is_empty() => {
                Alert::error(format!("The catalog service answered with status {status}"))
            }
            CatalogError::Api { message, .. } => Alert::error(message.clone()),
            other => Alert::error(other.to_string()),
        }
    }
}

impl From<CatalogError> for Alert {
    fn from(err: CatalogError) -> Self {
        Alert::from(&err)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            AlertKind::Success => "✅",
            AlertKind::Error => "❌",
        };
        write!(f, "{} {}", marker, self.text)
    }
}
