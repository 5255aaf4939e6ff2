//! User-facing notifications raised by the binding workflow

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Overrides the per-level duration
    pub duration_ms: Option<u32>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            duration_ms: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// How long each level stays on screen, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDurations {
    #[serde(default = "default_success")]
    pub success: u32,
    #[serde(default = "default_info")]
    pub info: u32,
    #[serde(default = "default_warning")]
    pub warning: u32,
    #[serde(default = "default_error")]
    pub error: u32,
}

fn default_success() -> u32 {
    4000
}

fn default_info() -> u32 {
    3000
}

fn default_warning() -> u32 {
    5000
}

fn default_error() -> u32 {
    6000
}

impl Default for NotificationDurations {
    fn default() -> Self {
        Self {
            success: default_success(),
            info: default_info(),
            warning: default_warning(),
            error: default_error(),
        }
    }
}

impl NotificationDurations {
    pub fn for_notification(&self, notification: &Notification) -> u32 {
        notification.duration_ms.unwrap_or(match notification.level {
            NotificationLevel::Success => self.success,
            NotificationLevel::Info => self.info,
            NotificationLevel::Warning => self.warning,
            NotificationLevel::Error => self.error,
        })
    }
}
