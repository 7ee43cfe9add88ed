//! "Talk back" form: feedback, song requests, and tips for the DJs.
//!
//! No login is required. Submissions are recorded in the log only; there is
//! no station endpoint to deliver them to yet.

use serde::Serialize;

use crate::util::ValidationError;

pub const SUBMITTED_MESSAGE: &str = "Your message has been sent to RadioRadioX!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Feedback,
    Request,
    Tip,
}

impl MessageKind {
    pub const ALL: [MessageKind; 3] = [MessageKind::Feedback, MessageKind::Request, MessageKind::Tip];

    pub fn label(self) -> &'static str {
        match self {
            MessageKind::Feedback => "Feedback",
            MessageKind::Request => "Song Request",
            MessageKind::Tip => "Tip",
        }
    }

    pub fn next(self) -> Self {
        match self {
            MessageKind::Feedback => MessageKind::Request,
            MessageKind::Request => MessageKind::Tip,
            MessageKind::Tip => MessageKind::Feedback,
        }
    }
}

/// Editable fields, in tab order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TalkBackField {
    #[default]
    Name,
    Email,
    Message,
}

impl TalkBackField {
    pub fn next(self) -> Self {
        match self {
            TalkBackField::Name => TalkBackField::Email,
            TalkBackField::Email => TalkBackField::Message,
            TalkBackField::Message => TalkBackField::Name,
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            TalkBackField::Name => "Your Name (optional)",
            TalkBackField::Email => "Your Email (optional)",
            TalkBackField::Message => "Your message...",
        }
    }
}

/// What was sent, as recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub kind: MessageKind,
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalkBackForm {
    pub kind: MessageKind,
    pub name: String,
    pub email: String,
    pub message: String,
}

impl TalkBackForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_mut(&mut self, field: TalkBackField) -> &mut String {
        match field {
            TalkBackField::Name => &mut self.name,
            TalkBackField::Email => &mut self.email,
            TalkBackField::Message => &mut self.message,
        }
    }

    pub fn field(&self, field: TalkBackField) -> &str {
        match field {
            TalkBackField::Name => &self.name,
            TalkBackField::Email => &self.email,
            TalkBackField::Message => &self.message,
        }
    }

    /// Records the message and resets the form to its defaults.
    ///
    /// A blank message is rejected and the form is left as it was.
    pub fn submit(&mut self) -> Result<Submission, ValidationError> {
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        let form = std::mem::take(self);
        let submission = Submission {
            kind: form.kind,
            name: form.name,
            email: form.email,
            message: form.message,
        };

        match serde_json::to_string(&submission) {
            Ok(json) => tracing::info!(submission = %json, "Talk back submitted"),
            Err(e) => tracing::warn!(error = %e, "Failed to encode talk back submission"),
        }
        Ok(submission)
    }
}
