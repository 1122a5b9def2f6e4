use crate::domain_model::UserId;

/// Verified identity attached to a request.
///
/// Only built from a verified token or a successful login; fields are
/// private so a principal cannot be altered once handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: UserId,
    label: String,
}

impl Principal {
    pub(crate) fn new(subject: UserId, label: impl Into<String>) -> Self {
        Principal {
            subject,
            label: label.into(),
        }
    }

    pub fn subject(&self) -> &UserId {
        &self.subject
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
