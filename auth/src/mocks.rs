//! Recording mocks for tests.

use crate::error::{AuthError, Result};
use crate::providers::EmailProvider;
use std::sync::{Arc, Mutex};

/// A captured verification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient.
    pub to: String,
    /// Verification link.
    pub link: String,
}

impl SentEmail {
    /// The `oobCode` query parameter of the link.
    #[must_use]
    pub fn code(&self) -> Option<String> {
        let query = self.link.split_once('?')?.1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("oobCode="))
            .and_then(|code| urlencoding::decode(code).ok())
            .map(std::borrow::Cow::into_owned)
    }
}

/// Email provider that records instead of sending.
#[derive(Debug, Clone, Default)]
pub struct MockEmailProvider {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    failing: Arc<Mutex<bool>>,
}

impl MockEmailProvider {
    /// Create a new mock email provider that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later send fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut flag) = self.failing.lock() {
            *flag = failing;
        }
    }

    /// All emails sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Most recent email to `to`.
    #[must_use]
    pub fn last_to(&self, to: &str) -> Option<SentEmail> {
        self.sent().into_iter().rev().find(|email| email.to == to)
    }
}

impl EmailProvider for MockEmailProvider {
    async fn send_verification_email(&self, to: &str, link: &str) -> Result<()> {
        if self.failing.lock().map(|f| *f).unwrap_or(false) {
            return Err(AuthError::EmailError("mock delivery failure".into()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentEmail {
                to: to.to_string(),
                link: link.to_string(),
            });
        }
        Ok(())
    }
}
