//! Sender password lookup.
//!
//! Known senders keep their relay password in an environment variable named by
//! the configured mapping, so the form value is ignored for them. Unknown senders
//! log in with the password supplied in the request.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::BatchError;

/// One entry of the `sender_credentials` config list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SenderCredential {
    pub email: String,
    /// Name of the environment variable holding the password.
    pub password_env: String,
}

/// Immutable sender → environment variable mapping, built once at start-up.
#[derive(Debug, Clone, Default)]
pub struct CredentialMap {
    entries: HashMap<String, String>,
}

impl CredentialMap {
    pub fn new(entries: impl IntoIterator<Item = SenderCredential>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|c| (c.email.trim().to_ascii_lowercase(), c.password_env))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of the variable configured for `sender`, if any.
    pub fn variable_for(&self, sender: &str) -> Option<&str> {
        self.entries
            .get(&sender.trim().to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Resolve the password for `sender` from the process environment.
    pub fn resolve(&self, sender: &str, supplied: &str) -> Result<String, BatchError> {
        self.resolve_with(sender, supplied, |var| std::env::var(var).ok())
    }

    pub fn resolve_with<F>(&self, sender: &str, supplied: &str, lookup: F) -> Result<String, BatchError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let Some(variable) = self.variable_for(sender) else {
            return Ok(supplied.to_string());
        };

        match lookup(variable) {
            Some(password) if !password.is_empty() => {
                tracing::debug!(sender, variable, "using mapped sender password");
                Ok(password)
            }
            _ => Err(BatchError::MissingCredential {
                sender: sender.to_string(),
                variable: variable.to_string(),
            }),
        }
    }
}
