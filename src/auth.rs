//! Static credential lookup gating access to a [`ReviewSession`].
//!
//! This is a demo gate, not an authentication system: credentials are a
//! plain username → password table held in memory.

use crate::config::AnalysisConfig;
use crate::error::WorkflowError;
use crate::workflow::ReviewSession;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl Default for CredentialStore {
    /// The demo accounts `admin/admin123` and `user/user123`.
    fn default() -> Self {
        Self::from_pairs([("admin", "admin123"), ("user", "user123")])
    }
}

impl CredentialStore {
    pub fn from_pairs<U, P>(pairs: impl IntoIterator<Item = (U, P)>) -> Self
    where
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: pairs
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users.get(username).is_some_and(|p| p == password)
    }

    /// Open a fresh session for a known user.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        config: AnalysisConfig,
    ) -> Result<ReviewSession, WorkflowError> {
        if !self.verify(username, password) {
            warn!("Rejected login for '{}'", username);
            return Err(WorkflowError::InvalidCredentials);
        }
        info!("User '{}' logged in", username);
        Ok(ReviewSession::new(username, config))
    }
}
