use crate::config::{PermissionConfig, PromptOutcome};
use crate::error::{permission_denied, provider_error, CalendarResult};
use crate::models::PermissionStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Preference key remembering a read/write permission request
pub const REQUESTED_KEY: &str = "permissionRequested";

/// Preference key remembering a read-only permission request
pub const REQUESTED_READ_KEY: &str = "permissionRequestedRead";

/// Grants plus the "already asked" preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PermissionState {
    pub read: bool,
    pub write: bool,
    #[serde(default)]
    pub preferences: BTreeMap<String, bool>,
}

fn requested_key(read_only: bool) -> &'static str {
    if read_only {
        REQUESTED_READ_KEY
    } else {
        REQUESTED_KEY
    }
}

impl PermissionState {
    /// Add grants the configuration hands out up front
    pub fn apply_config(&mut self, config: &PermissionConfig) {
        self.read |= config.read;
        self.write |= config.write;
    }

    /// Read-only access needs read; full access needs both
    pub fn has_access(&self, read_only: bool) -> bool {
        if read_only {
            self.read
        } else {
            self.read && self.write
        }
    }

    fn was_requested(&self, read_only: bool) -> bool {
        self.preferences
            .get(requested_key(read_only))
            .copied()
            .unwrap_or(false)
    }

    pub fn check(&self, read_only: bool, show_rationale: bool) -> PermissionStatus {
        if self.has_access(read_only) {
            PermissionStatus::Authorized
        } else if !self.was_requested(read_only) {
            PermissionStatus::Undetermined
        } else if show_rationale {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Restricted
        }
    }

    /// Record the request and resolve it against the prompt outcome
    pub fn request(
        &mut self,
        read_only: bool,
        prompt: PromptOutcome,
    ) -> CalendarResult<PermissionStatus> {
        self.preferences
            .insert(requested_key(read_only).to_string(), true);

        if self.has_access(read_only) {
            return Ok(PermissionStatus::Authorized);
        }

        match prompt {
            PromptOutcome::Grant => {
                self.read = true;
                if !read_only {
                    self.write = true;
                }
                Ok(PermissionStatus::Authorized)
            }
            PromptOutcome::Deny => Ok(PermissionStatus::Denied),
            PromptOutcome::Cancel => Err(provider_error(
                "permissions - unknown error",
                "Request was cancelled",
            )),
        }
    }

    /// Fail with a permission error unless access is granted
    pub fn require(&self, read_only: bool) -> CalendarResult<()> {
        if self.has_access(read_only) {
            Ok(())
        } else {
            Err(permission_denied())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_before_and_after_request() {
        let mut state = PermissionState::default();
        assert_eq!(state.check(false, false), PermissionStatus::Undetermined);

        assert_eq!(
            state.request(false, PromptOutcome::Deny).unwrap(),
            PermissionStatus::Denied
        );
        assert_eq!(state.check(false, false), PermissionStatus::Restricted);
        assert_eq!(state.check(false, true), PermissionStatus::Denied);
        // Read-only requests are tracked separately
        assert_eq!(state.check(true, true), PermissionStatus::Undetermined);
    }

    #[test]
    fn test_read_only_grant_does_not_allow_writes() {
        let mut state = PermissionState::default();
        assert_eq!(
            state.request(true, PromptOutcome::Grant).unwrap(),
            PermissionStatus::Authorized
        );
        assert!(state.require(true).is_ok());
        assert!(state.require(false).is_err());
        assert_eq!(state.check(false, false), PermissionStatus::Undetermined);
    }

    #[test]
    fn test_cancelled_prompt_is_an_error() {
        let mut state = PermissionState::default();
        assert!(state.request(false, PromptOutcome::Cancel).is_err());
        assert_eq!(state.preferences.get(REQUESTED_KEY), Some(&true));
    }

    #[test]
    fn test_granted_access_skips_prompt() {
        let mut state = PermissionState::default();
        state.apply_config(&PermissionConfig {
            read: true,
            write: true,
            ..PermissionConfig::default()
        });
        assert_eq!(
            state.request(false, PromptOutcome::Deny).unwrap(),
            PermissionStatus::Authorized
        );
    }
}
