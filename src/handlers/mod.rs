//! Route handlers. Inquiries, conversations and visits are shared by the
//! agent and user route groups; the ownership scope of the caller decides
//! which rows they see.

pub mod account;
pub mod admin;
pub mod agent;
pub mod conversations;
pub mod inquiries;
pub mod public;
pub mod user;
pub mod views;
pub mod visits;

use serde::Deserialize;

use crate::config::AppConfig;

/// `?limit=N` on list endpoints; clamped by `AppConfig::list_limit`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Row cap for history-style lists, which return everything up to the
    /// configured maximum unless a limit is given.
    pub fn history_limit(&self, config: &AppConfig) -> i64 {
        config.list_limit(Some(self.limit.unwrap_or(config.api.max_list_limit)))
    }
}

/// Fields whose flag is set, for `ApiError::missing_fields`.
pub(crate) fn missing<'a>(checks: &[(&'a str, bool)]) -> Vec<&'a str> {
    checks
        .iter()
        .filter_map(|(field, absent)| absent.then_some(*field))
        .collect()
}

/// Trimmed, non-empty string or `None`.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
