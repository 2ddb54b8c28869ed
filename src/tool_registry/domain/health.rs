//! Tool server health domain types.

use super::{ParseHealthStatusError, ServerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Consecutive failures at which a server is reported unhealthy.
const UNHEALTHY_FAILURE_THRESHOLD: u32 = 3;

/// Health status of a tool server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Health has not been checked yet.
    #[default]
    Unknown,
    /// Server answered the last check.
    Healthy,
    /// Server failed recent checks but is below the unhealthy threshold.
    Degraded,
    /// Server failed repeatedly.
    Unhealthy,
}

impl HealthStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HealthStatus {
    type Error = ParseHealthStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unknown" => Ok(Self::Unknown),
            "healthy" => Ok(Self::Healthy),
            "degraded" => Ok(Self::Degraded),
            "unhealthy" => Ok(Self::Unhealthy),
            _ => Err(ParseHealthStatusError(value.to_owned())),
        }
    }
}

/// Latest liveness snapshot of a server. One record is kept per server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    /// Server the snapshot belongs to.
    pub server_id: ServerId,
    /// Current status.
    pub status: HealthStatus,
    /// Round-trip latency of the last check in milliseconds.
    pub latency_ms: Option<u64>,
    /// Number of failed checks since the last success.
    pub consecutive_failures: u32,
    /// When the server was last checked.
    pub last_checked_at: Option<DateTime<Utc>>,
    /// When the server last answered successfully.
    pub last_success_at: Option<DateTime<Utc>>,
    /// Error message of the last failed check.
    pub last_error: Option<String>,
}

impl HealthRecord {
    /// Creates an unchecked record.
    #[must_use]
    pub const fn unknown(server_id: ServerId) -> Self {
        Self {
            server_id,
            status: HealthStatus::Unknown,
            latency_ms: None,
            consecutive_failures: 0,
            last_checked_at: None,
            last_success_at: None,
            last_error: None,
        }
    }

    /// Records a successful check, resetting the failure counter.
    #[must_use]
    pub fn record_success(mut self, latency_ms: u64, checked_at: DateTime<Utc>) -> Self {
        self.status = HealthStatus::Healthy;
        self.latency_ms = Some(latency_ms);
        self.consecutive_failures = 0;
        self.last_checked_at = Some(checked_at);
        self.last_success_at = Some(checked_at);
        self.last_error = None;
        self
    }

    /// Records a failed check.
    ///
    /// The server is `degraded` until the failure count reaches three, then
    /// `unhealthy`.
    #[must_use]
    pub fn record_failure(mut self, error: impl Into<String>, checked_at: DateTime<Utc>) -> Self {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.status = if self.consecutive_failures >= UNHEALTHY_FAILURE_THRESHOLD {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };
        self.latency_ms = None;
        self.last_checked_at = Some(checked_at);
        let message = error.into().trim().to_owned();
        self.last_error = (!message.is_empty()).then_some(message);
        self
    }
}
