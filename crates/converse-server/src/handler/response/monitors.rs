//! Monitor response types.

use converse_core::{ServiceHealth, ServiceStatus};
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// System monitoring status response.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonitorStatus {
    /// Timestamp when this status was generated.
    pub checked_at: Timestamp,
    /// Worst status among the backends.
    pub status: ServiceStatus,
    /// Application version.
    pub version: String,
    pub postgres: ServiceHealth,
    pub inference: ServiceHealth,
}

impl MonitorStatus {
    /// Combines backend reports; the overall status is the worst of them.
    pub fn new(postgres: ServiceHealth, inference: ServiceHealth) -> Self {
        Self {
            checked_at: Timestamp::now(),
            status: postgres.status.max(inference.status),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            postgres,
            inference,
        }
    }

    #[inline]
    pub fn is_operational(&self) -> bool {
        self.status != ServiceStatus::Unhealthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_status_is_the_worst() {
        let status = MonitorStatus::new(ServiceHealth::healthy(), ServiceHealth::degraded("slow"));
        assert_eq!(status.status, ServiceStatus::Degraded);
        assert!(status.is_operational());

        let status = MonitorStatus::new(ServiceHealth::unhealthy("down"), ServiceHealth::healthy());
        assert_eq!(status.status, ServiceStatus::Unhealthy);
        assert!(!status.is_operational());
    }
}
