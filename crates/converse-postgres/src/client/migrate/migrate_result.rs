use std::time::Duration;

/// Applied and pending migration versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Applied versions in ascending order.
    pub applied_versions: Vec<String>,
    /// Embedded versions not yet applied, in ascending order.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    pub fn new(
        applied_versions: impl Into<Vec<String>>,
        pending_versions: impl Into<Vec<String>>,
    ) -> Self {
        Self {
            applied_versions: applied_versions.into(),
            pending_versions: pending_versions.into(),
        }
    }

    /// Returns the applied share of all known migrations, 1.0 when there are none.
    pub fn progress_ratio(&self) -> f64 {
        match self.total_migrations() {
            0 => 1.0,
            total => self.applied_migrations() as f64 / total as f64,
        }
    }

    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.last().map(String::as_str)
    }

    pub fn next_pending_version(&self) -> Option<&str> {
        self.pending_versions.first().map(String::as_str)
    }

    #[inline]
    pub fn applied_migrations(&self) -> usize {
        self.applied_versions.len()
    }

    #[inline]
    pub fn pending_migrations(&self) -> usize {
        self.pending_versions.len()
    }

    #[inline]
    pub fn total_migrations(&self) -> usize {
        self.applied_migrations() + self.pending_migrations()
    }

    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    pub duration: Duration,
    /// Versions applied by this run.
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    pub fn success(duration: Duration, processed_versions: Vec<String>) -> Self {
        Self {
            duration,
            processed_versions,
        }
    }

    /// Returns the number of migrations this run applied.
    #[inline]
    pub fn migrations_processed(&self) -> usize {
        self.processed_versions.len()
    }
}
