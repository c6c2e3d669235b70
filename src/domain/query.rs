use chrono::Utc;

/// Terminal and in-flight states of a Logs Insights query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Scheduled,
    Running,
    Complete,
    Failed,
    Cancelled,
    Timeout,
    Unknown(String),
}

impl QueryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Running => "Running",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
            Self::Timeout => "Timeout",
            Self::Unknown(s) => s,
        }
    }

    /// Anything other than Scheduled/Running ends polling.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Scheduled | Self::Running)
    }
}

impl From<&str> for QueryStatus {
    fn from(s: &str) -> Self {
        match s {
            "Scheduled" => Self::Scheduled,
            "Running" => Self::Running,
            "Complete" => Self::Complete,
            "Failed" => Self::Failed,
            "Cancelled" => Self::Cancelled,
            "Timeout" => Self::Timeout,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Search range in milliseconds since the epoch. `start <= end` is the
/// caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeWindow {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Fill unset bounds with the defaults: end = now, start = end - 1h.
    pub fn resolve(start_ms: Option<i64>, end_ms: Option<i64>) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            start_ms: start_ms.unwrap_or(now - 3_600_000),
            end_ms: end_ms.unwrap_or(now),
        }
    }
}

/// One projected field of a query result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultField {
    pub field: String,
    pub value: String,
}

pub type ResultRow = Vec<ResultField>;

/// Snapshot of a query as reported by the service: its status and whatever
/// rows are available at that point.
#[derive(Debug, Clone)]
pub struct QueryResults {
    pub status: QueryStatus,
    pub rows: Vec<ResultRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for s in ["Scheduled", "Running", "Complete", "Failed", "Cancelled", "Timeout"] {
            assert_eq!(QueryStatus::from(s).as_str(), s);
        }
        assert_eq!(
            QueryStatus::from("Backfilling"),
            QueryStatus::Unknown("Backfilling".to_string())
        );
        assert_eq!(QueryStatus::from("Backfilling").as_str(), "Backfilling");
    }

    #[test]
    fn terminality() {
        assert!(!QueryStatus::Scheduled.is_terminal());
        assert!(!QueryStatus::Running.is_terminal());
        assert!(QueryStatus::Complete.is_terminal());
        assert!(QueryStatus::Failed.is_terminal());
        assert!(QueryStatus::Cancelled.is_terminal());
        assert!(QueryStatus::Timeout.is_terminal());
        assert!(QueryStatus::Unknown("Backfilling".to_string()).is_terminal());
    }

    #[test]
    fn window_defaults_cover_the_last_hour() {
        let window = TimeWindow::resolve(None, None);
        assert_eq!(window.end_ms - window.start_ms, 3_600_000);

        let pinned = TimeWindow::resolve(Some(1), Some(2));
        assert_eq!(pinned, TimeWindow::new(1, 2));
    }
}
