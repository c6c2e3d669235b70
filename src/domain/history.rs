use serde::Serialize;

use super::ExecutionEvent;

/// The output document: events in query-result order. The Insights query
/// sorts ascending by timestamp; nothing here re-sorts or deduplicates.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionHistory {
    pub events: Vec<ExecutionEvent>,
}
