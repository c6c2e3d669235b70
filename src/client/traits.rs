use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{QueryResults, TimeWindow};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("config error: {0}")]
    ConfigError(String),
    #[error("timeout")]
    Timeout,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// The log-service seam. Production traffic goes through the CloudWatch
/// implementation; tests script poll responses behind the same trait.
#[async_trait]
pub trait LogsClient: Send + Sync {
    /// Submit an Insights query over the window and return its query id.
    async fn start_query(
        &self,
        log_group: &str,
        query: &str,
        window: TimeWindow,
    ) -> ClientResult<String>;

    /// Fetch the query's current status and whatever rows it has produced.
    async fn get_query_results(&self, query_id: &str) -> ClientResult<QueryResults>;
}
