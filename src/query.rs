use std::sync::Arc;
use std::time::Duration;

use crate::client::{ClientResult, LogsClient};
use crate::domain::{QueryResults, TimeWindow};

/// Build the Insights query for one execution. The ARN lands between the
/// `/` delimiters unescaped, so an ARN containing regex metacharacters
/// corrupts the filter.
pub fn build_query(execution_arn: &str) -> String {
    format!(
        "fields @message\n| filter @message like /{execution_arn}/\n| sort @timestamp asc"
    )
}

/// Submits a query and polls it to a terminal status. There is no upper
/// bound on the loop: a query the service never finishes is polled forever.
pub struct QueryRunner {
    client: Arc<dyn LogsClient>,
    poll_interval: Duration,
}

impl QueryRunner {
    pub fn new(client: Arc<dyn LogsClient>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    /// Run the query to completion and return the terminal results as the
    /// service reported them. Non-`Complete` terminal statuses are not
    /// errors here; the caller branches on the status.
    pub async fn run(
        &self,
        log_group: &str,
        execution_arn: &str,
        window: TimeWindow,
    ) -> ClientResult<QueryResults> {
        let query = build_query(execution_arn);
        tracing::debug!(log_group, start_ms = window.start_ms, end_ms = window.end_ms, "submitting query");

        let query_id = self.client.start_query(log_group, &query, window).await?;
        tracing::info!(query_id, "query started");

        loop {
            let results = self.client.get_query_results(&query_id).await?;
            if results.status.is_terminal() {
                tracing::info!(status = %results.status, rows = results.rows.len(), "query finished");
                return Ok(results);
            }
            tracing::debug!(status = %results.status, "query not finished yet");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::client::ClientError;
    use crate::domain::QueryStatus;

    struct ScriptedClient {
        polls: Mutex<VecDeque<QueryResults>>,
        poll_count: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(polls: Vec<QueryResults>) -> Self {
            Self {
                polls: Mutex::new(polls.into()),
                poll_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LogsClient for ScriptedClient {
        async fn start_query(
            &self,
            _log_group: &str,
            _query: &str,
            _window: TimeWindow,
        ) -> ClientResult<String> {
            Ok("query-1".to_string())
        }

        async fn get_query_results(&self, query_id: &str) -> ClientResult<QueryResults> {
            assert_eq!(query_id, "query-1");
            self.poll_count.fetch_add(1, Ordering::SeqCst);
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ClientError::RequestFailed("script exhausted".to_string()))
        }
    }

    fn poll(status: QueryStatus) -> QueryResults {
        QueryResults {
            status,
            rows: vec![],
        }
    }

    #[test]
    fn query_embeds_the_arn_and_sorts_ascending() {
        let query = build_query("arn:aws:states:us-east-1:123:express:demo:run-1");
        assert!(query.contains("filter @message like /arn:aws:states:us-east-1:123:express:demo:run-1/"));
        assert!(query.starts_with("fields @message"));
        assert!(query.ends_with("| sort @timestamp asc"));
    }

    #[tokio::test]
    async fn polls_until_complete() {
        let client = Arc::new(ScriptedClient::new(vec![
            poll(QueryStatus::Scheduled),
            poll(QueryStatus::Running),
            poll(QueryStatus::Complete),
        ]));
        let runner = QueryRunner::new(client.clone(), Duration::ZERO);

        let results = runner
            .run("/aws/states/demo", "arn:aws:states:::run-1", TimeWindow::new(0, 1))
            .await
            .expect("query runs");

        assert_eq!(results.status, QueryStatus::Complete);
        assert_eq!(client.poll_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_success_terminal_status_ends_polling_and_is_returned() {
        let client = Arc::new(ScriptedClient::new(vec![poll(QueryStatus::Failed)]));
        let runner = QueryRunner::new(client.clone(), Duration::ZERO);

        let results = runner
            .run("/aws/states/demo", "arn:aws:states:::run-1", TimeWindow::new(0, 1))
            .await
            .expect("a failed status is not a client error");

        assert_eq!(results.status, QueryStatus::Failed);
        assert_eq!(client.poll_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn client_errors_propagate() {
        let client = Arc::new(ScriptedClient::new(vec![]));
        let runner = QueryRunner::new(client, Duration::ZERO);

        let err = runner
            .run("/aws/states/demo", "arn:aws:states:::run-1", TimeWindow::new(0, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::RequestFailed(_)));
    }
}
