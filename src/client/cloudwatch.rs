use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatchlogs::error::{ProvideErrorMetadata, SdkError};

use super::{ClientError, ClientResult, LogsClient};
use crate::domain::{QueryResults, QueryStatus, ResultField, TimeWindow};

pub struct CloudWatchLogsClient {
    inner: aws_sdk_cloudwatchlogs::Client,
}

impl CloudWatchLogsClient {
    /// Build a client from the default AWS config chain, with optional
    /// region and profile overrides. Fails up front when no region
    /// resolves rather than erroring on the first request.
    pub async fn connect(
        region: Option<String>,
        profile: Option<String>,
    ) -> ClientResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        match config.region() {
            Some(region) => tracing::info!(%region, "resolved AWS region"),
            None => {
                return Err(ClientError::ConfigError(
                    "no AWS region configured (use --region, AWS_REGION, or a profile with a region)"
                        .to_string(),
                ));
            }
        }

        Ok(Self {
            inner: aws_sdk_cloudwatchlogs::Client::new(&config),
        })
    }
}

#[async_trait]
impl LogsClient for CloudWatchLogsClient {
    async fn start_query(
        &self,
        log_group: &str,
        query: &str,
        window: TimeWindow,
    ) -> ClientResult<String> {
        // StartQuery takes epoch seconds; the window is milliseconds.
        let response = self
            .inner
            .start_query()
            .log_group_name(log_group)
            .query_string(query)
            .start_time(window.start_ms / 1000)
            .end_time(window.end_ms / 1000)
            .send()
            .await
            .map_err(sdk_error)?;

        response
            .query_id()
            .map(str::to_string)
            .ok_or_else(|| ClientError::ParseError("StartQuery returned no query id".to_string()))
    }

    async fn get_query_results(&self, query_id: &str) -> ClientResult<QueryResults> {
        let response = self
            .inner
            .get_query_results()
            .query_id(query_id)
            .send()
            .await
            .map_err(sdk_error)?;

        let status = response
            .status()
            .map(|s| QueryStatus::from(s.as_str()))
            .unwrap_or_else(|| QueryStatus::Unknown("missing status".to_string()));

        let rows = response
            .results()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|f| ResultField {
                        field: f.field().unwrap_or_default().to_string(),
                        value: f.value().unwrap_or_default().to_string(),
                    })
                    .collect()
            })
            .collect();

        Ok(QueryResults { status, rows })
    }
}

fn sdk_error<E>(err: SdkError<E>) -> ClientError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    if matches!(err, SdkError::TimeoutError(_)) {
        return ClientError::Timeout;
    }
    if matches!(err, SdkError::DispatchFailure(_)) {
        return ClientError::ConnectionError(err.to_string());
    }

    let code = err.code().unwrap_or("unknown").to_string();
    let message = err.message().unwrap_or("").to_string();
    match code.as_str() {
        "ResourceNotFoundException" => ClientError::NotFound(message),
        _ => ClientError::RequestFailed(format!("{code}: {message}")),
    }
}
