use chrono::{Local, SecondsFormat, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{
    EventDetails, ExecutionEvent, ExecutionFailedDetails, ExecutionHistory, RawLogRecord,
    ResultRow,
};

/// Field of the query projection that holds the JSON log record.
pub const MESSAGE_FIELD: &str = "@message";

/// Timezone used when rendering event timestamps. Local matches what the
/// tool has always produced; `utc` pins the output across machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    #[default]
    Local,
    Utc,
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("result row {row} has no @message field")]
    MissingMessage { row: usize },
    #[error("result row {row} is not a valid JSON log record: {source}")]
    MalformedRecord {
        row: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("event {id} ({event_type}): invalid details: {source}")]
    InvalidDetails {
        id: i64,
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("event timestamp {ms} is out of range")]
    TimestampOutOfRange { ms: i64 },
}

/// Project the rows of a completed query into an execution history, in
/// input order. Any malformed row aborts the whole build; there is no
/// partial output.
pub fn build_history(
    rows: &[ResultRow],
    format: TimestampFormat,
) -> Result<ExecutionHistory, HistoryError> {
    let mut events = Vec::with_capacity(rows.len());
    for (row, fields) in rows.iter().enumerate() {
        let message = fields
            .iter()
            .find(|f| f.field == MESSAGE_FIELD)
            .ok_or(HistoryError::MissingMessage { row })?;

        let record: RawLogRecord = serde_json::from_str(&message.value)
            .map_err(|source| HistoryError::MalformedRecord { row, source })?;

        events.push(project_event(record, format)?);
    }
    Ok(ExecutionHistory { events })
}

fn project_event(
    record: RawLogRecord,
    format: TimestampFormat,
) -> Result<ExecutionEvent, HistoryError> {
    let details =
        project_details(&record.event_type, record.details).map_err(|source| {
            HistoryError::InvalidDetails {
                id: record.id,
                event_type: record.event_type.clone(),
                source,
            }
        })?;

    Ok(ExecutionEvent {
        timestamp: format_timestamp(record.event_timestamp, format)?,
        event_type: record.event_type,
        id: record.id,
        previous_event_id: record.previous_event_id,
        details,
    })
}

/// The per-type projection. Unrecognized types carry no details; within a
/// recognized type every projected field is required.
fn project_details(
    event_type: &str,
    details: Value,
) -> Result<Option<EventDetails>, serde_json::Error> {
    Ok(Some(match event_type {
        "ExecutionStarted" => {
            EventDetails::ExecutionStarted(serde_json::from_value(details)?)
        }
        "ChoiceStateEntered" | "TaskStateEntered" | "FailStateEntered" => {
            EventDetails::StateEntered(serde_json::from_value(details)?)
        }
        "ChoiceStateExited" | "TaskStateExited" => {
            EventDetails::StateExited(serde_json::from_value(details)?)
        }
        "TaskScheduled" => EventDetails::TaskScheduled(serde_json::from_value(details)?),
        "TaskStarted" => EventDetails::TaskStarted(serde_json::from_value(details)?),
        "TaskSucceeded" => EventDetails::TaskSucceeded(serde_json::from_value(details)?),
        "ExecutionFailed" => EventDetails::ExecutionFailed(ExecutionFailedDetails {}),
        _ => return Ok(None),
    }))
}

fn format_timestamp(ms: i64, format: TimestampFormat) -> Result<String, HistoryError> {
    let utc = Utc
        .timestamp_millis_opt(ms)
        .single()
        .ok_or(HistoryError::TimestampOutOfRange { ms })?;

    Ok(match format {
        TimestampFormat::Utc => utc.to_rfc3339_opts(SecondsFormat::Millis, true),
        TimestampFormat::Local => utc
            .with_timezone(&Local)
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.3f")
            .to_string(),
    })
}
