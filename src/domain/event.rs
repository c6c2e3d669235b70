use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One log line's JSON payload as the state machine writes it. Numeric
/// fields arrive as either JSON numbers or numeric strings depending on
/// the logging configuration, so they go through [`lenient_i64`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawLogRecord {
    #[serde(deserialize_with = "lenient_i64")]
    pub event_timestamp: i64,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub previous_event_id: i64,
    pub details: Value,
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientI64;

    impl Visitor<'_> for LenientI64 {
        type Value = i64;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("an integer or a string holding one")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom(format!("{v} does not fit in i64")))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            Ok(v as i64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            v.parse()
                .map_err(|_| E::custom(format!("'{v}' is not an integer")))
        }
    }

    deserializer.deserialize_any(LenientI64)
}

/// Normalized output unit: the four base fields plus at most one
/// type-specific detail object, keyed by the variant's serialized name.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionEvent {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub id: i64,
    #[serde(rename = "previousEventId")]
    pub previous_event_id: i64,
    #[serde(flatten)]
    pub details: Option<EventDetails>,
}

/// Closed set of detail payloads. The variant name doubles as the nesting
/// key in the output document; event types outside this set carry no
/// details at all.
#[derive(Debug, Clone, Serialize)]
pub enum EventDetails {
    #[serde(rename = "executionStartedEventDetails")]
    ExecutionStarted(ExecutionStartedDetails),
    #[serde(rename = "stateEnteredEventDetails")]
    StateEntered(StateEnteredDetails),
    #[serde(rename = "stateExitedEventDetails")]
    StateExited(StateExitedDetails),
    #[serde(rename = "taskScheduledEventDetails")]
    TaskScheduled(TaskScheduledDetails),
    #[serde(rename = "taskStartedEventDetails")]
    TaskStarted(TaskStartedDetails),
    #[serde(rename = "taskSucceededEventDetails")]
    TaskSucceeded(TaskSucceededDetails),
    #[serde(rename = "executionFailedEventDetails")]
    ExecutionFailed(ExecutionFailedDetails),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStartedDetails {
    pub input: Value,
    pub input_details: Value,
    pub role_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateEnteredDetails {
    pub name: String,
    pub input: Value,
    pub input_details: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateExitedDetails {
    pub name: String,
    pub output: Value,
    pub output_details: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskScheduledDetails {
    pub resource_type: String,
    pub resource: String,
    pub region: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStartedDetails {
    pub resource_type: String,
    pub resource: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSucceededDetails {
    pub resource_type: String,
    pub resource: String,
    pub output: Value,
    pub output_details: Value,
}

/// Serializes as `{}` — the log line carries nothing worth projecting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionFailedDetails {}
