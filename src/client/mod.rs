pub mod cloudwatch;
pub mod traits;

pub use cloudwatch::CloudWatchLogsClient;
pub use traits::{ClientError, ClientResult, LogsClient};
