use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::history::TimestampFormat;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

#[derive(Parser, Debug)]
#[command(
    name = "express-history",
    about = "Rebuild Step Functions Express execution history from CloudWatch Logs"
)]
pub struct Cli {
    /// The execution ARN to search for in the logs
    #[arg(long, env = "EXPRESS_HISTORY_EXECUTION_ARN")]
    pub execution_arn: String,

    /// The CloudWatch Logs group the state machine logs to
    #[arg(long, env = "EXPRESS_HISTORY_LOG_GROUP")]
    pub log_group_name: String,

    /// Start of the search window in Unix milliseconds (default: one hour ago)
    #[arg(long)]
    pub start_time: Option<i64>,

    /// End of the search window in Unix milliseconds (default: now)
    #[arg(long)]
    pub end_time: Option<i64>,

    /// AWS region override
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS shared config profile
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Seconds between query completion polls
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Timezone for event timestamps in the output
    #[arg(long, value_enum)]
    pub timestamp_format: Option<TimestampFormat>,

    /// Where to write the history document
    #[arg(long, default_value = "output-express-history.json")]
    pub output: PathBuf,

    /// Log file path
    #[arg(long, env = "EXPRESS_HISTORY_LOG_FILE")]
    pub log_file: Option<String>,
}

impl Cli {
    /// Fill unset options from the config file. CLI and env values win;
    /// built-in defaults apply last via the resolver methods.
    pub fn merge(mut self, file: ConfigFile) -> Self {
        self.region = self.region.or(file.region);
        self.profile = self.profile.or(file.profile);
        self.poll_interval = self.poll_interval.or(file.poll_interval);
        self.timestamp_format = self.timestamp_format.or(file.timestamp_format);
        self
    }

    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
    }

    pub fn timestamp_format(&self) -> TimestampFormat {
        self.timestamp_format.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub poll_interval: Option<u64>,
    pub timestamp_format: Option<TimestampFormat>,
}

impl ConfigFile {
    pub fn load() -> Option<Self> {
        let config_dir = dirs::config_dir()?;
        let config_path = config_dir.join("express-history").join("config.toml");
        let content = std::fs::read_to_string(config_path).ok()?;
        toml::from_str(&content).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec![
            "express-history",
            "--execution-arn",
            "arn:aws:states:us-east-1:123:express:demo:run-1",
            "--log-group-name",
            "/aws/states/demo",
        ];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("args parse")
    }

    #[test]
    fn cli_values_win_over_config_file() {
        let cli = parse(&["--region", "eu-west-1", "--poll-interval", "5"]);
        let merged = cli.merge(ConfigFile {
            region: Some("us-east-1".to_string()),
            profile: Some("ops".to_string()),
            poll_interval: Some(2),
            timestamp_format: Some(TimestampFormat::Utc),
        });

        assert_eq!(merged.region.as_deref(), Some("eu-west-1"));
        assert_eq!(merged.profile.as_deref(), Some("ops"));
        assert_eq!(merged.poll_interval_secs(), 5);
        assert_eq!(merged.timestamp_format(), TimestampFormat::Utc);
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let merged = parse(&[]).merge(ConfigFile::default());

        assert_eq!(merged.poll_interval_secs(), DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(merged.timestamp_format(), TimestampFormat::Local);
        assert_eq!(
            merged.output,
            PathBuf::from("output-express-history.json")
        );
        assert!(merged.start_time.is_none());
        assert!(merged.end_time.is_none());
    }

    #[test]
    fn config_file_parses_from_toml() {
        let file: ConfigFile = toml::from_str(
            r#"
            region = "us-east-1"
            poll_interval = 3
            timestamp_format = "utc"
            "#,
        )
        .expect("toml parses");

        assert_eq!(file.region.as_deref(), Some("us-east-1"));
        assert_eq!(file.poll_interval, Some(3));
        assert_eq!(file.timestamp_format, Some(TimestampFormat::Utc));
    }
}
