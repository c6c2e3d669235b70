use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use express_history::client::{CloudWatchLogsClient, LogsClient};
use express_history::config::{Cli, ConfigFile};
use express_history::domain::{QueryStatus, TimeWindow};
use express_history::history::build_history;
use express_history::output::write_history;
use express_history::query::QueryRunner;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse().merge(ConfigFile::load().unwrap_or_default());
    let _log_guard = init_logging(cli.log_file.as_deref())?;

    let client = match CloudWatchLogsClient::connect(cli.region.clone(), cli.profile.clone()).await
    {
        Ok(c) => Arc::new(c) as Arc<dyn LogsClient>,
        Err(e) => {
            eprintln!("Failed to create CloudWatch Logs client: {}", e);
            eprintln!();
            eprintln!("Make sure AWS credentials and a region are configured.");
            eprintln!("  --region / AWS_REGION");
            eprintln!("  --profile / AWS_PROFILE");
            std::process::exit(1);
        }
    };

    let window = TimeWindow::resolve(cli.start_time, cli.end_time);
    let runner = QueryRunner::new(client, Duration::from_secs(cli.poll_interval_secs()));

    let results = runner
        .run(&cli.log_group_name, &cli.execution_arn, window)
        .await?;

    match results.status {
        QueryStatus::Complete => {
            let history = build_history(&results.rows, cli.timestamp_format())?;
            write_history(&cli.output, &history)?;
            println!("Execution history saved to '{}'", cli.output.display());
        }
        status => {
            // Exit code stays zero here; wrapping scripts read the printed status.
            println!("Query failed with status: {}", status);
        }
    }

    Ok(())
}

fn init_logging(log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    if let Some(log_file) = log_file {
        let file = std::fs::File::create(log_file)?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .with_env_filter(EnvFilter::from_default_env())
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(EnvFilter::from_default_env())
            .init();
        Ok(None)
    }
}
