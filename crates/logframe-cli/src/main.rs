mod config;
mod output;

use clap::Parser;
use config::Config;
use logframe_convert::query::{process_response, ResultFormat};
use logframe_convert::response::TableResponse;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Converts a decoded query response into typed frames.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (TOML)
    #[arg(long)]
    config: Option<String>,

    /// Query response JSON
    #[arg(long)]
    input: PathBuf,

    /// Query text recorded on the frames
    #[arg(long, default_value = "")]
    query: String,

    /// Result format: table, time_series or series
    #[arg(long)]
    format: Option<ResultFormat>,

    /// Results-cache max age for this query, overriding the configured one
    #[arg(long)]
    cache_max_age: Option<String>,

    /// Login forwarded to the query service when user tracking is enabled
    #[arg(long)]
    user: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };
    let properties = config
        .datasource
        .connection_properties(args.cache_max_age.as_deref())?;
    let headers = config.datasource.request_headers(args.user.as_deref());
    info!(
        cluster_url = %config.datasource.cluster_url,
        server_timeout = %properties.server_timeout,
        cache_max_age = ?properties.cache_max_age,
        headers = ?headers,
        "loaded settings"
    );

    let bytes = tokio::fs::read(&args.input).await?;
    let response = TableResponse::from_slice(&bytes)?;
    let format = args.format.unwrap_or(config.datasource.default_format);
    info!(
        columns = response.columns.len(),
        rows = response.results.len(),
        %format,
        "converting response"
    );

    let frames = process_response(&response, &args.query, format, &config.reshape_options())?;
    for frame in &frames {
        print!("{}", output::render_frame(frame));
    }
    Ok(())
}
