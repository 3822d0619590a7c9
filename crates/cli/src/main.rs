//! webcast-sign CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration** — flags with environment fallbacks
//!    (`SIGN_API_URL`, `SIGN_API_KEY`, `SIGN_CLIENT_NAME`,
//!    `SIGN_SERVER_MESSAGE_DISABLED`, `LOG_FORMAT`).
//! 2. **Wire observability** — see [`telemetry`].
//! 3. **Construct infrastructure** — one [`web::WebClient`] per run.
//! 4. **Run one command**:
//!    - `fetch` — one sign-server handshake; prints the session it produced.
//!    - `image` — downloads one CDN image to a file.
//!
//! Exit status is non-zero on any failure. A `RATE_LIMIT` failure also prints
//! how long to wait; the CLI itself never retries.

mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use web::{WebClient, WebClientConfig, DEFAULT_TIMEOUT_SECS};
use webcast::{ApiKey, SignApiError, SignConfig, DEFAULT_CLIENT_NAME, DEFAULT_SIGN_URL};

use crate::telemetry::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "webcast-sign", version, about = "Webcast sign-server handshake client")]
struct Cli {
    /// Base URL of the sign server.
    #[arg(long, env = "SIGN_API_URL", default_value = DEFAULT_SIGN_URL)]
    sign_url: String,

    /// API key sent to the sign server.
    #[arg(long, env = "SIGN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Value of the `client` query parameter.
    #[arg(long, env = "SIGN_CLIENT_NAME", default_value = DEFAULT_CLIENT_NAME)]
    client_name: String,

    /// Do not show the sign server's own message on rate-limit errors.
    /// From the environment, any value except `0`, `false`, `no` or `off` enables it.
    #[arg(
        long,
        env = "SIGN_SERVER_MESSAGE_DISABLED",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    suppress_server_message: bool,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Perform one sign-server handshake.
    Fetch {
        /// Extra query parameter as `name=value`. Repeatable.
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Download one image from the CDN.
    Image {
        url: String,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_owned(), value.to_owned())),
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

impl Cli {
    fn client_config(&self) -> WebClientConfig {
        WebClientConfig {
            sign: SignConfig {
                sign_url: self.sign_url.clone(),
                client_name: self.client_name.clone(),
                suppress_server_message: self.suppress_server_message,
            },
            timeout_secs: self.timeout_secs,
            ..WebClientConfig::default()
        }
    }
}

/// What `fetch` reports about a successful handshake.
#[derive(Debug, Serialize)]
struct FetchSummary {
    cursor: String,
    internal_ext: String,
    push_server: String,
    messages: usize,
    cookies: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match telemetry::init(cli.log_format) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(cli).await;
    telemetry.shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(sign) = e.downcast_ref::<SignApiError>() {
                report_retry(sign);
            }
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let api_key = cli.api_key.clone().and_then(ApiKey::new);
    let client = WebClient::new(cli.client_config(), api_key).context("invalid configuration")?;
    tracing::debug!(
        sign_url = %client.sign_config().sign_url,
        command = ?cli.command,
        "client ready"
    );

    match cli.command {
        Command::Fetch { params, json } => {
            let envelope = client.fetch_sign(&params).await?;
            let state = client.session().snapshot();
            let summary = FetchSummary {
                cursor: envelope.cursor,
                internal_ext: envelope.internal_ext,
                push_server: envelope.push_server,
                messages: envelope.messages.len(),
                cookies: state.cookies.iter().map(|(name, _, _)| name.to_owned()).collect(),
            };
            print_summary(&summary, json)?;
        }
        Command::Image { url, output } => {
            let bytes = client.fetch_image(url).await?;
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("wrote {} bytes to {}", bytes.len(), output.display());
        }
    }
    Ok(())
}

fn print_summary(summary: &FetchSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("cursor:       {}", summary.cursor);
        println!("internal_ext: {}", summary.internal_ext);
        println!("push_server:  {}", summary.push_server);
        println!("messages:     {}", summary.messages);
        println!("cookies:      {}", summary.cookies.join(", "));
    }
    Ok(())
}

fn report_retry(error: &SignApiError) {
    let Some(info) = error.rate_limit() else {
        return;
    };
    match info.reset_at() {
        Some(at) => eprintln!(
            "Rate limited: retry in {}s (limit resets at {at}).",
            info.retry_after()
        ),
        None => eprintln!("Rate limited: retry in {}s.", info.retry_after()),
    }
}
