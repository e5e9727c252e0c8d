//! `turno-host` -- headless appointment form session.
//!
//! Reads a JSON object of field values (from the file named by the first
//! argument, or stdin), validates it like the page would, and on success
//! runs the completion sequence and prints the normalized appointment
//! request as JSON on stdout. Field errors go to stderr.
//!
//! # Exit codes
//!
//! | Code | Meaning                                  |
//! |------|------------------------------------------|
//! | `0`  | form accepted and submitted              |
//! | `1`  | unreadable input or bad configuration    |
//! | `2`  | form incomplete, field errors on stderr  |

use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turno_host::config::HostConfig;
use turno_host::runner::{self, FormReport};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turno_host=info,turno_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Form session failed");
            ExitCode::from(1)
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let config = HostConfig::from_env();
    tracing::info!(
        rules = ?config.rules_path,
        submit_delay_ms = config.timings.submit_delay.as_millis() as u64,
        "Loaded host configuration",
    );

    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading form values from {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading form values from stdin")?;
            buf
        }
    };
    let values = runner::values_from_json(&input).context("parsing form values")?;

    match runner::run_form(values, &config).await? {
        FormReport::Submitted(request) => {
            println!("{}", serde_json::to_string_pretty(&request)?);
            Ok(ExitCode::SUCCESS)
        }
        FormReport::Incomplete(violations) => {
            for v in &violations {
                eprintln!("{}: {}", v.field, v.message);
            }
            Ok(ExitCode::from(2))
        }
    }
}
