mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use serde_json::Value;

use cli::{Cli, Command, PageArgs};
use datapass::numeric::format_number;
use datapass::user::get_user_data_from_value;
use datapass::{
    Console, DatapassConfig, Document, Orchestrator, StepSequencer, bootstrap,
    calculate_with_offset, detect, sum_array,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => DatapassConfig::load_from(path)?,
        None => DatapassConfig::load()?,
    };
    let console = Console::stdout();

    match cli.command {
        Command::Run { page } => {
            let orchestrator = build_orchestrator(config, &page, console)?;
            let code = orchestrator.run().await;
            Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
        }
        Command::Boot { page } => {
            let orchestrator = build_orchestrator(config, &page, console)?;
            let code = bootstrap(&orchestrator).await.unwrap_or(0);
            Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
        }
        Command::Steps => {
            StepSequencer::new(config.steps).run(&console).await;
            Ok(ExitCode::SUCCESS)
        }
        Command::Offset { value } => {
            console.log(format_number(calculate_with_offset(value.as_str())));
            Ok(ExitCode::SUCCESS)
        }
        Command::User { json } => {
            let value: Value = serde_json::from_str(&json).context("user must be valid JSON")?;
            console.log(get_user_data_from_value(&value));
            Ok(ExitCode::SUCCESS)
        }
        Command::Sum { json } => {
            let value: Value = serde_json::from_str(&json).context("input must be valid JSON")?;
            console.log(format_number(sum_array(&value)));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolves the page context from CLI flags over config, then wires the
/// orchestrator. CLI flags win over the config file.
fn build_orchestrator(
    mut config: DatapassConfig,
    page: &PageArgs,
    console: Console,
) -> Result<Orchestrator> {
    if page.page_url.is_some() {
        config.page_url.clone_from(&page.page_url);
    }
    if page.render_to.is_some() {
        config.render_to.clone_from(&page.render_to);
    }

    let url = config
        .page_url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("invalid page URL")?;
    let document = config
        .render_to
        .clone()
        .map_or(Document::InMemory, Document::File);

    let ctx = detect(url, Some(document));
    tracing::debug!(page = ctx.is_page(), "environment resolved");

    Ok(Orchestrator::new(ctx, config, console))
}
