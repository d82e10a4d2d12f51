mod cli;
mod composer;
mod config;
mod dom;
mod http;
mod pipeline;
mod render;
mod state;
mod wiring;

#[cfg(test)]
mod test_support;

use std::io::Read;
use std::path::Path;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::{ConfigError, ScriptAttrs, WidgetConfig};
use crate::dom::DomError;
use crate::http::HttpError;
use crate::pipeline::Mounted;
use crate::state::AppState;
use crate::wiring::WiringError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("render error: {0}")]
    Dom(#[from] DomError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no discussion to comment on")]
    NoDiscussion,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    config::load_dotenv()?;
    let host_page = cli.page.as_ref().map(std::fs::read_to_string).transpose()?;
    let script = host_page
        .as_deref()
        .map(config::script_attrs)
        .unwrap_or_else(ScriptAttrs::default);
    let config = WidgetConfig::from_env(&cli.overrides(), &script)?;
    info!(
        discussion = %config.discussion_number,
        mount = %config.mount_selector,
        repo_owner = %config.repo_owner,
        repo_name = %config.repo_name,
        "widget configured"
    );
    let state = wiring::build_state(config, host_page)?;

    match cli.command {
        Command::Render { out } => {
            let page = state.pipeline.render_page(state.host_document()).await?;
            if page.mounted == Mounted::Nothing {
                warn!("thread unavailable; page written without comments");
            }
            write_output(out.as_deref(), &page.document.to_html())?;
        }
        Command::Submit { body, out } => {
            let draft = match body {
                Some(body) => body,
                None => read_stdin()?,
            };
            submit(&state, &draft, out.as_deref()).await?;
        }
        Command::Serve => {
            let addr = state.config.http_addr;
            info!(%addr, "http server starting");
            tokio::select! {
                _ = shutdown_signal() => {
                    info!("shutdown signal received");
                }
                res = http::serve(addr, state) => {
                    res?;
                }
            }
        }
    }

    Ok(())
}

async fn submit(state: &AppState, draft: &str, out: Option<&Path>) -> Result<(), AppError> {
    let page = state.pipeline.render_page(state.host_document()).await?;
    let Some(discussion_id) = page.discussion_id else {
        return Err(AppError::NoDiscussion);
    };
    let (submitted, reloaded) = state
        .pipeline
        .submit_and_reload(&discussion_id, draft, state.host_document())
        .await?;
    if submitted.is_err() {
        warn!("comment was not accepted; printing reloaded page");
    }
    if let Mounted::Thread { comments, replies } = reloaded.mounted {
        info!(comments, replies, "thread reloaded");
    }
    write_output(out, &reloaded.document.to_html())?;
    Ok(())
}

fn read_stdin() -> Result<String, std::io::Error> {
    let mut draft = String::new();
    std::io::stdin().read_to_string(&mut draft)?;
    Ok(draft.trim_end().to_string())
}

fn write_output(out: Option<&Path>, html: &str) -> Result<(), std::io::Error> {
    match out {
        Some(path) => {
            std::fs::write(path, html)?;
            info!(path = %path.display(), bytes = html.len(), "page written");
        }
        None => println!("{html}"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
    }
}
