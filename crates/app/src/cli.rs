use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Overrides;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Discussion number within the configured repository.
    #[arg(long, global = true)]
    pub discussion: Option<String>,
    #[arg(long, global = true)]
    pub token: Option<String>,
    /// Mount point: `#id`, `.class` or a tag name.
    #[arg(long, global = true)]
    pub mount: Option<String>,
    /// Base URL of the comment proxy.
    #[arg(long, global = true)]
    pub api_base: Option<String>,
    /// Host page to mount into; its script tag may carry `data-discussion`
    /// and `data-token`.
    #[arg(long, global = true)]
    pub page: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch the thread once and print the rendered page.
    Render {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Post a comment, then reload and print the page.
    Submit {
        /// Comment body; read from stdin when omitted.
        #[arg(long)]
        body: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Serve the page with the thread mounted and accept form posts.
    Serve,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            discussion: self.discussion.clone(),
            token: self.token.clone(),
            mount: self.mount.clone(),
            api_base: self.api_base.clone(),
        }
    }
}
