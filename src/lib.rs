// localchat — A terminal chat interface for local and remote language models
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

pub mod app;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod ui;
pub mod viewport;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "localchat", version, about = "Terminal chat for local language models")]
pub struct Cli {
    /// Model to load on startup
    #[arg(long, short, default_value = "scripted-demo")]
    pub model: String,

    /// Import a previously exported conversation (JSON) and open it
    #[arg(long, value_name = "PATH")]
    pub import: Option<PathBuf>,

    /// Rows from the bottom that still count as "at the bottom"
    #[arg(long, value_name = "ROWS", default_value_t = 1)]
    pub scroll_threshold: usize,

    /// Delay between streamed tokens of the scripted engine
    #[arg(long, value_name = "MS", default_value_t = 30)]
    pub token_delay_ms: u64,

    /// Simulated model load time of the scripted engine
    #[arg(long, value_name = "MS", default_value_t = 400)]
    pub load_delay_ms: u64,

    /// Hide the keyboard shortcuts action in the header
    #[arg(long)]
    pub no_shortcuts: bool,

    /// Write tracing diagnostics to a file (disabled unless explicitly set)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Tracing filter directives (example: `info,localchat::viewport=debug`)
    /// Falls back to `RUST_LOG` when omitted.
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Append to `--log-file` instead of truncating on startup
    #[arg(long)]
    pub log_append: bool,
}

impl Cli {
    /// Reject combinations clap cannot express on its own.
    pub fn validate(&self) -> Result<(), error::AppError> {
        if self.model.trim().is_empty() {
            return Err(error::AppError::InvalidConfig("--model must not be empty".to_owned()));
        }
        Ok(())
    }
}
