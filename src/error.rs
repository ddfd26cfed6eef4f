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

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("Terminal is not available")]
    TerminalUnavailable,
    #[error("Failed to import conversation from {}", path.display())]
    ImportFailed { path: PathBuf, reason: String },
    #[error("Invalid command-line configuration: {0}")]
    InvalidConfig(String),
}

impl AppError {
    pub const TERMINAL_UNAVAILABLE_EXIT_CODE: i32 = 20;
    pub const IMPORT_FAILED_EXIT_CODE: i32 = 21;
    pub const INVALID_CONFIG_EXIT_CODE: i32 = 22;

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TerminalUnavailable => Self::TERMINAL_UNAVAILABLE_EXIT_CODE,
            Self::ImportFailed { .. } => Self::IMPORT_FAILED_EXIT_CODE,
            Self::InvalidConfig(_) => Self::INVALID_CONFIG_EXIT_CODE,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::TerminalUnavailable => {
                "No interactive terminal available. Run localchat from a TTY.".to_owned()
            }
            Self::ImportFailed { path, reason } => {
                format!("Could not import {}: {reason}", path.display())
            }
            Self::InvalidConfig(detail) => format!("Invalid configuration: {detail}"),
        }
    }
}
