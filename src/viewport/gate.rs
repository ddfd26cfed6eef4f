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

use crate::engine::EngineStatus;

/// Externally owned engine flags, read once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub status: EngineStatus,
    pub is_loading: bool,
}

/// Readiness and activity of generation for one frame.
///
/// Always derived fresh from the upstream flags; never stored across frames,
/// since the engine status and the loading flag change independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationGate {
    pub is_model_ready: bool,
    pub is_generating: bool,
}

/// Phase of the trailing assistant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Idle,
    Generating,
    NotReady,
}

#[must_use]
pub fn is_model_ready(status: EngineStatus, is_engine_loading: bool) -> bool {
    status == EngineStatus::Ready && !is_engine_loading
}

impl GenerationGate {
    #[must_use]
    pub fn derive(engine: EngineSnapshot, is_generating: bool) -> Self {
        Self { is_model_ready: is_model_ready(engine.status, engine.is_loading), is_generating }
    }

    #[must_use]
    pub fn phase(self) -> GatePhase {
        if self.is_generating {
            GatePhase::Generating
        } else if self.is_model_ready {
            GatePhase::Idle
        } else {
            GatePhase::NotReady
        }
    }
}
