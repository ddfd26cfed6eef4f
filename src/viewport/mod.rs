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

//! The streaming conversation viewport: readiness gating, row affordances
//! and bottom-pinned scrolling. Pure state, no terminal types.

mod gate;
mod rows;
mod scroll;
mod shell;

pub use gate::{EngineSnapshot, GatePhase, GenerationGate, is_model_ready};
pub use rows::{EmptyState, ListBody, RowDescriptor, RowOptions, build_rows, row_options};
pub use scroll::{
    AutoScroll, DEFAULT_BOTTOM_THRESHOLD, ScrollMetrics, ScrollSignature, SettleOutcome,
    ViewportState,
};
pub use shell::{Viewport, ViewportFrame, ViewportProps};
