// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Deterministic synthetic facility and detector.
//!
//! Stands in for a real facility/detector pair so the whole engine can run on one
//! machine. Events, frames and pixel values are a pure function of the source string,
//! so two runs with the same configuration produce the same statistics.
//!
//! # Source string
//!
//! Comma-separated `key=value` pairs, all optional:
//!
//! | key | meaning | default |
//! |---|---|---|
//! | `events` | total events across all workers | 100 |
//! | `frames` | frames per event | 1 |
//! | `pixels` | pixels per frame | 16 |
//! | `reject_every` | reject every Nth event (0 = never) | 0 |
//! | `corrupt_every` | corrupt every Nth frame (0 = never) | 0 |

mod layers;
mod map_reduce;
mod source;

pub use layers::{detector_layer, facility_layer};
pub use map_reduce::{summarize_frame, FrameSummary, RunningStatistics};
pub use source::{SimEvent, SimFrame, SimulatedSource, SourceSpec};
