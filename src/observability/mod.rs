// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational logging goes through message structs that
//! implement `Display`, so log text lives in one place instead of being scattered
//! through the engine as string literals.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::worker` - worker loop lifecycle and per-event/per-frame events
//! * `messages::coordinator` - coordinator receive loop and completion tracking
//! * `messages::shutdown` - die broadcast, confirmation drain and group abort
//! * `messages::extraction` - binding required fields to extraction functions
//!
//! # Usage
//!
//! ```rust
//! use frame_reducer::observability::messages::coordinator::ProcessingFinished;
//! use frame_reducer::observability::messages::StructuredLog;
//!
//! ProcessingFinished { processed_count: 42 }.log();
//! ```

pub mod messages;
