// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message channel between the members of a fixed-size process group.
//!
//! Members are addressed by an integer [`Rank`]; rank 0 is the coordinator. Every
//! message carries a [`Tag`] that routes it to a logical channel:
//!
//! * `Data` - a worker's result for one frame
//! * `End` - a worker has exhausted its event source
//! * `Die` - the coordinator asks a worker to stop
//! * `Dead` - a worker confirms it is terminating
//!
//! The [`Communicator`](crate::traits::Communicator) trait is the capability the engine
//! consumes. [`LocalGroup`] implements it for members that live in the same OS process
//! (one tokio task per member), which is what the binary and the tests use.

mod local;
mod message;
mod request;

pub use local::{AbortSignal, LocalEndpoint, LocalGroup};
pub use message::{Message, Rank, Received, ResultMessage, Source, Tag};
pub use request::SendRequest;
