// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod channel;
mod config;
mod engine;

pub use channel::ChannelError;
pub use config::{ConfigError, ValidationError};
pub use engine::{EngineError, EngineResult};

pub(crate) use engine::panic_message;
