// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // facility/detector layers
pub mod channel;    // message channel + in-process transport
pub mod config;     // config loading + run settings
pub mod engine;     // coordinator/worker state machines
pub mod errors;     // error handling
pub mod extraction; // data extraction resolver
pub mod observability;
pub mod traits;     // seams: communicator, event source, map/reduce
