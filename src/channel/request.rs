// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::errors::ChannelError;

type Completion = Pin<Box<dyn Future<Output = Result<(), ChannelError>> + Send>>;

/// Handle for an asynchronous send.
///
/// Waiting on it suspends until the destination has taken the message out of its
/// mailbox. Dropping it without waiting detaches the send; the message is still
/// delivered.
pub struct SendRequest {
    completion: Completion,
}

impl SendRequest {
    pub fn new<F>(completion: F) -> Self
    where
        F: Future<Output = Result<(), ChannelError>> + Send + 'static,
    {
        Self {
            completion: Box::pin(completion),
        }
    }

    /// A request that has already completed.
    pub fn completed() -> Self {
        Self::new(async { Ok(()) })
    }

    pub async fn wait(self) -> Result<(), ChannelError> {
        self.completion.await
    }
}

impl fmt::Debug for SendRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendRequest").finish_non_exhaustive()
    }
}
