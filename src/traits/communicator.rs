// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::channel::{Message, Rank, Received, SendRequest, Source, Tag};
use crate::errors::ChannelError;

/// Point-to-point message passing between the members of a fixed-size process group.
///
/// Implementations must preserve delivery order per (source, destination) pair and must
/// allow at least one outstanding asynchronous send per member. Only `send`, `recv` and
/// waiting on a [`SendRequest`] may suspend; `iprobe` and `try_recv` never do.
#[async_trait]
pub trait Communicator: Send {
    /// Payload carried by `Message::Result`.
    type Payload: Send + 'static;

    /// Identifier of this process within the group.
    fn rank(&self) -> Rank;

    /// Number of processes in the group.
    fn size(&self) -> usize;

    /// Start an asynchronous send and return a handle to wait on its completion.
    fn isend(
        &self,
        dest: Rank,
        message: Message<Self::Payload>,
    ) -> Result<SendRequest, ChannelError>;

    /// Send and wait until the destination has consumed the message.
    async fn send(
        &mut self,
        dest: Rank,
        message: Message<Self::Payload>,
    ) -> Result<(), ChannelError> {
        self.isend(dest, message)?.wait().await
    }

    /// Check, without consuming it, whether a message matching the filter is waiting.
    /// Returns the sender's rank.
    fn iprobe(&mut self, source: Source, tags: &[Tag]) -> Result<Option<Rank>, ChannelError>;

    /// Take the oldest matching message if one is waiting.
    fn try_recv(
        &mut self,
        source: Source,
        tags: &[Tag],
    ) -> Result<Option<Received<Self::Payload>>, ChannelError>;

    /// Wait for the oldest matching message.
    async fn recv(
        &mut self,
        source: Source,
        tags: &[Tag],
    ) -> Result<Received<Self::Payload>, ChannelError>;

    /// Unconditionally abort every member of the group.
    fn abort(&self, code: i32);
}
