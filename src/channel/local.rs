// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process message channel: every group member is a tokio task holding one
//! [`LocalEndpoint`].
//!
//! Each rank owns an unbounded mailbox. Envelopes that do not match a receive filter are
//! parked in arrival order, so selective receives never reorder messages coming from the
//! same source. Every envelope carries a oneshot acknowledgement that fires when the
//! destination takes it out of the mailbox; that acknowledgement is what completes a
//! [`SendRequest`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::channel::{Message, Rank, Received, SendRequest, Source, Tag};
use crate::errors::ChannelError;
use crate::traits::Communicator;

/// Group-wide abort flag shared by every endpoint of a [`LocalGroup`].
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    token: CancellationToken,
    code: Arc<OnceLock<i32>>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the group. The first exit code recorded wins.
    pub fn trigger(&self, code: i32) {
        let _ = self.code.set(code);
        self.token.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Exit code of the abort, if the group has been aborted.
    pub fn code(&self) -> Option<i32> {
        if self.is_aborted() {
            self.code.get().copied()
        } else {
            None
        }
    }

    /// Resolves once the group is aborted.
    pub async fn aborted(&self) {
        self.token.cancelled().await
    }

    fn error(&self) -> ChannelError {
        ChannelError::Aborted {
            code: self.code.get().copied().unwrap_or_default(),
        }
    }
}

struct Envelope<P> {
    source: Rank,
    message: Message<P>,
    consumed: oneshot::Sender<()>,
}

/// Builder for a process group whose members share one OS process.
pub struct LocalGroup<P> {
    endpoints: Vec<LocalEndpoint<P>>,
    abort: AbortSignal,
}

impl<P: Send + 'static> LocalGroup<P> {
    /// Create the mailboxes for a group of `size` members.
    pub fn new(size: usize) -> Result<Self, ChannelError> {
        if size == 0 {
            return Err(ChannelError::InvalidGroupSize(size));
        }

        let abort = AbortSignal::new();
        let (senders, inboxes): (Vec<_>, Vec<_>) =
            (0..size).map(|_| mpsc::unbounded_channel()).unzip();
        let peers: Arc<[mpsc::UnboundedSender<Envelope<P>>]> = senders.into();

        let endpoints = inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| LocalEndpoint {
                rank,
                size,
                peers: Arc::clone(&peers),
                inbox,
                parked: VecDeque::new(),
                abort: abort.clone(),
            })
            .collect();

        Ok(Self { endpoints, abort })
    }

    pub fn size(&self) -> usize {
        self.endpoints.len()
    }

    /// Handle for observing whether (and with which code) the group was aborted.
    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// Endpoints ordered by rank.
    pub fn into_endpoints(self) -> Vec<LocalEndpoint<P>> {
        self.endpoints
    }
}

/// One member's view of a [`LocalGroup`].
pub struct LocalEndpoint<P> {
    rank: Rank,
    size: usize,
    peers: Arc<[mpsc::UnboundedSender<Envelope<P>>]>,
    inbox: mpsc::UnboundedReceiver<Envelope<P>>,
    parked: VecDeque<Envelope<P>>,
    abort: AbortSignal,
}

impl<P> LocalEndpoint<P> {
    /// Number of messages waiting in this endpoint's mailbox, of any tag.
    pub fn queued_messages(&mut self) -> usize {
        self.park_arrivals();
        self.parked.len()
    }

    fn park_arrivals(&mut self) {
        while let Ok(envelope) = self.inbox.try_recv() {
            self.parked.push_back(envelope);
        }
    }

    fn find(&self, source: Source, tags: &[Tag]) -> Option<usize> {
        self.parked.iter().position(|envelope| {
            source.matches(envelope.source) && tags.contains(&envelope.message.tag())
        })
    }

    fn take(&mut self, index: usize) -> Option<Received<P>> {
        let envelope = self.parked.remove(index)?;
        // The sender may have detached its request; that is not an error.
        let _ = envelope.consumed.send(());
        Some(Received {
            source: envelope.source,
            message: envelope.message,
        })
    }

    fn ensure_running(&self) -> Result<(), ChannelError> {
        if self.abort.is_aborted() {
            Err(self.abort.error())
        } else {
            Ok(())
        }
    }
}

impl<P> fmt::Debug for LocalEndpoint<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalEndpoint")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .field("parked", &self.parked.len())
            .finish()
    }
}

#[async_trait]
impl<P: Send + 'static> Communicator for LocalEndpoint<P> {
    type Payload = P;

    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn isend(&self, dest: Rank, message: Message<P>) -> Result<SendRequest, ChannelError> {
        self.ensure_running()?;

        let peer = self.peers.get(dest).ok_or(ChannelError::InvalidRank {
            rank: dest,
            size: self.size,
        })?;

        let (consumed_tx, consumed_rx) = oneshot::channel();
        peer.send(Envelope {
            source: self.rank,
            message,
            consumed: consumed_tx,
        })
        .map_err(|_| ChannelError::Disconnected { rank: dest })?;

        let abort = self.abort.clone();
        Ok(SendRequest::new(async move {
            tokio::select! {
                biased;
                consumed = consumed_rx => consumed.map_err(|_| ChannelError::Disconnected { rank: dest }),
                _ = abort.aborted() => Err(abort.error()),
            }
        }))
    }

    fn iprobe(&mut self, source: Source, tags: &[Tag]) -> Result<Option<Rank>, ChannelError> {
        self.ensure_running()?;
        self.park_arrivals();
        Ok(self
            .find(source, tags)
            .and_then(|index| self.parked.get(index))
            .map(|envelope| envelope.source))
    }

    fn try_recv(
        &mut self,
        source: Source,
        tags: &[Tag],
    ) -> Result<Option<Received<P>>, ChannelError> {
        self.ensure_running()?;
        self.park_arrivals();
        match self.find(source, tags) {
            Some(index) => Ok(self.take(index)),
            None => Ok(None),
        }
    }

    async fn recv(&mut self, source: Source, tags: &[Tag]) -> Result<Received<P>, ChannelError> {
        loop {
            if let Some(received) = self.try_recv(source, tags)? {
                return Ok(received);
            }

            let abort = self.abort.clone();
            let arrival = tokio::select! {
                biased;
                _ = abort.aborted() => return Err(abort.error()),
                envelope = self.inbox.recv() => envelope,
            };

            match arrival {
                Some(envelope) => self.parked.push_back(envelope),
                None => return Err(ChannelError::Disconnected { rank: self.rank }),
            }
        }
    }

    fn abort(&self, code: i32) {
        self.abort.trigger(code);
    }
}
