// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::channel::{Message, Rank, SendRequest};
use crate::errors::ChannelError;
use crate::traits::Communicator;

/// Holds at most one asynchronous send in flight.
///
/// Submitting a message first waits for the previous one to be consumed, which
/// bounds a worker to a single buffered result no matter how slow its receiver is.
#[derive(Debug, Default)]
pub struct SendSlot {
    pending: Option<SendRequest>,
}

impl SendSlot {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the in-flight send, if any.
    pub async fn flush(&mut self) -> Result<(), ChannelError> {
        match self.pending.take() {
            Some(request) => request.wait().await,
            None => Ok(()),
        }
    }

    /// Flush the previous send, then start sending `message` without waiting for it.
    pub async fn submit<C>(
        &mut self,
        comm: &mut C,
        dest: Rank,
        message: Message<C::Payload>,
    ) -> Result<(), ChannelError>
    where
        C: Communicator + ?Sized,
    {
        self.flush().await?;
        self.pending = Some(comm.isend(dest, message)?);
        Ok(())
    }

    /// Drop the in-flight send without waiting; the message is still delivered.
    pub fn detach(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{LocalEndpoint, LocalGroup, Source, Tag};
    use std::time::Duration;
    use tokio::time::timeout;

    fn pair() -> (LocalEndpoint<u32>, LocalEndpoint<u32>) {
        let mut endpoints = LocalGroup::<u32>::new(2).unwrap().into_endpoints();
        let worker = endpoints.pop().unwrap();
        let coordinator = endpoints.pop().unwrap();
        (coordinator, worker)
    }

    #[tokio::test]
    async fn test_second_submit_waits_for_first_to_be_consumed() {
        let (mut coordinator, mut worker) = pair();
        let mut slot = SendSlot::new();

        slot.submit(&mut worker, 0, Message::Result(1)).await.unwrap();
        assert!(slot.is_pending());

        let blocked = timeout(
            Duration::from_millis(50),
            slot.submit(&mut worker, 0, Message::Result(2)),
        )
        .await;
        assert!(blocked.is_err());
        assert_eq!(coordinator.queued_messages(), 1);

        let first = coordinator.recv(Source::Any, &[Tag::Data]).await.unwrap();
        assert_eq!(first.message, Message::Result(1));

        timeout(
            Duration::from_millis(500),
            slot.submit(&mut worker, 0, Message::Result(3)),
        )
        .await
        .expect("submit should proceed once the previous send was consumed")
        .unwrap();
        assert_eq!(coordinator.queued_messages(), 1);
    }

    #[tokio::test]
    async fn test_flush_on_empty_slot_is_immediate() {
        let mut slot = SendSlot::new();
        assert!(!slot.is_pending());
        assert!(slot.flush().await.is_ok());
    }

    #[tokio::test]
    async fn test_detached_send_is_still_delivered() {
        let (mut coordinator, mut worker) = pair();
        let mut slot = SendSlot::new();

        slot.submit(&mut worker, 0, Message::Result(9)).await.unwrap();
        slot.detach();
        assert!(!slot.is_pending());

        let received = coordinator.recv(Source::Rank(1), &[Tag::Data]).await.unwrap();
        assert_eq!(received.message, Message::Result(9));
    }
}
