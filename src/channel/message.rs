// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt::{Display, Formatter};

/// Address of a process within the group.
pub type Rank = usize;

/// Discriminator routing a message to a logical channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Ordinary data: one mapped result.
    Data,
    /// End of a worker's event stream.
    End,
    /// Request to shut down, coordinator to worker.
    Die,
    /// Shutdown confirmation, worker to coordinator.
    Dead,
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tag::Data => "data",
            Tag::End => "end",
            Tag::Die => "die",
            Tag::Dead => "dead",
        };
        f.write_str(name)
    }
}

/// Source filter for probes and receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Any,
    Rank(Rank),
}

impl Source {
    pub fn matches(&self, rank: Rank) -> bool {
        match self {
            Source::Any => true,
            Source::Rank(expected) => *expected == rank,
        }
    }
}

/// A message travelling between group members.
///
/// The payload type `P` is opaque to the channel; only `Result` carries one.
#[derive(Debug, Clone, PartialEq)]
pub enum Message<P> {
    /// A mapped result for one frame.
    Result(P),
    /// Sent exactly once by a worker when its event source is exhausted.
    End { worker: Rank },
    /// Broadcast by the coordinator to stop a worker.
    Die,
    /// Sent by a worker immediately before it terminates.
    Dead,
}

impl<P> Message<P> {
    pub fn tag(&self) -> Tag {
        match self {
            Message::Result(_) => Tag::Data,
            Message::End { .. } => Tag::End,
            Message::Die => Tag::Die,
            Message::Dead => Tag::Dead,
        }
    }
}

/// A message taken out of a member's mailbox, together with its sender.
#[derive(Debug, Clone, PartialEq)]
pub struct Received<P> {
    pub source: Rank,
    pub message: Message<P>,
}

/// A worker's result as handed to the reduce function.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMessage<P> {
    /// Rank of the worker that produced the result.
    pub worker: Rank,
    pub payload: P,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_tags() {
        assert_eq!(Message::Result(7u32).tag(), Tag::Data);
        assert_eq!(Message::<u32>::End { worker: 3 }.tag(), Tag::End);
        assert_eq!(Message::<u32>::Die.tag(), Tag::Die);
        assert_eq!(Message::<u32>::Dead.tag(), Tag::Dead);
    }

    #[test]
    fn test_source_filter() {
        assert!(Source::Any.matches(0));
        assert!(Source::Any.matches(42));
        assert!(Source::Rank(2).matches(2));
        assert!(!Source::Rank(2).matches(0));
    }
}
