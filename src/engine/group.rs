// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Joining the members of a group that share one runtime.

use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::channel::{AbortSignal, Rank};
use crate::engine::shutdown::ABORT_EXIT_CODE;
use crate::engine::MemberReport;
use crate::errors::{panic_message, EngineError, EngineResult};
use crate::observability::messages::shutdown::MemberPanicked;
use crate::observability::messages::StructuredLog;

/// Wait for every member of a group and return their results in rank order.
///
/// `members[rank]` must be the task running that rank. A member that panics never
/// confirms its death, so the first one to do so aborts the group through `abort`,
/// releasing every member blocked in the channel.
pub async fn join_group<Red>(
    members: Vec<JoinHandle<EngineResult<MemberReport<Red>>>>,
    abort: &AbortSignal,
) -> Vec<EngineResult<MemberReport<Red>>>
where
    Red: Send + 'static,
{
    let mut results: Vec<Option<EngineResult<MemberReport<Red>>>> =
        members.iter().map(|_| None).collect();

    let mut pending = JoinSet::new();
    for (rank, member) in members.into_iter().enumerate() {
        pending.spawn(async move { (rank, member.await) });
    }

    while let Some(joined) = pending.join_next().await {
        match joined {
            Ok((rank, Ok(result))) => results[rank] = Some(result),
            Ok((rank, Err(error))) => results[rank] = Some(Err(member_died(rank, error, abort))),
            Err(error) => {
                tracing::error!(error = %error, "Lost track of a group member");
                abort.trigger(ABORT_EXIT_CODE);
            }
        }
    }

    results
        .into_iter()
        .enumerate()
        .map(|(rank, result)| {
            result.unwrap_or_else(|| {
                Err(EngineError::MemberPanicked {
                    rank,
                    reason: "member was never joined".to_string(),
                })
            })
        })
        .collect()
}

fn member_died(rank: Rank, error: JoinError, abort: &AbortSignal) -> EngineError {
    let reason = if error.is_panic() {
        panic_message(error.into_panic().as_ref())
    } else {
        error.to_string()
    };

    MemberPanicked {
        rank,
        reason: &reason,
    }
    .log();
    abort.trigger(ABORT_EXIT_CODE);

    EngineError::MemberPanicked { rank, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ChannelError;
    use std::time::Duration;
    use tokio::time::timeout;

    type Joined = EngineResult<MemberReport<()>>;

    #[tokio::test]
    async fn test_results_come_back_in_rank_order() {
        let abort = AbortSignal::new();
        let slow = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Joined::Err(EngineError::GroupTooSmall { size: 0 })
        });
        let fast = tokio::spawn(async { Joined::Err(EngineError::GroupTooSmall { size: 1 }) });

        let results = join_group(vec![slow, fast], &abort).await;

        assert!(matches!(results[0], Err(EngineError::GroupTooSmall { size: 0 })));
        assert!(matches!(results[1], Err(EngineError::GroupTooSmall { size: 1 })));
        assert!(!abort.is_aborted());
    }

    #[tokio::test]
    async fn test_panicking_member_aborts_the_group() {
        let abort = AbortSignal::new();
        let waiting = abort.clone();
        let blocked = tokio::spawn(async move {
            waiting.aborted().await;
            Joined::Err(EngineError::Channel(ChannelError::Aborted {
                code: waiting.code().unwrap_or_default(),
            }))
        });
        let panicking = tokio::spawn(async {
            if true {
                panic!("mapper overflow");
            }
            Joined::Err(EngineError::GroupTooSmall { size: 0 })
        });

        let results = timeout(Duration::from_secs(2), join_group(vec![blocked, panicking], &abort))
            .await
            .expect("a panic should release the blocked member");

        assert_eq!(abort.code(), Some(ABORT_EXIT_CODE));
        assert!(matches!(
            &results[0],
            Err(EngineError::Channel(ChannelError::Aborted { code })) if *code == ABORT_EXIT_CODE
        ));
        match &results[1] {
            Err(EngineError::MemberPanicked { rank, reason }) => {
                assert_eq!(*rank, 1);
                assert_eq!(reason, "mapper overflow");
            }
            other => panic!("expected a panicked member, got {:?}", other),
        }
    }
}
