use async_trait::async_trait;

use crate::api::{TaskInfo, Vote};
use crate::extender::extender_error::ExtenderError;
use crate::extender::hooks::{HookContract, RemoteHook};
use crate::extender::types::{EvictionRequest, EvictionResponse};
use crate::framework::hook_registry::{EvictableFn, EvictionVote, HookKind};

/// Asks the extender which evictees an evictor may preempt.
pub struct Preemptable;

/// Asks the extender which evictees an evictor may reclaim from other queues.
pub struct Reclaimable;

fn uninterested() -> EvictionVote {
    EvictionVote {
        victims: Some(Vec::new()),
        vote: Vote::Abstain,
    }
}

fn on_response(response: EvictionResponse) -> EvictionVote {
    EvictionVote {
        victims: response.victims,
        vote: response.status,
    }
}

fn on_failure(ignorable: bool) -> EvictionVote {
    EvictionVote {
        victims: None,
        vote: if ignorable { Vote::Permit } else { Vote::Reject },
    }
}

impl HookContract for Preemptable {
    const KIND: HookKind = HookKind::Preemptable;

    type Request<'a> = EvictionRequest<'a>;
    type Response = EvictionResponse;
    type Output = EvictionVote;

    fn subject<'a>(request: &EvictionRequest<'a>) -> Option<&'a TaskInfo>
    where
        'a: 'a,
    {
        Some(request.evictor)
    }

    fn uninterested(_request: &EvictionRequest<'_>) -> EvictionVote {
        uninterested()
    }

    fn on_response(_request: &EvictionRequest<'_>, response: EvictionResponse) -> EvictionVote {
        on_response(response)
    }

    fn on_failure(
        _request: &EvictionRequest<'_>,
        _error: ExtenderError,
        ignorable: bool,
    ) -> EvictionVote {
        on_failure(ignorable)
    }
}

impl HookContract for Reclaimable {
    const KIND: HookKind = HookKind::Reclaimable;

    type Request<'a> = EvictionRequest<'a>;
    type Response = EvictionResponse;
    type Output = EvictionVote;

    fn subject<'a>(request: &EvictionRequest<'a>) -> Option<&'a TaskInfo>
    where
        'a: 'a,
    {
        Some(request.evictor)
    }

    fn uninterested(_request: &EvictionRequest<'_>) -> EvictionVote {
        uninterested()
    }

    fn on_response(_request: &EvictionRequest<'_>, response: EvictionResponse) -> EvictionVote {
        on_response(response)
    }

    fn on_failure(
        _request: &EvictionRequest<'_>,
        _error: ExtenderError,
        ignorable: bool,
    ) -> EvictionVote {
        on_failure(ignorable)
    }
}

#[async_trait]
impl EvictableFn for RemoteHook<Preemptable> {
    async fn evictable(&self, evictor: &TaskInfo, evictees: &[&TaskInfo]) -> EvictionVote {
        self.invoke(EvictionRequest { evictor, evictees }).await
    }
}

#[async_trait]
impl EvictableFn for RemoteHook<Reclaimable> {
    async fn evictable(&self, evictor: &TaskInfo, evictees: &[&TaskInfo]) -> EvictionVote {
        self.invoke(EvictionRequest { evictor, evictees }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_votes_follow_ignorable() {
        assert_eq!(
            on_failure(true),
            EvictionVote { victims: None, vote: Vote::Permit }
        );
        assert_eq!(
            on_failure(false),
            EvictionVote { victims: None, vote: Vote::Reject }
        );
    }

    #[test]
    fn response_is_passed_through_unchanged() {
        let victim = TaskInfo::new("t-2", "low-priority", Default::default());
        let response = EvictionResponse {
            status: Vote::Permit,
            victims: Some(vec![victim.clone()]),
        };

        assert_eq!(
            on_response(response),
            EvictionVote { victims: Some(vec![victim]), vote: Vote::Permit }
        );
    }

    #[test]
    fn uninterested_evictor_abstains_with_no_victims() {
        assert_eq!(
            uninterested(),
            EvictionVote { victims: Some(Vec::new()), vote: Vote::Abstain }
        );
    }
}
