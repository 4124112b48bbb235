use async_trait::async_trait;

use crate::api::{JobInfo, Vote};
use crate::extender::extender_error::ExtenderError;
use crate::extender::hooks::{HookContract, RemoteHook};
use crate::extender::types::{JobEnqueueableRequest, JobEnqueueableResponse};
use crate::framework::hook_registry::{HookKind, JobEnqueueableFn};

/// Asks the extender whether a job may be admitted into its queue.
pub struct JobEnqueueable;

impl HookContract for JobEnqueueable {
    const KIND: HookKind = HookKind::JobEnqueueable;

    type Request<'a> = JobEnqueueableRequest<'a>;
    type Response = JobEnqueueableResponse;
    type Output = Vote;

    fn uninterested(_request: &JobEnqueueableRequest<'_>) -> Vote {
        Vote::Abstain
    }

    fn on_response(_request: &JobEnqueueableRequest<'_>, response: JobEnqueueableResponse) -> Vote {
        response.status
    }

    fn on_failure(
        _request: &JobEnqueueableRequest<'_>,
        _error: ExtenderError,
        ignorable: bool,
    ) -> Vote {
        if ignorable { Vote::Permit } else { Vote::Reject }
    }
}

#[async_trait]
impl JobEnqueueableFn for RemoteHook<JobEnqueueable> {
    async fn job_enqueueable(&self, job: &JobInfo) -> Vote {
        self.invoke(JobEnqueueableRequest { job }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_vote_is_returned() {
        let job = JobInfo::new("j-1", "training", "q-1");
        let request = JobEnqueueableRequest { job: &job };

        for status in [Vote::Permit, Vote::Abstain, Vote::Reject] {
            let response = JobEnqueueableResponse { status };
            assert_eq!(JobEnqueueable::on_response(&request, response), status);
        }
    }

    #[test]
    fn failure_permits_only_when_ignorable() {
        let job = JobInfo::new("j-1", "training", "q-1");
        let request = JobEnqueueableRequest { job: &job };
        let failure = || ExtenderError::Rejected("down".to_string());

        assert_eq!(JobEnqueueable::on_failure(&request, failure(), true), Vote::Permit);
        assert_eq!(JobEnqueueable::on_failure(&request, failure(), false), Vote::Reject);
    }
}
