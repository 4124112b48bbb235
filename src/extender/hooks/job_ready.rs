use async_trait::async_trait;

use crate::api::JobInfo;
use crate::extender::extender_error::ExtenderError;
use crate::extender::hooks::{HookContract, RemoteHook};
use crate::extender::types::{JobReadyRequest, JobReadyResponse};
use crate::framework::hook_registry::{HookKind, JobReadyFn};

/// Asks the extender whether a job has everything it needs to run.
pub struct JobReady;

impl HookContract for JobReady {
    const KIND: HookKind = HookKind::JobReady;

    type Request<'a> = JobReadyRequest<'a>;
    type Response = JobReadyResponse;
    type Output = bool;

    fn uninterested(_request: &JobReadyRequest<'_>) -> bool {
        true
    }

    fn on_response(_request: &JobReadyRequest<'_>, response: JobReadyResponse) -> bool {
        response.status
    }

    /// Ready only when failures are ignorable.
    fn on_failure(_request: &JobReadyRequest<'_>, _error: ExtenderError, ignorable: bool) -> bool {
        ignorable
    }
}

#[async_trait]
impl JobReadyFn for RemoteHook<JobReady> {
    async fn job_ready(&self, job: &JobInfo) -> bool {
        self.invoke(JobReadyRequest { job }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_readiness_is_returned() {
        let job = JobInfo::new("j-1", "training", "q-1");
        let request = JobReadyRequest { job: &job };

        assert!(JobReady::on_response(&request, JobReadyResponse { status: true }));
        assert!(!JobReady::on_response(&request, JobReadyResponse { status: false }));
    }

    #[test]
    fn failure_is_ready_only_when_ignorable() {
        let job = JobInfo::new("j-1", "training", "q-1");
        let request = JobReadyRequest { job: &job };
        let failure = || ExtenderError::Rejected("down".to_string());

        assert!(JobReady::on_failure(&request, failure(), true));
        assert!(!JobReady::on_failure(&request, failure(), false));
    }
}
