use async_trait::async_trait;

use crate::api::QueueInfo;
use crate::extender::extender_error::ExtenderError;
use crate::extender::hooks::{HookContract, RemoteHook};
use crate::extender::types::{QueueOverusedRequest, QueueOverusedResponse};
use crate::framework::hook_registry::{HookKind, OverusedFn};

/// Asks the extender whether a queue uses more than its share.
pub struct QueueOverused;

impl HookContract for QueueOverused {
    const KIND: HookKind = HookKind::QueueOverused;

    type Request<'a> = QueueOverusedRequest<'a>;
    type Response = QueueOverusedResponse;
    type Output = bool;

    fn uninterested(_request: &QueueOverusedRequest<'_>) -> bool {
        false
    }

    fn on_response(_request: &QueueOverusedRequest<'_>, response: QueueOverusedResponse) -> bool {
        response.overused
    }

    /// Unless failures are ignorable, assume the queue is overused.
    fn on_failure(
        _request: &QueueOverusedRequest<'_>,
        _error: ExtenderError,
        ignorable: bool,
    ) -> bool {
        !ignorable
    }
}

#[async_trait]
impl OverusedFn for RemoteHook<QueueOverused> {
    async fn overused(&self, queue: &QueueInfo) -> bool {
        self.invoke(QueueOverusedRequest { queue }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_flag_is_returned() {
        let queue = QueueInfo::new("q-1", "default");
        let request = QueueOverusedRequest { queue: &queue };

        let overused = QueueOverusedResponse { overused: true };
        assert!(QueueOverused::on_response(&request, overused));

        let within_share = QueueOverusedResponse { overused: false };
        assert!(!QueueOverused::on_response(&request, within_share));
    }

    #[test]
    fn failure_assumes_overused_unless_ignorable() {
        let queue = QueueInfo::new("q-1", "default");
        let request = QueueOverusedRequest { queue: &queue };
        let failure = || ExtenderError::Rejected("down".to_string());

        assert!(QueueOverused::on_failure(&request, failure(), false));
        assert!(!QueueOverused::on_failure(&request, failure(), true));
    }
}
