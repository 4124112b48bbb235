use async_trait::async_trait;

use crate::api::{NodeInfo, TaskInfo};
use crate::extender::extender_error::ExtenderError;
use crate::extender::hooks::{HookContract, RemoteHook};
use crate::extender::types::{PrioritizeRequest, PrioritizeResponse};
use crate::framework::hook_registry::{HookKind, NodeOrderFn, NodeScores};

/// Asks the extender to score candidate nodes for a task.
pub struct Prioritize;

impl HookContract for Prioritize {
    const KIND: HookKind = HookKind::Prioritize;

    type Request<'a> = PrioritizeRequest<'a>;
    type Response = PrioritizeResponse;
    /// `Ok(None)` abstains.
    type Output = Result<Option<NodeScores>, ExtenderError>;

    fn subject<'a>(request: &PrioritizeRequest<'a>) -> Option<&'a TaskInfo>
    where
        'a: 'a,
    {
        Some(request.task)
    }

    fn uninterested(_request: &PrioritizeRequest<'_>) -> Self::Output {
        Ok(Some(NodeScores::new()))
    }

    fn on_response(_request: &PrioritizeRequest<'_>, response: PrioritizeResponse) -> Self::Output {
        match response.node_score {
            Some(scores) if response.error_message.is_empty() => Ok(Some(scores)),
            None if response.error_message.is_empty() => Err(ExtenderError::Rejected(
                "extender returned no node scores".to_string(),
            )),
            _ => Err(ExtenderError::Rejected(response.error_message)),
        }
    }

    fn on_failure(
        _request: &PrioritizeRequest<'_>,
        error: ExtenderError,
        ignorable: bool,
    ) -> Self::Output {
        if ignorable { Ok(None) } else { Err(error) }
    }
}

#[async_trait]
impl NodeOrderFn for RemoteHook<Prioritize> {
    async fn node_order(
        &self,
        task: &TaskInfo,
        nodes: &[&NodeInfo],
    ) -> anyhow::Result<Option<NodeScores>> {
        Ok(self.invoke(PrioritizeRequest { task, nodes }).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> TaskInfo {
        TaskInfo::new("t-1", "worker-0", Default::default())
    }

    #[test]
    fn scores_without_message_are_returned() {
        let task = task();
        let request = PrioritizeRequest { task: &task, nodes: &[] };
        let scores = NodeScores::from([("node-a".to_string(), 10.0)]);
        let response = PrioritizeResponse {
            node_score: Some(scores.clone()),
            error_message: String::new(),
        };

        assert_eq!(Prioritize::on_response(&request, response).unwrap(), Some(scores));
    }

    #[test]
    fn reported_message_is_an_application_error() {
        let task = task();
        let request = PrioritizeRequest { task: &task, nodes: &[] };
        let response = PrioritizeResponse {
            node_score: Some(NodeScores::new()),
            error_message: "scorer overloaded".to_string(),
        };

        let error = Prioritize::on_response(&request, response).unwrap_err();
        assert!(!error.is_transport());
        assert_eq!(error.to_string(), "scorer overloaded");
    }

    #[test]
    fn missing_scores_are_an_application_error() {
        let task = task();
        let request = PrioritizeRequest { task: &task, nodes: &[] };

        let error = Prioritize::on_response(&request, PrioritizeResponse::default()).unwrap_err();
        assert!(matches!(error, ExtenderError::Rejected(_)));
    }

    #[test]
    fn failure_abstains_only_when_ignorable() {
        let task = task();
        let request = PrioritizeRequest { task: &task, nodes: &[] };
        let failure = || ExtenderError::Rejected("down".to_string());

        assert_eq!(Prioritize::on_failure(&request, failure(), true).unwrap(), None);
        assert!(Prioritize::on_failure(&request, failure(), false).is_err());
    }
}
