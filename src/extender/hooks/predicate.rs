use async_trait::async_trait;

use crate::api::{FitError, NodeInfo, Status, StatusCode, TaskInfo};
use crate::extender::PLUGIN_NAME;
use crate::extender::extender_error::ExtenderError;
use crate::extender::hooks::{HookContract, RemoteHook};
use crate::extender::types::{PredicateRequest, PredicateResponse};
use crate::framework::hook_registry::{HookKind, PredicateFn};

/// Asks the extender whether a task fits on a node.
pub struct Predicate;

impl HookContract for Predicate {
    const KIND: HookKind = HookKind::Predicate;

    type Request<'a> = PredicateRequest<'a>;
    type Response = PredicateResponse;
    type Output = Result<(), FitError>;

    fn subject<'a>(request: &PredicateRequest<'a>) -> Option<&'a TaskInfo>
    where
        'a: 'a,
    {
        Some(request.task)
    }

    fn uninterested(_request: &PredicateRequest<'_>) -> Self::Output {
        Ok(())
    }

    fn on_response(request: &PredicateRequest<'_>, response: PredicateResponse) -> Self::Output {
        if response.error_message.is_empty() {
            return Ok(());
        }

        // Older extenders send a message without a code; the zero value would
        // read as success.
        let code = match response.code {
            StatusCode::Success => StatusCode::Error,
            code => code,
        };

        Err(FitError::with_status(
            request.task,
            request.node,
            Status::new(code, response.error_message, PLUGIN_NAME),
        ))
    }

    fn on_failure(
        request: &PredicateRequest<'_>,
        error: ExtenderError,
        ignorable: bool,
    ) -> Self::Output {
        if ignorable {
            return Ok(());
        }

        Err(FitError::new(
            request.task,
            request.node,
            PLUGIN_NAME,
            error.to_string(),
        ))
    }
}

#[async_trait]
impl PredicateFn for RemoteHook<Predicate> {
    async fn predicate(&self, task: &TaskInfo, node: &NodeInfo) -> Result<(), FitError> {
        self.invoke(PredicateRequest { task, node }).await
    }
}
