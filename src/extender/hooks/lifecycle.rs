use async_trait::async_trait;

use crate::api::TaskInfo;
use crate::extender::extender_error::ExtenderError;
use crate::extender::hooks::{HookContract, RemoteHook};
use crate::extender::types::{EventHandlerRequest, EventHandlerResponse};
use crate::framework::event::{Event, EventFn};
use crate::framework::hook_registry::HookKind;

/// Notifies the extender that a task was allocated to a node.
pub struct Allocate;

/// Notifies the extender that a task's allocation was released.
pub struct Deallocate;

/// An error message from the extender is always surfaced; a transport failure
/// only when failures are not ignorable.
fn on_response(response: EventHandlerResponse) -> Option<ExtenderError> {
    if response.error_message.is_empty() {
        None
    } else {
        Some(ExtenderError::Rejected(response.error_message))
    }
}

fn on_failure(error: ExtenderError, ignorable: bool) -> Option<ExtenderError> {
    if ignorable { None } else { Some(error) }
}

impl HookContract for Allocate {
    const KIND: HookKind = HookKind::Allocate;

    type Request<'a> = EventHandlerRequest<'a>;
    type Response = EventHandlerResponse;
    /// Failure to inject into the event, if any.
    type Output = Option<ExtenderError>;

    fn subject<'a>(request: &EventHandlerRequest<'a>) -> Option<&'a TaskInfo>
    where
        'a: 'a,
    {
        Some(request.task)
    }

    fn uninterested(_request: &EventHandlerRequest<'_>) -> Option<ExtenderError> {
        None
    }

    fn on_response(
        _request: &EventHandlerRequest<'_>,
        response: EventHandlerResponse,
    ) -> Option<ExtenderError> {
        on_response(response)
    }

    fn on_failure(
        _request: &EventHandlerRequest<'_>,
        error: ExtenderError,
        ignorable: bool,
    ) -> Option<ExtenderError> {
        on_failure(error, ignorable)
    }
}

impl HookContract for Deallocate {
    const KIND: HookKind = HookKind::Deallocate;

    type Request<'a> = EventHandlerRequest<'a>;
    type Response = EventHandlerResponse;
    type Output = Option<ExtenderError>;

    fn subject<'a>(request: &EventHandlerRequest<'a>) -> Option<&'a TaskInfo>
    where
        'a: 'a,
    {
        Some(request.task)
    }

    fn uninterested(_request: &EventHandlerRequest<'_>) -> Option<ExtenderError> {
        None
    }

    fn on_response(
        _request: &EventHandlerRequest<'_>,
        response: EventHandlerResponse,
    ) -> Option<ExtenderError> {
        on_response(response)
    }

    fn on_failure(
        _request: &EventHandlerRequest<'_>,
        error: ExtenderError,
        ignorable: bool,
    ) -> Option<ExtenderError> {
        on_failure(error, ignorable)
    }
}

#[async_trait]
impl EventFn for RemoteHook<Allocate> {
    async fn handle(&self, event: &mut Event<'_>) {
        if let Some(error) = self.invoke(EventHandlerRequest { task: event.task }).await {
            event.err = Some(error.into());
        }
    }
}

#[async_trait]
impl EventFn for RemoteHook<Deallocate> {
    async fn handle(&self, event: &mut Event<'_>) {
        if let Some(error) = self.invoke(EventHandlerRequest { task: event.task }).await {
            event.err = Some(error.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_message_is_injected() {
        let response = EventHandlerResponse {
            error_message: "gpu slot already claimed".to_string(),
        };

        let error = on_response(response).unwrap();
        assert!(!error.is_transport());
        assert_eq!(error.to_string(), "gpu slot already claimed");
    }

    #[test]
    fn empty_message_injects_nothing() {
        assert!(on_response(EventHandlerResponse::default()).is_none());
    }

    #[test]
    fn transport_failure_is_injected_only_when_not_ignorable() {
        let failure = || ExtenderError::BodyTooLarge {
            verb: "allocate".to_string(),
            limit: 1,
        };

        assert!(on_failure(failure(), true).is_none());
        assert!(on_failure(failure(), false).is_some());
    }
}
