//! One contract per scheduling hook, driven by a single generic handler.
//!
//! A [`HookContract`] describes how a hook talks to the extender: the request
//! it sends, the response it expects, and how a response or a failure maps
//! back to what the framework wants. [`RemoteHook`] applies the parts every
//! hook shares: the interest filter, the single round trip, logging and the
//! ignorable policy.

pub mod eviction;
pub mod job_enqueueable;
pub mod job_ready;
pub mod lifecycle;
pub mod predicate;
pub mod prioritize;
pub mod queue_overused;

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::TaskInfo;
use crate::extender::extender_client::ExtenderClient;
use crate::extender::extender_error::ExtenderError;
use crate::framework::hook_registry::HookKind;

pub use eviction::{Preemptable, Reclaimable};
pub use job_enqueueable::JobEnqueueable;
pub use job_ready::JobReady;
pub use lifecycle::{Allocate, Deallocate};
pub use predicate::Predicate;
pub use prioritize::Prioritize;
pub use queue_overused::QueueOverused;

pub trait HookContract: Send + Sync + 'static {
    const KIND: HookKind;

    type Request<'a>: Serialize + Send + Sync;
    type Response: DeserializeOwned + Send;
    type Output: Send;

    /// Task whose resources gate the call. Job and queue hooks have none and
    /// are never filtered.
    fn subject<'a>(_request: &Self::Request<'a>) -> Option<&'a TaskInfo> {
        None
    }

    /// Answer given without calling the extender when it has no interest in
    /// the subject.
    fn uninterested(request: &Self::Request<'_>) -> Self::Output;

    fn on_response(request: &Self::Request<'_>, response: Self::Response) -> Self::Output;

    fn on_failure(request: &Self::Request<'_>, error: ExtenderError, ignorable: bool)
    -> Self::Output;
}

/// A hook bound to its configured verb.
pub struct RemoteHook<C> {
    client: ExtenderClient,
    verb: String,
    contract: PhantomData<fn() -> C>,
}

impl<C: HookContract> RemoteHook<C> {
    pub fn new(client: ExtenderClient, verb: impl Into<String>) -> Self {
        Self {
            client,
            verb: verb.into(),
            contract: PhantomData,
        }
    }

    /// Performs at most one round trip.
    pub async fn invoke(&self, request: C::Request<'_>) -> C::Output {
        if let Some(task) = C::subject(&request) {
            if !self.client.is_interested(task) {
                debug!(
                    hook = %C::KIND,
                    task = %task,
                    "task uses no managed resources; skipping extender"
                );
                return C::uninterested(&request);
            }
        }

        match self
            .client
            .send::<_, C::Response>(&self.verb, &request)
            .await
        {
            Ok(response) => C::on_response(&request, response),
            Err(error) => {
                warn!(hook = %C::KIND, verb = %self.verb, error = %error, "extender call failed");
                C::on_failure(&request, error, self.client.config().ignorable)
            }
        }
    }
}

impl<C> fmt::Debug for RemoteHook<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteHook")
            .field("verb", &self.verb)
            .finish()
    }
}
