use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::extender::PLUGIN_NAME;
use crate::extender::extender_client::ExtenderClient;
use crate::extender::extender_config::ExtenderConfig;
use crate::extender::extender_error::ExtenderResult;
use crate::extender::hooks::{
    Allocate, Deallocate, HookContract, JobEnqueueable, JobReady, Predicate, Preemptable,
    Prioritize, QueueOverused, Reclaimable, RemoteHook,
};
use crate::extender::types::{OnSessionCloseRequest, OnSessionOpenRequest};
use crate::framework::event::{EventFn, EventHandler};
use crate::framework::plugin::Plugin;
use crate::framework::session::Session;

/// Registers a remote hook for every configured verb when a session opens.
#[derive(Debug, Clone)]
pub struct ExtenderPlugin {
    client: ExtenderClient,
}

impl ExtenderPlugin {
    pub fn new(config: ExtenderConfig) -> ExtenderResult<Self> {
        debug!(
            url_prefix = %config.url_prefix,
            timeout = ?config.http_timeout,
            ignorable = config.ignorable,
            managed_resources = ?config.managed_resources,
            "extender plugin initialized"
        );

        Ok(Self {
            client: ExtenderClient::new(config)?,
        })
    }

    pub fn config(&self) -> &ExtenderConfig {
        self.client.config()
    }

    fn hook<C: HookContract>(&self, verb: &str) -> Option<Arc<RemoteHook<C>>> {
        (!verb.is_empty()).then(|| Arc::new(RemoteHook::new(self.client.clone(), verb)))
    }

    /// Returns false when the session must not be extended.
    async fn notify_open(&self, session: &Session) -> bool {
        let config = self.config();
        if config.on_session_open_verb.is_empty() {
            return true;
        }

        let request = OnSessionOpenRequest {
            jobs: &session.jobs,
            nodes: &session.nodes,
            queues: &session.queues,
            namespace_info: &session.namespace_info,
            revocable_nodes: &session.revocable_nodes,
        };

        match self
            .client
            .notify(&config.on_session_open_verb, &request)
            .await
        {
            Ok(()) => true,
            Err(error) => {
                warn!(session = %session.uid, error = %error, "extender session open failed");
                config.ignorable
            }
        }
    }
}

#[async_trait]
impl Plugin for ExtenderPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn on_session_open(&self, session: &mut Session) {
        if !self.notify_open(session).await {
            info!(session = %session.uid, "extender disabled for this session");
            return;
        }

        let config = self.config();

        if let Some(hook) = self.hook::<Predicate>(&config.predicate_verb) {
            session.add_predicate_fn(PLUGIN_NAME, hook);
        }
        if let Some(hook) = self.hook::<Prioritize>(&config.prioritize_verb) {
            session.add_batch_node_order_fn(PLUGIN_NAME, hook);
        }
        if let Some(hook) = self.hook::<Preemptable>(&config.preemptable_verb) {
            session.add_preemptable_fn(PLUGIN_NAME, hook);
        }
        if let Some(hook) = self.hook::<Reclaimable>(&config.reclaimable_verb) {
            session.add_reclaimable_fn(PLUGIN_NAME, hook);
        }
        if let Some(hook) = self.hook::<QueueOverused>(&config.queue_overused_verb) {
            session.add_overused_fn(PLUGIN_NAME, hook);
        }
        if let Some(hook) = self.hook::<JobEnqueueable>(&config.job_enqueueable_verb) {
            session.add_job_enqueueable_fn(PLUGIN_NAME, hook);
        }
        if let Some(hook) = self.hook::<JobReady>(&config.job_ready_verb) {
            session.add_job_ready_fn(PLUGIN_NAME, hook);
        }

        let handler = EventHandler {
            allocate: self
                .hook::<Allocate>(&config.allocate_func_verb)
                .map(|hook| hook as Arc<dyn EventFn>),
            deallocate: self
                .hook::<Deallocate>(&config.deallocate_func_verb)
                .map(|hook| hook as Arc<dyn EventFn>),
        };
        if handler.allocate.is_some() || handler.deallocate.is_some() {
            session.add_event_handler(PLUGIN_NAME, handler);
        }
    }

    async fn on_session_close(&self, session: &Session) {
        let verb = &self.config().on_session_close_verb;
        if verb.is_empty() {
            return;
        }

        if let Err(error) = self.client.notify(verb, &OnSessionCloseRequest {}).await {
            warn!(session = %session.uid, error = %error, "extender session close failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::snapshot::ClusterSnapshot;
    use crate::framework::hook_registry::HookKind;

    #[tokio::test]
    async fn only_configured_verbs_are_registered() {
        let plugin = ExtenderPlugin::new(ExtenderConfig {
            url_prefix: "http://127.0.0.1:1".to_string(),
            predicate_verb: "predicate".to_string(),
            job_ready_verb: "jobReady".to_string(),
            deallocate_func_verb: "deallocate".to_string(),
            ..Default::default()
        })
        .unwrap();

        let mut session = Session::new(ClusterSnapshot::default());
        plugin.on_session_open(&mut session).await;

        assert_eq!(
            session.hooks().registered(PLUGIN_NAME),
            vec![HookKind::Predicate, HookKind::JobReady, HookKind::Deallocate]
        );
    }

    #[tokio::test]
    async fn no_verbs_registers_nothing() {
        let plugin = ExtenderPlugin::new(ExtenderConfig::default()).unwrap();

        let mut session = Session::new(ClusterSnapshot::default());
        plugin.on_session_open(&mut session).await;

        assert!(session.hooks().is_empty());
    }
}
