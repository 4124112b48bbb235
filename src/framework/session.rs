use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::future::join_all;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::{FitError, JobInfo, NamespaceInfo, NodeInfo, QueueInfo, TaskInfo, Vote};
use crate::cache::snapshot::ClusterSnapshot;
use crate::framework::event::{Event, EventFn, EventHandler};
use crate::framework::hook_registry::{
    EvictableFn, EvictionVote, HookRegistry, JobEnqueueableFn, JobReadyFn, NodeOrderFn,
    NodeScores, OverusedFn, PredicateFn,
};
use crate::framework::plugin::Plugin;

/// One scheduling cycle: an inventory snapshot plus the hooks plugins
/// registered for it.
pub struct Session {
    pub uid: Uuid,
    pub jobs: BTreeMap<String, JobInfo>,
    pub nodes: BTreeMap<String, NodeInfo>,
    pub queues: BTreeMap<String, QueueInfo>,
    pub namespace_info: BTreeMap<String, NamespaceInfo>,
    pub revocable_nodes: BTreeMap<String, NodeInfo>,
    hooks: HookRegistry,
    plugins: Vec<Arc<dyn Plugin>>,
}

/// Opens a session over `snapshot` and lets every plugin register its hooks.
pub async fn open_session(snapshot: ClusterSnapshot, plugins: Vec<Arc<dyn Plugin>>) -> Session {
    let mut session = Session::new(snapshot);

    for plugin in &plugins {
        plugin.on_session_open(&mut session).await;
        debug!(
            session = %session.uid,
            plugin = plugin.name(),
            hooks = ?session.hooks.registered(plugin.name()),
            "plugin opened session"
        );
    }
    session.plugins = plugins;

    info!(
        session = %session.uid,
        jobs = session.jobs.len(),
        nodes = session.nodes.len(),
        queues = session.queues.len(),
        "session opened"
    );

    session
}

pub async fn close_session(session: Session) {
    for plugin in &session.plugins {
        plugin.on_session_close(&session).await;
    }

    info!(session = %session.uid, "session closed");
}

impl Session {
    pub fn new(snapshot: ClusterSnapshot) -> Self {
        Self {
            uid: Uuid::new_v4(),
            jobs: snapshot.jobs,
            nodes: snapshot.nodes,
            queues: snapshot.queues,
            namespace_info: snapshot.namespace_info,
            revocable_nodes: snapshot.revocable_nodes,
            hooks: HookRegistry::default(),
            plugins: Vec::new(),
        }
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn add_predicate_fn(&mut self, plugin: &str, predicate: Arc<dyn PredicateFn>) {
        self.hooks
            .predicate_fns
            .push((plugin.to_string(), predicate));
    }

    pub fn add_batch_node_order_fn(&mut self, plugin: &str, node_order: Arc<dyn NodeOrderFn>) {
        self.hooks
            .node_order_fns
            .push((plugin.to_string(), node_order));
    }

    pub fn add_preemptable_fn(&mut self, plugin: &str, preemptable: Arc<dyn EvictableFn>) {
        self.hooks
            .preemptable_fns
            .push((plugin.to_string(), preemptable));
    }

    pub fn add_reclaimable_fn(&mut self, plugin: &str, reclaimable: Arc<dyn EvictableFn>) {
        self.hooks
            .reclaimable_fns
            .push((plugin.to_string(), reclaimable));
    }

    pub fn add_overused_fn(&mut self, plugin: &str, overused: Arc<dyn OverusedFn>) {
        self.hooks
            .overused_fns
            .push((plugin.to_string(), overused));
    }

    pub fn add_job_enqueueable_fn(&mut self, plugin: &str, enqueueable: Arc<dyn JobEnqueueableFn>) {
        self.hooks
            .job_enqueueable_fns
            .push((plugin.to_string(), enqueueable));
    }

    pub fn add_job_ready_fn(&mut self, plugin: &str, ready: Arc<dyn JobReadyFn>) {
        self.hooks
            .job_ready_fns
            .push((plugin.to_string(), ready));
    }

    pub fn add_event_handler(&mut self, plugin: &str, handler: EventHandler) {
        self.hooks
            .event_handlers
            .push((plugin.to_string(), handler));
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &TaskInfo> {
        self.jobs.values().flat_map(JobInfo::pending_tasks)
    }

    /// First failing predicate wins.
    pub async fn predicate(&self, task: &TaskInfo, node: &NodeInfo) -> Result<(), FitError> {
        for (_, predicate) in &self.hooks.predicate_fns {
            predicate.predicate(task, node).await?;
        }
        Ok(())
    }

    /// Runs the predicates of `task` against every node concurrently.
    pub async fn predicate_nodes(&self, task: &TaskInfo) -> Vec<(&NodeInfo, Result<(), FitError>)> {
        let checks = self
            .nodes
            .values()
            .map(|node| async move { (node, self.predicate(task, node).await) });

        join_all(checks).await
    }

    /// Sums the scores every plugin gives each node.
    pub async fn node_order(&self, task: &TaskInfo, nodes: &[&NodeInfo]) -> Result<NodeScores> {
        let mut totals = NodeScores::new();

        for (plugin, node_order) in &self.hooks.node_order_fns {
            let scores = node_order
                .node_order(task, nodes)
                .await
                .with_context(|| format!("plugin {plugin} failed to score nodes for {task}"))?;

            for (node, score) in scores.into_iter().flatten() {
                *totals.entry(node).or_default() += score;
            }
        }

        Ok(totals)
    }

    pub async fn preemptable(&self, evictor: &TaskInfo, evictees: &[&TaskInfo]) -> Vec<TaskInfo> {
        select_victims(&self.hooks.preemptable_fns, evictor, evictees).await
    }

    pub async fn reclaimable(&self, evictor: &TaskInfo, evictees: &[&TaskInfo]) -> Vec<TaskInfo> {
        select_victims(&self.hooks.reclaimable_fns, evictor, evictees).await
    }

    /// A queue is overused as soon as one plugin says so.
    pub async fn overused(&self, queue: &QueueInfo) -> bool {
        for (plugin, overused) in &self.hooks.overused_fns {
            if overused.overused(queue).await {
                debug!(plugin = %plugin, queue = %queue.name, "queue overused");
                return true;
            }
        }
        false
    }

    /// A job may be enqueued unless one plugin rejects it.
    pub async fn job_enqueueable(&self, job: &JobInfo) -> bool {
        for (plugin, enqueueable) in &self.hooks.job_enqueueable_fns {
            if enqueueable.job_enqueueable(job).await == Vote::Reject {
                debug!(plugin = %plugin, job = %job.name, "job enqueue rejected");
                return false;
            }
        }
        true
    }

    pub async fn job_ready(&self, job: &JobInfo) -> bool {
        for (plugin, ready) in &self.hooks.job_ready_fns {
            if !ready.job_ready(job).await {
                debug!(plugin = %plugin, job = %job.name, "job not ready");
                return false;
            }
        }
        true
    }

    pub async fn allocate(&self, task: &TaskInfo) -> Result<()> {
        self.dispatch_event(task, |handler| handler.allocate.as_ref())
            .await
            .with_context(|| format!("allocation of {task} was rejected"))
    }

    pub async fn deallocate(&self, task: &TaskInfo) -> Result<()> {
        self.dispatch_event(task, |handler| handler.deallocate.as_ref())
            .await
            .with_context(|| format!("deallocation of {task} was rejected"))
    }

    async fn dispatch_event<F>(&self, task: &TaskInfo, select: F) -> Result<()>
    where
        F: Fn(&EventHandler) -> Option<&Arc<dyn EventFn>>,
    {
        let mut event = Event::new(task);

        for (_, handler) in &self.hooks.event_handlers {
            if let Some(event_fn) = select(handler) {
                event_fn.handle(&mut event).await;
            }
        }

        match event.err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Abstaining plugins are skipped; a rejection clears the victims and
/// permitting plugins narrow them to the tasks they all agree on.
async fn select_victims(
    evictables: &[(String, Arc<dyn EvictableFn>)],
    evictor: &TaskInfo,
    evictees: &[&TaskInfo],
) -> Vec<TaskInfo> {
    let mut victims: Option<Vec<TaskInfo>> = None;

    for (plugin, evictable) in evictables {
        let EvictionVote {
            victims: candidates,
            vote,
        } = evictable.evictable(evictor, evictees).await;

        match vote {
            Vote::Abstain => continue,
            Vote::Reject => {
                debug!(plugin = %plugin, evictor = %evictor, "eviction rejected");
                return Vec::new();
            }
            Vote::Permit => {
                let candidates = candidates.unwrap_or_default();
                victims = Some(match victims {
                    None => candidates,
                    Some(previous) => previous
                        .into_iter()
                        .filter(|victim| candidates.iter().any(|c| c.uid == victim.uid))
                        .collect(),
                });
            }
        }
    }

    victims.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct FixedVote(EvictionVote);

    #[async_trait]
    impl EvictableFn for FixedVote {
        async fn evictable(&self, _evictor: &TaskInfo, _evictees: &[&TaskInfo]) -> EvictionVote {
            self.0.clone()
        }
    }

    fn task(uid: &str) -> TaskInfo {
        TaskInfo::new(uid, uid, Default::default())
    }

    fn permit(uids: &[&str]) -> Arc<dyn EvictableFn> {
        Arc::new(FixedVote(EvictionVote {
            victims: Some(uids.iter().map(|uid| task(uid)).collect()),
            vote: Vote::Permit,
        }))
    }

    fn vote(vote: Vote) -> Arc<dyn EvictableFn> {
        Arc::new(FixedVote(EvictionVote {
            victims: None,
            vote,
        }))
    }

    #[tokio::test]
    async fn permitting_plugins_intersect_victims() {
        let mut session = Session::new(ClusterSnapshot::default());
        session.add_preemptable_fn("a", permit(&["t1", "t2", "t3"]));
        session.add_preemptable_fn("b", vote(Vote::Abstain));
        session.add_preemptable_fn("c", permit(&["t2", "t3", "t4"]));

        let evictor = task("evictor");
        let victims = session.preemptable(&evictor, &[]).await;
        let uids: Vec<_> = victims.iter().map(|victim| victim.uid.as_str()).collect();

        assert_eq!(uids, vec!["t2", "t3"]);
    }

    #[tokio::test]
    async fn a_rejection_leaves_no_victims() {
        let mut session = Session::new(ClusterSnapshot::default());
        session.add_reclaimable_fn("a", permit(&["t1"]));
        session.add_reclaimable_fn("b", vote(Vote::Reject));

        let evictor = task("evictor");
        assert!(session.reclaimable(&evictor, &[]).await.is_empty());
    }

    #[tokio::test]
    async fn empty_registry_keeps_framework_defaults() {
        let session = Session::new(ClusterSnapshot::default());
        let job = JobInfo::new("j1", "job", "default");
        let queue = QueueInfo::new("q1", "default");
        let task = task("t1");
        let node = NodeInfo::new("n1");

        assert!(session.hooks().is_empty());
        assert!(session.predicate(&task, &node).await.is_ok());
        assert!(session.node_order(&task, &[&node]).await.unwrap().is_empty());
        assert!(!session.overused(&queue).await);
        assert!(session.job_enqueueable(&job).await);
        assert!(session.job_ready(&job).await);
        assert!(session.allocate(&task).await.is_ok());
    }
}
