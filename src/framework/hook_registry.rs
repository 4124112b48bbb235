use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::api::{FitError, JobInfo, NodeInfo, QueueInfo, TaskInfo, Vote};
use crate::framework::event::EventHandler;

/// Score per node name.
pub type NodeScores = HashMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookKind {
    Predicate,
    Prioritize,
    Preemptable,
    Reclaimable,
    QueueOverused,
    JobEnqueueable,
    JobReady,
    Allocate,
    Deallocate,
}

impl HookKind {
    pub const ALL: [HookKind; 9] = [
        Self::Predicate,
        Self::Prioritize,
        Self::Preemptable,
        Self::Reclaimable,
        Self::QueueOverused,
        Self::JobEnqueueable,
        Self::JobReady,
        Self::Allocate,
        Self::Deallocate,
    ];
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate => write!(f, "predicate"),
            Self::Prioritize => write!(f, "prioritize"),
            Self::Preemptable => write!(f, "preemptable"),
            Self::Reclaimable => write!(f, "reclaimable"),
            Self::QueueOverused => write!(f, "queue-overused"),
            Self::JobEnqueueable => write!(f, "job-enqueueable"),
            Self::JobReady => write!(f, "job-ready"),
            Self::Allocate => write!(f, "allocate"),
            Self::Deallocate => write!(f, "deallocate"),
        }
    }
}

#[async_trait]
pub trait PredicateFn: Send + Sync {
    async fn predicate(&self, task: &TaskInfo, node: &NodeInfo) -> Result<(), FitError>;
}

#[async_trait]
pub trait NodeOrderFn: Send + Sync {
    /// `Ok(None)` abstains from scoring.
    async fn node_order(&self, task: &TaskInfo, nodes: &[&NodeInfo])
    -> Result<Option<NodeScores>>;
}

/// Victims a plugin is willing to evict, with its vote on the eviction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvictionVote {
    pub victims: Option<Vec<TaskInfo>>,
    pub vote: Vote,
}

#[async_trait]
pub trait EvictableFn: Send + Sync {
    async fn evictable(&self, evictor: &TaskInfo, evictees: &[&TaskInfo]) -> EvictionVote;
}

#[async_trait]
pub trait OverusedFn: Send + Sync {
    async fn overused(&self, queue: &QueueInfo) -> bool;
}

#[async_trait]
pub trait JobEnqueueableFn: Send + Sync {
    async fn job_enqueueable(&self, job: &JobInfo) -> Vote;
}

#[async_trait]
pub trait JobReadyFn: Send + Sync {
    async fn job_ready(&self, job: &JobInfo) -> bool;
}

/// Hooks registered for one session, in registration order, keyed by plugin name.
#[derive(Default)]
pub struct HookRegistry {
    pub(crate) predicate_fns: Vec<(String, Arc<dyn PredicateFn>)>,
    pub(crate) node_order_fns: Vec<(String, Arc<dyn NodeOrderFn>)>,
    pub(crate) preemptable_fns: Vec<(String, Arc<dyn EvictableFn>)>,
    pub(crate) reclaimable_fns: Vec<(String, Arc<dyn EvictableFn>)>,
    pub(crate) overused_fns: Vec<(String, Arc<dyn OverusedFn>)>,
    pub(crate) job_enqueueable_fns: Vec<(String, Arc<dyn JobEnqueueableFn>)>,
    pub(crate) job_ready_fns: Vec<(String, Arc<dyn JobReadyFn>)>,
    pub(crate) event_handlers: Vec<(String, EventHandler)>,
}

impl HookRegistry {
    /// Hook kinds `plugin` has registered, in `HookKind::ALL` order.
    pub fn registered(&self, plugin: &str) -> Vec<HookKind> {
        HookKind::ALL
            .into_iter()
            .filter(|kind| self.is_registered(plugin, *kind))
            .collect()
    }

    pub fn is_registered(&self, plugin: &str, kind: HookKind) -> bool {
        fn has<T>(entries: &[(String, T)], plugin: &str) -> bool {
            entries.iter().any(|(name, _)| name == plugin)
        }

        let handlers = || {
            self.event_handlers
                .iter()
                .filter(move |(name, _)| name == plugin)
                .map(|(_, handler)| handler)
        };

        match kind {
            HookKind::Predicate => has(&self.predicate_fns, plugin),
            HookKind::Prioritize => has(&self.node_order_fns, plugin),
            HookKind::Preemptable => has(&self.preemptable_fns, plugin),
            HookKind::Reclaimable => has(&self.reclaimable_fns, plugin),
            HookKind::QueueOverused => has(&self.overused_fns, plugin),
            HookKind::JobEnqueueable => has(&self.job_enqueueable_fns, plugin),
            HookKind::JobReady => has(&self.job_ready_fns, plugin),
            HookKind::Allocate => handlers().any(|handler| handler.allocate.is_some()),
            HookKind::Deallocate => handlers().any(|handler| handler.deallocate.is_some()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicate_fns.is_empty()
            && self.node_order_fns.is_empty()
            && self.preemptable_fns.is_empty()
            && self.reclaimable_fns.is_empty()
            && self.overused_fns.is_empty()
            && self.job_enqueueable_fns.is_empty()
            && self.job_ready_fns.is_empty()
            && self.event_handlers.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("predicate_fns", &self.predicate_fns.len())
            .field("node_order_fns", &self.node_order_fns.len())
            .field("preemptable_fns", &self.preemptable_fns.len())
            .field("reclaimable_fns", &self.reclaimable_fns.len())
            .field("overused_fns", &self.overused_fns.len())
            .field("job_enqueueable_fns", &self.job_enqueueable_fns.len())
            .field("job_ready_fns", &self.job_ready_fns.len())
            .field("event_handlers", &self.event_handlers.len())
            .finish()
    }
}
