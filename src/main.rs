use std::cmp::Ordering;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use extender_bridge::api::{NodeInfo, TaskInfo, TaskStatus};
use extender_bridge::cache::ClusterSnapshot;
use extender_bridge::framework::{SchedulerConf, Session, close_session, open_session};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Scheduler configuration with the plugin tiers.
    #[arg(long, default_value = "demos/scheduler.yml")]
    pub conf: PathBuf,

    /// Cluster state to run one scheduling cycle against.
    #[arg(long, default_value = "demos/cluster.yml")]
    pub snapshot: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("extender_bridge=debug".parse()?)
                .add_directive("reqwest=info".parse()?),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let conf = SchedulerConf::load(&args.conf)?;
    let snapshot = ClusterSnapshot::load(&args.snapshot)?;
    let plugins = conf.build_plugins()?;

    info!(actions = ?conf.actions(), plugins = plugins.len(), "scheduler configured");

    let session = open_session(snapshot, plugins).await;

    enqueue(&session).await;
    allocate(&session).await;
    check_readiness(&session).await;

    close_session(session).await;

    Ok(())
}

async fn enqueue(session: &Session) {
    for queue in session.queues.values() {
        if session.overused(queue).await {
            warn!(queue = %queue.name, "queue overused");
        }
    }

    for job in session.jobs.values() {
        let enqueueable = session.job_enqueueable(job).await;
        info!(job = %job.name, queue = %job.queue, enqueueable, "enqueue decision");
    }
}

async fn allocate(session: &Session) {
    for task in session.pending_tasks() {
        let mut feasible = Vec::new();

        for (node, fit) in session.predicate_nodes(task).await {
            match fit {
                Ok(()) => feasible.push(node),
                Err(error) => info!(%error, "node filtered"),
            }
        }

        if feasible.is_empty() {
            evict_for(session, task).await;
            continue;
        }

        let scores = match session.node_order(task, &feasible).await {
            Ok(scores) => scores,
            Err(error) => {
                warn!(task = %task, error = ?error, "node ordering failed");
                continue;
            }
        };

        let Some(best) = best_node(&feasible, |node| {
            scores.get(&node.name).copied().unwrap_or_default()
        }) else {
            continue;
        };

        match session.allocate(task).await {
            Ok(()) => info!(task = %task, node = %best.name, "task allocated"),
            Err(error) => {
                warn!(task = %task, node = %best.name, error = ?error, "allocation rolled back");
                if let Err(error) = session.deallocate(task).await {
                    warn!(task = %task, error = ?error, "deallocation failed");
                }
            }
        }
    }
}

/// Looks for running tasks the pending `task` may displace, first in its own
/// queue then in others.
async fn evict_for(session: &Session, task: &TaskInfo) {
    let Some(job) = session.jobs.get(&task.job) else {
        return;
    };

    let running: Vec<&TaskInfo> = session
        .jobs
        .values()
        .flat_map(|other| other.tasks.values())
        .filter(|t| t.status == TaskStatus::Running && t.priority < task.priority)
        .collect();

    let (same_queue, other_queues): (Vec<&TaskInfo>, Vec<&TaskInfo>) =
        running.into_iter().partition(|t| {
            session
                .jobs
                .get(&t.job)
                .is_some_and(|other| other.queue == job.queue)
        });

    if !same_queue.is_empty() {
        let victims = session.preemptable(task, &same_queue).await;
        info!(
            task = %task,
            candidates = same_queue.len(),
            victims = victims.len(),
            "preemption evaluated"
        );
    }

    if !other_queues.is_empty() {
        let victims = session.reclaimable(task, &other_queues).await;
        info!(
            task = %task,
            candidates = other_queues.len(),
            victims = victims.len(),
            "reclaim evaluated"
        );
    }
}

async fn check_readiness(session: &Session) {
    for job in session.jobs.values() {
        let ready = session.job_ready(job).await;
        info!(job = %job.name, ready, "job readiness");
    }
}

/// Highest score wins; ties go to the first node by name.
fn best_node<'a>(nodes: &[&'a NodeInfo], score: impl Fn(&NodeInfo) -> f64) -> Option<&'a NodeInfo> {
    nodes.iter().copied().max_by(|a, b| {
        score(a)
            .partial_cmp(&score(b))
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.name.cmp(&a.name))
    })
}
