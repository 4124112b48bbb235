use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::api::{JobInfo, NamespaceInfo, NodeInfo, QueueInfo};

/// Point-in-time inventory the scheduler opens a session over.
///
/// Maps are keyed by uid for jobs and queues and by name for nodes and
/// namespaces. Missing keys in the file are filled in from the entries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub jobs: BTreeMap<String, JobInfo>,
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeInfo>,
    #[serde(default)]
    pub queues: BTreeMap<String, QueueInfo>,
    #[serde(default)]
    pub namespace_info: BTreeMap<String, NamespaceInfo>,
    #[serde(default)]
    pub revocable_nodes: BTreeMap<String, NodeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    #[serde(default)]
    jobs: Vec<JobInfo>,
    #[serde(default)]
    nodes: Vec<NodeInfo>,
    #[serde(default)]
    queues: Vec<QueueInfo>,
    #[serde(default)]
    namespaces: Vec<NamespaceInfo>,
}

impl ClusterSnapshot {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read cluster snapshot {}", path.display()))?;

        Self::parse(&raw).with_context(|| format!("invalid cluster snapshot {}", path.display()))
    }

    /// Parses the list-shaped snapshot file format and indexes it.
    pub fn parse(raw: &str) -> Result<Self> {
        let file: SnapshotFile =
            serde_yaml::from_str(raw).context("failed to parse cluster snapshot")?;

        let mut snapshot = Self::default();
        for queue in file.queues {
            snapshot.add_queue(queue);
        }
        for node in file.nodes {
            snapshot.add_node(node);
        }
        for namespace in file.namespaces {
            snapshot.namespace_info.insert(namespace.name.clone(), namespace);
        }
        for job in file.jobs {
            snapshot.add_job(job);
        }

        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn add_job(&mut self, mut job: JobInfo) {
        for task in job.tasks.values_mut() {
            if task.job.is_empty() {
                task.job = job.uid.clone();
            }
        }
        self.jobs.insert(job.uid.clone(), job);
    }

    /// Nodes in a revocable zone are also indexed as revocable.
    pub fn add_node(&mut self, node: NodeInfo) {
        if node.revocable_zone.is_some() {
            self.revocable_nodes.insert(node.name.clone(), node.clone());
        }
        self.nodes.insert(node.name.clone(), node);
    }

    pub fn add_queue(&mut self, queue: QueueInfo) {
        self.queues.insert(queue.uid.clone(), queue);
    }

    fn validate(&self) -> Result<()> {
        for job in self.jobs.values() {
            if !self.queues.contains_key(&job.queue) {
                bail!("job {} references unknown queue {}", job.name, job.queue);
            }
            for (uid, task) in &job.tasks {
                if uid != &task.uid {
                    bail!("job {} indexes task {} under {uid}", job.name, task.uid);
                }
                if task.job != job.uid {
                    bail!("task {} belongs to job {}, not {}", task.uid, task.job, job.uid);
                }
            }
        }
        Ok(())
    }
}
