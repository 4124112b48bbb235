use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::ResourceList;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    Allocated,
    Pipelined,
    Binding,
    Bound,
    Running,
    Releasing,
    Succeeded,
    Failed,
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    #[serde(default)]
    pub requests: ResourceList,
    #[serde(default)]
    pub limits: ResourceList,
}

impl ResourceRequirements {
    /// Resource names present in either requests or limits.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.requests
            .keys()
            .chain(self.limits.keys())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub resources: ResourceRequirements,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default)]
    pub init_containers: Vec<Container>,
}

/// A schedulable unit of a job, backed by one pod.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub uid: String,
    #[serde(default)]
    pub job: String,
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub pod: PodSpec,
}

fn default_namespace() -> String {
    "default".to_string()
}

impl TaskInfo {
    pub fn new(uid: impl Into<String>, name: impl Into<String>, pod: PodSpec) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            namespace: default_namespace(),
            pod,
            ..Self::default()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }
}

impl fmt::Display for TaskInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
