use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::task_info::TaskInfo;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub uid: String,
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub queue: String,
    #[serde(default)]
    pub min_available: i32,
    #[serde(default)]
    pub priority: i32,
    /// Tasks keyed by task uid.
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskInfo>,
}

fn default_namespace() -> String {
    "default".to_string()
}

impl JobInfo {
    pub fn new(uid: impl Into<String>, name: impl Into<String>, queue: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            namespace: default_namespace(),
            queue: queue.into(),
            ..Self::default()
        }
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &TaskInfo> {
        self.tasks.values().filter(|task| task.is_pending())
    }
}
