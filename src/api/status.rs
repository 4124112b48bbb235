use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::{NodeInfo, TaskInfo};

/// Outcome code of a plugin's fit check. Encoded as an integer on the wire;
/// codes this side does not know decode as `Error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum StatusCode {
    #[default]
    Success,
    Error,
    Unschedulable,
    UnschedulableAndUnresolvable,
    Wait,
    Skip,
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        match code {
            0 => StatusCode::Success,
            2 => StatusCode::Unschedulable,
            3 => StatusCode::UnschedulableAndUnresolvable,
            4 => StatusCode::Wait,
            5 => StatusCode::Skip,
            _ => StatusCode::Error,
        }
    }
}

impl From<StatusCode> for i32 {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::Success => 0,
            StatusCode::Error => 1,
            StatusCode::Unschedulable => 2,
            StatusCode::UnschedulableAndUnresolvable => 3,
            StatusCode::Wait => 4,
            StatusCode::Skip => 5,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Success => write!(f, "Success"),
            StatusCode::Error => write!(f, "Error"),
            StatusCode::Unschedulable => write!(f, "Unschedulable"),
            StatusCode::UnschedulableAndUnresolvable => write!(f, "UnschedulableAndUnresolvable"),
            StatusCode::Wait => write!(f, "Wait"),
            StatusCode::Skip => write!(f, "Skip"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: StatusCode,
    pub reason: String,
    pub plugin: String,
}

impl Status {
    pub fn new(code: StatusCode, reason: impl Into<String>, plugin: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
            plugin: plugin.into(),
        }
    }
}

/// Why a task does not fit on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitError {
    pub task_namespace: String,
    pub task_name: String,
    pub node_name: String,
    pub statuses: Vec<Status>,
}

impl FitError {
    /// A generic `Error` fit failure reported by `plugin`.
    pub fn new(
        task: &TaskInfo,
        node: &NodeInfo,
        plugin: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::with_status(task, node, Status::new(StatusCode::Error, reason, plugin))
    }

    pub fn with_status(task: &TaskInfo, node: &NodeInfo, status: Status) -> Self {
        Self {
            task_namespace: task.namespace.clone(),
            task_name: task.name.clone(),
            node_name: node.name.clone(),
            statuses: vec![status],
        }
    }

    pub fn reasons(&self) -> Vec<&str> {
        self.statuses
            .iter()
            .map(|status| status.reason.as_str())
            .collect()
    }
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {}/{} on node {} fit failed: {}",
            self.task_namespace,
            self.task_name,
            self.node_name,
            self.reasons().join(", ")
        )
    }
}

impl std::error::Error for FitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_uses_integer_encoding() {
        assert_eq!(serde_json::to_string(&StatusCode::Unschedulable).unwrap(), "2");
        let code: StatusCode = serde_json::from_str("4").unwrap();
        assert_eq!(code, StatusCode::Wait);
    }

    #[test]
    fn unknown_status_code_decodes_as_error() {
        assert_eq!(serde_json::from_str::<StatusCode>("42").unwrap(), StatusCode::Error);
        assert_eq!(serde_json::from_str::<StatusCode>("-3").unwrap(), StatusCode::Error);
    }

    #[test]
    fn fit_error_message_names_task_and_node() {
        let task = TaskInfo::new("t-1", "worker-0", Default::default());
        let node = NodeInfo::new("node-a");
        let error = FitError::new(&task, &node, "extender", "no gpu left");

        assert_eq!(error.statuses[0].code, StatusCode::Error);
        assert_eq!(error.statuses[0].plugin, "extender");
        assert_eq!(
            error.to_string(),
            "task default/worker-0 on node node-a fit failed: no gpu left"
        );
    }
}
