pub mod job_info;
pub mod node_info;
pub mod queue_info;
pub mod status;
pub mod task_info;
pub mod vote;

use std::collections::BTreeMap;

/// Resource name to quantity, e.g. `cpu: "2"`, `nvidia.com/gpu: "1"`.
pub type ResourceList = BTreeMap<String, String>;

pub use job_info::JobInfo;
pub use node_info::NodeInfo;
pub use queue_info::{NamespaceInfo, QueueInfo};
pub use status::{FitError, Status, StatusCode};
pub use task_info::{Container, PodSpec, ResourceRequirements, TaskInfo, TaskStatus};
pub use vote::Vote;
