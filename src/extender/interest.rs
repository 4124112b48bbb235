use std::collections::BTreeSet;

use crate::api::{Container, TaskInfo};

/// Decides whether a task touches any resource the extender manages.
#[derive(Debug, Clone, Default)]
pub struct InterestFilter {
    managed_resources: BTreeSet<String>,
}

impl InterestFilter {
    pub fn new(managed_resources: BTreeSet<String>) -> Self {
        Self { managed_resources }
    }

    /// True when no resources are managed, or when a regular or init container
    /// of the task requests or limits a managed resource.
    pub fn is_interested(&self, task: &TaskInfo) -> bool {
        if self.managed_resources.is_empty() {
            return true;
        }

        self.has_managed_resources(&task.pod.containers)
            || self.has_managed_resources(&task.pod.init_containers)
    }

    fn has_managed_resources(&self, containers: &[Container]) -> bool {
        containers.iter().any(|container| {
            container
                .resources
                .names()
                .any(|name| self.managed_resources.contains(name))
        })
    }
}
