use std::sync::Arc;

use async_trait::async_trait;

use crate::api::TaskInfo;

/// An allocation or deallocation of one task.
///
/// Handlers may fill `err` to make the framework undo the operation.
#[derive(Debug)]
pub struct Event<'a> {
    pub task: &'a TaskInfo,
    pub err: Option<anyhow::Error>,
}

impl<'a> Event<'a> {
    pub fn new(task: &'a TaskInfo) -> Self {
        Self { task, err: None }
    }
}

#[async_trait]
pub trait EventFn: Send + Sync {
    async fn handle(&self, event: &mut Event<'_>);
}

#[derive(Clone, Default)]
pub struct EventHandler {
    pub allocate: Option<Arc<dyn EventFn>>,
    pub deallocate: Option<Arc<dyn EventFn>>,
}
