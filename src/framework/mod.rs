pub mod arguments;
pub mod conf;
pub mod event;
pub mod hook_registry;
pub mod plugin;
pub mod session;

pub use arguments::Arguments;
pub use conf::SchedulerConf;
pub use event::{Event, EventFn, EventHandler};
pub use hook_registry::{
    EvictableFn, EvictionVote, HookKind, HookRegistry, JobEnqueueableFn, JobReadyFn, NodeOrderFn,
    NodeScores, OverusedFn, PredicateFn,
};
pub use plugin::{Plugin, PluginBuilder, plugin_builder};
pub use session::{Session, close_session, open_session};
