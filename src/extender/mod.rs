//! Forwards scheduling decisions to an external HTTP service.

pub mod extender_client;
pub mod extender_config;
pub mod extender_error;
pub mod extender_plugin;
pub mod hooks;
pub mod interest;
pub mod types;

use std::sync::Arc;

use anyhow::Result;

use crate::framework::arguments::Arguments;
use crate::framework::plugin::Plugin;

pub use extender_client::ExtenderClient;
pub use extender_config::ExtenderConfig;
pub use extender_error::{ExtenderError, ExtenderResult};
pub use extender_plugin::ExtenderPlugin;
pub use interest::InterestFilter;

pub const PLUGIN_NAME: &str = "extender";

/// Builds the plugin from its scheduler configuration arguments.
pub fn new_plugin(arguments: &Arguments) -> Result<Arc<dyn Plugin>> {
    let config = ExtenderConfig::from_arguments(arguments);
    Ok(Arc::new(ExtenderPlugin::new(config)?))
}
