use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::extender;
use crate::framework::arguments::Arguments;
use crate::framework::session::Session;

#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Called once when a session opens; registers this plugin's hooks.
    async fn on_session_open(&self, session: &mut Session);

    async fn on_session_close(&self, session: &Session);
}

pub type PluginBuilder = fn(&Arguments) -> Result<Arc<dyn Plugin>>;

static PLUGIN_BUILDERS: Lazy<HashMap<&'static str, PluginBuilder>> = Lazy::new(|| {
    let mut builders: HashMap<&'static str, PluginBuilder> = HashMap::new();
    builders.insert(extender::PLUGIN_NAME, extender::new_plugin);
    builders
});

pub fn plugin_builder(name: &str) -> Option<PluginBuilder> {
    PLUGIN_BUILDERS.get(name).copied()
}
