use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::warn;

use crate::framework::arguments::Arguments;
use crate::framework::plugin::{Plugin, plugin_builder};

/// Scheduler configuration file: the actions to run and the plugin tiers.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConf {
    #[serde(default)]
    pub actions: String,
    pub tiers: Vec<Tier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tier {
    pub plugins: Vec<PluginOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginOption {
    pub name: String,
    #[serde(default)]
    pub arguments: Arguments,
}

impl SchedulerConf {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scheduler conf {}", path.display()))?;

        Self::parse(&raw).with_context(|| format!("invalid scheduler conf {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let conf: SchedulerConf =
            serde_yaml::from_str(raw).context("failed to parse scheduler conf")?;
        conf.validate()?;

        Ok(conf)
    }

    pub fn actions(&self) -> Vec<&str> {
        self.actions
            .split(',')
            .map(str::trim)
            .filter(|action| !action.is_empty())
            .collect()
    }

    pub fn plugin_options(&self) -> impl Iterator<Item = &PluginOption> {
        self.tiers.iter().flat_map(|tier| tier.plugins.iter())
    }

    /// Builds every configured plugin that has a registered builder, in tier order.
    pub fn build_plugins(&self) -> Result<Vec<Arc<dyn Plugin>>> {
        let mut plugins = Vec::new();

        for option in self.plugin_options() {
            let Some(builder) = plugin_builder(&option.name) else {
                warn!(plugin = %option.name, "no builder registered for plugin; skipping");
                continue;
            };

            let plugin = builder(&option.arguments)
                .with_context(|| format!("failed to build plugin {}", option.name))?;
            plugins.push(plugin);
        }

        Ok(plugins)
    }

    fn validate(&self) -> Result<()> {
        if self.tiers.is_empty() {
            bail!("tiers must not be empty");
        }
        for (index, tier) in self.tiers.iter().enumerate() {
            if tier.plugins.is_empty() {
                bail!("tier {index} has no plugins");
            }
            if let Some(option) = tier.plugins.iter().find(|option| option.name.trim().is_empty()) {
                bail!("tier {index} has a plugin without a name: {option:?}");
            }
        }
        Ok(())
    }
}
