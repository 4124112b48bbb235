use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::ResourceList;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub allocatable: ResourceList,
    #[serde(default)]
    pub idle: ResourceList,
    #[serde(default)]
    pub used: ResourceList,
    /// Zone of revocable resources, when the node lends idle capacity.
    #[serde(default)]
    pub revocable_zone: Option<String>,
}

impl NodeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
