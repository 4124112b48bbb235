use serde::{Deserialize, Serialize};

use crate::api::ResourceList;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueInfo {
    pub uid: String,
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: i32,
    #[serde(default)]
    pub capability: ResourceList,
    #[serde(default)]
    pub reclaimable: bool,
}

impl QueueInfo {
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            weight: default_weight(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInfo {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: i32,
}

fn default_weight() -> i32 {
    1
}
