//! Request and response bodies exchanged with the extender.
//!
//! Requests borrow the scheduler's entities for the duration of one call.
//! Response fields the extender leaves out or sends as `null` take their zero
//! value.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::api::{JobInfo, NamespaceInfo, NodeInfo, QueueInfo, StatusCode, TaskInfo, Vote};
use crate::framework::hook_registry::NodeScores;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnSessionOpenRequest<'a> {
    pub jobs: &'a BTreeMap<String, JobInfo>,
    pub nodes: &'a BTreeMap<String, NodeInfo>,
    pub queues: &'a BTreeMap<String, QueueInfo>,
    pub namespace_info: &'a BTreeMap<String, NamespaceInfo>,
    pub revocable_nodes: &'a BTreeMap<String, NodeInfo>,
}

#[derive(Debug, Default, Serialize)]
pub struct OnSessionCloseRequest {}

#[derive(Debug, Serialize)]
pub struct PredicateRequest<'a> {
    pub task: &'a TaskInfo,
    pub node: &'a NodeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PredicateResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub code: StatusCode,
    #[serde(deserialize_with = "null_as_default")]
    pub error_message: String,
}

#[derive(Debug, Serialize)]
pub struct PrioritizeRequest<'a> {
    pub task: &'a TaskInfo,
    pub nodes: &'a [&'a NodeInfo],
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrioritizeResponse {
    pub node_score: Option<NodeScores>,
    #[serde(deserialize_with = "null_as_default")]
    pub error_message: String,
}

/// Shared by the preemptable and reclaimable verbs.
#[derive(Debug, Serialize)]
pub struct EvictionRequest<'a> {
    pub evictor: &'a TaskInfo,
    pub evictees: &'a [&'a TaskInfo],
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EvictionResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub status: Vote,
    pub victims: Option<Vec<TaskInfo>>,
}

#[derive(Debug, Serialize)]
pub struct QueueOverusedRequest<'a> {
    pub queue: &'a QueueInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueueOverusedResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub overused: bool,
}

#[derive(Debug, Serialize)]
pub struct JobEnqueueableRequest<'a> {
    pub job: &'a JobInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobEnqueueableResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub status: Vote,
}

#[derive(Debug, Serialize)]
pub struct JobReadyRequest<'a> {
    pub job: &'a JobInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobReadyResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub status: bool,
}

/// Body of allocate and deallocate notifications.
#[derive(Debug, Serialize)]
pub struct EventHandlerRequest<'a> {
    pub task: &'a TaskInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventHandlerResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub error_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_fields_take_their_zero_value() {
        let predicate: PredicateResponse =
            serde_json::from_str(r#"{"code":null,"errorMessage":null}"#).unwrap();
        assert_eq!(predicate.code, StatusCode::Success);
        assert!(predicate.error_message.is_empty());

        let eviction: EvictionResponse =
            serde_json::from_str(r#"{"status":null,"victims":null}"#).unwrap();
        assert_eq!(eviction.status, Vote::Abstain);
        assert!(eviction.victims.is_none());

        let ready: JobReadyResponse = serde_json::from_str(r#"{"status":null}"#).unwrap();
        assert!(!ready.status);
    }

    #[test]
    fn unknown_codes_still_decode() {
        let predicate: PredicateResponse =
            serde_json::from_str(r#"{"code":6,"errorMessage":"remote says no"}"#).unwrap();
        assert_eq!(predicate.code, StatusCode::Error);

        let enqueueable: JobEnqueueableResponse =
            serde_json::from_str(r#"{"status":-2}"#).unwrap();
        assert_eq!(enqueueable.status, Vote::Reject);
    }
}
