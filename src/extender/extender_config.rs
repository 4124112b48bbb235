use std::collections::BTreeSet;
use std::time::Duration;

use tracing::warn;

use crate::framework::arguments::Arguments;

pub const URL_PREFIX: &str = "extender.urlPrefix";
pub const HTTP_TIMEOUT: &str = "extender.httpTimeout";
pub const ON_SESSION_OPEN_VERB: &str = "extender.onSessionOpenVerb";
pub const ON_SESSION_CLOSE_VERB: &str = "extender.onSessionCloseVerb";
pub const PREDICATE_VERB: &str = "extender.predicateVerb";
pub const PRIORITIZE_VERB: &str = "extender.prioritizeVerb";
pub const PREEMPTABLE_VERB: &str = "extender.preemptableVerb";
pub const RECLAIMABLE_VERB: &str = "extender.reclaimableVerb";
pub const QUEUE_OVERUSED_VERB: &str = "extender.queueOverusedVerb";
pub const JOB_ENQUEUEABLE_VERB: &str = "extender.jobEnqueueableVerb";
pub const JOB_READY_VERB: &str = "extender.jobReadyVerb";
pub const ALLOCATE_FUNC_VERB: &str = "extender.allocateFuncVerb";
pub const DEALLOCATE_FUNC_VERB: &str = "extender.deallocateFuncVerb";
pub const IGNORABLE: &str = "extender.ignorable";
pub const MANAGED_RESOURCES: &str = "extender.managedResources";

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings of one extender plugin instance. An empty verb disables its hook.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtenderConfig {
    pub url_prefix: String,
    /// Zero disables the client timeout.
    pub http_timeout: Duration,
    pub on_session_open_verb: String,
    pub on_session_close_verb: String,
    pub predicate_verb: String,
    pub prioritize_verb: String,
    pub preemptable_verb: String,
    pub reclaimable_verb: String,
    pub queue_overused_verb: String,
    pub job_enqueueable_verb: String,
    pub job_ready_verb: String,
    pub allocate_func_verb: String,
    pub deallocate_func_verb: String,
    /// Tolerate remote failures instead of failing the decision.
    pub ignorable: bool,
    /// Empty means every task is of interest.
    pub managed_resources: BTreeSet<String>,
}

impl Default for ExtenderConfig {
    fn default() -> Self {
        Self {
            url_prefix: String::new(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            on_session_open_verb: String::new(),
            on_session_close_verb: String::new(),
            predicate_verb: String::new(),
            prioritize_verb: String::new(),
            preemptable_verb: String::new(),
            reclaimable_verb: String::new(),
            queue_overused_verb: String::new(),
            job_enqueueable_verb: String::new(),
            job_ready_verb: String::new(),
            allocate_func_verb: String::new(),
            deallocate_func_verb: String::new(),
            ignorable: false,
            managed_resources: BTreeSet::new(),
        }
    }
}

impl ExtenderConfig {
    /// Never fails: missing or malformed values fall back to their defaults.
    pub fn from_arguments(arguments: &Arguments) -> Self {
        let verb = |key: &str| string_or_default(arguments, key);

        Self {
            url_prefix: verb(URL_PREFIX),
            http_timeout: http_timeout(arguments),
            on_session_open_verb: verb(ON_SESSION_OPEN_VERB),
            on_session_close_verb: verb(ON_SESSION_CLOSE_VERB),
            predicate_verb: verb(PREDICATE_VERB),
            prioritize_verb: verb(PRIORITIZE_VERB),
            preemptable_verb: verb(PREEMPTABLE_VERB),
            reclaimable_verb: verb(RECLAIMABLE_VERB),
            queue_overused_verb: verb(QUEUE_OVERUSED_VERB),
            job_enqueueable_verb: verb(JOB_ENQUEUEABLE_VERB),
            job_ready_verb: verb(JOB_READY_VERB),
            allocate_func_verb: verb(ALLOCATE_FUNC_VERB),
            deallocate_func_verb: verb(DEALLOCATE_FUNC_VERB),
            ignorable: ignorable(arguments),
            managed_resources: managed_resources(arguments),
        }
    }
}

fn string_or_default(arguments: &Arguments, key: &str) -> String {
    match arguments.get_string(key) {
        Some(value) => value,
        None => {
            if arguments.contains_key(key) {
                warn!(key, "extender argument is not a string; ignoring");
            }
            String::new()
        }
    }
}

fn ignorable(arguments: &Arguments) -> bool {
    match arguments.get_bool(IGNORABLE) {
        Some(ignorable) => ignorable,
        None => {
            if arguments.contains_key(IGNORABLE) {
                warn!(key = IGNORABLE, "extender argument is not a boolean; using false");
            }
            false
        }
    }
}

fn http_timeout(arguments: &Arguments) -> Duration {
    let Some(raw) = arguments.get_string(HTTP_TIMEOUT).filter(|raw| !raw.is_empty()) else {
        return DEFAULT_HTTP_TIMEOUT;
    };

    match parse_duration(&raw) {
        Some(timeout) => timeout,
        None => {
            warn!(key = HTTP_TIMEOUT, value = %raw, "invalid duration; using default");
            DEFAULT_HTTP_TIMEOUT
        }
    }
}

fn managed_resources(arguments: &Arguments) -> BTreeSet<String> {
    match arguments.get_string_list(MANAGED_RESOURCES) {
        Some(resources) => resources.into_iter().collect(),
        None => {
            if arguments.contains_key(MANAGED_RESOURCES) {
                warn!(key = MANAGED_RESOURCES, "expected a list of resource names; ignoring");
            }
            BTreeSet::new()
        }
    }
}

/// Parse a duration such as "300ms", "1.5s", "2m30s" or "1h".
///
/// Accepts the units `ns`, `us`, `µs`, `ms`, `s`, `m` and `h`; a bare `0` is
/// zero. Negative durations are rejected.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let mut rest = raw.trim();
    if let Some(positive) = rest.strip_prefix('+') {
        rest = positive;
    }
    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() || rest.starts_with('-') {
        return None;
    }

    let mut total_nanos: f64 = 0.0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return None;
        }
        let value: f64 = number.parse().ok()?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };

        total_nanos += value * scale;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(total_nanos.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_arguments() {
        let config = ExtenderConfig::from_arguments(&Arguments::new());

        assert_eq!(config, ExtenderConfig::default());
        assert_eq!(config.http_timeout, Duration::from_secs(1));
        assert!(!config.ignorable);
        assert!(config.managed_resources.is_empty());
    }

    #[test]
    fn reads_every_documented_key() {
        let arguments = Arguments::new()
            .with(URL_PREFIX, "http://127.0.0.1:8713/")
            .with(HTTP_TIMEOUT, "100ms")
            .with(ON_SESSION_OPEN_VERB, "onSessionOpen")
            .with(ON_SESSION_CLOSE_VERB, "onSessionClose")
            .with(PREDICATE_VERB, "predicate")
            .with(PRIORITIZE_VERB, "prioritize")
            .with(PREEMPTABLE_VERB, "preemptable")
            .with(RECLAIMABLE_VERB, "reclaimable")
            .with(QUEUE_OVERUSED_VERB, "queueOverused")
            .with(JOB_ENQUEUEABLE_VERB, "jobEnqueueable")
            .with(JOB_READY_VERB, "jobReady")
            .with(ALLOCATE_FUNC_VERB, "allocate")
            .with(DEALLOCATE_FUNC_VERB, "deallocate")
            .with(IGNORABLE, true)
            .with(MANAGED_RESOURCES, vec!["nvidia.com/gpu", "nvidia.com/gpumem"]);

        let config = ExtenderConfig::from_arguments(&arguments);

        assert_eq!(config.url_prefix, "http://127.0.0.1:8713/");
        assert_eq!(config.http_timeout, Duration::from_millis(100));
        assert_eq!(config.on_session_open_verb, "onSessionOpen");
        assert_eq!(config.on_session_close_verb, "onSessionClose");
        assert_eq!(config.predicate_verb, "predicate");
        assert_eq!(config.prioritize_verb, "prioritize");
        assert_eq!(config.preemptable_verb, "preemptable");
        assert_eq!(config.reclaimable_verb, "reclaimable");
        assert_eq!(config.queue_overused_verb, "queueOverused");
        assert_eq!(config.job_enqueueable_verb, "jobEnqueueable");
        assert_eq!(config.job_ready_verb, "jobReady");
        assert_eq!(config.allocate_func_verb, "allocate");
        assert_eq!(config.deallocate_func_verb, "deallocate");
        assert!(config.ignorable);
        assert!(config.managed_resources.contains("nvidia.com/gpumem"));
        assert_eq!(config.managed_resources.len(), 2);
    }

    #[test]
    fn malformed_optional_values_fall_back_silently() {
        let arguments = Arguments::new()
            .with(HTTP_TIMEOUT, "soon")
            .with(IGNORABLE, "yes")
            .with(PREDICATE_VERB, 42)
            .with(MANAGED_RESOURCES, 7);

        let config = ExtenderConfig::from_arguments(&arguments);

        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert!(!config.ignorable);
        assert!(config.predicate_verb.is_empty());
        assert!(config.managed_resources.is_empty());
    }

    #[test]
    fn negative_timeout_falls_back_to_default() {
        let arguments = Arguments::new().with(HTTP_TIMEOUT, "-5s");
        let config = ExtenderConfig::from_arguments(&arguments);

        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("3s"), Some(Duration::from_secs(3)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("750us"), Some(Duration::from_micros(750)));
        assert_eq!(parse_duration("10ns"), Some(Duration::from_nanos(10)));
    }

    #[test]
    fn parse_duration_compound_and_fractional() {
        assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("1h0m0.5s"), Some(Duration::from_millis(3_600_500)));
        assert_eq!(parse_duration("0"), Some(Duration::ZERO));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("5"), None);
        assert_eq!(parse_duration("s"), None);
        assert_eq!(parse_duration("5 s"), None);
        assert_eq!(parse_duration("5d"), None);
        assert_eq!(parse_duration("-1s"), None);
    }
}
