//! Restart-trigger annotation handling

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use k8s_openapi::api::core::v1::PodTemplateSpec;

/// Pod-template annotation watched by the rollout controller, same key `kubectl rollout restart` writes
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

/// Render a timestamp the way it is stored in the restart annotation
///
/// RFC 3339 in UTC with second precision, e.g. `2024-05-01T12:00:00Z`.
pub fn format_restart_time(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Return `annotations` with the restart annotation set to `now`
///
/// Every other entry is carried over untouched. A missing map is treated as empty.
pub fn with_restart_marker(
    annotations: Option<BTreeMap<String, String>>,
    now: DateTime<Utc>,
) -> BTreeMap<String, String> {
    let mut annotations = annotations.unwrap_or_default();
    annotations.insert(RESTARTED_AT_ANNOTATION.to_string(), format_restart_time(now));
    annotations
}

/// Time to write when replacing `previous`
///
/// The stored value only has second precision. When `previous` is not older
/// than `now` at that precision, writing `now` would leave the template
/// unchanged and no rollout would start, so the result is one second past
/// `previous` instead. Unparsable values are ignored.
pub fn next_restart_time(previous: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(0);
    match previous.and_then(|p| DateTime::parse_from_rfc3339(p).ok()) {
        Some(previous) => {
            let previous = previous.with_timezone(&Utc).trunc_subsecs(0);
            if previous >= now {
                previous + Duration::seconds(1)
            } else {
                now
            }
        }
        None => now,
    }
}

/// Set the restart annotation on a pod template, returning the value written
///
/// The value is always strictly later than the one it replaces.
pub fn mark_for_restart(template: &mut PodTemplateSpec, now: DateTime<Utc>) -> String {
    let metadata = template.metadata.get_or_insert_with(Default::default);
    let restart_time = next_restart_time(
        metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(RESTARTED_AT_ANNOTATION))
            .map(String::as_str),
        now,
    );
    metadata.annotations = Some(with_restart_marker(
        metadata.annotations.take(),
        restart_time,
    ));
    format_restart_time(restart_time)
}
