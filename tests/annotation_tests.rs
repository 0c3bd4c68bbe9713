//! Restart marker and sidecar detection properties
//!
//! Checked over a spread of annotation maps and init container layouts rather
//! than single hand-picked cases.

mod common;

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};
use common::{owner, pod};
use meshroll::restart::{
    RESTARTED_AT_ANNOTATION, format_restart_time, has_sidecar_marker, with_restart_marker,
};

fn annotation_maps() -> Vec<Option<BTreeMap<String, String>>> {
    let mut maps = vec![None, Some(BTreeMap::new())];
    for size in [1, 5, 40] {
        let map = (0..size)
            .map(|i| (format!("example.com/key-{}", i), format!("value-{}", i)))
            .collect();
        maps.push(Some(map));
    }
    maps.push(Some(BTreeMap::from([
        (
            RESTARTED_AT_ANNOTATION.to_string(),
            "2020-02-02T02:02:02Z".to_string(),
        ),
        ("kubectl.kubernetes.io/default-container".to_string(), "app".to_string()),
    ])));
    maps
}

#[test]
fn test_restart_marker_preserves_other_annotations() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    for original in annotation_maps() {
        let before = original.clone().unwrap_or_default();
        let after = with_restart_marker(original, now);

        assert_eq!(after[RESTARTED_AT_ANNOTATION], "2024-05-01T12:00:00Z");
        for (key, value) in before.iter().filter(|(k, _)| *k != RESTARTED_AT_ANNOTATION) {
            assert_eq!(after.get(key), Some(value), "lost {}", key);
        }
        let expected_len = before.len() + usize::from(!before.contains_key(RESTARTED_AT_ANNOTATION));
        assert_eq!(after.len(), expected_len);
    }
}

#[test]
fn test_restart_marker_is_idempotent_for_fixed_time() {
    let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();

    for original in annotation_maps() {
        let once = with_restart_marker(original, now);
        let twice = with_restart_marker(Some(once.clone()), now);
        assert_eq!(once, twice);
    }
}

#[test]
fn test_later_restart_sorts_after_earlier() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let stamps: Vec<String> = (0..5)
        .map(|i| format_restart_time(start + Duration::seconds(i * 37)))
        .collect();

    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    assert!(stamps.iter().all(|s| s.ends_with('Z') && s.len() == 20));
}

#[test]
fn test_sidecar_marker_cases() {
    let owner_ref = Some(owner("ReplicaSet", "web-1"));
    let cases: &[(&[&str], bool)] = &[
        (&["istio-init"], true),
        (&["istio-validation"], true),
        (&["sleep"], false),
        (&[], false),
        (&["migrate", "istio-init"], true),
        (&["istio"], false),
        (&["Istio-Init"], false),
    ];

    for (init_containers, expected) in cases {
        let pod = pod("ns1", "p", init_containers, owner_ref.clone());
        assert_eq!(
            has_sidecar_marker(&pod),
            *expected,
            "init containers {:?}",
            init_containers
        );
    }
}
