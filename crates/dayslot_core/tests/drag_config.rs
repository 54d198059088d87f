use dayslot_core::{ConfigError, DragConfig};
use serde_json::json;
use std::error::Error;
use std::io::Write;
use std::time::Duration;

#[test]
fn config_file_fixture_overrides_thresholds() {
    let fixture = json!({
        "long_press_delay": 350,
        "vertical_snap_threshold": 36.0,
        "grid_bands": [
            { "min_distance": 0.0, "minutes": 5 },
            { "min_distance": 150.0, "minutes": 15 }
        ],
        "retry": { "max_attempts": 4, "initial_backoff": 250 }
    });
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{fixture}").unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    let config = DragConfig::from_json_str(&text).unwrap();

    assert_eq!(config.long_press_delay, Duration::from_millis(350));
    assert_eq!(config.vertical_snap_threshold, 36.0);
    assert_eq!(config.grid_minutes_for(149.0), 5);
    assert_eq!(config.grid_minutes_for(151.0), 15);
    assert_eq!(config.retry.max_attempts, 4);
    assert_eq!(config.retry.backoff_after(2), Duration::from_millis(500));
    assert_eq!(config.horizontal_break_threshold, 60.0);
}

#[test]
fn serialized_defaults_parse_back_to_defaults() {
    let text = serde_json::to_string(&DragConfig::default()).unwrap();
    assert_eq!(DragConfig::from_json_str(&text).unwrap(), DragConfig::default());
}

#[test]
fn malformed_json_keeps_parser_error_as_source() {
    let err = DragConfig::from_json_str(r#"{ "long_press_delay": "soon" }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.source().is_some());
}

#[test]
fn ordering_violations_are_rejected() {
    let fixtures = [
        json!({ "horizontal_snap_threshold": 60.0 }),
        json!({ "grid_bands": [ { "min_distance": 10.0, "minutes": 1 } ] }),
        json!({ "grid_bands": [
            { "min_distance": 0.0, "minutes": 1 },
            { "min_distance": 0.0, "minutes": 5 }
        ] }),
        json!({ "grid_bands": [ { "min_distance": 0.0, "minutes": 7 } ] }),
        json!({ "quantize_interval": 0 }),
        json!({ "retry": { "max_attempts": 0 } }),
        json!({ "bottom_zone_fraction": 1.2 }),
    ];
    for fixture in fixtures {
        let err = DragConfig::from_json_str(&fixture.to_string()).unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid(_)),
            "fixture {fixture} should be invalid, got {err}"
        );
    }
}
