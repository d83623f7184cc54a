#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use ovrbridge_runtime::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
poll:
  tick_interval_ms: 16
  max_messages_per_tik: 4 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.poll.tick_interval_ms, 16);
    assert_eq!(cfg.poll.limit(), None);
    assert_eq!(cfg.logging.filter, "info");
}

#[test]
fn limit_and_filter_are_honoured() {
    let ok = r#"
version: 1
poll:
  tick_interval_ms: 5
  max_messages_per_tick: 8
logging:
  filter: "ovrbridge_runtime=debug,warn"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.poll.limit(), Some(8));
    assert_eq!(cfg.poll.tick_interval().as_millis(), 5);
}

#[test]
fn out_of_range_values_fail_validation() {
    for bad in [
        "version: 2\n",
        "version: 1\npoll:\n  tick_interval_ms: 0\n",
        "version: 1\npoll:\n  tick_interval_ms: 5000\n",
        "version: 1\npoll:\n  max_messages_per_tick: 1000000\n",
        "version: 1\nlogging:\n  filter: \"ovrbridge=notalevel\"\n",
    ] {
        assert!(config::load_from_str(bad).is_err(), "accepted: {bad}");
    }
}

#[test]
fn unreadable_file_is_an_io_error() {
    let err = config::load_from_file("/nonexistent/ovrbridge.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "IO");
}
