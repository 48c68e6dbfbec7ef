#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use busrelay_gateway::config::{self, RelayConfig};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
listen:
  port: 3000
bus:
  nmae: "orders" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn empty_bus_name_rejected() {
    let err = config::load_from_str("bus:\n  name: \"\"\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn malformed_tags_rejected() {
    let err = config::load_from_str("telemetry:\n  tags: [\"nocolon\"]\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
bus:
  name: "orders"
  endpoint: "http://localhost:4566"
telemetry:
  api_key: "abc"
  logs_url: "http://127.0.0.1:9000/v1/input"
"#;
    let file = config::load_from_str(ok).expect("must parse");
    let cfg = RelayConfig::resolve(Some(&file), |_| None).expect("must resolve");
    assert_eq!(cfg.bus.bus_name, "orders");
    assert_eq!(cfg.bus.endpoint.as_deref(), Some("http://localhost:4566"));
    assert_eq!(cfg.telemetry.api_key.as_deref(), Some("abc"));
    assert_eq!(cfg.telemetry.logs_url, "http://127.0.0.1:9000/v1/input");
    assert_eq!(cfg.listen_port, 3000);
}

#[test]
fn empty_file_is_all_defaults() {
    let file = config::load_from_str("{}").expect("must parse");
    let cfg = RelayConfig::resolve(Some(&file), |_| None).unwrap();
    assert_eq!(cfg, RelayConfig::resolve(None, |_| None).unwrap());
}
