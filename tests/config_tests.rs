//! Config file loading end to end.

use std::io::Write;

use fleetlord::config::Config;
use fleetlord::domain::{BackendKind, Status};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_a_full_fleet_config() {
    let file = write_config(
        r#"
        [logging]
        level = "debug"
        format = "json"

        [orchestrator]
        cycle_interval_secs = 5
        settle_interval_secs = 2
        probe_timeout_secs = 1
        concurrency = 8

        [subprocess]
        command = ["python", "manage.py", "runserver"]
        working_dir = "/srv/app"

        [container]
        command = ["python", "manage.py", "runserver"]
        build_context = "/srv/app"
        image_label = "acme_worker"
        container_prefix = "acme_"

        [[fleet]]
        id = "wh-1"
        name = "Warehouse One"
        object_type = "warehouse"
        object_id = "1"
        backend = "subprocess"
        scheme = "http"
        netloc = "127.0.0.1:9100"

        [[fleet]]
        id = "wh-2"
        name = "Warehouse Two"
        object_type = "warehouse"
        object_id = "2"
        backend = "container"
        scheme = "http"
        netloc = "127.0.0.1:9101"
        wanted_status = "down"
        healthcheck_path = "/healthz"
        kill_path = "/die"
    "#,
    );

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.orchestrator.cycle_interval_secs, 5);
    assert_eq!(config.orchestrator.concurrency, 8);
    assert_eq!(config.fleet.len(), 2);

    let two = &config.fleet[1];
    assert_eq!(two.backend, BackendKind::Container);
    assert_eq!(two.wanted_status, Status::Down);
    assert_eq!(two.last_known_status, Status::Down);
    assert_eq!(two.healthcheck_path, "/healthz");
}

#[test]
fn empty_config_gets_full_defaults() {
    let file = write_config("");
    let config = Config::load(file.path()).unwrap();

    assert!(config.fleet.is_empty());
    assert_eq!(config.orchestrator.cycle_interval_secs, 10);
    assert_eq!(config.orchestrator.settle_interval_secs, 1);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.container.image_label, "fleetlord_worker");
}

#[test]
fn missing_file_is_a_read_error() {
    let err = Config::load("/definitely/not/here.toml").unwrap_err();
    assert!(err.to_string().contains("read config file"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[[fleet]\nid=");
    let err = Config::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("parse config"));
}

#[test]
fn container_fleet_without_command_is_rejected() {
    let file = write_config(
        r#"
        [[fleet]]
        id = "wh-1"
        name = "Warehouse One"
        object_type = "warehouse"
        object_id = "1"
        backend = "docker"
        scheme = "http"
        netloc = "127.0.0.1:9100"
    "#,
    );
    let err = Config::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("container.command"));
}
