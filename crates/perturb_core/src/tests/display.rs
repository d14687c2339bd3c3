//! Xvfb sessions driven by stand-in server scripts

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::{DisplayConfig, RunConfig};
use crate::display::{DisplayProvider, XvfbDisplay};
use crate::error::RunError;
use crate::model::{ModelOutput, NodeMatrix, Parameters};
use crate::runner::RunModel;
use crate::traits::FnModel;

/// Serializes tests that start sessions, since a session sets `DISPLAY`
static SESSION_LOCK: Mutex<()> = Mutex::new(());

fn server_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("Xvfb");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn display_config(server: &str) -> DisplayConfig {
    DisplayConfig {
        server: server.to_string(),
        startup_ms: 100,
        ..DisplayConfig::default()
    }
}

/// A server that exits during startup, e.g. because the display number is
/// taken, fails the acquisition
#[test]
fn test_server_exiting_at_startup_is_config_error() {
    let _lock = SESSION_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let script = server_script(dir.path(), "echo 'display :99 already active' >&2\nexit 1");
    let before = std::env::var_os("DISPLAY");

    let display = XvfbDisplay::new(display_config(":99")).with_executable(script);
    let err = display.acquire().err().unwrap();

    match err {
        RunError::Config(message) => assert!(message.contains("exited during startup")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::env::var_os("DISPLAY"), before);
}

/// A failed session start aborts the run before any evaluation
#[test]
fn test_run_fails_when_server_does_not_start() {
    let _lock = SESSION_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let script = server_script(dir.path(), "exit 1");

    let calls = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&calls);
    let model = FnModel::new("model", move |_| {
        *counter.lock().unwrap() += 1;
        Ok(ModelOutput::untimed(1.0))
    })
    .suppress_graphics(true);

    let result = RunModel::new(model, Parameters::from_pairs([("a", 1.0)]).unwrap())
        .with_config(RunConfig::default().with_workers(2))
        .with_display(Arc::new(
            XvfbDisplay::new(display_config(":98")).with_executable(script),
        ))
        .run(&NodeMatrix::from_samples(vec![1.0, 2.0]), "a");

    assert!(matches!(result, Err(RunError::Config(_))));
    assert_eq!(*calls.lock().unwrap(), 0);
}

/// Models see the session's display name in `DISPLAY`, and the previous
/// value comes back once the run ends
#[test]
fn test_models_see_session_display() {
    let _lock = SESSION_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let script = server_script(dir.path(), "exec sleep 30");
    let before = std::env::var_os("DISPLAY");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let model = FnModel::new("model", move |_| {
        recorder.lock().unwrap().push(std::env::var("DISPLAY").ok());
        Ok(ModelOutput::untimed(1.0))
    })
    .suppress_graphics(true);

    let config = RunConfig {
        workers: Some(2),
        display: display_config(":77"),
    };
    let display = XvfbDisplay::new(config.display.clone()).with_executable(script);
    RunModel::new(model, Parameters::from_pairs([("a", 1.0)]).unwrap())
        .with_config(config)
        .with_display(Arc::new(display))
        .run(&NodeMatrix::from_samples(vec![1.0, 2.0, 3.0]), "a")
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|d| d.as_deref() == Some(":77")));
    assert_eq!(std::env::var_os("DISPLAY"), before);
}
