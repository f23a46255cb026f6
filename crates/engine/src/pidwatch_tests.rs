// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use tempfile::tempdir;

fn now() -> Instant {
    Instant::now()
}

#[test]
fn initial_observation_of_an_existing_file_is_not_a_created_event() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mover.pid");
    fs::write(&path, "123\n").unwrap();

    let mut watcher = PidFileWatcher::new(&path);
    assert_eq!(watcher.poll(now()), None, "baseline observation must not emit created");
}

#[test]
fn created_event_fires_once_file_appears() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mover.pid");

    let mut watcher = PidFileWatcher::new(&path);
    assert_eq!(watcher.poll(now()), None);

    fs::write(&path, "123").unwrap();
    let event = watcher.poll(now()).unwrap();
    assert_eq!(event.kind, PidFileEventKind::Created);
    assert_eq!(event.pid, Some(123));
}

#[test]
fn deleted_event_fires_once_file_disappears() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mover.pid");
    fs::write(&path, "123").unwrap();

    let mut watcher = PidFileWatcher::new(&path);
    watcher.poll(now());

    fs::remove_file(&path).unwrap();
    let event = watcher.poll(now()).unwrap();
    assert_eq!(event.kind, PidFileEventKind::Deleted);
    assert_eq!(event.pid, None);
}

#[test]
fn modified_event_fires_when_pid_changes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mover.pid");
    fs::write(&path, "123").unwrap();

    let mut watcher = PidFileWatcher::new(&path);
    watcher.poll(now());

    fs::write(&path, "456").unwrap();
    let event = watcher.poll(now()).unwrap();
    assert_eq!(event.kind, PidFileEventKind::Modified);
    assert_eq!(event.pid, Some(456));
}

#[test]
fn rewriting_the_same_pid_is_not_a_modified_event() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mover.pid");
    fs::write(&path, "123").unwrap();

    let mut watcher = PidFileWatcher::new(&path);
    watcher.poll(now());

    fs::write(&path, "123").unwrap();
    assert_eq!(watcher.poll(now()), None);
}

#[test]
fn multi_line_content_parses_as_no_pid_but_file_still_exists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mover.pid");
    fs::write(&path, "123\n456").unwrap();

    let mut watcher = PidFileWatcher::new(&path);
    watcher.poll(now()); // baseline observation

    fs::remove_file(&path).unwrap();
    let deleted = watcher.poll(now()).unwrap();
    assert_eq!(deleted.kind, PidFileEventKind::Deleted, "malformed content still counted as existing");
}

#[test]
fn non_positive_or_non_numeric_content_parses_as_no_pid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mover.pid");

    let mut watcher = PidFileWatcher::new(&path);
    watcher.poll(now());

    fs::write(&path, "0").unwrap();
    let event = watcher.poll(now()).unwrap();
    assert_eq!(event.kind, PidFileEventKind::Created);
    assert_eq!(event.pid, None);

    fs::write(&path, "abc").unwrap();
    assert_eq!(watcher.poll(now()), None, "pid stays none, so no modified event");
}

#[test]
fn missing_file_never_emits_an_event_on_repeated_polls() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("never-there.pid");

    let mut watcher = PidFileWatcher::new(&path);
    assert_eq!(watcher.poll(now()), None);
    assert_eq!(watcher.poll(now()), None);
}

#[tokio::test(start_paused = true)]
async fn watch_stops_within_one_interval_of_cancellation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mover.pid");
    let watcher = PidFileWatcher::new(&path);
    let (tx, _rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();

    let cancel2 = cancel.clone();
    let handle =
        tokio::spawn(watcher.watch(moverd_core::SystemClock, Duration::from_secs(60), tx, cancel2));

    cancel.cancel();
    tokio::time::timeout(Duration::from_millis(50), handle).await.unwrap().unwrap();
}
