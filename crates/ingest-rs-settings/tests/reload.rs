//! Tests for publishing and reloading effective settings.

use ingest_rs_settings::{
    EnvSource, Resolver, ResolverOptions, SettingsError, SettingsHandle, SourceLayer,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn options_for(file: &std::path::Path) -> ResolverOptions {
    ResolverOptions::new()
        .with_env(EnvSource::fixed(Vec::<(String, String)>::new()))
        .with_config_file(file)
}

/// Reload should pick up file edits and swap the snapshot.
#[test]
fn reload_publishes_new_values() {
    let temp = TempDir::new().expect("tmp");
    let file = temp.path().join("newrelic.yml");
    fs::write(&file, "span_events:\n  max_samples_stored: 1000\n").expect("write");

    let handle = SettingsHandle::load(Resolver::new(options_for(&file))).expect("load");
    let before = handle.snapshot();
    assert_eq!(
        handle.get("span_events.max_samples_stored", 0i64).expect("int"),
        1000
    );

    fs::write(&file, "span_events:\n  max_samples_stored: 250\n").expect("write");
    let after = handle.reload().expect("reload");

    assert_eq!(after.get("span_events.max_samples_stored", 0i64).expect("int"), 250);
    assert_eq!(
        before.get("span_events.max_samples_stored", 0i64).expect("int"),
        1000
    );
    assert!(Arc::ptr_eq(&after, &handle.snapshot()));
}

/// A failed reload must leave the previous config in place.
#[test]
fn failed_reload_keeps_previous_snapshot() {
    let temp = TempDir::new().expect("tmp");
    let file = temp.path().join("newrelic.yml");
    fs::write(&file, "application_logging:\n  enabled: false\n").expect("write");

    let handle = SettingsHandle::load(Resolver::new(options_for(&file))).expect("load");
    let before = handle.snapshot();

    fs::write(&file, "application_logging: [broken\n").expect("write");
    let err = handle.reload().unwrap_err();
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(Arc::ptr_eq(&before, &handle.snapshot()));
    assert_eq!(
        handle.get("application_logging.enabled", true).expect("bool"),
        false
    );

    fs::remove_file(&file).expect("remove");
    let err = handle.reload().unwrap_err();
    assert!(matches!(err, SettingsError::FileNotFound(_)));
    assert!(Arc::ptr_eq(&before, &handle.snapshot()));
}

/// Readers on other threads only ever see whole snapshots.
#[test]
fn concurrent_readers_see_consistent_snapshots() {
    let temp = TempDir::new().expect("tmp");
    let file = temp.path().join("newrelic.yml");
    fs::write(
        &file,
        "span_events:\n  max_samples_stored: 1\ntransaction_events:\n  max_samples_stored: 1\n",
    )
    .expect("write");
    let handle = Arc::new(SettingsHandle::load(Resolver::new(options_for(&file))).expect("load"));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = handle.snapshot();
                    let spans: i64 = snapshot
                        .get("span_events.max_samples_stored", 0)
                        .expect("int");
                    let transactions: i64 = snapshot
                        .get("transaction_events.max_samples_stored", 0)
                        .expect("int");
                    assert_eq!(spans, transactions);
                }
            })
        })
        .collect();

    for value in 2..20 {
        fs::write(
            &file,
            format!(
                "span_events:\n  max_samples_stored: {value}\ntransaction_events:\n  max_samples_stored: {value}\n"
            ),
        )
        .expect("write");
        handle.reload().expect("reload");
    }

    for reader in readers {
        reader.join().expect("reader");
    }
    assert_eq!(
        handle
            .snapshot()
            .provenance("span_events.max_samples_stored"),
        Some(SourceLayer::File)
    );
}

/// Layer summaries follow the published snapshot.
#[test]
fn layer_summaries_track_reloads() {
    let temp = TempDir::new().expect("tmp");
    let file = temp.path().join("newrelic.yml");
    fs::write(&file, "app_name: One\n").expect("write");
    let handle = SettingsHandle::load(Resolver::new(options_for(&file))).expect("load");
    let file_entries = |handle: &SettingsHandle| {
        handle
            .layers()
            .iter()
            .find(|layer| layer.source == SourceLayer::File)
            .map(|layer| layer.entries)
    };
    assert_eq!(file_entries(&handle), Some(1));

    fs::write(&file, "app_name: Two\nlabels: a:b\n").expect("write");
    handle.reload().expect("reload");
    assert_eq!(file_entries(&handle), Some(2));
}

/// Overlapping reloads leave the newest file contents published.
#[test]
fn concurrent_reloads_publish_latest_inputs() {
    let temp = TempDir::new().expect("tmp");
    let file = temp.path().join("newrelic.yml");
    fs::write(&file, "span_events:\n  max_samples_stored: 0\n").expect("write");
    let handle = Arc::new(SettingsHandle::load(Resolver::new(options_for(&file))).expect("load"));

    let reloaders: Vec<_> = (0..4)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for _ in 0..50 {
                    handle.reload().expect("reload");
                }
            })
        })
        .collect();

    for value in 1..=50 {
        let temp_file = temp.path().join("newrelic.yml.tmp");
        fs::write(
            &temp_file,
            format!("span_events:\n  max_samples_stored: {value}\n"),
        )
        .expect("write");
        fs::rename(&temp_file, &file).expect("rename");
        handle.reload().expect("reload");
    }

    for reloader in reloaders {
        reloader.join().expect("reloader");
    }
    assert_eq!(
        handle.get("span_events.max_samples_stored", 0i64).expect("int"),
        50
    );
}
