use std::fs;
use std::path::Path;
use std::sync::Arc;

use qst_core::remote::{MockRemote, RemoteRecord};
use qst_core::storage::{
    FileStore, MemoryStore, CORRUPT_QUOTES_KEY, QUOTES_KEY, SELECTED_FILTER_KEY,
};
use qst_core::{Config, Filter, Origin, QuoteApp, QuoteCollection, QuoteError, SyncSettings};
use tempfile::TempDir;

fn config_for(dir: &Path) -> Config {
    let mut config = Config::default();
    config.paths.data_dir = Some(dir.join("data"));
    config
}

fn open(dir: &TempDir) -> QuoteApp {
    QuoteApp::open(&config_for(dir.path())).expect("open app")
}

#[test]
fn first_run_persists_seed_set() {
    let dir = tempfile::tempdir().unwrap();
    let app = open(&dir);
    assert_eq!(app.visible_quotes().unwrap().len(), 4);

    let raw = fs::read_to_string(dir.path().join("data").join(QUOTES_KEY)).unwrap();
    assert!(raw.contains("Stay hungry, stay foolish."));
}

#[test]
fn quotes_and_filter_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let app = open(&dir);
        app.add_quote("Persisted", "Mine").unwrap();
        app.set_filter(&Filter::Category("Mine".into())).unwrap();
        app.draw_random("Mine").unwrap();
    }

    let app = open(&dir);
    assert_eq!(app.current_filter().unwrap(), Filter::Category("Mine".into()));
    let visible = app.visible_quotes().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, 1000);
    assert_eq!(visible[0].origin, Origin::LocalUnsynced);
    // the session slot does not outlive the process
    assert!(app.last_quote().unwrap().is_none());

    let filter = fs::read_to_string(dir.path().join("data").join(SELECTED_FILTER_KEY)).unwrap();
    assert_eq!(filter, "Mine");
}

#[test]
fn corrupt_payload_is_kept_aside_and_seeds_restored() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join(QUOTES_KEY), "[{\"id\": 1, \"text\": ").unwrap();

    let app = open(&dir);
    assert_eq!(app.visible_quotes().unwrap().len(), 4);
    assert_eq!(
        fs::read_to_string(data.join(CORRUPT_QUOTES_KEY)).unwrap(),
        "[{\"id\": 1, \"text\": "
    );
    let restored = fs::read_to_string(data.join(QUOTES_KEY)).unwrap();
    assert!(restored.starts_with('['));
}

#[tokio::test]
async fn failed_import_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let app = open(&dir);
    let before = fs::read_to_string(dir.path().join("data").join(QUOTES_KEY)).unwrap();

    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{"quotes": []}"#).unwrap();
    let err = app.import_file(&bad).await.unwrap_err();
    assert!(matches!(err, QuoteError::Format(_)));

    let after = fs::read_to_string(dir.path().join("data").join(QUOTES_KEY)).unwrap();
    assert_eq!(before, after);
}

fn app_with_remote(dir: &TempDir, remote: Arc<MockRemote>) -> QuoteApp {
    let durable = Arc::new(FileStore::open(dir.path().join("data")).unwrap());
    QuoteApp::new(durable, Arc::new(MemoryStore::new()), remote, SyncSettings::default())
        .expect("open app")
}

#[tokio::test]
async fn cli_and_daemon_share_one_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MockRemote::new());
    remote.set_records(vec![RemoteRecord {
        id: 3000,
        title: "srv".into(),
    }]);
    let daemon = app_with_remote(&dir, remote.clone());
    let cli = app_with_remote(&dir, Arc::new(MockRemote::new()));

    cli.add_quote("user quote", "Mine").unwrap();
    let report = daemon.sync_now().await;
    assert!(report.is_success());
    assert_eq!(report.pushed, 1);
    assert_eq!(report.merged, 1);
    assert_eq!(remote.created()[0].title, "user quote");

    let store = Arc::new(FileStore::open(dir.path().join("data")).unwrap());
    let stored = QuoteCollection::load(store).unwrap();
    assert_eq!(stored.find(1000).unwrap().origin, Origin::LocalSynced);
    assert_eq!(stored.find(3000).unwrap().text, "srv");

    // the cli sees the push and continues the id sequence
    let next = cli.add_quote("second", "Mine").unwrap();
    assert_eq!(next.id, 3001);
    let pending: Vec<u64> = cli.pending().iter().map(|q| q.id).collect();
    assert_eq!(pending, vec![3001]);
}
