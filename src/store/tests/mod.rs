use super::*;
use tempfile::TempDir;

const HEADER: &str = "ID,Spotify_URL,処理フラグ,メモ";

fn store_at(temp_dir: &TempDir, contents: Option<&str>) -> RecordStore {
    let path = temp_dir.path().join("input.csv");
    if let Some(contents) = contents {
        std::fs::write(&path, contents).unwrap();
    }
    RecordStore::new(DatasetConfig {
        path,
        ..Default::default()
    })
}

#[tokio::test]
async fn missing_file_means_nothing_to_do() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_at(&temp_dir, None);

    let (dataset, pending) = store.load_pending().await.unwrap();
    assert!(dataset.is_empty());
    assert!(pending.is_empty());
}

#[tokio::test]
async fn selects_only_trimmed_exact_new() {
    let temp_dir = TempDir::new().unwrap();
    let csv = format!(
        "{HEADER}\n\
         1,https://open.spotify.com/track/a1,NEW,\n\
         2,https://open.spotify.com/track/b2,DONE,\n\
         3,https://open.spotify.com/track/c3, NEW ,padded\n\
         4,https://open.spotify.com/track/d4,new,lowercase\n\
         5,https://open.spotify.com/track/e5,,\n"
    );
    let store = store_at(&temp_dir, Some(&csv));

    let (dataset, pending) = store.load_pending().await.unwrap();

    assert_eq!(dataset.len(), 5);
    let ids: Vec<_> = pending.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(pending[0].track_url, "https://open.spotify.com/track/a1");
    assert_eq!(pending[1].status, RecordStatus::New);
    assert_eq!(dataset.field(&pending[1], "メモ"), Some("padded"));
}

#[tokio::test]
async fn header_only_file_has_no_records() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_at(&temp_dir, Some(&format!("{HEADER}\n")));

    let (dataset, pending) = store.load_pending().await.unwrap();
    assert_eq!(dataset.headers().len(), 4);
    assert!(dataset.is_empty());
    assert!(pending.is_empty());
}

#[tokio::test]
async fn empty_file_is_empty_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_at(&temp_dir, Some(""));

    let (dataset, pending) = store.load_pending().await.unwrap();
    assert!(dataset.headers().is_empty());
    assert!(pending.is_empty());
}

#[tokio::test]
async fn missing_column_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_at(&temp_dir, Some("ID,URL,Status\n1,https://x/track/a,NEW\n"));

    let err = store.load_pending().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Dataset(DatasetError::MissingColumn { ref column, .. }) if column == "Spotify_URL"
    ));
}

#[tokio::test]
async fn long_row_is_fatal_and_short_row_is_padded() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_at(
        &temp_dir,
        Some(&format!("{HEADER}\n1,https://x/track/a,NEW\n2,u,NEW,m,extra\n")),
    );

    let err = store.load_pending().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Dataset(DatasetError::RowTooLong {
            expected: 4,
            found: 5,
            ..
        })
    ));

    let store = store_at(&temp_dir, Some(&format!("{HEADER}\n1,https://x/track/a,NEW\n")));
    let (dataset, pending) = store.load_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(dataset.records()[0].fields.len(), 4);
    assert_eq!(dataset.field(&dataset.records()[0], "メモ"), Some(""));
}

#[tokio::test]
async fn commit_marks_only_processed_ids() {
    let temp_dir = TempDir::new().unwrap();
    let csv = format!(
        "{HEADER}\n\
         1,https://open.spotify.com/track/a1,NEW,first\n\
         2,https://open.spotify.com/track/b2,NEW,\"quoted, with comma\"\n\
         3,https://open.spotify.com/track/c3,HOLD,third\n"
    );
    let store = store_at(&temp_dir, Some(&csv));
    let (mut dataset, _pending) = store.load_pending().await.unwrap();

    let processed: ProcessedSet = ["1"].into_iter().collect();
    let updated = store.commit(&mut dataset, &processed).await.unwrap();
    assert_eq!(updated, 1);

    let rewritten = std::fs::read_to_string(store.path()).unwrap();
    let lines: Vec<_> = rewritten.lines().collect();
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines[1], "1,https://open.spotify.com/track/a1,DONE,first");
    assert_eq!(
        lines[2],
        "2,https://open.spotify.com/track/b2,NEW,\"quoted, with comma\""
    );
    assert_eq!(lines[3], "3,https://open.spotify.com/track/c3,HOLD,third");
    assert!(!store.path().with_file_name("input.csv.tmp").exists());
}

#[tokio::test]
async fn commit_round_trips_unprocessed_rows() {
    let temp_dir = TempDir::new().unwrap();
    let csv = format!(
        "{HEADER}\n\
         a,https://x/track/one, NEW ,メモ欄\n\
         b,https://x/track/two,DONE,\n"
    );
    let store = store_at(&temp_dir, Some(&csv));
    let (mut dataset, _) = store.load_pending().await.unwrap();
    let before = dataset.records().to_vec();

    store
        .commit(&mut dataset, &ProcessedSet::new())
        .await
        .unwrap();

    let (reloaded, pending) = store.load_pending().await.unwrap();
    assert_eq!(reloaded.records(), before.as_slice());
    assert_eq!(pending.len(), 1);
    assert_eq!(reloaded.records()[0].fields[2], " NEW ");
}

#[tokio::test]
async fn commit_marks_every_row_sharing_an_id() {
    let temp_dir = TempDir::new().unwrap();
    let csv = format!("{HEADER}\n7,https://x/track/a,NEW,\n7,https://x/track/b,NEW,\n");
    let store = store_at(&temp_dir, Some(&csv));
    let (mut dataset, _) = store.load_pending().await.unwrap();

    let processed: ProcessedSet = ["7"].into_iter().collect();
    assert_eq!(store.commit(&mut dataset, &processed).await.unwrap(), 2);

    let (_, pending) = store.load_pending().await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn commit_on_empty_dataset_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_at(&temp_dir, None);
    let (mut dataset, _) = store.load_pending().await.unwrap();

    let processed: ProcessedSet = ["1"].into_iter().collect();
    assert_eq!(store.commit(&mut dataset, &processed).await.unwrap(), 0);
    assert!(!store.path().exists());
}

#[test]
fn temp_path_is_a_sibling() {
    assert_eq!(
        temp_path_for(Path::new("scripts/input.csv")),
        PathBuf::from("scripts/input.csv.tmp")
    );
}
