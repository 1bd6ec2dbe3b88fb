use chrono::NaiveDate;
use std::fs;
use tvlens_shared_models::MergedRow;
use tvlens_store::{DEFAULT_ARTIFACT, MergedStore, StoreError};

fn row(d: u32, tvl_usd: f64, price: f64) -> MergedRow {
    MergedRow::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap(), tvl_usd, price)
}

fn store_in(dir: &tempfile::TempDir) -> MergedStore {
    MergedStore::new(dir.path().join(DEFAULT_ARTIFACT))
}

#[test]
fn saved_rows_load_back_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let rows = vec![row(2, 110.0, 10.5), row(3, 105.25, 10.0), row(4, 1.5e10, 312.875)];

    store.save(&rows).unwrap();

    assert_eq!(store.load().unwrap(), rows);
}

#[test]
fn file_starts_with_the_fixed_header() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.save(&[row(2, 110.0, 10.5)]).unwrap();

    let text = fs::read_to_string(store.path()).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("date,tvl_usd,price"));
    assert!(lines.next().unwrap().starts_with("2024-01-02,110"));
}

#[test]
fn empty_dataset_keeps_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.save(&[]).unwrap();

    assert_eq!(fs::read_to_string(store.path()).unwrap().trim(), "date,tvl_usd,price");
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn save_replaces_previous_contents_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.save(&[row(2, 1.0, 1.0), row(3, 2.0, 2.0)]).unwrap();
    store.save(&[row(5, 3.0, 3.0)]).unwrap();

    assert_eq!(store.load().unwrap(), vec![row(5, 3.0, 3.0)]);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(store_in(&dir).load(), Err(StoreError::NotFound { .. })));
}

#[test]
fn foreign_header_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), "day,tvl,close\n2024-01-02,1,2\n").unwrap();

    match store.load() {
        Err(StoreError::Parse(err)) => assert!(err.detail.contains("day,tvl,close")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn non_utf8_header_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), b"da\xfft\xfe,tvl_usd,price\n2024-01-02,110,10.5\n").unwrap();

    match store.load() {
        Err(StoreError::Parse(err)) => assert!(err.expected.contains("UTF-8")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn malformed_row_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), "date,tvl_usd,price\n2024-01-02,110,10.5\n2024-01-03,lots,10\n").unwrap();

    match store.load() {
        Err(StoreError::Parse(err)) => assert!(err.detail.starts_with("line 3")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn out_of_order_dates_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(
        store.path(),
        "date,tvl_usd,price\n2024-01-03,110,10.5\n2024-01-02,105,10\n",
    )
    .unwrap();

    assert!(matches!(store.load(), Err(StoreError::Parse(_))));
}

#[test]
fn duplicate_dates_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(
        store.path(),
        "date,tvl_usd,price\n2024-01-02,110,10.5\n2024-01-02,105,10\n",
    )
    .unwrap();

    assert!(matches!(store.load(), Err(StoreError::Parse(_))));
}
