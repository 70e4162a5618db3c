// tests/storage_tests.rs
//! Persisting sessions and reconstructing them from a dataset store

use emg_signal::metadata::SubjectMetadata;
use emg_signal::processing::features::RowSum;
use emg_signal::{DatasetStore, EmgError, FileDatasetStore, Metadata, MetadataValue, SignalSession};
use tempfile::TempDir;

fn band_metadata() -> Metadata {
    let mut metadata = Metadata::for_band(3, 500).with_subject(SubjectMetadata {
        age: Some(27),
        gender: Some("m".to_string()),
        height: Some(181.0),
        weight: Some(77.0),
    });
    metadata.band.channel_mask = Some(0x07);
    metadata.band.resolution = Some(8);
    metadata
}

fn recorded_session() -> SignalSession {
    let session = SignalSession::with_metadata(band_metadata()).unwrap();
    for i in 0..50 {
        let t = i as f32;
        session.add_data_row(vec![t, t * 0.5, -t]).unwrap();
    }
    session
}

#[test]
fn test_persist_and_reload_session() {
    let dir = TempDir::new().unwrap();
    let store = FileDatasetStore::open(dir.path()).unwrap();

    let mut session = recorded_session();
    let id = session.persist(&store).unwrap();
    assert_eq!(id, "1");

    let mut reloaded = SignalSession::from_dataset(&store, &id).unwrap();
    assert_eq!(reloaded.metadata(), &band_metadata());
    assert_eq!(reloaded.signal().unwrap(), session.signal().unwrap());
    assert!(!reloaded.is_outdated());

    // A reconstructed session can be processed without an explicit read
    let sums = reloaded.schedule_feature_extraction(RowSum);
    reloaded.extract_features().unwrap();
    assert_eq!(reloaded.feature(sums).unwrap().rows(), 50);
}

#[test]
fn test_dataset_ids_increase() {
    let dir = TempDir::new().unwrap();
    let store = FileDatasetStore::open(dir.path()).unwrap();

    let (table, metadata) = recorded_session().into_parts().unwrap();
    let first = store.store(&table, &metadata).unwrap();
    let second = store.store(&table, &metadata).unwrap();

    assert_eq!((first.as_str(), second.as_str()), ("1", "2"));
    assert_eq!(store.list_datasets().unwrap(), vec!["1", "2"]);
}

#[test]
fn test_metadata_keeps_both_namespaces() {
    let dir = TempDir::new().unwrap();
    let store = FileDatasetStore::open(dir.path()).unwrap();
    let id = recorded_session().persist(&store).unwrap();

    let sidecar = std::fs::read_to_string(dir.path().join(&id).join("metadata.toml")).unwrap();
    assert!(sidecar.contains("[band]"));
    assert!(sidecar.contains("[subject]"));

    let map = store.load_metadata(&id).unwrap().to_map();
    match &map["subject"] {
        MetadataValue::Map(subject) => {
            assert_eq!(subject["gender"], MetadataValue::String("m".to_string()));
        }
        other => panic!("subject is not a map: {:?}", other),
    }
}

#[test]
fn test_missing_dataset_is_recoverable() {
    let dir = TempDir::new().unwrap();
    let store = FileDatasetStore::open(dir.path()).unwrap();

    let err = SignalSession::from_dataset(&store, "42").unwrap_err();
    assert!(matches!(err, EmgError::DatasetNotFound { ref id } if id == "42"));
    assert!(err.is_recoverable());
}

#[test]
fn test_missing_metadata_is_reported() {
    let dir = TempDir::new().unwrap();
    let store = FileDatasetStore::open(dir.path()).unwrap();
    let id = recorded_session().persist(&store).unwrap();
    std::fs::remove_file(dir.path().join(&id).join("metadata.toml")).unwrap();

    let err = SignalSession::from_dataset(&store, &id).unwrap_err();
    assert!(matches!(err, EmgError::MetadataNotFound { .. }));
    assert!(err.is_recoverable());
}

#[test]
fn test_full_range_channel_mask_persists() {
    let dir = TempDir::new().unwrap();
    let store = FileDatasetStore::open(dir.path()).unwrap();

    let mut metadata = band_metadata();
    metadata.band.channel_mask = Some(u64::MAX);
    let mut session = SignalSession::with_metadata(metadata.clone()).unwrap();
    session.add_data_row(vec![1.0, 2.0, 3.0]).unwrap();

    let id = session.persist(&store).unwrap();
    assert_eq!(store.list_datasets().unwrap(), vec![id.clone()]);
    assert_eq!(store.load_metadata(&id).unwrap(), metadata);
    assert_eq!(store.load_data(&id).unwrap().rows(), 1);
}
