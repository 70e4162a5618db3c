// tests/session_scenarios.rs
//! End-to-end behaviour of a signal session: buffering, filtering, extraction

use emg_signal::processing::features::{RowSum, TimeDomainExtractor};
use emg_signal::processing::filters::{ChannelSelect, Decimate, MovingAverage, Passthrough};
use emg_signal::{EmgError, Metadata, SignalSession, SignalTable};

fn rows(n: usize, channels: usize) -> Vec<Vec<f32>> {
    (0..n)
        .map(|i| (0..channels).map(|c| (i * channels + c) as f32).collect())
        .collect()
}

#[test]
fn test_band_recording_scenario() {
    let mut session = SignalSession::new(4);
    session.add_data_row(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    session.add_data_row(vec![5.0, 6.0, 7.0, 8.0]).unwrap();

    let table = session.signal().unwrap();
    assert_eq!(table.rows(), 2);
    assert_eq!(table.channels(), 4);
    assert_eq!(table.to_rows(), vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]]);
    let before = table.clone();

    session.schedule_filter(Passthrough);
    session.apply_filters().unwrap();
    assert_eq!(session.signal().unwrap(), &before);
    assert_eq!(session.applied_filters().len(), 1);

    let sums = session.schedule_feature_extraction(RowSum);
    session.extract_features().unwrap();
    assert_eq!(
        session.feature(sums).unwrap().column("sum").unwrap().to_vec(),
        vec![10.0, 26.0]
    );
}

#[test]
fn test_rows_keep_arrival_order() {
    let mut session = SignalSession::new(3);
    let input = rows(500, 3);
    for row in &input {
        session.add_data_row(row.clone()).unwrap();
    }
    assert_eq!(session.signal().unwrap().to_rows(), input);
}

#[test]
fn test_no_loss_across_reads() {
    let mut session = SignalSession::new(2);
    let input = rows(30, 2);

    for row in &input[..18] {
        session.add_data_row(row.clone()).unwrap();
    }
    assert_eq!(session.signal().unwrap().rows(), 18);

    for row in &input[18..] {
        session.add_data_row(row.clone()).unwrap();
    }
    assert_eq!(session.signal().unwrap().to_rows(), input);
}

#[test]
fn test_repeated_read_is_identical() {
    let mut session = SignalSession::new(2);
    for row in rows(10, 2) {
        session.add_data_row(row).unwrap();
    }
    let first = session.signal().unwrap().clone();
    let second = session.signal().unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_staleness_predicate() {
    let mut session = SignalSession::new(2);
    assert!(!session.is_outdated());

    session.add_data_row(vec![1.0, 2.0]).unwrap();
    assert!(session.is_outdated());

    session.signal().unwrap();
    assert!(!session.is_outdated());

    let before = session.signal().unwrap().clone();
    assert!(!session.is_outdated());
    assert_eq!(session.signal().unwrap(), &before);
}

#[test]
fn test_filters_compose_in_order() {
    let mut session = SignalSession::new(2);
    for row in rows(8, 2) {
        session.add_data_row(row).unwrap();
    }
    session.signal().unwrap();

    // The average runs over all 8 rows before every second row is dropped
    session.schedule_filter(MovingAverage::new(3).unwrap());
    session.schedule_filter(Decimate::new(2).unwrap());
    assert_eq!(session.apply_filters().unwrap(), 2);

    let expected = [[2.0 / 3.0, 4.0 / 3.0], [4.0, 5.0], [8.0, 9.0], [12.0, 13.0]];
    let filtered = session.signal().unwrap().to_rows();
    assert_eq!(filtered.len(), expected.len());
    for (row, want) in filtered.iter().zip(expected) {
        for (got, want) in row.iter().zip(want) {
            assert!((got - want).abs() < 1e-4, "{:?}", filtered);
        }
    }
    assert!(session.pending_filters().is_empty());
    assert_eq!(session.applied_filters(), vec!["moving-average-3", "decimate-2"]);
}

#[test]
fn test_extractors_follow_filtered_table() {
    let mut session = SignalSession::new(2);
    session.add_data_row(vec![1.0, 2.0]).unwrap();
    session.add_data_row(vec![3.0, 4.0]).unwrap();
    session.signal().unwrap();

    let sums = session.schedule_feature_extraction(RowSum);
    let td = session.schedule_feature_extraction(TimeDomainExtractor::default());
    session.extract_features().unwrap();
    assert_eq!(session.feature(sums).unwrap().to_rows(), vec![vec![3.0], vec![7.0]]);
    assert_eq!(session.feature(td).unwrap().rows(), 2);

    session.schedule_filter(ChannelSelect::new(vec![1]).unwrap());
    session.apply_filters().unwrap();
    session.extract_features().unwrap();

    assert_eq!(session.feature(sums).unwrap().to_rows(), vec![vec![2.0], vec![4.0]]);
    assert_eq!(session.feature(td).unwrap().rows(), 1);
}

#[test]
fn test_apply_without_filters_leaves_table() {
    let mut session = SignalSession::new(2);
    session.add_data_row(vec![1.0, 2.0]).unwrap();
    let before = session.signal().unwrap().clone();

    assert!(matches!(session.apply_filters(), Err(EmgError::NoFiltersScheduled)));
    assert_eq!(session.signal().unwrap(), &before);
}

#[test]
fn test_processing_requires_a_read() {
    let mut session = SignalSession::new(2);
    session.add_data_row(vec![1.0, 2.0]).unwrap();
    session.schedule_filter(Passthrough);
    session.schedule_feature_extraction(RowSum);

    assert!(matches!(session.apply_filters(), Err(EmgError::StaleReadRequired { .. })));
    assert!(matches!(session.extract_features(), Err(EmgError::StaleReadRequired { .. })));
    assert_eq!(session.pending_filters(), vec!["passthrough"]);
}

#[test]
fn test_rows_after_reshape_are_kept_aside() {
    let mut session = SignalSession::new(2);
    session.add_data_row(vec![1.0, 2.0]).unwrap();
    session.signal().unwrap();
    session.schedule_filter(ChannelSelect::new(vec![0]).unwrap());
    session.apply_filters().unwrap();

    session.add_data_row(vec![3.0, 4.0]).unwrap();
    assert!(matches!(session.signal(), Err(EmgError::RowShape { expected: 1, actual: 2 })));
    assert!(session.is_outdated());
    assert_eq!(session.take_unmerged(), vec![vec![3.0, 4.0]]);
    assert_eq!(session.signal().unwrap().to_rows(), vec![vec![1.0]]);
}

#[test]
fn test_flattened_signal_is_row_major() {
    let mut session = SignalSession::new(2);
    session.add_data_row(vec![1.0, 2.0]).unwrap();
    session.add_data_row(vec![3.0, 4.0]).unwrap();
    assert_eq!(session.flattened_signal().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_reconstructed_session_keeps_metadata() {
    let table = SignalTable::from_rows(2, rows(4, 2)).unwrap();
    let metadata = Metadata::for_band(2, 500).with_extra("note", "rest");
    let session = SignalSession::from_existing(table.clone(), metadata.clone());

    assert_eq!(session.metadata(), &metadata);
    let (out_table, out_metadata) = session.into_parts().unwrap();
    assert_eq!(out_table, table);
    assert_eq!(out_metadata, metadata);
}
