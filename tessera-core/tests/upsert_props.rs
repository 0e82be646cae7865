use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use tessera_core::{AddMode, AddOptions, Frame, Frequency, TimeSeriesCollection};

fn arb_ts() -> impl Strategy<Value = DateTime<Utc>> {
    // Whole days keep the batches on one inferable cadence grid.
    (0i64..3_000).prop_map(|d| DateTime::from_timestamp(d * 86_400, 0).unwrap())
}

fn arb_batch() -> impl Strategy<Value = Vec<(DateTime<Utc>, f64)>> {
    proptest::collection::btree_map(arb_ts(), -1_000.0f64..1_000.0, 1..40)
        .prop_map(|m| m.into_iter().collect())
}

fn frame_of(points: &[(DateTime<Utc>, f64)]) -> Frame {
    Frame::single("close", points)
}

fn opts() -> AddOptions {
    AddOptions::new()
        .symbol("AAPL")
        .frequency(Frequency::Daily)
        .mode(AddMode::Upsert)
}

fn stored_points(tsc: &TimeSeriesCollection) -> Vec<(DateTime<Utc>, f64)> {
    let state = tsc.to_state();
    assert_eq!(state.series.len(), 1);
    state.series.into_iter().next().unwrap().points
}

proptest! {
    #[test]
    fn upsert_is_union_with_last_write_wins(batches in proptest::collection::vec(arb_batch(), 1..5)) {
        let mut tsc = TimeSeriesCollection::new();
        let mut expected: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();
        for batch in &batches {
            tsc.add(&frame_of(batch), &opts()).unwrap();
            for &(ts, v) in batch {
                expected.insert(ts, v);
            }
        }
        let stored = stored_points(&tsc);
        prop_assert_eq!(stored, expected.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn upsert_is_idempotent(batch in arb_batch()) {
        let mut once = TimeSeriesCollection::new();
        once.add(&frame_of(&batch), &opts()).unwrap();

        let mut twice = TimeSeriesCollection::new();
        twice.add(&frame_of(&batch), &opts()).unwrap();
        twice.add(&frame_of(&batch), &opts()).unwrap();

        prop_assert_eq!(stored_points(&once), stored_points(&twice));
    }

    #[test]
    fn stored_points_are_strictly_ascending(batches in proptest::collection::vec(arb_batch(), 1..4)) {
        let mut tsc = TimeSeriesCollection::new();
        for batch in &batches {
            tsc.add(&frame_of(batch), &opts()).unwrap();
        }
        let stored = stored_points(&tsc);
        for pair in stored.windows(2) {
            prop_assert!(pair[0].0 < pair[1].0);
        }
    }

    #[test]
    fn last_update_tracks_latest_payload(first in arb_batch(), second in arb_batch()) {
        let mut tsc = TimeSeriesCollection::new();
        tsc.add(&frame_of(&first), &opts()).unwrap();
        tsc.add(&frame_of(&second), &opts()).unwrap();

        // Freshness reflects the most recent call's payload, even when that
        // payload is a backfill older than what is already stored.
        let expected = second.iter().map(|(ts, _)| *ts).max().unwrap();
        let meta = tsc.get_metadata("AAPL", "close").unwrap();
        prop_assert_eq!(meta.last_update, expected);
    }
}
