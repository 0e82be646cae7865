use chrono::{DateTime, TimeZone, Utc};
use tessera_core::{
    AddOptions, Alignment, CollectionConfig, ColumnOrder, Frame, FrameColumns, Frequency,
    TimeSeriesCollection,
};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn seeded(alignment: Alignment) -> TimeSeriesCollection {
    let mut tsc = TimeSeriesCollection::with_config(CollectionConfig {
        alignment,
        ..CollectionConfig::default()
    });
    // Daily close on days 1..=4; sparse volume on days 2 and 4 only.
    let close = Frame::single("close", &[(day(1), 1.0), (day(2), 2.0), (day(3), 3.0), (day(4), 4.0)]);
    let volume = Frame::single("volume", &[(day(2), 20.0), (day(4), 40.0)]);
    tsc.add(
        &close,
        &AddOptions::new().symbol("AAPL").frequency(Frequency::Daily),
    )
    .unwrap();
    tsc.add(
        &volume,
        &AddOptions::new().symbol("AAPL").frequency(Frequency::Daily),
    )
    .unwrap();
    tsc
}

#[test]
fn timeline_is_the_union_of_all_series() {
    let tsc = seeded(Alignment::None);
    let combined = tsc.get(None, None);
    assert_eq!(
        combined.time_index().unwrap(),
        &[day(1), day(2), day(3), day(4)]
    );
    assert_eq!(combined.n_cols(), 2);
}

#[test]
fn ffill_carries_forward_but_never_backward() {
    let tsc = seeded(Alignment::Ffill);
    let combined = tsc.get(None, None);
    // No observation exists before volume's first point, so day 1 stays
    // missing; day 3 carries day 2's value forward.
    assert_eq!(
        combined.multi_column("AAPL", "volume").unwrap(),
        &[None, Some(20.0), Some(20.0), Some(40.0)]
    );
    assert_eq!(
        combined.multi_column("AAPL", "close").unwrap(),
        &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
    );
}

#[test]
fn none_alignment_leaves_gaps_missing() {
    let tsc = seeded(Alignment::None);
    let combined = tsc.get(None, None);
    assert_eq!(
        combined.multi_column("AAPL", "volume").unwrap(),
        &[None, Some(20.0), None, Some(40.0)]
    );
}

#[test]
fn bounds_are_inclusive_on_both_ends() {
    let tsc = seeded(Alignment::None);
    let combined = tsc.get(Some(day(2)), Some(day(3)));
    assert_eq!(combined.time_index().unwrap(), &[day(2), day(3)]);
    assert_eq!(
        combined.multi_column("AAPL", "close").unwrap(),
        &[Some(2.0), Some(3.0)]
    );
}

#[test]
fn ffill_does_not_resurrect_values_outside_the_bounds() {
    let tsc = seeded(Alignment::Ffill);
    // Day 3 is inside the window but volume's only in-range point is day 4:
    // the out-of-range day-2 observation must not leak in via the fill.
    let combined = tsc.get(Some(day(3)), Some(day(4)));
    assert_eq!(
        combined.multi_column("AAPL", "volume").unwrap(),
        &[None, Some(40.0)]
    );
}

#[test]
fn series_with_no_points_in_range_is_dropped() {
    let tsc = seeded(Alignment::None);
    let combined = tsc.get(Some(day(1)), Some(day(1)));
    assert_eq!(combined.n_cols(), 1);
    assert!(combined.multi_column("AAPL", "close").is_some());
    assert!(combined.multi_column("AAPL", "volume").is_none());
}

#[test]
fn empty_collection_and_empty_range_yield_the_empty_frame() {
    let tsc = TimeSeriesCollection::new();
    assert!(tsc.get(None, None).is_empty());

    let tsc = seeded(Alignment::None);
    assert!(tsc.get(Some(day(20)), Some(day(30))).is_empty());
}

#[test]
fn inverted_bounds_yield_the_empty_frame() {
    let tsc = seeded(Alignment::None);
    assert!(tsc.get(Some(day(5)), Some(day(1))).is_empty());
    // Equal bounds are a valid one-instant window, not an inversion.
    assert_eq!(tsc.get(Some(day(2)), Some(day(2))).n_rows(), 1);
}

#[test]
fn column_order_controls_label_levels() {
    let mut tsc = TimeSeriesCollection::with_config(CollectionConfig {
        column_order: ColumnOrder::SeriesFirst,
        ..CollectionConfig::default()
    });
    tsc.add(
        &Frame::single("close", &[(day(1), 1.0)]),
        &AddOptions::new().symbol("AAPL").frequency(Frequency::Daily),
    )
    .unwrap();
    tsc.add(
        &Frame::single("close", &[(day(1), 2.0)]),
        &AddOptions::new().symbol("MSFT").frequency(Frequency::Daily),
    )
    .unwrap();

    let combined = tsc.get(None, None);
    match combined.columns() {
        FrameColumns::Multi { level_names, labels } => {
            assert_eq!(level_names, &("series".to_owned(), "symbol".to_owned()));
            assert_eq!(
                labels,
                &[
                    ("close".to_owned(), "AAPL".to_owned()),
                    ("close".to_owned(), "MSFT".to_owned()),
                ]
            );
        }
        FrameColumns::Flat(_) => panic!("expected two-level columns"),
    }
}

#[test]
fn columns_are_sorted_lexicographically() {
    let mut tsc = TimeSeriesCollection::new();
    for symbol in ["MSFT", "AAPL"] {
        tsc.add(
            &Frame::single("close", &[(day(1), 1.0)]),
            &AddOptions::new().symbol(symbol).frequency(Frequency::Daily),
        )
        .unwrap();
    }
    let combined = tsc.get(None, None);
    let labels = combined.multi_labels().unwrap();
    assert_eq!(labels[0].0, "AAPL");
    assert_eq!(labels[1].0, "MSFT");
}

#[test]
fn forecast_timestamps_extend_the_shared_timeline() {
    let mut tsc = TimeSeriesCollection::new();
    tsc.add(
        &Frame::single("close", &[(day(1), 1.0), (day(2), 2.0)]),
        &AddOptions::new().symbol("AAPL").frequency(Frequency::Daily),
    )
    .unwrap();
    tsc.add(
        &Frame::single("close_forecast", &[(day(3), 3.0), (day(4), 4.0)]),
        &AddOptions::new()
            .symbol("AAPL")
            .frequency(Frequency::Daily)
            .metadata("forecast_origin", "2024-01-02T00:00:00Z"),
    )
    .unwrap();

    let combined = tsc.get(None, None);
    assert_eq!(
        combined.time_index().unwrap(),
        &[day(1), day(2), day(3), day(4)]
    );
    // Historical close forward-fills across the forecast horizon.
    assert_eq!(
        combined.multi_column("AAPL", "close").unwrap(),
        &[Some(1.0), Some(2.0), Some(2.0), Some(2.0)]
    );
}
