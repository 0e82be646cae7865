use chrono::{DateTime, TimeZone, Utc};
use tessera_core::{
    AddMode, AddOptions, CollectionConfig, Frame, Frequency, MaxWindow, TimeSeriesCollection,
    UpdateMode,
};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn windowed(window: &str) -> TimeSeriesCollection {
    TimeSeriesCollection::with_config(CollectionConfig {
        max_window: Some(window.parse().unwrap()),
        ..CollectionConfig::default()
    })
}

fn daily_opts(symbol: &str) -> AddOptions {
    AddOptions::new()
        .symbol(symbol)
        .frequency(Frequency::Daily)
        .mode(AddMode::Upsert)
}

fn stored_days(tsc: &TimeSeriesCollection, symbol: &str, name: &str) -> Vec<DateTime<Utc>> {
    tsc.to_state()
        .series
        .into_iter()
        .find(|s| s.symbol == symbol && s.name == name)
        .map(|s| s.points.into_iter().map(|(ts, _)| ts).collect())
        .unwrap_or_default()
}

#[test]
fn bar_window_keeps_the_most_recent_bars_across_appends() {
    let mut tsc = windowed("3");
    for d in 1..=5 {
        tsc.add(
            &Frame::single("close", &[(day(d), f64::from(d))]),
            &daily_opts("AAPL"),
        )
        .unwrap();
    }
    assert_eq!(stored_days(&tsc, "AAPL", "close"), vec![day(3), day(4), day(5)]);
}

#[test]
fn bar_window_applies_on_initial_insert_too() {
    let mut tsc = windowed("2");
    let points: Vec<_> = (1..=5).map(|d| (day(d), f64::from(d))).collect();
    tsc.add(&Frame::single("close", &points), &daily_opts("AAPL"))
        .unwrap();
    assert_eq!(stored_days(&tsc, "AAPL", "close"), vec![day(4), day(5)]);
}

#[test]
fn day_window_measures_from_each_series_own_newest() {
    assert_eq!("7d".parse::<MaxWindow>().unwrap(), MaxWindow::Days(7));

    let mut tsc = windowed("7d");
    let points: Vec<_> = [1, 2, 3, 10].map(|d| (day(d), 0.0)).to_vec();
    tsc.add(&Frame::single("close", &points), &daily_opts("AAPL"))
        .unwrap();
    // Cutoff is day 10 minus 7 days, inclusive: day 3 survives.
    assert_eq!(stored_days(&tsc, "AAPL", "close"), vec![day(3), day(10)]);
}

#[test]
fn direct_update_respects_the_window() {
    let mut tsc = windowed("3");
    tsc.add(
        &Frame::single("close", &[(day(1), 1.0), (day(2), 2.0), (day(3), 3.0)]),
        &daily_opts("AAPL"),
    )
    .unwrap();
    tsc.update(&[(day(4), 4.0)], "AAPL", "close", UpdateMode::Append)
        .unwrap();
    assert_eq!(stored_days(&tsc, "AAPL", "close"), vec![day(2), day(3), day(4)]);
}

#[test]
fn replace_mode_discards_the_prior_body() {
    let mut tsc = TimeSeriesCollection::new();
    tsc.add(
        &Frame::single("close", &[(day(1), 1.0), (day(2), 2.0)]),
        &daily_opts("AAPL"),
    )
    .unwrap();
    tsc.update(&[(day(5), 5.0)], "AAPL", "close", UpdateMode::Replace)
        .unwrap();
    assert_eq!(stored_days(&tsc, "AAPL", "close"), vec![day(5)]);
}

#[test]
fn update_overlays_values_at_matching_timestamps() {
    let mut tsc = TimeSeriesCollection::new();
    tsc.add(
        &Frame::single("close", &[(day(1), 1.0), (day(2), 2.0)]),
        &daily_opts("AAPL"),
    )
    .unwrap();
    tsc.update(&[(day(2), 20.0), (day(3), 3.0)], "AAPL", "close", UpdateMode::Update)
        .unwrap();
    let state = tsc.to_state();
    assert_eq!(
        state.series[0].points,
        vec![(day(1), 1.0), (day(2), 20.0), (day(3), 3.0)]
    );
}

fn seeded_three_series() -> TimeSeriesCollection {
    let mut tsc = TimeSeriesCollection::new();
    for (symbol, name) in [("AAPL", "close"), ("AAPL", "volume"), ("MSFT", "close")] {
        tsc.add(
            &Frame::single(name, &[(day(1), 1.0), (day(2), 2.0)]),
            &daily_opts(symbol),
        )
        .unwrap();
    }
    tsc
}

#[test]
fn remove_exact_series() {
    let mut tsc = seeded_three_series();
    assert_eq!(tsc.remove(Some("AAPL"), Some("close")), 1);
    assert_eq!(tsc.len(), 2);
    assert!(tsc.get_metadata("AAPL", "volume").is_ok());
    assert!(tsc.get_metadata("MSFT", "close").is_ok());
}

#[test]
fn remove_whole_symbol() {
    let mut tsc = seeded_three_series();
    assert_eq!(tsc.remove(Some("AAPL"), None), 2);
    let keys: Vec<String> = tsc.keys().map(ToString::to_string).collect();
    assert_eq!(keys, vec!["(MSFT, close)"]);
}

#[test]
fn remove_name_across_symbols() {
    let mut tsc = seeded_three_series();
    assert_eq!(tsc.remove(None, Some("close")), 2);
    let keys: Vec<String> = tsc.keys().map(ToString::to_string).collect();
    assert_eq!(keys, vec!["(AAPL, volume)"]);
}

#[test]
fn remove_everything() {
    let mut tsc = seeded_three_series();
    assert_eq!(tsc.remove(None, None), 3);
    assert!(tsc.is_empty());
    assert!(tsc.get(None, None).is_empty());
}

#[test]
fn remove_is_idempotent_on_missing_targets() {
    let mut tsc = seeded_three_series();
    assert_eq!(tsc.remove(Some("GOOG"), None), 0);
    assert_eq!(tsc.remove(Some("AAPL"), Some("open")), 0);
    assert_eq!(tsc.len(), 3);
}
