#![allow(clippy::unreadable_literal)]
use std::io::Write;

use ssrtrack_bias::{
    attribute_bias_intervals, load_catalog, BadCodeword, Classification, ConcernDeriver,
    ConcernPolicy, EntryKind, EntryStatus, Interval, Timeline, TrackerConfig,
};
use ssrtrack_core::{Address, AddressSpace, MissionTime, PointerCorrelator, ReferenceSample};

fn t(text: &str) -> MissionTime {
    MissionTime::from_yday(text).unwrap()
}

fn correlator_at(ref_time: &str, ref_addr: u64) -> PointerCorrelator {
    let space = AddressSpace::chandra_defaults();
    let reference = ReferenceSample::new(t(ref_time), ref_addr, &space).unwrap();
    PointerCorrelator::new(space, reference).unwrap()
}

#[test]
fn test_short_interval_windows() {
    let policy = ConcernPolicy::chandra_defaults();
    let corr = correlator_at("2024:001:00:00:00", 1000);
    let deriver = ConcernDeriver::new(&corr, &policy);

    let interval = Interval::new(
        t("2024:001:00:00:00"),
        t("2024:001:00:10:00"),
        "TE_00A12",
        &policy,
    );
    assert_eq!(interval.classification, Classification::Short);

    let windows = deriver.derive_concern_windows(&interval);
    assert_eq!(windows.len(), 2);

    assert_eq!(windows[0].start, t("2024:001:00:01:00"));
    assert_eq!(windows[0].stop, t("2024:001:00:02:00"));
    assert_eq!(windows[0].address_start, Address(121_000));
    assert_eq!(windows[0].address_stop, Address(241_000));

    assert_eq!(windows[1].start, t("2024:001:00:05:00"));
    assert_eq!(windows[1].stop, t("2024:001:00:12:00"));
    assert_eq!(windows[1].address_start, Address(601_000));
    assert_eq!(windows[1].address_stop, Address(1_441_000));
}

#[test]
fn test_twenty_four_minutes_is_short() {
    let policy = ConcernPolicy::chandra_defaults();
    let exact = Interval::new(
        t("2024:001:00:00:00"),
        t("2024:001:00:24:00"),
        "TE_B",
        &policy,
    );
    assert_eq!(exact.classification, Classification::Short);

    let over = Interval::new(
        t("2024:001:00:00:00"),
        t("2024:001:00:24:01"),
        "TE_B",
        &policy,
    );
    assert_eq!(over.classification, Classification::Long);
}

#[test]
fn test_windows_across_address_wrap() {
    let policy = ConcernPolicy::chandra_defaults();
    let space = AddressSpace::chandra_defaults();
    // Reference 30 s before the end of the buffer
    let corr = correlator_at("2024:001:00:00:00", space.modulus() - 60_000);
    let deriver = ConcernDeriver::new(&corr, &policy);

    let interval = Interval::new(
        t("2024:001:00:00:00"),
        t("2024:001:00:05:00"),
        "CC_000E2",
        &policy,
    );
    let range = deriver.bias_range(interval);
    assert_eq!(range.address_start, Address(space.modulus() - 60_000));
    assert_eq!(range.address_stop, Address(540_000));
    assert_eq!(range.windows.len(), 1);
    assert_eq!(range.windows[0].address_start, Address(60_000));
}

#[test]
fn test_catalog_to_timeline() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"start": "2024:001:00:00:00", "stop": "2024:001:00:10:00",
              "kind": "ACIS BIAS Packet"}},
            {{"start": "2024:001:00:20:00", "stop": "2024:001:04:00:00", "kind": "Observation",
              "label": "TE_00A12"}},
            {{"start": "2024:002:06:00:00", "stop": "2024:002:06:10:00",
              "kind": "ACIS BIAS Packet"}},
            {{"start": "2024:002:06:20:00", "stop": "2024:002:08:00:00", "kind": "Observation",
              "label": "CC_000E2"}}
        ]"#
    )
    .unwrap();

    let config = TrackerConfig::default();
    let events = load_catalog(file.path()).unwrap();
    let intervals = attribute_bias_intervals(&events, &config.policy).unwrap();
    assert_eq!(intervals.len(), 2);

    // Record pointer at 02:00 has advanced 14,400,000 words from address 0 at 00:00
    let corr = correlator_at("2024:001:02:00:00", 14_400_000);
    let deriver = ConcernDeriver::new(&corr, &config.policy);
    let ranges = deriver.plan(intervals, &t("2024:001:00:00:00"));
    assert_eq!(ranges.len(), 1, "day-2 bias is past the stale horizon");

    let bcw = BadCodeword {
        address: Address(180_000),
        observed_at: t("2024:001:02:00:00"),
    };
    let timeline = Timeline::build(&ranges, Address(300_000), &[bcw], &corr);
    assert_eq!(timeline.len(), 8);

    let rows: Vec<(String, EntryStatus)> = timeline
        .iter()
        .map(|row| (row.kind.to_string(), row.status))
        .collect();
    assert_eq!(rows[0], ("AC Bias Start - TE_SHORT".to_string(), EntryStatus::PlayedBack));
    assert_eq!(rows[1], ("CON# 1 - Start".to_string(), EntryStatus::PlayedBack));
    assert_eq!(rows[2], ("BCW".to_string(), EntryStatus::BadCodeword));
    assert_eq!(rows[3], ("CON# 1 - Stop".to_string(), EntryStatus::PlayedBack));
    assert_eq!(rows[4], ("PB POINTER".to_string(), EntryStatus::PlaybackPointer));
    assert_eq!(rows[5], ("CON# 2 - Start".to_string(), EntryStatus::Pending));
    assert_eq!(rows[6], ("AC Bias Stop - TE_SHORT".to_string(), EntryStatus::Pending));
    assert_eq!(rows[7], ("CON# 2 - Stop".to_string(), EntryStatus::Pending));

    let pb = &timeline.entries()[4];
    assert_eq!(pb.kind, EntryKind::PlaybackPointer);
    assert_eq!(pb.time, t("2024:001:00:02:30"));
}

#[test]
fn test_config_policy_changes_classification() {
    let config = TrackerConfig::from_json(r#"{"policy": {"long_threshold_secs": 300.0}}"#).unwrap();
    let interval = Interval::new(
        t("2024:001:00:00:00"),
        t("2024:001:00:10:00"),
        "TE_00A12",
        &config.policy,
    );
    assert_eq!(interval.classification, Classification::Long);
}
