//! End-to-end tests for the viewing-history pipeline
//!
//! These run a realistic export through loading, normalization, aggregation
//! and session reconstruction.

use chrono::Weekday;
use tempfile::TempDir;
use viewing_data::aggregator::{GroupKey, ViewingAggregator};
use viewing_data::analysis::analyze_export;
use viewing_data::core::config::PipelineConfig;
use viewing_data::core::error::ViewingError;
use viewing_data::core::time_utils::hours_of;
use viewing_data::reader::EXPORT_FILE_NAME;
use viewing_data::sessions::SessionReconstructor;

const HEADER: &str = "Profile Name,Start Time,Duration,Attributes,Title,Supplemental Video Type,Device Type,Bookmark,Latest Bookmark,Country";

/// A few weeks of viewing across four profiles, with trailers and short previews.
fn export_rows() -> Vec<&'static str> {
    vec![
        // Dana binges on a Friday evening (UTC+3 local).
        "Dana,2023-07-14 17:00:00,00:48:00,,\"Dark: Season 1: Secrets (Episode 1)\",,Samsung 2015 Tizen TV,00:48:00,00:48:00,IL (Israel)",
        "Dana,2023-07-14 17:53:00,00:51:00,Autoplayed: user action: None;,\"Dark: Season 1: Lies (Episode 2)\",,Samsung 2015 Tizen TV,00:51:00,00:51:00,IL (Israel)",
        "Dana,2023-07-14 18:50:00,00:02:10,,Trailer: Stranger Things,TRAILER,Samsung 2015 Tizen TV,00:02:10,00:02:10,IL (Israel)",
        "Dana,2023-07-14 18:55:00,00:44:00,,\"Dark: Season 1: Past and Present (Episode 3)\",,Samsung 2015 Tizen TV,00:44:00,00:44:00,IL (Israel)",
        // A film on Sunday morning from a laptop abroad.
        "Dana,2023-07-16 06:00:00,02:15:00,,Roma,,Chrome PC (Cadmium),02:15:00,02:15:00,FR (France)",
        // Kids watch short episodes on a tablet.
        "Kids,2023-07-15 05:00:00,00:07:00,,\"Bluey: Season 1: Magic Xylophone\",,Apple iPad Air 2,00:07:00,00:07:00,IL (Israel)",
        "Kids,2023-07-15 05:09:00,00:07:00,,\"Bluey: Season 1: Hospital\",,Apple iPad Air 2,00:07:00,00:07:00,IL (Israel)",
        "Kids,2023-07-15 05:16:30,00:00:20,,\"Bluey: Season 1: Keepy Uppy\",,Apple iPad Air 2,00:00:20,00:00:20,IL (Israel)",
        "Kids,2023-08-02 06:00:00,00:25:00,,\"Bluey: Season 2: Dance Mode\",,Apple iPad Air 2,00:25:00,00:25:00,IL (Israel)",
        // A Hebrew title watched on a phone.
        "Noa,2023-08-03 19:00:00,00:40:00,,\"פרק 3\u{200e}\u{200f}עונה 1\u{200e}\u{200f}שטיסל\",,Apple iPhone 12,00:40:00,00:40:00,IL (Israel)",
        // A guest profile that only ever watched a preview.
        "Guest,2023-08-04 19:00:00,00:00:30,,Roma,,Apple iPhone 12,00:00:30,00:00:30,IL (Israel)",
    ]
}

fn setup_export() -> TempDir {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("netflix-report").join("CONTENT_INTERACTION");
    std::fs::create_dir_all(&nested).unwrap();

    let mut content = String::from(HEADER);
    for row in export_rows() {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    std::fs::write(nested.join(EXPORT_FILE_NAME), content).unwrap();
    dir
}

#[test]
fn test_full_pipeline_counts() {
    let dir = setup_export();
    let result = analyze_export(dir.path(), &PipelineConfig::default()).unwrap();

    assert_eq!(result.metadata.rows_read, 11);
    assert_eq!(result.metadata.supplemental_dropped, 1);
    assert_eq!(result.metadata.short_dropped, 2);
    assert_eq!(result.records.len(), 8);
    assert_eq!(result.profiles, vec!["Dana", "Guest", "Kids", "Noa"]);
}

#[test]
fn test_title_view_conserves_hours() {
    let dir = setup_export();
    let config = PipelineConfig::default();
    let result = analyze_export(dir.path(), &config).unwrap();

    let rows = ViewingAggregator::aggregate(&result.records, GroupKey::TitleName, None, &config);
    let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["Bluey", "Dark", "Roma", "שטיסל"]);

    let total = hours_of(ViewingAggregator::total_duration(&result.records));
    assert!((ViewingAggregator::total_hours(&rows) - total).abs() < 1e-9);
    assert!(rows.iter().all(|r| !r.key.starts_with("Trailer")));
}

#[test]
fn test_profile_filtered_views() {
    let dir = setup_export();
    let config = PipelineConfig::default();
    let result = analyze_export(dir.path(), &config).unwrap();

    ViewingAggregator::validate_profile(&result.profiles, "Kids").unwrap();
    let rows =
        ViewingAggregator::aggregate(&result.records, GroupKey::DeviceCategory, Some("Kids"), &config);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key, "Tablet");

    // Known profile with nothing left after filtering is not an error.
    ViewingAggregator::validate_profile(&result.profiles, "Guest").unwrap();
    assert!(
        ViewingAggregator::aggregate(&result.records, GroupKey::TitleName, Some("Guest"), &config)
            .is_empty()
    );

    let err = ViewingAggregator::validate_profile(&result.profiles, "Nobody").unwrap_err();
    assert!(matches!(err, ViewingError::UnknownProfile { .. }));
    assert_eq!(
        err.to_string(),
        "Invalid profile name \"Nobody\". Please choose from: Dana, Guest, Kids, Noa"
    );
}

#[test]
fn test_weekday_and_country_views() {
    let dir = setup_export();
    let config = PipelineConfig::default();
    let result = analyze_export(dir.path(), &config).unwrap();

    let weekdays = ViewingAggregator::aggregate(&result.records, GroupKey::Weekday, None, &config);
    let keys: Vec<&str> = weekdays.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["Sunday", "Wednesday", "Thursday", "Friday", "Saturday"]);

    let monday_first = PipelineConfig {
        week_start: Weekday::Mon,
        ..config.clone()
    };
    let weekdays =
        ViewingAggregator::aggregate(&result.records, GroupKey::Weekday, None, &monday_first);
    assert_eq!(weekdays.last().unwrap().key, "Sunday");

    let countries = ViewingAggregator::aggregate(&result.records, GroupKey::Country, None, &config);
    let top = ViewingAggregator::top_n(countries, 1).unwrap();
    assert_eq!(top[0].key, "FR (France)");
    assert!((top[0].hours - 2.25).abs() < 1e-9);
}

#[test]
fn test_sessions_and_monthly_counts() {
    let dir = setup_export();
    let config = PipelineConfig::default();
    let result = analyze_export(dir.path(), &config).unwrap();

    let reconstructor = SessionReconstructor::from_config(&config);
    let dana = reconstructor.sessions(&result.records, Some("Dana"));
    // Three Dark episodes with a 5-minute and an 11-minute break, then Roma.
    assert_eq!(dana.len(), 3);
    assert_eq!(dana[0].len(), 2);

    let kids = reconstructor.sessions(&result.records, Some("Kids"));
    assert_eq!(kids.len(), 2);
    assert_eq!(kids[0].len(), 2);

    let all = reconstructor.sessions(&result.records, None);
    let covered: usize = all.iter().map(|s| s.len()).sum();
    assert_eq!(covered, result.records.len());

    let views = ViewingAggregator::monthly_view_count(&result.records, None);
    assert_eq!(views.len(), 2);
    assert_eq!((views[0].month.as_str(), views[0].count), ("2023-07", 6));
    assert_eq!((views[1].month.as_str(), views[1].count), ("2023-08", 2));

    let matrix = ViewingAggregator::monthly_matrix(&views);
    assert_eq!(matrix.len(), 1);
    assert_eq!(matrix[0].counts[6], Some(6));
    assert_eq!(matrix[0].counts[7], Some(2));
}

#[test]
fn test_records_serialize_to_json() {
    let dir = setup_export();
    let result = analyze_export(dir.path(), &PipelineConfig::default()).unwrap();

    let value = serde_json::to_value(&result.records[0]).unwrap();
    assert_eq!(value["profile_name"], "Dana");
    assert_eq!(value["title_name"], "Dark");
    assert_eq!(value["weekday"], "Friday");
    assert_eq!(value["hour"], 20);
    assert_eq!(value["duration_minutes"], 48.0);
    // Same spelling as the duration-category aggregate keys.
    assert_eq!(value["duration_category"], "31–60 mins");
    assert_eq!(value["device_category"], "tv");
}
