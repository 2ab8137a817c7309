//! Integration tests for loading dataset snapshots from JSON-lines files

use std::fs;
use std::path::{Path, PathBuf};
use yelp_recsys_core::{ConfigLoader, DataConfig, DatasetStats, InteractionStore, RecsysError};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("recsys-core-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_sample(dir: &Path) {
    fs::write(
        dir.join("users.json"),
        concat!(
            r#"{"user_id":"u1","name":"Bill","review_count":3,"average_stars":4.3,"fans":1,"useful":2,"funny":0,"cool":1}"#,
            "\n",
            r#"{"user_id":"u2","name":"Ann","review_count":1,"average_stars":2.0,"fans":0,"useful":0,"funny":0,"cool":0}"#,
            "\n"
        ),
    )
    .unwrap();
    fs::write(
        dir.join("businesses.json"),
        concat!(
            r#"{"business_id":"b1","name":"Tony's","categories":"Restaurants, Pizza"}"#,
            "\n\n",
            r#"{"business_id":"b2","name":"Zen Spa","categories":null}"#,
            "\n"
        ),
    )
    .unwrap();
    fs::write(
        dir.join("reviews.json"),
        concat!(
            r#"{"review_id":"r1","user_id":"u1","business_id":"b1","stars":5.0,"text":"great"}"#,
            "\n",
            r#"{"review_id":"r2","user_id":"u2","business_id":"b2","stars":2.0}"#,
            "\n"
        ),
    )
    .unwrap();
}

#[test]
fn test_load_sample_dataset() {
    let dir = scratch_dir("load");
    write_sample(&dir);

    let config = DataConfig::default().with_data_dir(&dir);
    assert!(config.validate().is_ok());

    let store = InteractionStore::load(&config).unwrap();
    assert_eq!(store.users().len(), 2);
    assert_eq!(store.businesses().len(), 2);
    assert_eq!(store.reviews().len(), 2);
    assert_eq!(
        store.business_categories("b1").unwrap(),
        &["Restaurants".to_string(), "Pizza".to_string()]
    );
    assert!(store.business_categories("b2").unwrap().is_empty());

    let stats = DatasetStats::compute(&store, 5).unwrap();
    assert_eq!(stats.distinct_categories, 2);
    assert_eq!(stats.review_stars.total(), 2);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_malformed_line_reports_line_number() {
    let dir = scratch_dir("malformed");
    write_sample(&dir);
    fs::write(
        dir.join("reviews.json"),
        concat!(
            r#"{"user_id":"u1","business_id":"b1","stars":5.0}"#,
            "\n",
            r#"{"user_id":"u1","business_id":"b1"}"#,
            "\n"
        ),
    )
    .unwrap();

    let config = DataConfig::default().with_data_dir(&dir);
    let err = InteractionStore::load(&config).unwrap_err();
    match err {
        RecsysError::Data(message) => assert!(message.contains("reviews.json:2")),
        other => panic!("expected data error, got {other}"),
    }

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = scratch_dir("missing");
    let config = DataConfig::default().with_data_dir(dir.join("does-not-exist"));
    let err = InteractionStore::load(&config).unwrap_err();
    assert!(matches!(err, RecsysError::Io(_)));
    fs::remove_dir_all(&dir).ok();
}
