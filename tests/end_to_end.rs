use car_scout::identity::assign_id;
use car_scout::sources::{JsonBatchSource, ListingSource, RawListing};
use car_scout::store::{DatasetStore, JsonFileStore};
use car_scout::{run_capture, AppConfig};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::{Path, PathBuf};

const VEHICLE: &str = "Mazda MX-5";

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 20, 9, 0, 0).unwrap()
}

fn write_batch(dir: &Path, name: &str, texts: &[&str]) -> PathBuf {
    let raws: Vec<RawListing> = texts.iter().map(|t| RawListing::new(VEHICLE, t)).collect();
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(&raws).unwrap()).unwrap();
    path
}

fn batch_source(path: PathBuf) -> Vec<Box<dyn ListingSource>> {
    vec![Box::new(JsonBatchSource::new(path))]
}

const BATCH_A: [&str; 5] = [
    "2015 Mazda MX-5 Roadster\nAuckland\n$19,500\nListed 3 hours ago",
    "2016 Mazda MX-5 GT\nHamilton\n$22,000",
    "2014 Mazda MX-5 Limited\nWellington\n$17,000",
    "2017 Mazda MX-5 RF\nNelson\n$27,500",
    "2013 Mazda MX-5 project\nDunedin\n$500 reserve",
];

#[tokio::test]
async fn test_two_capture_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default();
    let store = JsonFileStore::new(dir.path().join("dataset.json"));

    let first = run_capture(
        &config,
        &batch_source(write_batch(dir.path(), "a.json", &BATCH_A)),
        &store,
        t0(),
    )
    .await
    .unwrap();

    assert_eq!(first.records.len(), 5);
    assert_eq!(first.records.iter().filter(|l| l.price.is_some()).count(), 4);
    assert!(first.records.iter().all(|l| l.is_active));

    let project_id = assign_id("2013 Mazda MX-5 project", Some("Dunedin"), Some(2013));
    let roadster_id = assign_id("2015 Mazda MX-5 Roadster", Some("Auckland"), Some(2015));
    let project = first.records.iter().find(|l| l.id == project_id).unwrap();
    assert_eq!(project.price, None);

    // the roadster reappears without a price, the project car is gone
    let batch_b = [
        "2015 Mazda MX-5 Roadster\nAuckland\nprice on request",
        BATCH_A[1],
        BATCH_A[2],
        BATCH_A[3],
        "2018 Mazda MX-5 Club\nTauranga\n$31,000",
    ];
    let later = t0() + Duration::days(1);
    let second = run_capture(
        &config,
        &batch_source(write_batch(dir.path(), "b.json", &batch_b)),
        &store,
        later,
    )
    .await
    .unwrap();

    assert_eq!(second.records.len(), 6);
    assert_eq!(second.reconcile.inserted, 1);
    assert_eq!(second.reconcile.updated, 4);
    assert_eq!(second.reconcile.deactivated, 1);

    let dataset = store.load().await.unwrap();
    let project = dataset.get(&project_id).unwrap();
    assert!(!project.is_active);
    assert_eq!(project.last_seen, Some(t0()));

    let club_id = assign_id("2018 Mazda MX-5 Club", Some("Tauranga"), Some(2018));
    let club = dataset.get(&club_id).unwrap();
    assert!(club.is_active);
    assert_eq!(club.first_seen, Some(later));

    let roadster = dataset.get(&roadster_id).unwrap();
    assert!(roadster.is_active);
    assert_eq!(roadster.price, Some(19_500));
    assert_eq!(roadster.first_seen, Some(t0()));
    assert_eq!(roadster.last_seen, Some(later));

    // the only inactive record trails the table
    assert_eq!(second.records.last().unwrap().id, project_id);
    assert_eq!(second.summary.active, 5);
    assert_eq!(second.summary.inactive, 1);
}

#[tokio::test]
async fn test_repeat_run_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default();
    let store = JsonFileStore::new(dir.path().join("dataset.json"));
    let batch = write_batch(dir.path(), "a.json", &BATCH_A);

    let first = run_capture(&config, &batch_source(batch.clone()), &store, t0())
        .await
        .unwrap();
    let second = run_capture(&config, &batch_source(batch), &store, t0())
        .await
        .unwrap();

    assert_eq!(second.reconcile.deactivated, 0);
    assert_eq!(second.reconcile.updated, 5);
    let ids = |records: &[car_scout::Listing]| -> Vec<String> {
        records.iter().map(|l| l.id.clone()).collect()
    };
    assert_eq!(ids(&first.records), ids(&second.records));
    assert!(second.records.iter().all(|l| l.is_active));
}
