//! End-to-end workflows against the mock capture backend
//!
//! Config file on disk → filename template → capture → saved image, and the
//! schedule file driving the same path.

use chrono::{NaiveDate, NaiveDateTime};
use screenshotto_core::{
    capture::MockBackend,
    config::{ConfigPaths, load_or_create},
    error::AppError,
    schedule::{Scheduler, load_schedule, tick, write_default_schedule},
    writer::save_screenshot,
};

fn saturday_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 6, 16).unwrap().and_hms_opt(9, 0, 0).unwrap()
}

fn write_config(paths: &ConfigPaths, body: &str) {
    std::fs::create_dir_all(&paths.config_dir).unwrap();
    std::fs::write(&paths.config_file, body).unwrap();
}

#[tokio::test]
async fn test_first_run_generates_config_and_saves_png() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::in_dir(dir.path());

    let config = load_or_create(&paths).unwrap();
    assert!(paths.config_file.exists());

    let backend = MockBackend::new().with_monitors(vec![(0, 0, 40, 30)]);
    let path = save_screenshot(&backend, &config, saturday_morning()).await.unwrap();

    assert_eq!(path, paths.default_img_dir.join("2018-06-16 0900.png"));
    let image = image::open(&path).unwrap();
    assert_eq!((image.width(), image.height()), (40, 30));
}

#[tokio::test]
async fn test_hand_edited_config_is_repaired_then_used() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::in_dir(dir.path());
    let img_dir = dir.path().join("my shots");
    write_config(
        &paths,
        &format!(
            "[Screenshotto]\nimg_dir = '{}'\nstrftime = \"'%a %d %B %Y %H:%M'\"\nfilename = \
             \"Desktop - {{strftime}}.jpg\"\n",
            img_dir.display()
        ),
    );

    let config = load_or_create(&paths).unwrap();
    assert_eq!(config.img_dir, img_dir);
    assert_eq!(config.strftime, "%a %d %B %Y %H_%M");

    // The repaired file loads cleanly and unchanged
    let reloaded = load_or_create(&paths).unwrap();
    assert!(!reloaded.has_changed(&config));

    let backend = MockBackend::new().with_monitors(vec![(0, 0, 16, 16)]);
    let path = save_screenshot(&backend, &config, saturday_morning()).await.unwrap();
    assert_eq!(path, img_dir.join("Desktop - Sat 16 June 2018 09_00.jpg"));
    assert_eq!(&std::fs::read(&path).unwrap()[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_multi_monitor_desktop_is_stitched() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::in_dir(dir.path());
    let config = load_or_create(&paths).unwrap();

    // Second monitor to the left of and below the primary one
    let backend =
        MockBackend::new().with_monitors(vec![(0, 0, 100, 50), (-60, 20, 60, 40)]);
    let path = save_screenshot(&backend, &config, saturday_morning()).await.unwrap();

    let image = image::open(&path).unwrap();
    assert_eq!((image.width(), image.height()), (160, 60));
}

#[tokio::test]
async fn test_failed_capture_surfaces_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::in_dir(dir.path());
    let config = load_or_create(&paths).unwrap();
    let backend = MockBackend::new().with_monitors(Vec::new());

    let err = save_screenshot(&backend, &config, saturday_morning()).await.unwrap_err();
    assert!(matches!(err, AppError::BackendNotAvailable { .. }));
}

#[tokio::test]
async fn test_schedule_file_drives_captures() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::in_dir(dir.path());
    let config = load_or_create(&paths).unwrap();

    assert!(write_default_schedule(&paths.schedule_file).unwrap());
    assert!(load_schedule(&paths.schedule_file).unwrap().is_empty());

    std::fs::write(&paths.schedule_file, "# every day\nevery 2 minutes\n").unwrap();
    let specs = load_schedule(&paths.schedule_file).unwrap();
    let start = saturday_morning();
    let mut scheduler = Scheduler::with_seed(specs, start, 42);
    let backend = MockBackend::new().with_monitors(vec![(0, 0, 8, 8)]);
    let mut out = Vec::new();

    let mut saved = Vec::new();
    for minute in 0..=6 {
        let now = start + chrono::TimeDelta::minutes(minute);
        saved.extend(tick(&mut scheduler, &backend, &config, || now, 80, &mut out).await.unwrap());
    }

    let names: Vec<_> = saved
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["2018-06-16 0902.png", "2018-06-16 0904.png", "2018-06-16 0906.png"]);
    assert_eq!(backend.capture_count(), 3);
}

#[test]
fn test_broken_schedule_line_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.txt");
    std::fs::write(&path, "every 10 minutes\nevery blue moon\n").unwrap();

    let err = load_schedule(&path).unwrap_err();
    assert!(matches!(err, AppError::ScheduleParse { line: 2, .. }));
    assert!(err.remediation_hint().contains("schedule edit"));
}
