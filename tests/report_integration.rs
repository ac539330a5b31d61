//! Integration tests for report publishing and run-to-run comparison
//!
//! Runs suites against screenshots on disk, publishes them with the JSON
//! sink, reads them back and compares two runs.

use std::sync::Arc;

use pixel_parity::compare::DiffOptions;
use pixel_parity::model::{PageSpec, Viewport};
use pixel_parity::report::{
    load_report, CaseChange, JsonReportSink, ReportComparison, ReportSink, DIFF_DIR_NAME,
};
use pixel_parity::suite::{FileCapture, Orchestrator, SuiteConfig};

mod common;
use common::assertions::{assert_error_kind, case};
use common::fixtures::{small_viewports, with_changed_rows, Project, GRAY, WHITE};
use pixel_parity::frame::ImageFrame;
use pixel_parity::model::ErrorKind;

fn suite(pages: &[&str]) -> SuiteConfig {
    SuiteConfig::new(
        pages
            .iter()
            .map(|p| {
                PageSpec::new(
                    *p,
                    "shots/{page}-{viewport}-reference.png",
                    "shots/{page}-{viewport}-candidate.png",
                )
            })
            .collect(),
        small_viewports(),
    )
}

fn shoot_identical(project: &Project, page: &str, viewports: &[Viewport]) {
    for v in viewports {
        let frame = ImageFrame::filled(v.width, v.height, GRAY);
        project.shot(page, &v.name, "reference", &frame).unwrap();
        project.shot(page, &v.name, "candidate", &frame).unwrap();
    }
}

#[tokio::test]
async fn test_file_capture_suite_publishes_artifacts() {
    let project = Project::new().unwrap();
    let viewports = small_viewports();
    shoot_identical(&project, "home", &viewports);
    project
        .shot("home", "mobile", "candidate", &with_changed_rows(20, 20, 3, GRAY))
        .unwrap();

    let capture = Arc::new(FileCapture::new(project.root()));
    let report = Orchestrator::new(suite(&["home"]), capture).run().await.unwrap();
    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), 1);

    let out = project.root().join("parity-results");
    let sink = JsonReportSink::new(&out);
    sink.publish(&report).unwrap();

    assert!(sink.report_path().exists());
    assert!(out.join(DIFF_DIR_NAME).join("home-mobile.png").exists());
    assert!(out.join(DIFF_DIR_NAME).join("home-desktop.png").exists());

    let loaded = load_report(&sink.report_path()).unwrap();
    assert_eq!(loaded.run_id(), report.run_id());
    assert_eq!(loaded.total_tests(), 2);
    assert_eq!(loaded.accuracy_percentage(), 50.0);
    assert!(!case(&loaded, "home", "mobile").passed());
    // Diff images live on disk, not in the JSON
    assert!(case(&loaded, "home", "mobile").comparison().unwrap().diff_image().is_none());
}

#[tokio::test]
async fn test_missing_screenshot_is_capture_error() {
    let project = Project::new().unwrap();
    let viewports = small_viewports();
    shoot_identical(&project, "home", &viewports[..1]);

    let capture = Arc::new(FileCapture::new(project.root()));
    let report = Orchestrator::new(suite(&["home"]), capture).run().await.unwrap();

    assert!(case(&report, "home", "desktop").passed());
    let mobile = case(&report, "home", "mobile");
    assert_error_kind(mobile, ErrorKind::Capture);
    assert!(mobile.error_outcome().unwrap().message.contains("home-mobile-reference.png"));
}

#[tokio::test]
async fn test_diff_images_can_be_disabled() {
    let project = Project::new().unwrap();
    shoot_identical(&project, "home", &small_viewports());

    let config = suite(&["home"]).with_diff_options(DiffOptions::default().with_generate_image(false));
    let report = Orchestrator::new(config, Arc::new(FileCapture::new(project.root())))
        .run()
        .await
        .unwrap();

    let out = project.root().join("parity-results");
    JsonReportSink::new(&out).publish(&report).unwrap();
    assert!(!out.join(DIFF_DIR_NAME).exists());
}

#[tokio::test]
async fn test_second_run_detects_regression_and_fix() {
    let project = Project::new().unwrap();
    let viewports = small_viewports();
    shoot_identical(&project, "home", &viewports);
    shoot_identical(&project, "links", &viewports);
    project
        .shot("links", "desktop", "candidate", &with_changed_rows(40, 20, 10, GRAY))
        .unwrap();

    let capture = Arc::new(FileCapture::new(project.root()));
    let first = Orchestrator::new(suite(&["home", "links"]), capture.clone())
        .run()
        .await
        .unwrap();

    // links/desktop gets fixed, home/mobile breaks
    project
        .shot("links", "desktop", "candidate", &ImageFrame::filled(40, 20, GRAY))
        .unwrap();
    project
        .shot("home", "mobile", "candidate", &ImageFrame::filled(20, 20, WHITE))
        .unwrap();
    let second = Orchestrator::new(suite(&["home", "links"]), capture).run().await.unwrap();

    let comparison = ReportComparison::between(&first, &second);
    assert!(comparison.has_regressions());

    let regressed: Vec<String> = comparison.regressions().map(|d| d.case.to_string()).collect();
    assert_eq!(regressed, vec!["home/mobile"]);
    let fixed: Vec<String> = comparison.fixes().map(|d| d.case.to_string()).collect();
    assert_eq!(fixed, vec!["links/desktop"]);

    assert_eq!(comparison.with_change(CaseChange::Unchanged).count(), 2);
    assert_eq!(comparison.accuracy_delta(), 0.0);
}
