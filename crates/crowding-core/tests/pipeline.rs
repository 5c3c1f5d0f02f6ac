use std::fs;
use std::path::{Path, PathBuf};

use crowding_core::dataset::Dataset;
use crowding_core::pipeline;
use crowding_core::quality::QualityReport;
use crowding_parser::parse_export;

const FIXTURE_CSV: &str = "\
요일구분,호선,역번호,출발역,상하구분,7시30분,8시0분,17시30분
토요일,2호선,222,강남,내선,50,60,70
평일,2호선,222,강남,내선,100,120,60
평일,2호선,223,역삼,내선,90,110,50
평일,2호선,222,강남,외선,70,90,30
";

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

fn write_euc_kr_fixture(dir: &Path) -> PathBuf {
    let (encoded, _, had_errors) = encoding_rs::EUC_KR.encode(FIXTURE_CSV);
    assert!(!had_errors);
    let input = dir.join("raw_export.csv");
    fs::write(&input, encoded.as_ref()).unwrap();
    input
}

#[test]
fn end_to_end_run_produces_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_euc_kr_fixture(dir.path());
    let out_dir = dir.path().join("out");

    let (summary, report) = pipeline::run(&input, &out_dir).unwrap();

    assert_eq!(summary.encoding, "EUC-KR");
    assert_eq!(summary.raw_rows, 4);
    assert_eq!(summary.time_columns, 3);
    assert_eq!(summary.tidy_rows, 12);
    assert!(summary.passed);
    assert!(report.passed);
    assert_eq!(report.rows_tidy, 12);

    assert!(summary.artifacts.tidy_csv.is_file());
    assert!(summary.artifacts.tidy_parquet.is_file());
    assert!(summary.artifacts.quality_report.is_file());

    let csv_bytes = fs::read(&summary.artifacts.tidy_csv).unwrap();
    assert_eq!(&csv_bytes[..3], &UTF8_BOM);
}

#[test]
fn persisted_report_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_euc_kr_fixture(dir.path());
    let out_dir = dir.path().join("out");

    let (summary, report) = pipeline::run(&input, &out_dir).unwrap();

    let json = fs::read(&summary.artifacts.quality_report).unwrap();
    let reloaded: QualityReport = serde_json::from_slice(&json).unwrap();
    assert_eq!(reloaded, report);
}

#[test]
fn parquet_artifact_round_trips_the_tidy_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_euc_kr_fixture(dir.path());
    let out_dir = dir.path().join("out");

    let (summary, _) = pipeline::run(&input, &out_dir).unwrap();

    let dataset = Dataset::load(&summary.artifacts.tidy_parquet).unwrap();
    let expected = parse_export(FIXTURE_CSV.as_bytes()).unwrap().tidy;
    assert!(dataset.frame().equals_missing(&expected));
    assert_eq!(dataset.rows(), 12);
}

#[test]
fn reruns_write_identical_csv_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_euc_kr_fixture(dir.path());

    let (first, _) = pipeline::run(&input, &dir.path().join("a")).unwrap();
    let (second, _) = pipeline::run(&input, &dir.path().join("b")).unwrap();

    let a = fs::read(&first.artifacts.tidy_csv).unwrap();
    let b = fs::read(&second.artifacts.tidy_csv).unwrap();
    assert_eq!(a, b);
}

#[test]
fn a_failed_run_leaves_prior_artifacts_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_euc_kr_fixture(dir.path());
    let out_dir = dir.path().join("out");

    let (summary, _) = pipeline::run(&input, &out_dir).unwrap();
    let before = fs::read(&summary.artifacts.tidy_csv).unwrap();

    // bytes no candidate encoding can decode
    let broken = dir.path().join("broken.csv");
    fs::write(&broken, [0xFF, 0xFF, 0x00]).unwrap();
    assert!(pipeline::run(&broken, &out_dir).is_err());

    let after = fs::read(&summary.artifacts.tidy_csv).unwrap();
    assert_eq!(before, after);
}

#[test]
fn dataset_exposes_selector_enumerations() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_euc_kr_fixture(dir.path());
    let out_dir = dir.path().join("out");

    let (summary, _) = pipeline::run(&input, &out_dir).unwrap();
    let dataset = Dataset::load(&summary.artifacts.tidy_parquet).unwrap();

    // 평일 leads even though 토요일 sorts (and therefore appears) first
    assert_eq!(dataset.day_types(), ["평일", "토요일"]);
    assert_eq!(dataset.lines(), ["2호선"]);
    assert_eq!(dataset.directions(), ["내선", "외선"]);
    assert_eq!(
        dataset.stations_on_line("2호선").unwrap(),
        vec!["강남", "역삼"]
    );
    assert_eq!(
        dataset.directions_on_line("2호선").unwrap(),
        vec!["내선", "외선"]
    );
    assert!(dataset.stations_on_line("9호선").unwrap().is_empty());
}

#[test]
fn global_dataset_is_initialized_once() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_euc_kr_fixture(dir.path());
    let out_dir = dir.path().join("out");

    let (summary, _) = pipeline::run(&input, &out_dir).unwrap();

    let first = Dataset::global(&summary.artifacts.tidy_parquet).unwrap();
    let second = Dataset::global(&summary.artifacts.tidy_parquet).unwrap();
    assert!(std::ptr::eq(first, second));
}
