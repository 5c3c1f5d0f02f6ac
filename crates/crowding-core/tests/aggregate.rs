use crowding_core::aggregate::{
    heatmap_pivot, kpi_summary, rush_hour_ranking, station_detail, station_detail_for,
};
use crowding_core::types::{SortMode, TimeWindow};
use crowding_parser::parse_export;
use polars::prelude::DataFrame;

fn tidy_from(csv: &str) -> DataFrame {
    parse_export(csv.as_bytes()).expect("fixture should parse").tidy
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

const FIXTURE_CSV: &str = "\
요일구분,호선,역번호,출발역,상하구분,7시30분,8시0분,17시30분
평일,2호선,223,역삼,내선,90,110,50
평일,2호선,222,강남,내선,100,120,60
평일,2호선,150,서울역,내선,80,100,40
평일,2호선,222,강남,외선,70,90,30
평일,1호선,133,시청,상선,60,80,20
토요일,2호선,222,강남,내선,10,20,30
";

#[test]
fn heatmap_filters_to_one_selection() {
    let tidy = tidy_from(FIXTURE_CSV);
    let pivot = heatmap_pivot(&tidy, "평일", "2호선", "내선", SortMode::NameAsc).unwrap();

    assert_eq!(pivot.stations.len(), 3);
    assert_eq!(pivot.time_labels, vec!["07:30", "08:00", "17:30"]);
    assert!(!pivot.stations.contains(&"시청".to_string()));
}

#[test]
fn heatmap_name_sort_is_alphabetical() {
    let tidy = tidy_from(FIXTURE_CSV);
    let pivot = heatmap_pivot(&tidy, "평일", "2호선", "내선", SortMode::NameAsc).unwrap();

    assert_eq!(pivot.stations, vec!["강남", "서울역", "역삼"]);
}

#[test]
fn heatmap_code_sort_follows_station_codes() {
    let tidy = tidy_from(FIXTURE_CSV);
    let pivot = heatmap_pivot(&tidy, "평일", "2호선", "내선", SortMode::CodeAsc).unwrap();

    // 서울역=150, 강남=222, 역삼=223
    assert_eq!(pivot.stations, vec!["서울역", "강남", "역삼"]);
}

#[test]
fn heatmap_avg_sort_is_descending_by_station_mean() {
    let tidy = tidy_from(FIXTURE_CSV);
    let pivot = heatmap_pivot(&tidy, "평일", "2호선", "내선", SortMode::AvgDesc).unwrap();

    // per-station means over all slots: 강남 93.3, 역삼 83.3, 서울역 73.3
    assert_eq!(pivot.stations, vec!["강남", "역삼", "서울역"]);
}

#[test]
fn heatmap_avg_sort_ties_keep_code_order() {
    let csv = "\
요일구분,호선,역번호,출발역,상하구분,7시30분
평일,2호선,223,역삼,내선,100
평일,2호선,222,강남,내선,100
";
    let tidy = tidy_from(csv);
    let pivot = heatmap_pivot(&tidy, "평일", "2호선", "내선", SortMode::AvgDesc).unwrap();

    // equal means fall back to the table's station_code order
    assert_eq!(pivot.stations, vec!["강남", "역삼"]);
}

#[test]
fn heatmap_cells_hold_means_and_nulls_stay_empty() {
    let csv = "\
요일구분,호선,역번호,출발역,상하구분,7시30분,8시0분
평일,2호선,222,강남,내선,100,
";
    let tidy = tidy_from(csv);
    let pivot = heatmap_pivot(&tidy, "평일", "2호선", "내선", SortMode::NameAsc).unwrap();

    assert_eq!(pivot.cell(0, 0), Some(100.0));
    assert_eq!(pivot.cell(0, 1), None);
    assert_eq!(pivot.color_scale, Some((100.0, 100.0)));
}

#[test]
fn heatmap_averages_duplicate_cells() {
    let csv = "\
요일구분,호선,역번호,출발역,상하구분,7시30분
평일,2호선,222,강남,내선,100
평일,2호선,222,강남,내선,200
";
    let tidy = tidy_from(csv);
    let pivot = heatmap_pivot(&tidy, "평일", "2호선", "내선", SortMode::NameAsc).unwrap();

    assert_eq!(pivot.stations, vec!["강남"]);
    assert_eq!(pivot.cell(0, 0), Some(150.0));
}

#[test]
fn heatmap_code_sort_uses_the_first_seen_code_per_station() {
    let csv = "\
요일구분,호선,역번호,출발역,상하구분,7시30분
평일,2호선,150,강남,내선,10
평일,2호선,200,역삼,내선,20
평일,2호선,222,강남,내선,30
";
    let tidy = tidy_from(csv);
    let pivot = heatmap_pivot(&tidy, "평일", "2호선", "내선", SortMode::CodeAsc).unwrap();

    // 강남 sorts by its first-seen code 150, not the later 222
    assert_eq!(pivot.stations, vec!["강남", "역삼"]);
    assert_eq!(pivot.cell(0, 0), Some(20.0));
}

#[test]
fn heatmap_time_axis_keeps_column_order_not_label_order() {
    let csv = "\
요일구분,호선,역번호,출발역,상하구분,10시00분,8시30분
평일,2호선,222,강남,내선,50,60
";
    let tidy = tidy_from(csv);
    let pivot = heatmap_pivot(&tidy, "평일", "2호선", "내선", SortMode::NameAsc).unwrap();

    assert_eq!(pivot.time_labels, vec!["10:00", "08:30"]);
}

#[test]
fn heatmap_with_no_matching_rows_is_empty() {
    let tidy = tidy_from(FIXTURE_CSV);
    let pivot = heatmap_pivot(&tidy, "일요일", "2호선", "내선", SortMode::AvgDesc).unwrap();

    assert!(pivot.is_empty());
    assert_eq!(pivot.color_scale, None);
}

#[test]
fn heatmap_color_scale_spans_cell_means() {
    let tidy = tidy_from(FIXTURE_CSV);
    let pivot = heatmap_pivot(&tidy, "평일", "2호선", "내선", SortMode::AvgDesc).unwrap();

    assert_eq!(pivot.color_scale, Some((40.0, 120.0)));
}

#[test]
fn morning_ranking_orders_by_window_mean() {
    let tidy = tidy_from(FIXTURE_CSV);
    let entries = rush_hour_ranking(
        &tidy,
        "평일",
        Some("2호선"),
        Some("내선"),
        TimeWindow::Morning,
        10,
    )
    .unwrap();

    let names: Vec<&str> = entries.iter().map(|e| e.station_name.as_str()).collect();
    assert_eq!(names, vec!["강남", "역삼", "서울역"]);
    assert_close(entries[0].avg_crowding, 110.0);
    assert_close(entries[1].avg_crowding, 100.0);
    assert_close(entries[2].avg_crowding, 90.0);
    assert_eq!(entries[0].peak_time_label, "08:00");
}

#[test]
fn ranking_ranks_are_contiguous_from_one() {
    let tidy = tidy_from(FIXTURE_CSV);
    let entries =
        rush_hour_ranking(&tidy, "평일", None, None, TimeWindow::Morning, 10).unwrap();

    assert_eq!(entries.len(), 5);
    let ranks: Vec<u32> = entries.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
}

#[test]
fn ranking_without_line_filter_keeps_directions_apart() {
    let tidy = tidy_from(FIXTURE_CSV);
    let entries =
        rush_hour_ranking(&tidy, "평일", None, None, TimeWindow::Morning, 10).unwrap();

    let gangnam: Vec<&str> = entries
        .iter()
        .filter(|e| e.station_name == "강남")
        .map(|e| e.direction.as_str())
        .collect();
    assert_eq!(gangnam, vec!["내선", "외선"]);
    assert!(entries.iter().any(|e| e.line == "1호선"));
}

#[test]
fn ranking_truncates_to_top_n() {
    let tidy = tidy_from(FIXTURE_CSV);
    let entries =
        rush_hour_ranking(&tidy, "평일", None, None, TimeWindow::Morning, 2).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].station_name, "강남");
    assert_eq!(entries[1].station_name, "역삼");
}

#[test]
fn evening_window_only_sees_evening_slots() {
    let tidy = tidy_from(FIXTURE_CSV);
    let entries = rush_hour_ranking(
        &tidy,
        "평일",
        Some("2호선"),
        Some("내선"),
        TimeWindow::Evening,
        10,
    )
    .unwrap();

    assert_close(entries[0].avg_crowding, 60.0);
    assert_eq!(entries[0].peak_time_label, "17:30");
}

#[test]
fn all_day_window_averages_every_slot() {
    let tidy = tidy_from(FIXTURE_CSV);
    let entries = rush_hour_ranking(
        &tidy,
        "평일",
        Some("2호선"),
        Some("내선"),
        TimeWindow::AllDay,
        10,
    )
    .unwrap();

    assert_eq!(entries[0].station_name, "강남");
    assert_close(entries[0].avg_crowding, 280.0 / 3.0);
}

#[test]
fn ranking_peak_ties_keep_the_earlier_slot() {
    let csv = "\
요일구분,호선,역번호,출발역,상하구분,7시30분,8시0분
평일,2호선,222,강남,내선,100,100
";
    let tidy = tidy_from(csv);
    let entries =
        rush_hour_ranking(&tidy, "평일", None, None, TimeWindow::Morning, 10).unwrap();

    assert_eq!(entries[0].peak_time_label, "07:30");
}

#[test]
fn ranking_mean_ties_keep_table_order() {
    let csv = "\
요일구분,호선,역번호,출발역,상하구분,7시30분
평일,2호선,223,역삼,내선,100
평일,2호선,222,강남,내선,100
";
    let tidy = tidy_from(csv);
    let entries =
        rush_hour_ranking(&tidy, "평일", None, None, TimeWindow::Morning, 10).unwrap();

    assert_eq!(entries[0].station_name, "강남");
    assert_eq!(entries[1].station_name, "역삼");
}

#[test]
fn ranking_with_no_match_is_empty() {
    let tidy = tidy_from(FIXTURE_CSV);
    let entries =
        rush_hour_ranking(&tidy, "일요일", None, None, TimeWindow::Morning, 10).unwrap();

    assert!(entries.is_empty());
}

#[test]
fn kpi_summary_covers_the_selection() {
    let tidy = tidy_from(FIXTURE_CSV);
    let summary = kpi_summary(&tidy, "평일", "2호선", "내선").unwrap().unwrap();

    assert_close(summary.avg_crowding, 750.0 / 9.0);
    assert_eq!(summary.top_station, "강남");
    assert_close(summary.top_station_avg, 280.0 / 3.0);
    assert_eq!(summary.peak_time_label, "08:00");
    assert_eq!(summary.station_count, 3);
    assert_close(summary.morning_avg, 100.0);
    assert_close(summary.evening_avg, 50.0);
}

#[test]
fn kpi_ties_keep_the_first_occurrence() {
    let csv = "\
요일구분,호선,역번호,출발역,상하구분,7시30분,8시0분
평일,2호선,223,역삼,내선,100,100
평일,2호선,222,강남,내선,100,100
";
    let tidy = tidy_from(csv);
    let summary = kpi_summary(&tidy, "평일", "2호선", "내선").unwrap().unwrap();

    // all station and label means are 100; the table's first occurrence
    // (강남 by station_code, 07:30 by time_order) wins both fields
    assert_eq!(summary.top_station, "강남");
    assert_close(summary.top_station_avg, 100.0);
    assert_eq!(summary.peak_time_label, "07:30");
}

#[test]
fn kpi_summary_is_none_when_nothing_matches() {
    let tidy = tidy_from(FIXTURE_CSV);
    let summary = kpi_summary(&tidy, "일요일", "2호선", "내선").unwrap();

    assert!(summary.is_none());
}

#[test]
fn kpi_window_averages_are_zero_outside_rush_slots() {
    let csv = "\
요일구분,호선,역번호,출발역,상하구분,10시00분
평일,2호선,222,강남,내선,75
";
    let tidy = tidy_from(csv);
    let summary = kpi_summary(&tidy, "평일", "2호선", "내선").unwrap().unwrap();

    assert_close(summary.avg_crowding, 75.0);
    assert_close(summary.morning_avg, 0.0);
    assert_close(summary.evening_avg, 0.0);
    assert_eq!(summary.peak_time_label, "10:00");
}

#[test]
fn station_detail_is_chronological_with_summary_figures() {
    let tidy = tidy_from(FIXTURE_CSV);
    let detail = station_detail(&tidy, "평일", "2호선", "강남", "내선")
        .unwrap()
        .unwrap();

    let labels: Vec<&str> = detail.points.iter().map(|p| p.time_label.as_str()).collect();
    assert_eq!(labels, vec!["07:30", "08:00", "17:30"]);
    assert_eq!(detail.points[1].crowding, Some(120.0));
    assert_close(detail.avg_crowding, 280.0 / 3.0);
    assert_eq!(detail.max_crowding, Some(120.0));
}

#[test]
fn station_detail_tolerates_missing_values() {
    let csv = "\
요일구분,호선,역번호,출발역,상하구분,7시30분,8시0분
평일,2호선,222,강남,내선,100,
";
    let tidy = tidy_from(csv);
    let detail = station_detail(&tidy, "평일", "2호선", "강남", "내선")
        .unwrap()
        .unwrap();

    assert_eq!(detail.points[1].crowding, None);
    assert_close(detail.avg_crowding, 100.0);
    assert_eq!(detail.max_crowding, Some(100.0));
}

#[test]
fn station_detail_is_none_for_unknown_station() {
    let tidy = tidy_from(FIXTURE_CSV);
    let detail = station_detail(&tidy, "평일", "2호선", "잠실", "내선").unwrap();

    assert!(detail.is_none());
}

#[test]
fn ranking_entry_jumps_to_its_station_detail() {
    let tidy = tidy_from(FIXTURE_CSV);
    let entries = rush_hour_ranking(
        &tidy,
        "평일",
        Some("2호선"),
        Some("내선"),
        TimeWindow::Morning,
        10,
    )
    .unwrap();

    let intent = entries[0].navigation_intent("평일");
    let detail = station_detail_for(&tidy, &intent).unwrap().unwrap();

    assert_eq!(detail.station_name, entries[0].station_name);
    assert_eq!(detail.direction, entries[0].direction);
    assert_eq!(detail.day_type, "평일");
}
