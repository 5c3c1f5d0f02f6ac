use std::path::Path;

use anyhow::Result;
use crowding_core::aggregate::{heatmap_pivot, kpi_summary, rush_hour_ranking, station_detail};
use crowding_core::dataset::Dataset;
use crowding_core::quality::quality_report;
use crowding_core::types::{direction_display, SortMode, TimeWindow};

use super::render;

pub fn report(tidy: &Path) -> Result<()> {
    let dataset = Dataset::global(tidy)?;
    let report = quality_report(dataset.frame())?;
    println!("{}", render::quality_table(&report));
    if report.passed {
        println!("Acceptance criteria: PASSED");
    } else {
        println!("Acceptance criteria: FAILED");
    }
    Ok(())
}

pub fn heatmap(
    tidy: &Path,
    day_type: &str,
    line: &str,
    direction: &str,
    sort: SortMode,
) -> Result<()> {
    let dataset = Dataset::global(tidy)?;
    let pivot = heatmap_pivot(dataset.frame(), day_type, line, direction, sort)?;
    if pivot.is_empty() {
        println!("No data for {day_type} / {line} / {direction}");
        return Ok(());
    }

    println!(
        "{} {} {} ({} stations, sort: {sort})",
        day_type,
        line,
        direction_display(line, direction),
        pivot.stations.len()
    );
    println!("{}", render::heatmap_table(&pivot));
    if let Some((lo, hi)) = pivot.color_scale {
        println!("value range: {lo:.1} to {hi:.1}");
    }
    Ok(())
}

pub fn rank(
    tidy: &Path,
    day_type: &str,
    line: Option<&str>,
    direction: Option<&str>,
    window: TimeWindow,
    top_n: usize,
) -> Result<()> {
    let dataset = Dataset::global(tidy)?;
    let entries = rush_hour_ranking(dataset.frame(), day_type, line, direction, window, top_n)?;
    if entries.is_empty() {
        println!("No data for this selection");
        return Ok(());
    }

    println!("Top {} most crowded stations, {day_type}, {window} window", entries.len());
    println!("{}", render::ranking_table(&entries));
    Ok(())
}

pub fn kpi(tidy: &Path, day_type: &str, line: &str, direction: &str) -> Result<()> {
    let dataset = Dataset::global(tidy)?;
    let Some(summary) = kpi_summary(dataset.frame(), day_type, line, direction)? else {
        println!("No data for {day_type} / {line} / {direction}");
        return Ok(());
    };

    println!("{} {} {}", day_type, line, direction_display(line, direction));
    println!("{}", render::kpi_table(&summary));
    Ok(())
}

pub fn detail(
    tidy: &Path,
    day_type: &str,
    line: &str,
    station: &str,
    direction: &str,
) -> Result<()> {
    let dataset = Dataset::global(tidy)?;
    let Some(detail) = station_detail(dataset.frame(), day_type, line, station, direction)? else {
        println!("No data for {station} ({day_type} / {line} / {direction})");
        return Ok(());
    };

    println!(
        "{} {} {} {}",
        detail.station_name,
        detail.day_type,
        detail.line,
        direction_display(&detail.line, &detail.direction)
    );
    println!("{}", render::detail_table(&detail));
    match detail.max_crowding {
        Some(max) => println!("avg {:.1}, max {max:.1}", detail.avg_crowding),
        None => println!("avg {:.1}, max n/a", detail.avg_crowding),
    }
    Ok(())
}
