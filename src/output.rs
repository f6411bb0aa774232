use crate::loader::LoadReport;
use crate::reports::{forecast_rows, ranking_rows};
use crate::types::{PlaceReport, PlaceSummary, SummaryJson};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub const RANKING_FILE: &str = "place_ranking.csv";
pub const FORECAST_FILE: &str = "place_forecast.csv";
pub const SUMMARY_FILE: &str = "summary.json";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Write the ranking, the forecast of the selected place and a JSON summary
/// into `dir`. Returns the written paths.
pub fn export_all(
    dir: &Path,
    load: &LoadReport,
    summary: &PlaceSummary,
    selected: Option<&PlaceReport>,
    threshold: f64,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let ranking = dir.join(RANKING_FILE);
    write_csv(&ranking, &ranking_rows(&summary.ranking))?;
    written.push(ranking);

    if let Some(report) = selected {
        let forecast = dir.join(FORECAST_FILE);
        write_csv(&forecast, &forecast_rows(report, threshold))?;
        written.push(forecast);
    }

    let json = dir.join(SUMMARY_FILE);
    write_json(
        &json,
        &SummaryJson {
            total_rows: load.total_rows,
            accepted_rows: load.accepted_rows,
            rejected_rows: load.rejected_rows,
            places: &summary.places,
            ranking: &summary.ranking,
            selected,
            threshold,
        },
    )?;
    written.push(json);

    info!(dir = %dir.display(), files = written.len(), "exported reports");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::loader::load_observations;
    use crate::reports::{generate_place_report, summarize_places};

    const TABLE: &str = "\
date,time,place,crowd_count (in thousands)
2024-01-01,08:00,\"Harbour, North\",100
2024-01-01,09:00,\"Harbour, North\",200
2024-01-01,08:00,Fort,50
";

    #[test]
    fn test_export_all_writes_files() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = AnalysisConfig::default();
        let (data, load) = load_observations(TABLE).unwrap();
        let summary = summarize_places(&data, cfg.top_n);
        let report = generate_place_report(&data, "Harbour, North", &cfg);

        let written = export_all(tmp.path(), &load, &summary, Some(&report), cfg.threshold).unwrap();
        assert_eq!(written.len(), 3);

        let ranking = std::fs::read_to_string(tmp.path().join(RANKING_FILE)).unwrap();
        let mut lines = ranking.lines();
        assert_eq!(lines.next(), Some("Rank,Place,TotalCrowd"));
        assert_eq!(lines.next(), Some("1,\"Harbour, North\",\"300,000\""));
        assert_eq!(lines.next(), Some("2,Fort,\"50,000\""));

        let forecast = std::fs::read_to_string(tmp.path().join(FORECAST_FILE)).unwrap();
        assert!(forecast.starts_with("Interval,PredictedCount,OverThreshold"));
        assert_eq!(forecast.lines().count(), 1 + cfg.horizon);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(tmp.path().join(SUMMARY_FILE)).unwrap()).unwrap();
        assert_eq!(json["accepted_rows"], 3);
        assert_eq!(json["places"][0], "Fort");
        assert_eq!(json["selected"]["place"], "Harbour, North");
        assert_eq!(json["selected"]["forecast"]["congested"], false);
    }

    #[test]
    fn test_export_without_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let (data, load) = load_observations(TABLE).unwrap();
        let summary = summarize_places(&data, 1);
        let written = export_all(tmp.path(), &load, &summary, None, 1.0).unwrap();
        assert_eq!(written.len(), 2);
        assert!(!tmp.path().join(FORECAST_FILE).exists());
    }
}
