use crate::config::AnalysisConfig;
use crate::forecast::{forecast_series, recent_window, select_series};
use crate::types::{
    ForecastRow, Observation, PlaceReport, PlaceSummary, PlaceTotal, RankingRow, RecentRow,
};
use crate::util::format_number;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Sum crowd counts per place.
///
/// `places` lists every place in ascending order; `ranking` holds the `top_n`
/// busiest, highest total first. Equal totals keep first-seen order.
pub fn summarize_places(data: &[Observation], top_n: usize) -> PlaceSummary {
    let mut totals: Vec<PlaceTotal> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for r in data {
        let i = *slot.entry(r.place.as_str()).or_insert_with(|| {
            totals.push(PlaceTotal {
                place: r.place.clone(),
                total: 0.0,
            });
            totals.len() - 1
        });
        totals[i].total += r.crowd_count;
    }

    let mut places: Vec<String> = totals.iter().map(|t| t.place.clone()).collect();
    places.sort();

    // `sort_by` is stable, which gives the first-seen tie order.
    totals.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    totals.truncate(top_n);

    PlaceSummary {
        places,
        ranking: totals,
    }
}

/// Series, recent points and forecast for one place.
pub fn generate_place_report(data: &[Observation], place: &str, cfg: &AnalysisConfig) -> PlaceReport {
    let series = select_series(data, place, cfg.order);
    let forecast = forecast_series(&series, cfg.window, cfg.horizon, cfg.threshold);
    PlaceReport {
        place: place.to_string(),
        series_len: series.len(),
        recent: recent_window(&series, cfg.window).to_vec(),
        forecast,
    }
}

pub fn ranking_rows(ranking: &[PlaceTotal]) -> Vec<RankingRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(idx, t)| RankingRow {
            rank: idx + 1,
            place: t.place.clone(),
            total_crowd: format_number(t.total, 0),
        })
        .collect()
}

pub fn recent_rows(report: &PlaceReport) -> Vec<RecentRow> {
    report
        .recent
        .iter()
        .map(|o| RecentRow {
            timestamp: o.timestamp.clone(),
            count: format_number(o.crowd_count, 0),
        })
        .collect()
}

pub fn forecast_rows(report: &PlaceReport, threshold: f64) -> Vec<ForecastRow> {
    report
        .forecast
        .predictions
        .iter()
        .enumerate()
        .map(|(idx, p)| ForecastRow {
            interval: format!("+{}", idx + 1),
            predicted_count: format_number(p.round(), 0),
            over_threshold: if *p > threshold {
                "Yes".to_string()
            } else {
                "No".to_string()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_observations;

    fn obs(ts: &str, count: f64, place: &str) -> Observation {
        Observation {
            timestamp: ts.to_string(),
            crowd_count: count,
            place: place.to_string(),
        }
    }

    #[test]
    fn test_totals_and_order() {
        let data = vec![
            obs("1", 5.0, "B"),
            obs("1", 1.0, "A"),
            obs("2", 2.0, "C"),
            obs("2", 6.0, "A"),
            obs("3", 1.0, "C"),
        ];
        let s = summarize_places(&data, 15);
        assert_eq!(s.places, vec!["A", "B", "C"]);
        let ranked: Vec<(&str, f64)> = s.ranking.iter().map(|t| (t.place.as_str(), t.total)).collect();
        assert_eq!(ranked, vec![("A", 7.0), ("B", 5.0), ("C", 3.0)]);
        for t in &s.ranking {
            let expected: f64 = data.iter().filter(|o| o.place == t.place).map(|o| o.crowd_count).sum();
            assert_eq!(t.total, expected);
        }
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let data = vec![obs("1", 4.0, "Z"), obs("1", 4.0, "M"), obs("1", 9.0, "A"), obs("1", 4.0, "B")];
        let s = summarize_places(&data, 10);
        let names: Vec<&str> = s.ranking.iter().map(|t| t.place.as_str()).collect();
        assert_eq!(names, vec!["A", "Z", "M", "B"]);
    }

    #[test]
    fn test_top_n_truncates() {
        let data: Vec<Observation> = (0..20).map(|i| obs("t", i as f64, &format!("P{:02}", i))).collect();
        assert_eq!(summarize_places(&data, 15).ranking.len(), 15);
        assert_eq!(summarize_places(&data, 15).ranking[0].place, "P19");
        assert_eq!(summarize_places(&data[..4], 15).ranking.len(), 4);
        assert_eq!(summarize_places(&data, 0).ranking.len(), 0);
        assert_eq!(summarize_places(&data, 0).places.len(), 20);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(summarize_places(&[], 15), PlaceSummary::default());
    }

    #[test]
    fn test_place_report_for_unknown_place() {
        let data = vec![obs("1", 5.0, "B")];
        let report = generate_place_report(&data, "Nowhere", &AnalysisConfig::default());
        assert_eq!(report.series_len, 0);
        assert!(report.recent.is_empty());
        assert!(report.forecast.predictions.is_empty());
        assert!(!report.forecast.congested);
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let text = "\
date,time,place,crowd_count (in thousands)
2024-01-01,08:00,Station,900
2024-01-01,09:00,Station,1000
2024-01-01,10:00,Station,1100
2024-01-01,11:00,Station,1200
2024-01-01,12:00,Station,1300
2024-01-01,07:00,Station,800
2024-01-01,08:00,Park,10
2024-01-01,09:00,Park,
";
        let cfg = AnalysisConfig::default();
        let (data, report) = load_observations(text).unwrap();
        assert_eq!(report.rejected_rows, 1);

        let summary = summarize_places(&data, cfg.top_n);
        assert_eq!(summary.ranking[0].place, "Station");

        let place = generate_place_report(&data, &summary.ranking[0].place, &cfg);
        assert_eq!(place.series_len, 6);
        assert_eq!(place.recent.len(), 5);
        assert_eq!(place.recent[0].timestamp, "2024-01-01 08:00");
        let expected = [1_400_000.0, 1_500_000.0, 1_600_000.0, 1_700_000.0, 1_800_000.0];
        for (p, e) in place.forecast.predictions.iter().zip(expected) {
            assert!((p - e).abs() < 1e-6);
        }
        assert!(place.forecast.congested);

        let rows = forecast_rows(&place, cfg.threshold);
        assert_eq!(rows[0].interval, "+1");
        assert_eq!(rows[0].predicted_count, "1,400,000");
        assert_eq!(rows[0].over_threshold, "No");
        assert_eq!(rows[2].over_threshold, "Yes");

        // no hidden state between runs
        let (again, _) = load_observations(text).unwrap();
        assert_eq!(summarize_places(&again, cfg.top_n), summary);
        assert_eq!(generate_place_report(&again, "Station", &cfg), place);
    }

    #[test]
    fn test_display_rows() {
        let ranking = vec![PlaceTotal {
            place: "Ghat".to_string(),
            total: 2_500_000.0,
        }];
        let rows = ranking_rows(&ranking);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].total_crowd, "2,500,000");

        let report = PlaceReport {
            place: "Ghat".to_string(),
            series_len: 1,
            recent: vec![obs("2024-01-01 10:00", 1250.0, "Ghat")],
            forecast: Default::default(),
        };
        let recent = recent_rows(&report);
        assert_eq!(recent[0].count, "1,250");
        assert!(forecast_rows(&report, 1.0).is_empty());
    }
}
