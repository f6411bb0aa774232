use serde::Serialize;
use tabled::Tabled;

/// One accepted row of the crowd table.
///
/// `crowd_count` is already scaled from thousands to people.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub timestamp: String,
    pub crowd_count: f64,
    pub place: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceTotal {
    pub place: String,
    pub total: f64,
}

/// Output of the aggregator: every place (sorted by name) and the busiest ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaceSummary {
    pub places: Vec<String>,
    pub ranking: Vec<PlaceTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastResult {
    pub predictions: Vec<f64>,
    pub congested: bool,
}

/// Everything the presentation layer needs for one selected place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceReport {
    pub place: String,
    pub series_len: usize,
    pub recent: Vec<Observation>,
    pub forecast: ForecastResult,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Place")]
    #[tabled(rename = "Place")]
    pub place: String,
    #[serde(rename = "TotalCrowd")]
    #[tabled(rename = "TotalCrowd")]
    pub total_crowd: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RecentRow {
    #[serde(rename = "Timestamp")]
    #[tabled(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ForecastRow {
    #[serde(rename = "Interval")]
    #[tabled(rename = "Interval")]
    pub interval: String,
    #[serde(rename = "PredictedCount")]
    #[tabled(rename = "PredictedCount")]
    pub predicted_count: String,
    #[serde(rename = "OverThreshold")]
    #[tabled(rename = "OverThreshold")]
    pub over_threshold: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryJson<'a> {
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub rejected_rows: usize,
    pub places: &'a [String],
    pub ranking: &'a [PlaceTotal],
    pub selected: Option<&'a PlaceReport>,
    pub threshold: f64,
}
