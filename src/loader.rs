use crate::error::LoadError;
use crate::types::Observation;
use crate::util::parse_count_safe;
use std::collections::HashMap;
use tracing::{debug, info};

pub const COL_DATE: &str = "date";
pub const COL_TIME: &str = "time";
pub const COL_PLACE: &str = "place";
pub const COL_CROWD_COUNT: &str = "crowd_count (in thousands)";

/// Required columns, in the order they are checked.
pub const REQUIRED_COLUMNS: [&str; 4] = [COL_DATE, COL_TIME, COL_PLACE, COL_CROWD_COUNT];

/// Source counts are given in thousands of people.
pub const THOUSANDS: f64 = 1000.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub rejected_rows: usize,
}

/// Field positions of the [`REQUIRED_COLUMNS`], matched case-insensitively
/// against the header row.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    date: usize,
    time: usize,
    place: usize,
    crowd_count: usize,
}

impl HeaderIndex {
    pub fn from_header(header: &[String]) -> Result<Self, LoadError> {
        // A repeated column name keeps its last position.
        let positions: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_lowercase(), i))
            .collect();

        let mut resolved = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, col) in resolved.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = *positions
                .get(col)
                .ok_or_else(|| LoadError::MissingColumn(col.to_string()))?;
        }
        let [date, time, place, crowd_count] = resolved;

        Ok(Self {
            date,
            time,
            place,
            crowd_count,
        })
    }
}

/// Split one line into trimmed fields.
///
/// A `"` toggles quoted mode and is dropped; commas inside quotes are kept.
/// There is no escape for a literal quote, and an unterminated quote simply
/// runs to the end of the line.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut token = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut token)),
            _ => token.push(c),
        }
    }
    fields.push(token);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

/// Lines of a table, with any leading byte-order mark and surrounding
/// whitespace removed first.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.trim_start_matches('\u{feff}').trim().split('\n').collect()
}

/// Turn one data row into an [`Observation`], or `None` if any required field
/// is empty or the crowd count is not a usable number.
pub fn build_observation(row: &[String], index: &HeaderIndex) -> Option<Observation> {
    let field = |i: usize| row.get(i).map(String::as_str).filter(|s| !s.is_empty());

    let date = field(index.date)?;
    let time = field(index.time)?;
    let place = field(index.place)?;
    let count = parse_count_safe(field(index.crowd_count))?;

    Some(Observation {
        timestamp: format!("{} {}", date, time),
        crowd_count: count * THOUSANDS,
        place: place.to_string(),
    })
}

/// Parse a whole crowd table.
///
/// Fails only on structural problems (too few lines, missing column).
/// Malformed data rows are skipped and counted in the returned report.
pub fn load_observations(text: &str) -> Result<(Vec<Observation>, LoadReport), LoadError> {
    let lines = split_lines(text);
    if lines.len() < 2 {
        return Err(LoadError::TooFewLines { lines: lines.len() });
    }

    let index = HeaderIndex::from_header(&parse_line(lines[0]))?;

    let mut observations = Vec::with_capacity(lines.len() - 1);
    let mut rejected_rows = 0usize;
    for (n, line) in lines.iter().enumerate().skip(1) {
        match build_observation(&parse_line(line), &index) {
            Some(obs) => observations.push(obs),
            None => {
                rejected_rows += 1;
                debug!(line = n + 1, "skipping malformed row");
            }
        }
    }

    let report = LoadReport {
        total_rows: lines.len() - 1,
        accepted_rows: observations.len(),
        rejected_rows,
    };
    info!(
        total = report.total_rows,
        accepted = report.accepted_rows,
        rejected = report.rejected_rows,
        "crowd table loaded"
    );
    Ok((observations, report))
}
