// Entry point and high-level CLI flow.
//
// - Loads the crowd table once and prints load diagnostics.
// - Prints the busiest-places ranking.
// - Prints the recent counts, forecast and congestion verdict for the chosen
//   place (the busiest one unless `--place` is given).
// - With `--interactive`, keeps asking for another place until the user quits.
mod config;
mod error;
mod forecast;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use clap::Parser;
use config::{AnalysisConfig, Cli};
use loader::LoadReport;
use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};
use types::{Observation, PlaceReport, PlaceSummary};

/// The loaded table and what the host derived from it. The core functions
/// never see this; they get the observations and the place as arguments.
struct Session {
    data: Vec<Observation>,
    load: LoadReport,
    summary: PlaceSummary,
    cfg: AnalysisConfig,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let text = std::fs::read_to_string(&cli.file)
            .map_err(|e| format!("Failed to load crowd data from {}: {}", cli.file.display(), e))?;
        let (data, load) = loader::load_observations(&text)?;
        let cfg = cli.analysis_config();
        let summary = reports::summarize_places(&data, cfg.top_n);
        Ok(Self {
            data,
            load,
            summary,
            cfg,
        })
    }

    fn report_for(&self, place: &str) -> PlaceReport {
        reports::generate_place_report(&self.data, place, &self.cfg)
    }

    fn default_place(&self) -> Option<&str> {
        self.summary.ranking.first().map(|t| t.place.as_str())
    }
}

fn print_load_report(load: &LoadReport, places: usize) {
    println!(
        "Processing dataset... ({} rows read, {} accepted, {} places)",
        util::format_int(load.total_rows),
        util::format_int(load.accepted_rows),
        util::format_int(places)
    );
    if load.rejected_rows > 0 {
        println!(
            "Note: {} rows skipped due to missing or invalid fields.",
            util::format_int(load.rejected_rows)
        );
    }
    println!();
}

fn print_ranking(session: &Session) {
    println!("Top {} Busiest Places", session.summary.ranking.len());
    println!("(Ranked by total crowd count)\n");
    let rows = reports::ranking_rows(&session.summary.ranking);
    output::preview_table_rows(&rows, rows.len());
}

fn print_place_report(report: &PlaceReport, cfg: &AnalysisConfig) {
    println!("Place: {}\n", report.place);
    if report.series_len == 0 {
        println!("No data available for \"{}\".\n", report.place);
        return;
    }

    println!("Recently Measured Crowd Counts (Last {})\n", cfg.window);
    output::preview_table_rows(&reports::recent_rows(report), cfg.window);

    println!("Predicted Crowd Counts (Next {} Intervals)\n", cfg.horizon);
    if report.forecast.predictions.is_empty() {
        println!("Not enough data to forecast (need at least 2 observations).\n");
    } else {
        output::preview_table_rows(&reports::forecast_rows(report, cfg.threshold), cfg.horizon);
    }

    if report.forecast.congested {
        println!(
            "Warning: Potential congestion predicted! Crowd count expected to exceed {}.\n",
            util::format_number(cfg.threshold, 0)
        );
    } else {
        println!("Crowd levels are predicted to be within safe limits.\n");
    }
}

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask whether to go back to place selection.
///
/// Returns `true` for `Y`, `false` for `N` or end of input.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to Place Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Accepts a rank number from the printed ranking or an exact place name.
fn resolve_choice<'a>(summary: &'a PlaceSummary, choice: &'a str) -> &'a str {
    choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| summary.ranking.get(i))
        .map_or(choice, |t| t.place.as_str())
}

fn run_interactive(session: &Session) {
    loop {
        print_ranking(session);
        let Some(choice) = read_line("Select place (rank or name): ") else {
            break;
        };
        if choice.is_empty() {
            println!("Invalid choice. Please enter a rank or a place name.\n");
            continue;
        }
        println!();
        let place = resolve_choice(&session.summary, &choice);
        print_place_report(&session.report_for(place), &session.cfg);
        if !prompt_back_to_menu() {
            println!("Exiting the program.");
            break;
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let session = Session::open(cli)?;
    print_load_report(&session.load, session.summary.places.len());

    if cli.interactive {
        run_interactive(&session);
        return Ok(());
    }

    print_ranking(&session);
    let place = cli.place.as_deref().or_else(|| session.default_place());
    let report = place.map(|p| session.report_for(p));
    match &report {
        Some(r) => print_place_report(r, &session.cfg),
        None => warn!("no places found in the dataset"),
    }

    if let Some(dir) = &cli.export {
        let written = output::export_all(
            dir,
            &session.load,
            &session.summary,
            report.as_ref(),
            session.cfg.threshold,
        )?;
        for path in written {
            println!("(Exported {})", path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlaceTotal;

    #[test]
    fn test_resolve_choice() {
        let summary = PlaceSummary {
            places: vec!["Fort".to_string(), "Ghat".to_string()],
            ranking: vec![
                PlaceTotal {
                    place: "Ghat".to_string(),
                    total: 2.0,
                },
                PlaceTotal {
                    place: "Fort".to_string(),
                    total: 1.0,
                },
            ],
        };
        assert_eq!(resolve_choice(&summary, "1"), "Ghat");
        assert_eq!(resolve_choice(&summary, "2"), "Fort");
        assert_eq!(resolve_choice(&summary, "0"), "0");
        assert_eq!(resolve_choice(&summary, "9"), "9");
        assert_eq!(resolve_choice(&summary, "Fort"), "Fort");
    }

    #[test]
    fn test_session_defaults_to_busiest_place() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("crowd.csv");
        std::fs::write(
            &file,
            "date,time,place,crowd_count (in thousands)\n2024-01-01,08:00,Fort,1\n2024-01-01,08:00,Ghat,3\n",
        )
        .unwrap();
        let cli = Cli::parse_from(["crowd_report", file.to_str().unwrap()]);
        let session = Session::open(&cli).unwrap();
        assert_eq!(session.default_place(), Some("Ghat"));
        assert_eq!(session.report_for("Ghat").series_len, 1);
    }

    #[test]
    fn test_session_surfaces_structural_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("crowd.csv");
        std::fs::write(&file, "date,time,crowd_count (in thousands)\n2024-01-01,08:00,1\n").unwrap();
        let cli = Cli::parse_from(["crowd_report", file.to_str().unwrap()]);
        let err = Session::open(&cli).err().unwrap();
        assert_eq!(err.to_string(), "CSV missing required column: place");
    }
}
