//! Command-line entry point.
//!
//! # Usage
//! - `fairdraft_cli` prints ping/version (linkage smoke check).
//! - `fairdraft_cli <db_path> [team_count] [seed]` drafts the default roster
//!   stored in `db_path`, prints the teams and records the result.
//!
//! Set `FAIRDRAFT_LOG_DIR` to an absolute directory to enable file logs.

use fairdraft_core::db::open_db;
use fairdraft_core::draft::{summarize_team, MAX_TEAM_COUNT};
use fairdraft_core::{
    default_log_level, init_logging, DraftService, DraftSettings, GeneratedResult,
    ResultRepository, RosterService, SqlitePlayerRepository, SqlitePlayerSetRepository,
    SqliteResultRepository,
};
use std::error::Error;
use std::process::ExitCode;

const UNSAVED_RESULTS_KEPT: u32 = 20;

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("FAIRDRAFT_LOG_DIR") {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(db_path) = args.first() else {
        println!("fairdraft_core ping={}", fairdraft_core::ping());
        println!("fairdraft_core version={}", fairdraft_core::core_version());
        return ExitCode::SUCCESS;
    };

    match run(db_path, &args[1..]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: &str, rest: &[String]) -> Result<(), Box<dyn Error>> {
    let mut settings = DraftSettings::default();
    if let Some(raw) = rest.first() {
        settings.team_count = raw
            .parse()
            .map_err(|_| format!("team_count must be a whole number, got `{raw}`"))?;
        if settings.team_count > MAX_TEAM_COUNT {
            return Err(format!("team_count must be at most {MAX_TEAM_COUNT}, got {raw}").into());
        }
    }
    let seed = match rest.get(1) {
        Some(raw) => Some(
            raw.parse::<u64>()
                .map_err(|_| format!("seed must be an unsigned integer, got `{raw}`"))?,
        ),
        None => None,
    };

    let conn = open_db(db_path)?;
    let roster = RosterService::new(
        SqlitePlayerRepository::try_new(&conn)?,
        SqlitePlayerSetRepository::try_new(&conn)?,
    );
    let result = DraftService::new(roster).generate(&settings, seed)?;
    print_result(&result);

    let results = SqliteResultRepository::try_new(&conn)?;
    results.save_result(&result)?;
    results.prune_unsaved(UNSAVED_RESULTS_KEPT)?;
    Ok(())
}

fn print_result(result: &GeneratedResult) {
    let partition = result.partition();
    let balance_key = result.parameters.attribute_key.as_deref();

    println!("seed={}", result.seed);
    for team in &partition.teams {
        let label = team.name.as_deref().unwrap_or(team.id.as_str());
        match balance_key.and_then(|key| summarize_team(&partition, team, key)) {
            Some(summary) => println!("{label} ({} players) {summary:?}", team.len()),
            None => println!("{label} ({} players)", team.len()),
        }
        for player in partition.members(team) {
            println!("  - {}", player.name);
        }
    }

    if let Some(report) = &result.fairness {
        println!(
            "fairness[{}]: score={:.1} spread={} min={} max={} missing={}",
            report.attribute_key,
            report.score,
            report.spread,
            report.min_sum,
            report.max_sum,
            report.missing_count
        );
        for note in &report.notes {
            println!("  note: {note}");
        }
    }
}
