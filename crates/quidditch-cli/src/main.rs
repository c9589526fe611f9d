//! Quidditch CLI
//!
//! Plays a match in the terminal on the engine's real-time cadence, or runs
//! a batch of seeded matches and prints the aggregate.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use quidditch_core::{
    simulate_many, BatchReport, JsonRoster, MatchConfig, MatchSnapshot, PhraseBook, RosterSource,
    Side, Simulation,
};

#[derive(Parser)]
#[command(name = "quidditch")]
#[command(about = "Minute-by-minute Quidditch matches in the terminal", long_about = None)]
struct Cli {
    /// Diagnostics level on stderr (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one match
    Play {
        #[command(flatten)]
        setup: MatchSetup,

        /// Seed for the match dice (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the real-time pauses
        #[arg(long)]
        fast: bool,

        /// Print the final snapshot as JSON instead of the live commentary
        #[arg(long)]
        json: bool,
    },

    /// Play many seeded matches in parallel and print the aggregate
    Batch {
        #[command(flatten)]
        setup: MatchSetup,

        /// Number of matches
        #[arg(long, default_value_t = 100)]
        runs: u64,

        /// Seed of the first match; the others count up from it
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct MatchSetup {
    /// Roster JSON file (defaults to the bundled teams)
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Home team name
    #[arg(long, default_value = "Hogwarts Hawks")]
    home: String,

    /// Away team name
    #[arg(long, default_value = "Durmstrang Dragons")]
    away: String,

    /// Match config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Phrase book JSON file (defaults to the built-in English set)
    #[arg(long)]
    phrases: Option<PathBuf>,
}

struct Loaded {
    roster: JsonRoster,
    config: MatchConfig,
    phrases: PhraseBook,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Play {
            setup,
            seed,
            fast,
            json,
        } => {
            let seed = seed.unwrap_or_else(clock_seed);
            play(&setup, seed, fast, json)
        }
        Commands::Batch {
            setup,
            runs,
            seed,
            json,
        } => batch(&setup, runs, seed, json),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("invalid log level `{level}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn load(setup: &MatchSetup) -> Result<Loaded> {
    let roster = match &setup.roster {
        Some(path) => JsonRoster::from_file(path)
            .with_context(|| format!("loading roster {}", path.display()))?,
        None => JsonRoster::bundled().context("loading bundled roster")?,
    };
    let config = load_optional(setup.config.as_deref(), |p| MatchConfig::from_file(p), "config")?
        .unwrap_or_default();
    let phrases = load_optional(setup.phrases.as_deref(), |p| PhraseBook::from_file(p), "phrases")?
        .unwrap_or_else(PhraseBook::standard);
    debug!(teams = ?roster.team_names(), "setup loaded");
    Ok(Loaded {
        roster,
        config,
        phrases,
    })
}

fn load_optional<T>(
    path: Option<&Path>,
    read: impl Fn(&Path) -> quidditch_core::Result<T>,
    what: &str,
) -> Result<Option<T>> {
    path.map(|path| read(path).with_context(|| format!("loading {what} {}", path.display())))
        .transpose()
}

// =============================================================================
// play
// =============================================================================

fn play(setup: &MatchSetup, seed: u64, fast: bool, json: bool) -> Result<()> {
    let Loaded {
        roster,
        config,
        phrases,
    } = load(setup)?;
    let mut sim = Simulation::from_source(&roster, &setup.home, &setup.away, phrases, config, seed)
        .context("setting up the match")?;
    info!(seed, "kick-off");

    let step = render_step(sim.config());
    let mut shown = 0;
    let mut scoreline = None;
    if !json {
        println!("{}  (seed {seed})", headline(&sim.snapshot()));
    }

    while !sim.is_over() {
        sim.advance_by(step)?;
        if json {
            continue;
        }
        let snapshot = sim.snapshot();
        for line in &snapshot.event_log[shown..] {
            println!("[{:>2}'] {line}", snapshot.minute);
        }
        shown = snapshot.event_log.len();
        let score = (snapshot.home.score, snapshot.away.score);
        if scoreline != Some(score) {
            if scoreline.is_some() {
                println!("      {}", headline(&snapshot));
            }
            scoreline = Some(score);
        }
        if !fast && !sim.is_over() {
            thread::sleep(step);
        }
    }

    let snapshot = sim.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }
    println!();
    println!("{}", headline(&snapshot));
    for line in &snapshot.summary {
        if !line.is_empty() {
            println!("{line}");
        }
    }
    println!();
    print_ratings(&snapshot);
    Ok(())
}

/// Largest step that lands on every tick and every line boundary.
fn render_step(config: &MatchConfig) -> Duration {
    fn gcd(a: u64, b: u64) -> u64 {
        if b == 0 {
            a
        } else {
            gcd(b, a % b)
        }
    }
    Duration::from_millis(gcd(config.tick_period_ms, config.line_duration_ms).max(1))
}

fn headline(snapshot: &MatchSnapshot) -> String {
    format!(
        "{} {} : {} {}",
        snapshot.home.team, snapshot.home.score, snapshot.away.score, snapshot.away.team
    )
}

fn print_ratings(snapshot: &MatchSnapshot) {
    for side in [&snapshot.home, &snapshot.away] {
        println!("{}", side.team);
        for player in &side.players {
            let goals = if player.goals > 0 {
                format!("  {} goal(s)", player.goals)
            } else {
                String::new()
            };
            println!(
                "  {:<7} {:<22} {:>4.1}{goals}",
                player.role.to_string(),
                player.name,
                player.rating
            );
        }
    }
}

// =============================================================================
// batch
// =============================================================================

fn batch(setup: &MatchSetup, runs: u64, seed: u64, json: bool) -> Result<()> {
    let Loaded {
        roster,
        config,
        phrases,
    } = load(setup)?;
    let (home, away) = roster
        .load_teams(&setup.home, &setup.away)
        .context("loading teams")?;
    let seeds: Vec<u64> = (0..runs).map(|i| seed.wrapping_add(i)).collect();
    let report = simulate_many(&home, &away, &phrases, &config, &seeds)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, home.name(), away.name());
    }
    Ok(())
}

fn print_report(report: &BatchReport, home: &str, away: &str) {
    println!("{} matches", report.runs);
    println!("  {home} wins: {}", report.home_wins);
    println!("  {away} wins: {}", report.away_wins);
    println!("  draws: {}", report.draws);
    println!(
        "  average score: {:.1} : {:.1}",
        report.avg_home_score, report.avg_away_score
    );
    println!("  snitch caught: {:.0}%", report.snitch_rate * 100.0);
    println!("  average final minute: {:.1}", report.avg_end_minute);
    let biggest = report
        .matches
        .iter()
        .max_by_key(|m| m.home_score.abs_diff(m.away_score));
    if let Some(m) = biggest {
        let winner = match m.winner {
            Some(Side::Home) => home,
            Some(Side::Away) => away,
            None => "nobody",
        };
        println!(
            "  widest margin: seed {} ({} : {}, {winner})",
            m.seed, m.home_score, m.away_score
        );
    }
}
