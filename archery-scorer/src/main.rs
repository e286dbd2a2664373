mod config;
mod play;
mod reports;
mod store;
mod util;

use anyhow::{Context, Result};
use archery_game::{GameCatalog, ScoringEngine, ScoringSession, SciezkaParams, SessionStatus};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdin, stdout};
use std::path::PathBuf;

use config::ScorerConfig;
use play::{PromptedScores, ScorePicker, ScriptedScores, SimulatedScores, run_game};
use reports::{ReportFormat, write_catalog, write_game_report, write_outcome, write_status};
use store::FileSessionStore;
use util::parse_scores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GameArg {
    /// Liga 15/20/25m (10 fixed ends)
    Liga,
    /// Ścieżka łucznicza (14 ends, configurable)
    Sciezka,
}

#[derive(Debug, Clone, Default, clap::Args)]
struct SciezkaArgs {
    /// Marker (peg) to shoot from; repeat for several markers (ścieżka only)
    #[arg(long = "marker")]
    markers: Vec<String>,

    /// Arrows shot from each marker per end (ścieżka only)
    #[arg(long)]
    arrows: Option<u32>,

    /// Points for the highest-scoring target zone (ścieżka only)
    #[arg(long)]
    max_score: Option<u32>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the available games
    Games,
    /// Start a new game for a session, replacing any game in progress
    Start {
        #[arg(value_enum)]
        game: GameArg,
        #[arg(long)]
        session: String,
        #[command(flatten)]
        sciezka: SciezkaArgs,
    },
    /// Record the score of the end awaiting one
    Submit {
        #[arg(long)]
        session: String,
        /// Number of the end being scored
        #[arg(long)]
        end: u16,
        #[arg(long)]
        score: u32,
    },
    /// Show the end awaiting a score, or the final result
    Status {
        #[arg(long)]
        session: String,
    },
    /// Forget a session's game
    Abandon {
        #[arg(long)]
        session: String,
    },
    /// Score a whole game in one go, prompting for each end unless --scores is given
    Play {
        #[arg(value_enum)]
        game: GameArg,
        #[command(flatten)]
        sciezka: SciezkaArgs,
        /// Comma-separated scores, one per end
        #[arg(long)]
        scores: Option<String>,
    },
    /// Play a game with random legal scores
    Simulate {
        #[arg(value_enum)]
        game: GameArg,
        #[command(flatten)]
        sciezka: SciezkaArgs,
        #[arg(long, default_value_t = 1337)]
        seed: u64,
    },
}

#[derive(Debug, Parser)]
#[command(name = "archery-scorer", version)]
#[command(about = "Score keeper for Liga 15/20/25m and ścieżka łucznicza archery games")]
struct Args {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output report format (defaults to the configured one)
    #[arg(long, value_enum, global = true)]
    report: Option<ReportFormat>,

    /// Optional path to write the report output instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Directory holding session files (defaults to the configured one)
    #[arg(long, global = true)]
    session_dir: Option<PathBuf>,

    /// Echo every scored end
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = ScorerConfig::load(args.config.as_deref())?;
    let format = args.report.unwrap_or(config.report);
    if args.output.is_some() {
        colored::control::set_override(false);
    }

    let mut output_target = OutputTarget::new(args.output.clone())?;
    run_command(&args, &config, format, output_target.writer())?;
    output_target.flush_inner()?;
    Ok(())
}

fn run_command(
    args: &Args,
    config: &ScorerConfig,
    format: ReportFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let session_dir = args
        .session_dir
        .clone()
        .unwrap_or_else(|| config.session_dir.clone());
    let engine = || ScoringEngine::new(FileSessionStore::new(session_dir.clone()));

    match &args.command {
        Command::Games => write_catalog(out, format, &GameCatalog::entries()),
        Command::Start {
            game,
            session,
            sciezka,
        } => {
            let engine = engine();
            let status = match game {
                GameArg::Liga => engine.start_liga(session),
                GameArg::Sciezka => engine.start_sciezka(session, &sciezka_params(config, sciezka)),
            }
            .with_context(|| format!("could not start {game:?} for session '{session}'"))?;
            write_status(out, format, session, &status)
        }
        Command::Submit {
            session,
            end,
            score,
        } => {
            let outcome = engine()
                .submit_score(session, *end, *score)
                .with_context(|| format!("end {end} not recorded for session '{session}'"))?;
            write_outcome(out, format, session, &outcome)
        }
        Command::Status { session } => {
            let status = engine().status(session)?;
            write_status(out, format, session, &status)
        }
        Command::Abandon { session } => {
            engine().abandon(session)?;
            writeln!(out, "Session '{session}' abandoned")?;
            Ok(())
        }
        Command::Play {
            game,
            sciezka,
            scores,
        } => {
            let session = new_session(*game, config, sciezka)?;
            let report = if let Some(scores) = scores {
                let mut picker = ScriptedScores::new(parse_scores(scores)?);
                play_game(session, &mut picker, args.verbose)?
            } else {
                let mut picker = PromptedScores::new(stdin().lock(), std::io::stderr());
                play_game(session, &mut picker, args.verbose)?
            };
            write_game_report(out, format, &report)
        }
        Command::Simulate {
            game,
            sciezka,
            seed,
        } => {
            let session = new_session(*game, config, sciezka)?;
            let report = play_game(session, &mut SimulatedScores::new(*seed), args.verbose)?;
            write_game_report(out, format, &report)
        }
    }
}

fn sciezka_params(config: &ScorerConfig, args: &SciezkaArgs) -> SciezkaParams {
    config.sciezka_params(&args.markers, args.arrows, args.max_score)
}

fn new_session(game: GameArg, config: &ScorerConfig, args: &SciezkaArgs) -> Result<ScoringSession> {
    Ok(match game {
        GameArg::Liga => ScoringSession::liga(),
        GameArg::Sciezka => {
            let built = sciezka_params(config, args)
                .build()
                .context("invalid ścieżka setup")?;
            ScoringSession::sciezka(built)
        }
    })
}

fn play_game(
    session: ScoringSession,
    picker: &mut dyn ScorePicker,
    verbose: bool,
) -> Result<play::GameReport> {
    if verbose {
        announce_banner(&session);
    }
    let report = run_game(session, picker, verbose)?;
    log::info!(
        "{} {} game finished with {}",
        report.source,
        report.game,
        report.result.result
    );
    Ok(report)
}

fn announce_banner(session: &ScoringSession) {
    let status = session.status();
    let ends = match &status {
        SessionStatus::AwaitingEnd(view) => view.end_count,
        SessionStatus::Finished(_) => 0,
    };
    eprintln!(
        "{}",
        format!("🎯 {} ({ends} ends)", session.kind().display_name())
            .bright_cyan()
            .bold()
    );
    eprintln!("{}", "================================".cyan());
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
