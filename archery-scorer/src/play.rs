//! Whole-game traversals driven by scripted, typed or simulated scores.
use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use archery_game::{
    EndView, FinalResult, GameKind, ScoringSession, SessionStatus, StepOutcome,
};
use colored::Colorize;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Supplies the score for the end awaiting one.
pub trait ScorePicker {
    fn label(&self) -> &'static str;

    fn pick(&mut self, view: &EndView) -> Result<u32>;

    /// Whether a rejected score should be asked for again.
    fn retries(&self) -> bool {
        false
    }

    fn seed(&self) -> Option<u64> {
        None
    }
}

/// Scores given up front, one per end.
pub struct ScriptedScores {
    scores: std::vec::IntoIter<u32>,
}

impl ScriptedScores {
    pub fn new(scores: Vec<u32>) -> Self {
        Self {
            scores: scores.into_iter(),
        }
    }
}

impl ScorePicker for ScriptedScores {
    fn label(&self) -> &'static str {
        "scripted"
    }

    fn pick(&mut self, view: &EndView) -> Result<u32> {
        self.scores.next().with_context(|| {
            format!(
                "no score given for end {} of {}",
                view.current_end_number, view.end_count
            )
        })
    }
}

/// Scores typed by the archer, one line per end.
pub struct PromptedScores<R, W> {
    input: R,
    prompt: W,
}

impl<R: BufRead, W: Write> PromptedScores<R, W> {
    pub const fn new(input: R, prompt: W) -> Self {
        Self { input, prompt }
    }
}

impl<R: BufRead, W: Write> ScorePicker for PromptedScores<R, W> {
    fn label(&self) -> &'static str {
        "interactive"
    }

    fn pick(&mut self, view: &EndView) -> Result<u32> {
        let max = view.legal_scores.first().copied().unwrap_or_default();
        loop {
            write!(
                self.prompt,
                "Seria {}/{} [{}] wynik {} > punkty (0-{max}): ",
                view.current_end_number,
                view.end_count,
                view.end.distance_label(),
                view.running_total
            )?;
            self.prompt.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                bail!(
                    "input ended before end {} was scored",
                    view.current_end_number
                );
            }
            match line.trim().parse::<u32>() {
                Ok(score) => return Ok(score),
                Err(_) => writeln!(self.prompt, "'{}' is not a whole number", line.trim())?,
            }
        }
    }

    fn retries(&self) -> bool {
        true
    }
}

/// Uniformly random legal scores from a seeded generator.
pub struct SimulatedScores {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SimulatedScores {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ScorePicker for SimulatedScores {
    fn label(&self) -> &'static str {
        "simulated"
    }

    fn pick(&mut self, view: &EndView) -> Result<u32> {
        let max = view.legal_scores.first().copied().unwrap_or_default();
        Ok(self.rng.gen_range(0..=max))
    }

    fn seed(&self) -> Option<u64> {
        Some(self.seed)
    }
}

/// One scored end as shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndLine {
    pub end_number: u16,
    pub distance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archer_position: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<&'static str>,
    pub score: u32,
    pub max_score: u32,
    pub running_total: u32,
}

impl EndLine {
    fn scored(view: &EndView, score: u32) -> Self {
        let placement = view.end.placement();
        Self {
            end_number: view.current_end_number,
            distance: view.end.distance_label(),
            archer_position: placement.map(|p| p.archer_position.label()),
            target: placement.map(|p| p.target.label()),
            score,
            max_score: view.legal_scores.first().copied().unwrap_or_default(),
            running_total: view.running_total.saturating_add(score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameReport {
    pub game: GameKind,
    pub game_name: &'static str,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub generated_at: String,
    pub ends: Vec<EndLine>,
    pub result: FinalResult,
}

/// Score every remaining end of `session` and report the outcome.
pub fn run_game(
    mut session: ScoringSession,
    picker: &mut dyn ScorePicker,
    verbose: bool,
) -> Result<GameReport> {
    let mut ends = Vec::new();
    let result = loop {
        let view = match session.status() {
            SessionStatus::AwaitingEnd(view) => view,
            SessionStatus::Finished(result) => break result,
        };
        let score = picker.pick(&view)?;
        match session.submit(view.current_end_number, score) {
            Ok(outcome) => {
                let line = EndLine::scored(&view, score);
                if verbose {
                    eprintln!(
                        "  {} seria {:>2}/{} {:<20} {:>4} / {:<4} {}",
                        "🏹".cyan(),
                        line.end_number,
                        view.end_count,
                        line.distance,
                        line.score.to_string().green(),
                        line.max_score,
                        format!("Σ {}", line.running_total).bold()
                    );
                }
                ends.push(line);
                if let StepOutcome::Finished(result) = outcome {
                    break result;
                }
            }
            Err(err) if picker.retries() => eprintln!("⚠️  {}", err.to_string().yellow()),
            Err(err) => return Err(err).context("score rejected"),
        }
    };

    Ok(GameReport {
        game: result.game,
        game_name: result.game.display_name(),
        source: picker.label(),
        seed: picker.seed(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        ends,
        result,
    })
}
