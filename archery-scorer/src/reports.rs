use std::io::Write;

use anyhow::Result;
use archery_game::{CatalogEntry, EndView, FinalResult, SessionStatus, StepOutcome};
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::play::GameReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Colored, human-readable output
    Console,
    /// Machine-readable JSON
    Json,
    /// Markdown tables
    Markdown,
}

pub fn write_catalog(
    out: &mut dyn Write,
    format: ReportFormat,
    entries: &[CatalogEntry],
) -> Result<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, entries)?;
            writeln!(out)?;
        }
        ReportFormat::Markdown => {
            writeln!(out, "# Archery games\n")?;
            writeln!(out, "| Game | Ends | Configurable | Description |")?;
            writeln!(out, "|------|------|--------------|-------------|")?;
            for entry in entries {
                writeln!(
                    out,
                    "| {} (`{}`) | {} | {} | {} |",
                    entry.name,
                    entry.kind,
                    entry.end_count,
                    if entry.configurable { "yes" } else { "no" },
                    entry.description
                )?;
            }
        }
        ReportFormat::Console => {
            writeln!(out, "{}", "🎯 Available games".bright_cyan().bold())?;
            for entry in entries {
                writeln!(
                    out,
                    "  {:10} {} ({} ends) - {}",
                    entry.kind.to_string().bold(),
                    entry.name,
                    entry.end_count,
                    entry.description
                )?;
            }
        }
    }
    Ok(())
}

pub fn write_status(
    out: &mut dyn Write,
    format: ReportFormat,
    session_id: &str,
    status: &SessionStatus,
) -> Result<()> {
    match status {
        SessionStatus::AwaitingEnd(view) => write_view(out, format, session_id, view),
        SessionStatus::Finished(result) => write_result(out, format, session_id, result),
    }
}

pub fn write_outcome(
    out: &mut dyn Write,
    format: ReportFormat,
    session_id: &str,
    outcome: &StepOutcome,
) -> Result<()> {
    match outcome {
        StepOutcome::Next(view) => write_view(out, format, session_id, view),
        StepOutcome::Finished(result) => write_result(out, format, session_id, result),
    }
}

#[derive(Serialize)]
struct SessionReport<'a, T: Serialize> {
    session: &'a str,
    state: &'static str,
    #[serde(flatten)]
    body: &'a T,
}

fn write_view(
    out: &mut dyn Write,
    format: ReportFormat,
    session_id: &str,
    view: &EndView,
) -> Result<()> {
    let max = view.legal_scores.first().copied().unwrap_or_default();
    let placement = view.end.placement();
    match format {
        ReportFormat::Json => {
            let report = SessionReport {
                session: session_id,
                state: "awaiting_end",
                body: view,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        ReportFormat::Markdown => {
            writeln!(
                out,
                "## Seria {}/{} ({session_id})\n",
                view.current_end_number, view.end_count
            )?;
            writeln!(out, "- **Distance**: {}", view.end.distance_label())?;
            if let Some(placement) = placement {
                writeln!(out, "- **Position**: {}", placement.archer_position)?;
                writeln!(out, "- **Target**: {}", placement.target)?;
            }
            writeln!(out, "- **Arrows**: {}", view.end.arrows_number)?;
            writeln!(out, "- **Legal scores**: {max}..0")?;
            writeln!(out, "- **Running total**: {}", view.running_total)?;
        }
        ReportFormat::Console => {
            writeln!(
                out,
                "{} {}",
                format!("🏹 Seria {}/{}", view.current_end_number, view.end_count)
                    .bright_cyan()
                    .bold(),
                format!("[{session_id}]").dimmed()
            )?;
            writeln!(out, "   Distance:  {}", view.end.distance_label())?;
            if let Some(placement) = placement {
                writeln!(out, "   Position:  {}", placement.archer_position)?;
                writeln!(out, "   Target:    {}", placement.target)?;
            }
            writeln!(
                out,
                "   Arrows:    {} × max {}",
                view.end.arrows_number, view.end.max_scoring_per_arrow
            )?;
            writeln!(out, "   Scores:    {max}..0")?;
            writeln!(
                out,
                "   Total:     {}",
                view.running_total.to_string().green()
            )?;
        }
    }
    Ok(())
}

fn write_result(
    out: &mut dyn Write,
    format: ReportFormat,
    session_id: &str,
    result: &FinalResult,
) -> Result<()> {
    match format {
        ReportFormat::Json => {
            let report = SessionReport {
                session: session_id,
                state: "finished",
                body: result,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        ReportFormat::Markdown => {
            writeln!(out, "## Wynik ({session_id})\n")?;
            writeln!(
                out,
                "- **{}**: {} / {}",
                result.game.display_name(),
                result.result,
                result.max_total
            )?;
        }
        ReportFormat::Console => {
            writeln!(
                out,
                "{} {} / {} {}",
                "🏆 Wynik:".bright_yellow().bold(),
                result.result.to_string().green().bold(),
                result.max_total,
                format!("({} · {session_id})", result.game.display_name()).dimmed()
            )?;
        }
    }
    Ok(())
}

pub fn write_game_report(
    out: &mut dyn Write,
    format: ReportFormat,
    report: &GameReport,
) -> Result<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        ReportFormat::Markdown => generate_markdown_report(out, report)?,
        ReportFormat::Console => generate_console_report(out, report)?,
    }
    Ok(())
}

fn generate_console_report(out: &mut dyn Write, report: &GameReport) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        format!("📊 {} - score card", report.game_name)
            .bright_cyan()
            .bold()
    )?;
    writeln!(out, "{}", "==============================".cyan())?;
    for line in &report.ends {
        let layout = match (line.archer_position, line.target) {
            (Some(position), Some(target)) => format!("{position}, {target}"),
            _ => String::new(),
        };
        writeln!(
            out,
            "  {:>2}. {:<24} {:<20} {:>4} / {:<4} Σ {}",
            line.end_number,
            line.distance,
            layout,
            line.score.to_string().green(),
            line.max_score,
            line.running_total
        )?;
    }
    writeln!(out)?;
    let pct = if report.result.max_total == 0 {
        0.0
    } else {
        f64::from(report.result.result) / f64::from(report.result.max_total) * 100.0
    };
    writeln!(
        out,
        "{} {} / {} ({pct:.1}%)",
        "🏆 Wynik:".bright_yellow().bold(),
        report.result.result.to_string().green().bold(),
        report.result.max_total
    )?;
    if let Some(seed) = report.seed {
        writeln!(out, "Seed: {seed}")?;
    }
    Ok(())
}

fn generate_markdown_report(out: &mut dyn Write, report: &GameReport) -> Result<()> {
    writeln!(out, "# {} - score card\n", report.game_name)?;
    writeln!(out, "- **Source**: {}", report.source)?;
    if let Some(seed) = report.seed {
        writeln!(out, "- **Seed**: {seed}")?;
    }
    writeln!(out, "- **Generated**: {}\n", report.generated_at)?;
    writeln!(out, "| End | Distance | Position | Target | Score | Max | Total |")?;
    writeln!(out, "|-----|----------|----------|--------|-------|-----|-------|")?;
    for line in &report.ends {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            line.end_number,
            line.distance,
            line.archer_position.unwrap_or("-"),
            line.target.unwrap_or("-"),
            line.score,
            line.max_score,
            line.running_total
        )?;
    }
    writeln!(
        out,
        "\n**Wynik: {} / {}**",
        report.result.result, report.result.max_total
    )?;
    Ok(())
}
