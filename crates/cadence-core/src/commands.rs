use std::path::Path;

use anyhow::{Context, anyhow};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::cli::Invocation;
use crate::config::Config;
use crate::datetime::CalendarClock;
use crate::document::ChallengeDocument;
use crate::error::CalendarError;
use crate::format::{format_frequency, month_abbrev};
use crate::render::{Renderer, StatusSummary};
use crate::score::compute_score;
use crate::streak::longest_streak;
use crate::temporal::{is_older_than_a_week, is_past};
use crate::weeks::{WeekRow, build_weeks};

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "grid",
        "status",
        "score",
        "streak",
        "frequency",
        "month",
        "export",
        "_show",
        "help",
        "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(cfg, renderer, clock, inv))]
pub fn dispatch(
    cfg: &Config,
    renderer: &mut Renderer,
    clock: &CalendarClock,
    inv: Invocation,
) -> anyhow::Result<()> {
    let command = inv.command.as_str();
    debug!(command, args = ?inv.command_args, "dispatching command");

    match command {
        "grid" => cmd_grid(renderer, clock, &inv.command_args),
        "status" => cmd_status(renderer, clock, &inv.command_args),
        "score" => cmd_score(clock, &inv.command_args),
        "streak" => cmd_streak(&inv.command_args),
        "frequency" => cmd_frequency(&inv.command_args),
        "month" => cmd_month(&inv.command_args),
        "export" => cmd_export(clock, &inv.command_args),
        "_show" => cmd_show(cfg),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

fn load_document(args: &[String]) -> anyhow::Result<ChallengeDocument> {
    let path = args
        .first()
        .ok_or_else(|| anyhow!("missing challenge file argument"))?;
    ChallengeDocument::load(Path::new(path))
}

fn weeks_for(doc: &ChallengeDocument, clock: &CalendarClock) -> anyhow::Result<Vec<WeekRow>> {
    let challenge = &doc.challenge;
    let weeks = build_weeks(
        challenge.duration,
        challenge.start_date,
        challenge.end_date()?,
        clock.now(),
    )?;
    Ok(weeks)
}

/// Score of the document, or `None` when no score is defined yet.
fn score_for(doc: &ChallengeDocument, clock: &CalendarClock) -> anyhow::Result<Option<i64>> {
    let challenge = &doc.challenge;
    let completions = u32::try_from(doc.completions.len()).context("too many completions")?;
    match compute_score(challenge, completions, challenge.end_date()?, clock.today()) {
        Ok(score) => Ok(Some(score)),
        Err(err @ CalendarError::UndefinedScore { .. }) => {
            warn!(error = %err, "no score available");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn summary_for(doc: &ChallengeDocument, clock: &CalendarClock) -> anyhow::Result<StatusSummary> {
    let challenge = &doc.challenge;
    let today = clock.today();

    Ok(StatusSummary {
        name: doc.display_name().to_string(),
        frequency: format_frequency(
            challenge.frequency,
            challenge.per_week,
            challenge.per_month,
            &challenge.specific_days,
        ),
        start: challenge.start_date,
        end: challenge.end_date()?,
        is_past: is_past(challenge, today)?,
        is_archivable: is_older_than_a_week(challenge, today)?,
        score: score_for(doc, clock)?,
        longest_streak: longest_streak(&doc.completions),
        completions: doc.completions.len(),
    })
}

#[instrument(skip(renderer, clock, args))]
fn cmd_grid(renderer: &mut Renderer, clock: &CalendarClock, args: &[String]) -> anyhow::Result<()> {
    info!("command grid");
    let doc = load_document(args)?;
    let weeks = weeks_for(&doc, clock)?;
    renderer.print_weeks(&weeks, &doc.completions)
}

#[instrument(skip(renderer, clock, args))]
fn cmd_status(renderer: &mut Renderer, clock: &CalendarClock, args: &[String]) -> anyhow::Result<()> {
    info!("command status");
    let doc = load_document(args)?;
    let summary = summary_for(&doc, clock)?;
    renderer.print_summary(&summary)
}

#[instrument(skip(clock, args))]
fn cmd_score(clock: &CalendarClock, args: &[String]) -> anyhow::Result<()> {
    let doc = load_document(args)?;
    match score_for(&doc, clock)? {
        Some(score) => println!("{score}"),
        None => println!("-"),
    }
    Ok(())
}

#[instrument(skip(args))]
fn cmd_streak(args: &[String]) -> anyhow::Result<()> {
    let doc = load_document(args)?;
    println!("{}", longest_streak(&doc.completions));
    Ok(())
}

#[instrument(skip(args))]
fn cmd_frequency(args: &[String]) -> anyhow::Result<()> {
    let doc = load_document(args)?;
    let challenge = &doc.challenge;
    println!(
        "{}",
        format_frequency(
            challenge.frequency,
            challenge.per_week,
            challenge.per_month,
            &challenge.specific_days,
        )
    );
    Ok(())
}

#[instrument(skip(args))]
fn cmd_month(args: &[String]) -> anyhow::Result<()> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow!("missing month index argument"))?;
    let index: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid month index: {raw}"))?;
    println!("{}", month_abbrev(index)?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ExportView<'a> {
    name: &'a str,
    frequency: String,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    is_past: bool,
    is_archivable: bool,
    score: Option<i64>,
    longest_streak: u32,
    weeks: Vec<WeekRow>,
}

#[instrument(skip(clock, args))]
fn cmd_export(clock: &CalendarClock, args: &[String]) -> anyhow::Result<()> {
    let doc = load_document(args)?;
    let summary = summary_for(&doc, clock)?;
    let view = ExportView {
        name: doc.display_name(),
        frequency: summary.frequency,
        start: summary.start,
        end: summary.end,
        is_past: summary.is_past,
        is_archivable: summary.is_archivable,
        score: summary.score,
        longest_streak: summary.longest_streak,
        weeks: weeks_for(&doc, clock)?,
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn cmd_show(cfg: &Config) -> anyhow::Result<()> {
    let mut entries: Vec<(&String, &String)> = cfg.iter().collect();
    entries.sort();
    for (key, value) in entries {
        println!("{key}={value}");
    }
    for file in &cfg.loaded_files {
        println!("# loaded {}", file.display());
    }
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "usage: cadence [-v] [-q] [--rc key=value] [--cadencerc PATH] <command> [args]\n\n\
         commands:\n  \
         grid <file>       week grid of the challenge\n  \
         status <file>     frequency, range, state, score and streak\n  \
         score <file>      completion percentage\n  \
         streak <file>     longest run of consecutive days\n  \
         frequency <file>  readable recurrence\n  \
         month <index>     abbreviation of a zero-based month\n  \
         export <file>     status and grid as json\n  \
         _show             effective configuration\n  \
         help | version"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviations_resolve_uniquely() {
        let known = known_command_names();
        assert_eq!(expand_command_abbrev("gr", &known), Some("grid"));
        assert_eq!(expand_command_abbrev("sc", &known), Some("score"));
        assert_eq!(expand_command_abbrev("st", &known), None);
        assert_eq!(expand_command_abbrev("xyz", &known), None);
    }

    #[test]
    fn summary_marks_undefined_score_as_missing() {
        let doc = ChallengeDocument::parse(
            r#"{"challenge": {"start_date": "2026-10-16", "duration": 30, "frequency": "daily"},
                "completions": [{"date": "2026-10-16"}]}"#,
        )
        .expect("parse document");
        let clock = CalendarClock::Fixed(
            chrono::NaiveDate::from_ymd_opt(2026, 10, 16)
                .and_then(|d| d.and_hms_opt(8, 0, 0))
                .expect("valid time"),
        );
        let summary = summary_for(&doc, &clock).expect("summary");
        assert_eq!(summary.score, None);
        assert_eq!(summary.longest_streak, 1);
        assert!(!summary.is_past);
    }
}
