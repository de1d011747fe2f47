use std::collections::HashSet;
use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::{Datelike, NaiveDate};
use unicode_width::UnicodeWidthStr;

use crate::challenge::Completion;
use crate::config::Config;
use crate::format::month_abbrev;
use crate::weeks::{WEEK_MASK, WeekRow};

/// Everything `status` prints about one challenge.
#[derive(Debug, Clone)]
pub struct StatusSummary {
    pub name: String,
    pub frequency: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub is_past: bool,
    pub is_archivable: bool,
    pub score: Option<i64>,
    pub longest_streak: u32,
    pub completions: usize,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, weeks, completions))]
    pub fn print_weeks(&mut self, weeks: &[WeekRow], completions: &[Completion]) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_weeks(out, weeks, completions)
    }

    pub fn write_weeks<W: Write>(
        &self,
        writer: W,
        weeks: &[WeekRow],
        completions: &[Completion],
    ) -> anyhow::Result<()> {
        let done: HashSet<NaiveDate> = completions.iter().map(|c| c.date).collect();

        let mut headers = vec!["Week".to_string()];
        headers.extend(WEEK_MASK.iter().map(|label| label.to_string()));

        let mut rows = Vec::with_capacity(weeks.len());
        for week in weeks {
            let week_label = match week.monday() {
                Some(monday) => format!("{} {:>2}", month_abbrev(monday.month0())?, monday.day()),
                None => "-".to_string(),
            };
            let mut row = vec![week_label];

            for cell in &week.days {
                let day = cell.day();
                let text = format!("{:>2}", day.day());
                let text = if !cell.is_in_range() {
                    self.paint(" .", "2")
                } else if done.contains(&day) {
                    self.paint(&text, "32")
                } else if cell.is_in_future {
                    self.paint(&text, "2")
                } else {
                    text
                };
                row.push(text);
            }
            rows.push(row);
        }

        write_table(writer, headers, rows)
    }

    #[tracing::instrument(skip(self, summary))]
    pub fn print_summary(&mut self, summary: &StatusSummary) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_summary(out, summary)
    }

    pub fn write_summary<W: Write>(&self, mut out: W, summary: &StatusSummary) -> anyhow::Result<()> {
        let state = if summary.is_archivable {
            self.paint("archived", "2")
        } else if summary.is_past {
            self.paint("finished", "33")
        } else {
            self.paint("active", "32")
        };
        let score = summary
            .score
            .map(|score| format!("{score}%"))
            .unwrap_or_else(|| "-".to_string());

        writeln!(out, "name       {}", summary.name)?;
        writeln!(out, "frequency  {}", summary.frequency)?;
        writeln!(
            out,
            "range      {} - {}",
            short_date(summary.start)?,
            short_date(summary.end)?
        )?;
        writeln!(out, "state      {state}")?;
        writeln!(out, "score      {score}")?;
        writeln!(out, "streak     {}", summary.longest_streak)?;
        writeln!(out, "done       {}", summary.completions)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn short_date(date: NaiveDate) -> anyhow::Result<String> {
    Ok(format!("{} {} {}", date.day(), month_abbrev(date.month0())?, date.year()))
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
