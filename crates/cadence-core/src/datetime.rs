use std::fs;
use std::path::PathBuf;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  Duration,
  Local,
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;

use crate::config::Config;
use crate::error::CalendarError;

const TIMEZONE_CONFIG_FILE: &str =
  "cadence-time.toml";
const TIMEZONE_ENV_VAR: &str =
  "CADENCE_TIMEZONE";
const TIMEZONE_CONFIG_ENV_VAR: &str =
  "CADENCE_TIME_CONFIG";

#[derive(Debug, Deserialize)]
struct TimezoneConfig {
  timezone: Option<String>,
  time:     Option<TimezoneSection>
}

#[derive(Debug, Deserialize)]
struct TimezoneSection {
  timezone: Option<String>
}

/// Source of the wall-clock used by
/// every now-dependent computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalendarClock {
  /// The operating system's local
  /// time.
  System,
  /// Current instant seen from a
  /// named IANA zone.
  Zone(Tz),
  /// A pinned instant.
  Fixed(NaiveDateTime)
}

impl CalendarClock {
  #[tracing::instrument(skip(cfg))]
  pub fn resolve(
    cfg: &Config
  ) -> anyhow::Result<Self> {
    if let Some(raw) = cfg.get("today")
    {
      let today = parse_date_expr(
        &raw,
        Local::now().naive_local()
      )
      .with_context(|| {
        format!(
          "invalid rc.today value: \
           {raw}"
        )
      })?;
      tracing::info!(
        today = %today,
        "pinned calendar clock"
      );
      return Ok(CalendarClock::Fixed(
        today.and_time(NaiveTime::MIN)
      ));
    }

    Ok(
      match resolve_timezone(cfg) {
        | Some(tz) => {
          CalendarClock::Zone(tz)
        }
        | None => CalendarClock::System
      }
    )
  }

  #[must_use]
  pub fn now(&self) -> NaiveDateTime {
    match self {
      | CalendarClock::System => {
        Local::now().naive_local()
      }
      | CalendarClock::Zone(tz) => {
        Utc::now()
          .with_timezone(tz)
          .naive_local()
      }
      | CalendarClock::Fixed(at) => *at
    }
  }

  #[must_use]
  pub fn today(&self) -> NaiveDate {
    self.now().date()
  }
}

fn resolve_timezone(
  cfg: &Config
) -> Option<Tz> {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) = parse_timezone(
      &raw,
      TIMEZONE_ENV_VAR
    )
  {
    return Some(tz);
  }

  if let Some(raw) = cfg.get("timezone")
    && let Some(tz) =
      parse_timezone(&raw, "rc.timezone")
  {
    return Some(tz);
  }

  if let Some(path) =
    timezone_config_path()
    && let Some(tz) =
      load_timezone_from_file(&path)
  {
    return Some(tz);
  }

  tracing::debug!(
    "no timezone configured; using \
     system local time"
  );
  None
}

fn timezone_config_path()
-> Option<PathBuf> {
  if let Ok(raw) = std::env::var(
    TIMEZONE_CONFIG_ENV_VAR
  ) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  std::env::current_dir().ok().map(
    |dir| {
      dir.join(TIMEZONE_CONFIG_FILE)
    }
  )
}

fn load_timezone_from_file(
  path: &PathBuf
) -> Option<Tz> {
  if !path.exists() {
    tracing::debug!(
      file = %path.display(),
      "timezone config file not found"
    );
    return None;
  }

  let raw = match fs::read_to_string(
    path
  ) {
    | Ok(raw) => raw,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed reading timezone config file"
      );
      return None;
    }
  };

  let parsed = match toml::from_str::<
    TimezoneConfig
  >(&raw)
  {
    | Ok(parsed) => parsed,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed parsing timezone config file"
      );
      return None;
    }
  };

  let timezone =
    parsed.timezone.or_else(|| {
      parsed.time.and_then(|section| {
        section.timezone
      })
    });
  let Some(timezone) = timezone else {
    tracing::warn!(
      file = %path.display(),
      "timezone config had no timezone field"
    );
    return None;
  };

  parse_timezone(
    timezone.as_str(),
    &format!("file:{}", path.display())
  )
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured calendar timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// Whole days between two calendar
/// days, negative when `later` is
/// before `earlier`.
#[must_use]
pub fn date_diff(
  later: NaiveDate,
  earlier: NaiveDate
) -> i64 {
  (later - earlier).num_days()
}

/// Whether two values fall on the same
/// calendar day, ignoring time of day.
#[must_use]
pub fn is_same_day<A, B>(
  a: &A,
  b: &B
) -> bool
where
  A: Datelike,
  B: Datelike
{
  a.year() == b.year()
    && a.ordinal() == b.ordinal()
}

pub fn add_days(
  date: NaiveDate,
  days: i64
) -> Result<NaiveDate, CalendarError> {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .ok_or(CalendarError::DateOutOfRange)
}

/// Last day of a challenge starting on
/// `start` that lasts `duration` days;
/// a zero duration ends on its start
/// day.
pub fn effective_end_date(
  start: NaiveDate,
  duration: u32
) -> Result<NaiveDate, CalendarError> {
  let span = if duration == 0 {
    0
  } else {
    i64::from(duration) - 1
  };
  add_days(start, span)
}

#[tracing::instrument(skip(now), fields(input = input))]
pub fn parse_date_expr(
  input: &str,
  now: NaiveDateTime
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();
  let today = now.date();

  match lower.as_str() {
    | "today" | "now" => {
      return Ok(today);
    }
    | "tomorrow" => {
      return add_days(today, 1)
        .context("tomorrow");
    }
    | "yesterday" => {
      return add_days(today, -1)
        .context("yesterday");
    }
    | _ => {}
  }

  if let Some(target_weekday) =
    parse_weekday_name(&lower)
  {
    return Ok(next_weekday_date(
      today,
      target_weekday
    ));
  }

  let rel_re = Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dw])$")
        .map_err(|e| anyhow!("internal regex compile failure: {e}"))?;

  if let Some(caps) =
    rel_re.captures(&lower)
  {
    let sign = caps
      .name("sign")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative sign")
      })?;
    let num: i64 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let unit = caps
      .name("unit")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative unit")
      })?;

    let days = match unit {
      | "d" => num,
      | "w" => num.saturating_mul(7),
      | _ => {
        return Err(anyhow!(
          "unknown relative unit: \
           {unit}"
        ))
      }
    };
    let days =
      if sign == "-" { -days } else { days };

    return add_days(today, days)
      .with_context(|| {
        format!(
          "relative date out of \
           range: {input}"
        )
      });
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Ok(date);
  }

  if let Ok(dt) =
    chrono::DateTime::parse_from_rfc3339(
      token
    )
  {
    return Ok(dt.date_naive());
  }

  Err(anyhow!(
    "unrecognized date expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: \
     today/tomorrow/yesterday, \
     weekday names (e.g. monday), \
     +Nd/-Nd/+Nw/-Nw, YYYY-MM-DD, \
     RFC3339"
  })
}

fn parse_weekday_name(
  token: &str
) -> Option<Weekday> {
  match token.trim() {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "tuesday" | "tue" | "tues" => {
      Some(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Some(Weekday::Wed)
    }
    | "thursday" | "thu" | "thur"
    | "thurs" => Some(Weekday::Thu),
    | "friday" | "fri" => {
      Some(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}

fn next_weekday_date(
  from: NaiveDate,
  target: Weekday
) -> NaiveDate {
  let from_idx = from
    .weekday()
    .num_days_from_monday()
    as i64;
  let target_idx = target
    .num_days_from_monday()
    as i64;
  let mut delta =
    (7 + target_idx - from_idx) % 7;
  if delta == 0 {
    delta = 7;
  }
  from
    .checked_add_signed(Duration::days(
      delta
    ))
    .unwrap_or(from)
}
