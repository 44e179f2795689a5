//! Schedule file parsing
//!
//! One job per line, blank lines and `#` comments ignored. Two spellings are
//! accepted, case-insensitively:
//!
//! ```text
//! every 10 minutes
//! every 2 to 4 hours at :30
//! every monday at 09:00
//! schedule.every(10).minutes.do(job)
//! schedule.every().monday.at("09:00").do(job)
//! ```

use std::sync::LazyLock;

use chrono::{NaiveTime, Weekday};
use regex::Regex;

use super::job::{JobSpec, Unit};
use crate::error::{AppError, AppResult};

static PLAIN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^every(?:\s+(\d+)(?:\s+to\s+(\d+))?)?\s+([a-z]+)(?:\s+at\s+(\S+))?$")
        .expect("static regex")
});

static CALL_CHAIN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?ix)^
        schedule\s*\.\s*every\s*\(\s*(\d*)\s*\)
        (?:\s*\.\s*to\s*\(\s*(\d+)\s*\))?
        \s*\.\s*([a-z]+)
        (?:\s*\.\s*at\s*\(\s*["']([^"']*)["']\s*\))?
        \s*\.\s*do\s*\(\s*job\s*\)\s*;?
        $"#,
    )
    .expect("static regex")
});

static DAILY_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}):(\d{2})(?::(\d{2}))?$").expect("static regex"));
static HOURLY_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})?:(\d{2})$").expect("static regex"));
static MINUTELY_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:(\d{2})$").expect("static regex"));

/// Parses a whole schedule file.
///
/// # Errors
///
/// [`AppError::ScheduleParse`] for the first line that is neither blank, a
/// comment, nor a valid job.
pub fn parse_schedule(text: &str) -> AppResult<Vec<JobSpec>> {
    let mut jobs = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let spec = parse_line(line).map_err(|reason| AppError::ScheduleParse {
            line: idx + 1,
            text: line.to_string(),
            reason,
        })?;
        tracing::debug!("Schedule line {}: {}", idx + 1, spec);
        jobs.push(spec);
    }
    Ok(jobs)
}

fn parse_line(line: &str) -> Result<JobSpec, String> {
    let caps = PLAIN_LINE
        .captures(line)
        .or_else(|| CALL_CHAIN_LINE.captures(line))
        .ok_or_else(|| "expected 'every [N [to M]] <unit> [at <time>]'".to_string())?;

    let number = |i: usize| -> Result<Option<u32>, String> {
        caps.get(i)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<u32>().map_err(|_| format!("'{s}' is not a valid number")))
            .transpose()
    };
    let interval = number(1)?;
    let latest = number(2)?;
    let word = caps[3].to_ascii_lowercase();
    let at = caps.get(4).map(|m| m.as_str());

    build_spec(interval, latest, &word, at)
}

enum Period {
    Singular(Unit),
    Plural(Unit),
    Weekday(Weekday),
}

fn period_for(word: &str) -> Option<Period> {
    let period = match word {
        "second" => Period::Singular(Unit::Seconds),
        "minute" => Period::Singular(Unit::Minutes),
        "hour" => Period::Singular(Unit::Hours),
        "day" => Period::Singular(Unit::Days),
        "week" => Period::Singular(Unit::Weeks),
        "seconds" => Period::Plural(Unit::Seconds),
        "minutes" => Period::Plural(Unit::Minutes),
        "hours" => Period::Plural(Unit::Hours),
        "days" => Period::Plural(Unit::Days),
        "weeks" => Period::Plural(Unit::Weeks),
        other => Period::Weekday(other.parse::<Weekday>().ok()?),
    };
    Some(period)
}

fn build_spec(
    interval: Option<u32>,
    latest: Option<u32>,
    word: &str,
    at: Option<&str>,
) -> Result<JobSpec, String> {
    let period = period_for(word).ok_or_else(|| format!("unknown unit '{word}'"))?;
    let n = interval.unwrap_or(1);
    if n == 0 {
        return Err("the interval must be at least 1".to_string());
    }

    let mut spec = match period {
        Period::Singular(unit) => {
            if n != 1 || latest.is_some() {
                return Err(format!("use '{word}s' for intervals other than 1"));
            }
            JobSpec::every(1, unit)
        }
        Period::Plural(unit) => JobSpec::every(n, unit),
        Period::Weekday(day) => {
            if n != 1 || latest.is_some() {
                return Err(format!("'{word}' jobs run weekly and take no interval"));
            }
            JobSpec::weekly_on(day)
        }
    };

    if let Some(latest) = latest {
        if latest < n {
            return Err(format!("the range end {latest} is below the start {n}"));
        }
        spec = spec.to(latest);
    }

    if let Some(at) = at {
        let time = parse_at(&spec, at)?;
        spec = spec.at(time);
    }

    Ok(spec)
}

fn parse_at(spec: &JobSpec, at: &str) -> Result<NaiveTime, String> {
    let field = |caps: &regex::Captures<'_>, i: usize| -> u32 {
        caps.get(i).and_then(|m| m.as_str().parse().ok()).unwrap_or(0)
    };

    let parsed = if spec.start_day.is_some() || spec.unit == Unit::Days {
        DAILY_AT
            .captures(at)
            .ok_or_else(|| format!("'{at}' should look like HH:MM or HH:MM:SS"))
            .map(|c| NaiveTime::from_hms_opt(field(&c, 1), field(&c, 2), field(&c, 3)))?
    } else if spec.unit == Unit::Hours {
        HOURLY_AT
            .captures(at)
            .ok_or_else(|| format!("'{at}' should look like :MM or MM:SS"))
            .map(|c| match c.get(1) {
                Some(_) => NaiveTime::from_hms_opt(0, field(&c, 1), field(&c, 2)),
                None => NaiveTime::from_hms_opt(0, field(&c, 2), 0),
            })?
    } else if spec.unit == Unit::Minutes {
        MINUTELY_AT
            .captures(at)
            .ok_or_else(|| format!("'{at}' should look like :SS"))
            .map(|c| NaiveTime::from_hms_opt(0, 0, field(&c, 1)))?
    } else {
        return Err("'at' only applies to minutes, hours, days or a weekday".to_string());
    };

    parsed.ok_or_else(|| format!("'{at}' is not a valid time"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn one(line: &str) -> JobSpec {
        let mut jobs = parse_schedule(line).unwrap();
        assert_eq!(jobs.len(), 1, "{line}");
        jobs.remove(0)
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let text = "# every 10 minutes\n\n   \n  # every day\n";
        assert!(parse_schedule(text).unwrap().is_empty());
    }

    #[test]
    fn test_plain_forms() {
        assert_eq!(one("every minute"), JobSpec::every(1, Unit::Minutes));
        assert_eq!(one("every 10 minutes"), JobSpec::every(10, Unit::Minutes));
        assert_eq!(one("every 2 to 4 hours"), JobSpec::every(2, Unit::Hours).to(4));
        assert_eq!(one("every weeks"), JobSpec::every(1, Unit::Weeks));
        assert_eq!(one("Every Monday"), JobSpec::weekly_on(Weekday::Mon));
    }

    #[test]
    fn test_at_forms() {
        assert_eq!(
            one("every day at 10:30"),
            JobSpec::every(1, Unit::Days).at(time(10, 30, 0))
        );
        assert_eq!(
            one("every sunday at 23:59:30"),
            JobSpec::weekly_on(Weekday::Sun).at(time(23, 59, 30))
        );
        assert_eq!(one("every hour at :15"), JobSpec::every(1, Unit::Hours).at(time(0, 15, 0)));
        assert_eq!(
            one("every 3 hours at 20:05"),
            JobSpec::every(3, Unit::Hours).at(time(0, 20, 5))
        );
        assert_eq!(one("every minute at :45"), JobSpec::every(1, Unit::Minutes).at(time(0, 0, 45)));
    }

    #[test]
    fn test_call_chain_forms() {
        assert_eq!(one("schedule.every(10).minutes.do(job)"), JobSpec::every(10, Unit::Minutes));
        assert_eq!(
            one("schedule.every(5).to(10).minutes.do(job)"),
            JobSpec::every(5, Unit::Minutes).to(10)
        );
        assert_eq!(
            one(r#"schedule.every().wednesday.at("13:15").do(job)"#),
            JobSpec::weekly_on(Weekday::Wed).at(time(13, 15, 0))
        );
        assert_eq!(
            one("schedule.every().day.at('10:30').do(job)"),
            JobSpec::every(1, Unit::Days).at(time(10, 30, 0))
        );
    }

    #[test]
    fn test_multiple_jobs_keep_order() {
        let jobs = parse_schedule("every day at 09:00\n# lunch\nevery day at 13:00\n").unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].at_time, Some(time(9, 0, 0)));
        assert_eq!(jobs[1].at_time, Some(time(13, 0, 0)));
    }

    #[test]
    fn test_error_reports_line_number() {
        let err = parse_schedule("every day\n\nevery fortnight\n").unwrap_err();
        match err {
            AppError::ScheduleParse { line, text, reason } => {
                assert_eq!(line, 3);
                assert_eq!(text, "every fortnight");
                assert!(reason.contains("fortnight"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_jobs_rejected() {
        for line in [
            "every 0 minutes",
            "every 2 minute",
            "every 2 mondays",
            "every 2 monday",
            "every 10 to 5 minutes",
            "every 10 seconds at :30",
            "every week at 10:00",
            "every day at 25:00",
            "every day at 9:00",
            "every hour at 10:00:00",
            "every minute at 10:00",
            "take a screenshot sometimes",
        ] {
            assert!(parse_schedule(line).is_err(), "{line} should be rejected");
        }
    }
}
