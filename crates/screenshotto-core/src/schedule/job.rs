//! Recurring job timing
//!
//! A [`JobSpec`] says how often to run ("every 2 to 4 hours at :30"); a
//! [`Job`] tracks when it last ran and when it runs next.
//!
//! Next-run rules:
//!
//! 1. The period is `interval` units, drawn at random from
//!    `interval..=latest` when a range was given. The next run is
//!    `now + period`.
//! 2. Weekday jobs (`every monday`) move to the next such weekday, a full
//!    week out when today is that weekday.
//! 3. An `at` time pins hour/minute/second for day and weekday jobs,
//!    minute/second for hourly jobs, and second for minutely jobs.
//! 4. On the first run (or after a gap longer than one period) a pinned time
//!    that is still ahead in the current day/hour/minute is used right away
//!    instead of waiting a full period. For day jobs this only applies to
//!    `every day`, not `every N days`.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Weekday};
use rand::Rng;

/// Interval unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl Unit {
    fn delta(self, n: u32) -> TimeDelta {
        let n = i64::from(n);
        match self {
            Unit::Seconds => TimeDelta::seconds(n),
            Unit::Minutes => TimeDelta::minutes(n),
            Unit::Hours => TimeDelta::hours(n),
            Unit::Days => TimeDelta::days(n),
            Unit::Weeks => TimeDelta::weeks(n),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Unit::Seconds => "seconds",
            Unit::Minutes => "minutes",
            Unit::Hours => "hours",
            Unit::Days => "days",
            Unit::Weeks => "weeks",
        }
    }
}

/// How often a job recurs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// Interval, or the lower bound of a randomized interval
    pub interval:  u32,
    /// Upper bound of a randomized interval
    pub latest:    Option<u32>,
    /// Interval unit; weekday jobs use [`Unit::Weeks`]
    pub unit:      Unit,
    /// Weekday for `every monday` style jobs
    pub start_day: Option<Weekday>,
    /// Pinned time of day / minute of hour / second of minute
    pub at_time:   Option<NaiveTime>,
}

impl JobSpec {
    /// `every <interval> <unit>`
    pub fn every(interval: u32, unit: Unit) -> Self {
        Self {
            interval,
            latest: None,
            unit,
            start_day: None,
            at_time: None,
        }
    }

    /// `every <weekday>`
    pub fn weekly_on(day: Weekday) -> Self {
        Self {
            start_day: Some(day),
            ..Self::every(1, Unit::Weeks)
        }
    }

    /// Randomizes the interval up to `latest`
    pub fn to(mut self, latest: u32) -> Self {
        self.latest = Some(latest);
        self
    }

    /// Pins the run time
    pub fn at(mut self, time: NaiveTime) -> Self {
        self.at_time = Some(time);
        self
    }
}

impl fmt::Display for JobSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every ")?;
        match self.start_day {
            Some(day) => write!(f, "{day}")?,
            None => {
                write!(f, "{}", self.interval)?;
                if let Some(latest) = self.latest {
                    write!(f, " to {latest}")?;
                }
                write!(f, " {}", self.unit.name())?;
            }
        }
        if let Some(at) = self.at_time {
            write!(f, " at {}", at.format("%H:%M:%S"))?;
        }
        Ok(())
    }
}

/// A scheduled job with its run history
#[derive(Debug, Clone)]
pub struct Job {
    spec:     JobSpec,
    period:   TimeDelta,
    last_run: Option<NaiveDateTime>,
    next_run: NaiveDateTime,
}

impl Job {
    /// Creates the job and schedules its first run relative to `now`
    pub fn new<R: Rng + ?Sized>(spec: JobSpec, now: NaiveDateTime, rng: &mut R) -> Self {
        let mut job = Self {
            period: spec.unit.delta(spec.interval),
            spec,
            last_run: None,
            next_run: now,
        };
        job.schedule_next(now, rng);
        job
    }

    /// The job's spec
    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    /// When the job runs next
    pub fn next_run(&self) -> NaiveDateTime {
        self.next_run
    }

    /// When the job last ran
    pub fn last_run(&self) -> Option<NaiveDateTime> {
        self.last_run
    }

    /// Whether the job is due at `now`
    pub fn should_run(&self, now: NaiveDateTime) -> bool {
        now >= self.next_run
    }

    /// Records a run finished at `now` and schedules the next one
    pub fn mark_run<R: Rng + ?Sized>(&mut self, now: NaiveDateTime, rng: &mut R) {
        self.last_run = Some(now);
        self.schedule_next(now, rng);
    }

    fn schedule_next<R: Rng + ?Sized>(&mut self, now: NaiveDateTime, rng: &mut R) {
        let spec = &self.spec;
        let interval = match spec.latest {
            Some(latest) if latest > spec.interval => rng.random_range(spec.interval..=latest),
            _ => spec.interval,
        };
        self.period = spec.unit.delta(interval);
        let mut next = now + self.period;

        if let Some(day) = spec.start_day {
            let mut days_ahead = i64::from(day.num_days_from_monday())
                - i64::from(next.weekday().num_days_from_monday());
            if days_ahead <= 0 {
                days_ahead += 7;
            }
            next += TimeDelta::days(days_ahead) - self.period;
        }

        if let Some(at) = spec.at_time {
            let daily = spec.unit == Unit::Days || spec.start_day.is_some();
            let hour = if daily { at.hour() } else { next.hour() };
            let minute = if daily || spec.unit == Unit::Hours { at.minute() } else { next.minute() };
            if let Some(pinned) = next.date().and_hms_opt(hour, minute, at.second()) {
                next = pinned;
            }

            let first_in_period = match self.last_run {
                None => true,
                Some(last) => next - last > self.period,
            };
            if first_in_period {
                let now_time = now.time();
                match spec.unit {
                    Unit::Days if at > now_time && spec.interval == 1 => {
                        next -= TimeDelta::days(1);
                    }
                    Unit::Hours
                        if (at.minute(), at.second()) > (now_time.minute(), now_time.second()) =>
                    {
                        next -= TimeDelta::hours(1);
                    }
                    Unit::Minutes if at.second() > now_time.second() => {
                        next -= TimeDelta::minutes(1);
                    }
                    _ => {}
                }
            }
        }

        if spec.start_day.is_some() && spec.at_time.is_some() && next - now >= TimeDelta::days(7)
        {
            next -= self.period;
        }

        self.next_run = next;
    }
}
