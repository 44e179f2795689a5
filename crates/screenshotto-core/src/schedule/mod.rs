//! Recurring screenshots
//!
//! The schedule file lists jobs one per line (see [`parse`]). `schedule run`
//! loads it into a [`Scheduler`] and polls once a second, showing a
//! countdown until the next capture:
//!
//! ```text
//! Next screenshot will be captured in 4 minutes...
//! ```
//!
//! The loop only stops when the process is terminated.

use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{Local, NaiveDateTime};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    capture::ScreenCapture,
    config::Config,
    error::{AppError, AppResult},
    writer::save_screenshot,
};

pub mod humanize;
pub mod job;
pub mod parse;

pub use job::{Job, JobSpec, Unit};
pub use parse::parse_schedule;

/// Written on first use; every example is commented out.
pub const DEFAULT_SCHEDULE: &str = r#"
# Uncomment one or more of the example lines below, or add your own here.
# Lines are case-insensitive; "at" pins the time of day (days, weekdays),
# the minute (":MM" for hours) or the second (":SS" for minutes).

#every second
#every 10 seconds
#every 30 to 60 seconds
#every minute
#every 10 minutes
#every 5 to 10 minutes
#every minute at :30
#every hour
#every 6 hours
#every 6 to 12 hours
#every hour at :15
#every day
#every day at 06:30
#every 2 days
#every 2 days at 15:00
#every week
#every 2 weeks
#every monday
#every tuesday
#every wednesday
#every thursday
#every friday
#every saturday
#every sunday at 23:59

# The call-chain spelling works too:
#schedule.every(10).minutes.do(job)
#schedule.every().sunday.at("23:59").do(job)
"#;

/// Terminal width used when the real one cannot be determined
const FALLBACK_WIDTH: usize = 80;

/// Writes [`DEFAULT_SCHEDULE`] to `path` unless the file already exists.
///
/// Returns whether the file was created.
pub fn write_default_schedule(path: &Path) -> AppResult<bool> {
    if path.exists() {
        return Ok(false);
    }
    tracing::debug!("Writing default schedule to '{}'", path.display());
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| AppError::ConfigIo {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, DEFAULT_SCHEDULE).map_err(|source| AppError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Reads and parses the schedule file at `path`.
pub fn load_schedule(path: &Path) -> AppResult<Vec<JobSpec>> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_schedule(&text)
}

/// The set of scheduled jobs
pub struct Scheduler {
    jobs: Vec<Job>,
    rng:  StdRng,
}

impl Scheduler {
    /// Schedules every job relative to `now`, randomizing intervals from OS
    /// entropy.
    pub fn new(specs: Vec<JobSpec>, now: NaiveDateTime) -> Self {
        Self::with_rng(specs, now, StdRng::from_os_rng())
    }

    /// Like [`Scheduler::new`] with a deterministic interval generator
    pub fn with_seed(specs: Vec<JobSpec>, now: NaiveDateTime, seed: u64) -> Self {
        Self::with_rng(specs, now, StdRng::seed_from_u64(seed))
    }

    fn with_rng(specs: Vec<JobSpec>, now: NaiveDateTime, mut rng: StdRng) -> Self {
        let jobs = specs.into_iter().map(|spec| Job::new(spec, now, &mut rng)).collect();
        Self { jobs, rng }
    }

    /// Whether there is nothing to run
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// The earliest next run across all jobs
    pub fn next_run(&self) -> Option<NaiveDateTime> {
        self.jobs.iter().map(Job::next_run).min()
    }

    /// Runs `task` once for every job due at `clock()`, earliest first.
    ///
    /// Each job is rescheduled from the clock reading taken after its run.
    /// Returns the number of runs. The first failing run stops the pass and
    /// its error is returned; that job is not rescheduled.
    pub async fn run_pending<C, F>(&mut self, clock: C, mut task: F) -> AppResult<usize>
    where
        C: Fn() -> NaiveDateTime,
        F: AsyncFnMut() -> AppResult<()>,
    {
        let now = clock();
        let mut due: Vec<usize> =
            (0..self.jobs.len()).filter(|&i| self.jobs[i].should_run(now)).collect();
        due.sort_by_key(|&i| self.jobs[i].next_run());

        for &idx in &due {
            tracing::debug!("Running job '{}'", self.jobs[idx].spec());
            task().await?;
            let finished = clock();
            self.jobs[idx].mark_run(finished, &mut self.rng);
            let job = &self.jobs[idx];
            tracing::debug!("Next run of '{}' at {}", job.spec(), job.next_run());
        }
        Ok(due.len())
    }
}

/// `"Next screenshot will be captured in 4 minutes..."`
pub fn countdown_text(next: NaiveDateTime, now: NaiveDateTime) -> String {
    let when = match humanize::humanize(next, now).as_str() {
        "just now" => "imminently".to_string(),
        "in seconds" => format!("in {} seconds", (next - now).num_seconds()),
        other => other.to_string(),
    };
    format!("Next screenshot will be captured {when}...")
}

/// Current terminal width in columns
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _)| usize::from(cols))
        .ok()
        .filter(|&cols| cols > 0)
        .unwrap_or(FALLBACK_WIDTH)
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// One poll of the schedule loop.
///
/// Prints the countdown over the current line, then captures for every due
/// job: the line is blanked, the screenshot saved and its path printed.
/// Returns the saved paths.
pub async fn tick<C, W>(
    scheduler: &mut Scheduler,
    backend: &dyn ScreenCapture,
    config: &Config,
    clock: C,
    width: usize,
    out: &mut W,
) -> AppResult<Vec<PathBuf>>
where
    C: Fn() -> NaiveDateTime,
    W: Write,
{
    if let Some(next) = scheduler.next_run() {
        write!(out, "{:<width$}", format!("\r{}", countdown_text(next, clock())))?;
        out.flush()?;
    }

    let mut saved = Vec::new();
    scheduler
        .run_pending(&clock, async || {
            write!(out, "\r{:<width$}", " ")?;
            let path = save_screenshot(backend, config, clock()).await?;
            writeln!(out, "\nScreenshot saved to:\n\t{}", path.display())?;
            writeln!(out)?;
            out.flush()?;
            saved.push(path);
            Ok::<(), AppError>(())
        })
        .await?;
    Ok(saved)
}

/// Runs the schedule until the process is terminated.
///
/// With no jobs, prints a hint naming `edit_command` and returns.
pub async fn run_loop(
    mut scheduler: Scheduler,
    backend: &dyn ScreenCapture,
    config: &Config,
    edit_command: &str,
) -> AppResult<()> {
    if scheduler.is_empty() {
        tracing::debug!("Schedule has no jobs defined");
        println!("Schedule has no jobs defined! Maybe try '{edit_command}'");
        return Ok(());
    }

    let width = terminal_width();
    let mut stdout = std::io::stdout();
    loop {
        tick(&mut scheduler, backend, config, local_now, width, &mut stdout).await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
