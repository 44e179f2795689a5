//! screenshotto: Capture the entire screen (all monitors) and save it
//!
//! There is no prompt. The whole operation is unattended; files are named
//! and saved according to the config file, which is generated on first run
//! in the user config directory.

use std::{
    io::{BufRead, Write},
    path::Path,
    process::ExitCode,
};

use anyhow::Result;
use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use screenshotto_core::{
    capture::create_default_backend,
    config::{ConfigPaths, load_or_create},
    error::AppError,
    logging::{self, LogHandle},
    model::version_string,
    schedule::{Scheduler, load_schedule, run_loop, write_default_schedule},
    util::launch::{edit_file, open_file},
    writer::save_screenshot,
};
use tracing::{debug, error};

const BIN_NAME: &str = env!("CARGO_BIN_NAME");

#[derive(Parser)]
#[command(name = "screenshotto")]
#[command(about = "Capture a screenshot of the entire screen (all monitors) and save it")]
#[command(long_about = "Capture a screenshot of the entire screen (all monitors) and save it.\n\n\
    There is no prompt. The entire operation is unattended, though you will see basic log \
    messages.\n\n\
    Files are named and saved according to options in the config file, which is generated \
    automatically on first run and can be found in the user config directory.")]
#[command(infer_subcommands = true)]
struct Cli {
    /// Keep the console window open after the command finishes
    #[arg(short = 'w', long)]
    show_window: bool,
    /// Show debug messages
    #[arg(long)]
    debug:       bool,
    /// Print version number
    #[arg(short = 'v', long)]
    version:     bool,
    #[command(subcommand)]
    command:     Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture and save a screenshot without user interaction
    #[command(visible_aliases = ["capture", "save", "ss"])]
    Screenshot,
    /// Open config file
    Config,
    /// Open log file
    Log,
    /// Run screenshot command on a schedule
    #[command(infer_subcommands = true)]
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
}

#[derive(Subcommand)]
enum ScheduleCommands {
    /// Open schedule file for editing
    Edit,
    /// Start processing schedule
    #[command(visible_alias = "start")]
    Run,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    execute(&cli, start, &mut std::io::stdin().lock(), &mut std::io::stdout()).await
}

/// Runs `cli` after `setup`, then waits for Enter on `input` when the window
/// should stay open, whether or not anything failed.
async fn execute<S, R, W>(cli: &Cli, setup: S, input: &mut R, out: &mut W) -> ExitCode
where
    S: FnOnce(&Cli) -> Result<(ConfigPaths, LogHandle), AppError>,
    R: BufRead,
    W: Write,
{
    let code = match setup(cli) {
        Ok((paths, log)) => match run(&cli, &paths, &log).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                report(&e);
                ExitCode::FAILURE
            }
        },
        // No logger yet; the error goes straight to stderr
        Err(e) => {
            eprintln!("{e}\n{}", e.remediation_hint());
            ExitCode::FAILURE
        }
    };

    if cli.show_window {
        keep_open(input, out);
    }
    code
}

/// Locates the user directories and installs logging
fn start(cli: &Cli) -> Result<(ConfigPaths, LogHandle), AppError> {
    let paths = ConfigPaths::discover()?;
    let log = logging::init(&paths.log_dir)?;
    debug!("{}", version_string());

    if cli.show_window {
        debug!("Force show window mode");
    }
    if cli.debug {
        debug!("Debug mode");
    }
    // Always called; it releases the buffered console output
    log.set_debug(cli.debug);
    Ok((paths, log))
}

async fn run(cli: &Cli, paths: &ConfigPaths, log: &LogHandle) -> Result<()> {
    if cli.version {
        println!("{}", version_string());
    }

    let Some(command) = &cli.command else {
        if !cli.version {
            debug!("No subcommand. Showing help.");
            Cli::command().print_help()?;
        }
        return Ok(());
    };

    match command {
        Commands::Screenshot => screenshot(paths).await,
        Commands::Config => open_config(paths).await,
        Commands::Log => {
            debug!("Opening log file");
            open_file(log.log_file()).await?;
            Ok(())
        }
        Commands::Schedule { command } => match command {
            ScheduleCommands::Edit => schedule_edit(&paths.schedule_file).await,
            ScheduleCommands::Run => schedule_run(paths).await,
        },
    }
}

async fn screenshot(paths: &ConfigPaths) -> Result<()> {
    let config = load_or_create(paths)?;
    let backend = create_default_backend()?;

    let path = save_screenshot(backend.as_ref(), &config, Local::now().naive_local()).await?;
    println!("\nScreenshot saved to:\n\t{}", path.display());
    Ok(())
}

async fn open_config(paths: &ConfigPaths) -> Result<()> {
    load_or_create(paths)?;
    edit_file(&paths.config_file).await?;
    Ok(())
}

async fn schedule_edit(schedule_file: &Path) -> Result<()> {
    debug!("schedule edit");
    write_default_schedule(schedule_file)?;
    edit_file(schedule_file).await?;
    Ok(())
}

async fn schedule_run(paths: &ConfigPaths) -> Result<()> {
    debug!("schedule run");
    if !paths.schedule_file.exists() {
        println!("You don't have a schedule set up!\n");
        schedule_edit(&paths.schedule_file).await?;
    }

    let config = load_or_create(paths)?;
    let specs = load_schedule(&paths.schedule_file)?;
    let backend = create_default_backend()?;
    let scheduler = Scheduler::new(specs, Local::now().naive_local());

    let edit_command = format!("{BIN_NAME} schedule edit");
    run_loop(scheduler, backend.as_ref(), &config, &edit_command).await?;
    Ok(())
}

fn report(e: &anyhow::Error) {
    match e.downcast_ref::<AppError>() {
        Some(app) => error!("{app}\n{}", app.remediation_hint()),
        None => error!("{e:#}"),
    }
}

fn keep_open(input: &mut impl BufRead, out: &mut impl Write) {
    let _ = write!(out, "\nPress enter to close...");
    let _ = out.flush();
    let mut line = String::new();
    let _ = input.read_line(&mut line);
}
