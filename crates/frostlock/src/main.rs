//! `frostlock` - Wayland screen locker
//!
//! This binary captures every output, blurs it and shows a PAM-backed
//! password prompt on top until the session is unlocked.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use tracing::error;

use cli::{Cli, Command, ConfigCommand, LockCommand};
use frostlock_core::{init_logging, Config, GrimCapturer, LockSession, SwayOutputs};

// Platform-specific imports using conditional compilation
#[cfg(target_os = "linux")]
use frostlock_linux as platform;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if is_startup_failure(&e) {
                error!("{e:#}; the screen was not locked");
            } else {
                error!("{e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Whether the error stopped the session before any lock window appeared.
fn is_startup_failure(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<frostlock_core::Error>())
        .any(frostlock_core::Error::is_startup_error)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone();

    match cli.command_or_default() {
        // Config commands report on a file that may not load
        Command::Config(config_cmd) => handle_config(config_path, config_cmd),
        Command::Lock(lock_cmd) => handle_lock(load_config(config_path)?, &lock_cmd),
        Command::Outputs(outputs_cmd) => {
            handle_outputs(&load_config(config_path)?, outputs_cmd.json)
        }
        Command::Prepare => handle_prepare(&load_config(config_path)?),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("failed to load configuration")
}

fn sources(config: &Config) -> (SwayOutputs, GrimCapturer) {
    (
        SwayOutputs::new(&config.capture.outputs_command),
        GrimCapturer::new(&config.capture.screenshot_command),
    )
}

#[cfg(target_os = "linux")]
fn handle_lock(mut config: Config, cmd: &LockCommand) -> anyhow::Result<()> {
    use std::sync::Arc;

    if cmd.windowed {
        config.window.fullscreen = false;
    }
    if cmd.keep_images {
        config.capture.keep_images = true;
    }

    tracing::info!(platform = platform::platform_name(), "starting lock session");
    platform::init()?;

    let user = match &config.auth.user {
        Some(user) => user.clone(),
        None => platform::current_username()?,
    };
    let authenticator = Arc::new(platform::PamAuthenticator::new(&config.auth.service));
    let mut presenter = platform::GtkPresenter::new(&config)?;

    let (outputs, capturer) = sources(&config);
    let reason = LockSession::new(&config, &outputs, &capturer)
        .run(&mut presenter, authenticator, &user)
        .context("lock session failed")?;
    tracing::info!(%reason, "frostlock exiting");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn handle_lock(_config: Config, _cmd: &LockCommand) -> anyhow::Result<()> {
    anyhow::bail!("locking is only supported on Linux with a Wayland compositor")
}

fn handle_outputs(config: &Config, json: bool) -> anyhow::Result<()> {
    let (outputs, capturer) = sources(config);
    let found = LockSession::new(config, &outputs, &capturer).outputs()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        for output in &found {
            println!("{output}");
        }
    }
    Ok(())
}

fn handle_prepare(config: &Config) -> anyhow::Result<()> {
    let (outputs, capturer) = sources(config);
    let images = LockSession::new(config, &outputs, &capturer)
        .prepare()
        .context("failed to prepare lock images")?;
    for image in &images {
        println!("{}\t{}", image.output, image.path.display());
    }
    Ok(())
}

fn handle_config(path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_config(&config);
            }
        }
        ConfigCommand::Path => {
            println!(
                "{}",
                path.unwrap_or_else(Config::default_config_path).display()
            );
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn print_config(config: &Config) {
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("[Capture]");
    println!("  Outputs command:    {}", config.capture.outputs_command);
    println!("  Screenshot command: {}", config.capture.screenshot_command);
    println!("  Image directory:    {}", config.image_dir().display());
    println!("  Blur sigma:         {}", config.capture.blur_sigma);
    println!("  Keep images:        {}", config.capture.keep_images);
    println!();
    println!("[Auth]");
    println!("  PAM service:        {}", config.auth.service);
    println!(
        "  User:               {}",
        config.auth.user.as_deref().unwrap_or("(current user)")
    );
    println!();
    println!("[Input]");
    println!("  Quit key:           {}", config.input.quit_key);
    println!();
    println!("[Timing]");
    println!("  Typing revert (ms): {}", config.timing.typing_revert_ms);
    println!("  Wrong revert (ms):  {}", config.timing.wrong_revert_ms);
    println!("  Clear revert (ms):  {}", config.timing.clear_revert_ms);
    println!("  Redraw (ms):        {}", config.timing.redraw_interval_ms);
    println!();
    println!("[Indicator]");
    println!("  Radius:             {}", config.indicator.radius);
    println!("  Line width:         {}", config.indicator.line_width);
    println!("  Clock format:       {}", config.indicator.clock_format);
    println!("  Date format:        {}", config.indicator.date_format);
    println!();
    println!("[Window]");
    println!("  Fullscreen:         {}", config.window.fullscreen);
}
