// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod launch;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::build::{
    compile_if_needed, initial_build, BuildEventBus, BuildStepChain, CommandInvoker, LogListener,
    RecordedStep, StepRecorder,
};
use crate::cli::CliArgs;
use crate::config::{load_from_path, project_dir_of, validate_config, ConfigFile};
use crate::engine::{listen_for_shutdown, LoopExit, LoopOptions, RedeployLoop, ShutdownSignal};
use crate::exec::ProcessSupervisor;
use crate::fs::RealFileSystem;
use crate::launch::{command_from_config, LaunchCommand};
use crate::watch::detector::matching_paths;
use crate::watch::{ChangeDetector, WatchSpec};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (with `--no-redeploy` applied before validation)
/// - launch command computation
/// - the initial build and step recording
/// - change detector, process supervisor and build chain
/// - SIGINT / SIGTERM handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let mut raw = load_from_path(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if args.no_redeploy {
        raw.redeploy.enabled = false;
    }
    let cfg = validate_config(raw, project_dir_of(&config_path))?;

    let command = command_from_config(&cfg)?;
    let recorded = configured_steps(&cfg);

    if args.dry_run {
        print_dry_run(&cfg, &command, &recorded)?;
        return Ok(());
    }

    let mut invoker = CommandInvoker::from_config(&cfg);
    compile_if_needed(&cfg.output_dir(), &mut invoker).await?;

    // The recorder is one subscriber among others; we keep a handle to read
    // the recording after the initial build.
    let recorder = StepRecorder::new();
    let mut bus = BuildEventBus::new();
    bus.subscribe(Box::new(recorder.clone()));
    bus.subscribe(Box::new(LogListener::new(project_name(&cfg))));
    initial_build(&recorded, &mut invoker, &mut bus).await;

    let chain = BuildStepChain::from_recording(recorder.recording());
    info!(steps = chain.len(), "redeploy build chain ready");

    let detector = if cfg.redeploy.enabled {
        let spec = WatchSpec::from_config(&cfg.redeploy);
        info!(root = ?spec.root, "watching for changes");
        Some(ChangeDetector::initialize(spec)?)
    } else {
        info!("redeploy disabled; the application will not be restarted on changes");
        None
    };

    let shutdown = ShutdownSignal::new();
    listen_for_shutdown(shutdown.clone()).context("failed to install signal handlers")?;

    // Recomputed on every start so edited conf files are picked up.
    let launch_cfg = cfg.clone();
    let redeploy = RedeployLoop::new(
        ProcessSupervisor::new(),
        detector,
        invoker,
        chain,
        move || command_from_config(&launch_cfg),
        LoopOptions::from_config(&cfg),
        shutdown,
    );
    let summary = redeploy.run().await?;

    match summary.exit {
        LoopExit::ProcessExited(code) => {
            info!(exit_code = ?code, restarts = summary.restarts, "application terminated")
        }
        LoopExit::ShutdownRequested => {
            info!(restarts = summary.restarts, "stopped on request")
        }
    }
    Ok(())
}

fn configured_steps(cfg: &ConfigFile) -> Vec<RecordedStep> {
    cfg.build.step.iter().map(RecordedStep::from).collect()
}

fn project_name(cfg: &ConfigFile) -> String {
    cfg.project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// Dry-run output: launch command, watch spec and the build chain.
fn print_dry_run(cfg: &ConfigFile, command: &LaunchCommand, recorded: &[RecordedStep]) -> Result<()> {
    println!("devloop dry-run");
    println!("  project_dir = {}", cfg.project_dir.display());
    println!();

    println!("launch:");
    println!("  cmd: {command}");
    println!("  working_dir: {}", command.working_dir.display());
    for (key, value) in &command.env {
        println!("  env: {key}={value}");
    }
    println!();

    println!("redeploy:");
    println!("  enabled: {}", cfg.redeploy.enabled);
    println!("  root: {}", cfg.redeploy.root.display());
    if !cfg.redeploy.includes.is_empty() {
        println!("  includes: {:?}", cfg.redeploy.includes);
    }
    if !cfg.redeploy.excludes.is_empty() {
        println!("  excludes: {:?}", cfg.redeploy.excludes);
    }
    println!("  scan_period: {:?}", cfg.redeploy.scan_period);
    println!("  grace_period: {:?}", cfg.redeploy.grace_period);
    println!("  stop_timeout: {:?}", cfg.redeploy.stop_timeout);
    if cfg.redeploy.use_hash {
        println!("  use_hash: true");
    }
    if cfg.redeploy.enabled {
        let spec = WatchSpec::from_config(&cfg.redeploy);
        let matched = matching_paths(&RealFileSystem, &spec)?;
        println!("  watched files: {}", matched.len());
    }
    println!();

    // Without running the initial build, every configured step is assumed
    // to succeed.
    let chain = BuildStepChain::from_recording(Some(recorded.to_vec()));
    println!("build chain ({}):", chain.len());
    for step in chain.steps() {
        println!("  - {}", chain.step_name(*step));
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
