//! 命令处理
//!
//! 每个子命令先发现目标，再调用挂起/恢复引擎

pub mod parser;
pub mod render;

pub use parser::{Cli, Commands};

use crate::config::TOKEN_REVEAL_DELAY;
use crate::core::Target;
use crate::error::FreezeResult;
use crate::freeze::{self, FreezePlan};
use crate::platform::NativeThreads;
use crate::settings::Settings;
use crate::signal;
use std::process::ExitCode;
use std::sync::Arc;

/// Width used when laying out thread tokens
pub const DISPLAY_WIDTH: usize = 72;

pub fn execute(
    command: Commands,
    settings: &Settings,
    api: Arc<dyn NativeThreads>,
) -> FreezeResult<ExitCode> {
    if matches!(command, Commands::Freeze { .. }) {
        render::banner();
    }
    render::status("scanning processes");
    let mut target = Target::attach(&settings.target, api)?;

    match command {
        Commands::Freeze { .. } => run_freeze(&mut target, settings),
        Commands::List => {
            render::print_processes(&target);
            render::print_threads(&target, DISPLAY_WIDTH);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Suspend => {
            render::status("suspending connection");
            Ok(exit_for(target.suspend(), "suspend", &target))
        }
        Commands::Resume => {
            render::status("resuming connection");
            Ok(exit_for(target.resume(), "resume", &target))
        }
    }
}

fn run_freeze(target: &mut Target, settings: &Settings) -> FreezeResult<ExitCode> {
    let plan = FreezePlan::from_settings(settings, &mut rand::thread_rng());
    let _guard = signal::install()?;

    render::reveal_threads(target, DISPLAY_WIDTH, TOKEN_REVEAL_DELAY);
    render::status("locking threads");

    let bar = render::countdown(plan.duration);
    let report = freeze::run(target, &plan, signal::interrupt_flag(), |remaining| {
        render::update_countdown(&bar, plan.duration, remaining)
    });
    bar.finish();

    render::print_threads(target, DISPLAY_WIDTH);
    render::print_report(&report);

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn exit_for(ok: bool, op: &str, target: &Target) -> ExitCode {
    if ok {
        render::status(&format!(
            "{} {}: {} threads",
            op,
            target.name(),
            target.thread_count()
        ));
        ExitCode::SUCCESS
    } else {
        render::failure(&format!("{} of {} failed", op, target.name()));
        ExitCode::from(1)
    }
}
