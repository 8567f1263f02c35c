//! The application being frozen, as an explicitly owned context

use super::pausable::{PauseOp, SweepReport};
use super::process::ProcessNode;
use super::program::ProgramNode;
use super::thread::ThreadHandle;
use crate::error::{FreezeError, FreezeResult};
use crate::platform::NativeThreads;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the target is in its freeze cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeState {
    /// Discovered, not yet touched
    Scanned,
    Suspended,
    Resumed,
}

/// A discovered application plus the state of its last operation
#[derive(Debug)]
pub struct Target {
    program: ProgramNode,
    state: FreezeState,
}

impl Target {
    /// Discover `name`; fails when no instance is running
    pub fn attach(name: &str, api: Arc<dyn NativeThreads>) -> FreezeResult<Self> {
        let program = ProgramNode::new(name, api)?;
        Self::from_program(program)
    }

    pub fn from_program(program: ProgramNode) -> FreezeResult<Self> {
        if program.is_empty() {
            return Err(FreezeError::NoMatchingProcess {
                name: program.name().to_string(),
            });
        }

        info!(
            target_name = program.name(),
            processes = program.processes().len(),
            threads = program.thread_count(),
            "target attached"
        );
        Ok(Self {
            program,
            state: FreezeState::Scanned,
        })
    }

    pub fn name(&self) -> &str {
        self.program.name()
    }

    pub fn state(&self) -> FreezeState {
        self.state
    }

    pub fn processes(&self) -> &[ProcessNode] {
        self.program.processes()
    }

    pub fn threads(&self) -> impl Iterator<Item = &ThreadHandle> {
        self.program.threads()
    }

    pub fn thread_count(&self) -> usize {
        self.program.thread_count()
    }

    pub fn suspend(&mut self) -> bool {
        self.suspend_report().succeeded()
    }

    pub fn resume(&mut self) -> bool {
        self.resume_report().succeeded()
    }

    pub fn suspend_report(&mut self) -> SweepReport {
        self.run(PauseOp::Suspend)
    }

    pub fn resume_report(&mut self) -> SweepReport {
        self.run(PauseOp::Resume)
    }

    fn run(&mut self, op: PauseOp) -> SweepReport {
        debug!(target_name = self.name(), op = op.as_str(), "sweeping processes");
        let report = self.program.sweep(op);

        match report.failed_at {
            None => {
                self.state = match op {
                    PauseOp::Suspend => FreezeState::Suspended,
                    PauseOp::Resume => FreezeState::Resumed,
                };
                info!(
                    target_name = self.name(),
                    op = op.as_str(),
                    processes = report.total,
                    "operation completed"
                );
            }
            Some(index) => {
                let pid = self.program.processes()[index].id();
                warn!(
                    target_name = self.name(),
                    op = op.as_str(),
                    pid,
                    untouched = report.untouched(),
                    "operation stopped at first failing process"
                );
            }
        }

        report
    }
}
