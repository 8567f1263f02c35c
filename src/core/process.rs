use super::pausable::{resume_all, suspend_all, sweep, PauseOp, Pausable, SweepReport};
use super::thread::{checked_id, ThreadHandle};
use crate::error::{FreezeResult, IdKind};
use crate::platform::NativeThreads;
use std::fmt;
use std::sync::Arc;

/// One running process and a snapshot of its threads
#[derive(Debug)]
pub struct ProcessNode {
    id: u32,
    threads: Vec<ThreadHandle>,
}

impl ProcessNode {
    /// Enumerate the threads of `id` as the OS reports them right now.
    ///
    /// The list is not refreshed later: threads started afterwards are not
    /// paused, threads that exit simply fail to open.
    pub fn new(id: i64, api: Arc<dyn NativeThreads>) -> FreezeResult<Self> {
        let id = checked_id(IdKind::Process, id)?;
        let threads = api
            .threads_of(id)?
            .into_iter()
            .map(|tid| ThreadHandle::new(tid, api.clone()))
            .collect::<FreezeResult<Vec<_>>>()?;

        Ok(Self { id, threads })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn threads(&self) -> &[ThreadHandle] {
        &self.threads
    }

    pub fn sweep(&self, op: PauseOp) -> SweepReport {
        sweep(&self.threads, op)
    }
}

impl Pausable for ProcessNode {
    fn suspend(&self) -> bool {
        suspend_all(&self.threads)
    }

    fn resume(&self) -> bool {
        resume_all(&self.threads)
    }
}

impl fmt::Display for ProcessNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.id)
    }
}
