use super::pausable::{resume_all, suspend_all, sweep, PauseOp, Pausable, SweepReport};
use super::process::ProcessNode;
use super::thread::ThreadHandle;
use crate::error::FreezeResult;
use crate::platform::NativeThreads;
use std::sync::Arc;

/// Every running instance of a named application
#[derive(Debug)]
pub struct ProgramNode {
    name: String,
    processes: Vec<ProcessNode>,
}

impl ProgramNode {
    /// Look up the processes matching `name` and snapshot their threads.
    ///
    /// No match yields an empty program; deciding whether that is fatal is
    /// up to the caller.
    pub fn new(name: impl Into<String>, api: Arc<dyn NativeThreads>) -> FreezeResult<Self> {
        let name = name.into();
        let pids = api.processes_by_name(&name)?;
        Self::from_pids(name, pids, api)
    }

    /// Build from an already-resolved process list
    pub fn from_pids(
        name: impl Into<String>,
        pids: Vec<i64>,
        api: Arc<dyn NativeThreads>,
    ) -> FreezeResult<Self> {
        let processes = pids
            .into_iter()
            .map(|pid| ProcessNode::new(pid, api.clone()))
            .collect::<FreezeResult<Vec<_>>>()?;

        Ok(Self {
            name: name.into(),
            processes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn processes(&self) -> &[ProcessNode] {
        &self.processes
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn thread_count(&self) -> usize {
        self.processes.iter().map(|p| p.threads().len()).sum()
    }

    /// All threads across all processes, in walk order
    pub fn threads(&self) -> impl Iterator<Item = &ThreadHandle> {
        self.processes.iter().flat_map(|p| p.threads().iter())
    }

    pub fn sweep(&self, op: PauseOp) -> SweepReport {
        sweep(&self.processes, op)
    }
}

impl Pausable for ProgramNode {
    fn suspend(&self) -> bool {
        suspend_all(&self.processes)
    }

    fn resume(&self) -> bool {
        resume_all(&self.processes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::simulated::SimulatedOs;
    use pretty_assertions::assert_eq;

    fn foo_os() -> Arc<SimulatedOs> {
        Arc::new(
            SimulatedOs::new()
                .with_process("Foo", 100, &[10, 11])
                .with_process("Idle", 150, &[90])
                .with_process("Foo", 200, &[20]),
        )
    }

    #[test]
    fn test_discovers_matching_processes_in_order() {
        let program = ProgramNode::new("Foo", foo_os()).unwrap();

        assert_eq!(program.name(), "Foo");
        let pids: Vec<u32> = program.processes().iter().map(|p| p.id()).collect();
        assert_eq!(pids, vec![100, 200]);
        let tids: Vec<u32> = program.threads().map(|t| t.id()).collect();
        assert_eq!(tids, vec![10, 11, 20]);
        assert_eq!(program.thread_count(), 3);
    }

    #[test]
    fn test_suspend_walks_processes_then_threads() {
        let os = foo_os();
        let program = ProgramNode::new("Foo", os.clone()).unwrap();

        assert!(program.suspend());
        assert_eq!(os.suspend_log(), vec![10, 11, 20]);
        assert_eq!(os.count_of(90), 0, "other applications are untouched");

        assert!(program.resume());
        for tid in [10, 11, 20] {
            assert_eq!(os.count_of(tid), 0);
        }
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let program = ProgramNode::new("Bar", foo_os()).unwrap();
        assert!(program.is_empty());
        assert_eq!(program.thread_count(), 0);
        assert!(program.suspend());
    }

    #[test]
    fn test_failing_process_leaves_later_processes_untouched() {
        let os = foo_os();
        os.refuse_open(11);
        let program = ProgramNode::new("Foo", os.clone()).unwrap();

        let report = program.sweep(PauseOp::Suspend);
        assert_eq!(report.failed_at, Some(0));
        assert_eq!(report.untouched(), 1);
        assert_eq!(os.suspend_log(), vec![10]);
        assert_eq!(os.count_of(20), 0);
    }

    #[test]
    fn test_process_list_is_a_snapshot() {
        let os = foo_os();
        let program = ProgramNode::new("Foo", os.clone()).unwrap();

        os.kill(200);
        os.spawn("Foo", 300, &[30]);
        assert_eq!(program.processes().len(), 2);
    }

    #[test]
    fn test_from_pids_rejects_negative() {
        assert!(ProgramNode::from_pids("Foo", vec![100, -5], foo_os()).is_err());
    }
}
