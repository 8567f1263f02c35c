//! In-memory OS used by tests
//!
//! Tracks processes, threads and per-thread suspend counts, hands out fake
//! handles, and records every primitive call so tests can assert on order
//! and on handle leaks.

use super::{names_match, NativeThreads, PlatformError, RawHandle};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct SimProcess {
    pid: i64,
    name: String,
    threads: Vec<i64>,
}

#[derive(Debug, Default)]
struct SimState {
    processes: Vec<SimProcess>,
    counts: HashMap<u32, u32>,
    handles: HashMap<isize, u32>,
    next_handle: isize,
    refuse_open: HashSet<u32>,
    refuse_close: HashSet<u32>,
    opened: usize,
    closed: usize,
    suspend_log: Vec<u32>,
    resume_log: Vec<u32>,
}

/// Simulated OS with native suspend-count semantics
#[derive(Debug, Default)]
pub struct SimulatedOs {
    state: Mutex<SimState>,
}

impl SimulatedOs {
    pub fn new() -> Self {
        let state = SimState {
            next_handle: 0x100,
            ..SimState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Add a running process with the given threads
    pub fn with_process(self, name: &str, pid: i64, threads: &[i64]) -> Self {
        self.spawn(name, pid, threads);
        self
    }

    pub fn spawn(&self, name: &str, pid: i64, threads: &[i64]) {
        self.state.lock().processes.push(SimProcess {
            pid,
            name: name.to_string(),
            threads: threads.to_vec(),
        });
    }

    /// Remove a process, as if it exited
    pub fn kill(&self, pid: i64) {
        self.state.lock().processes.retain(|p| p.pid != pid);
    }

    /// Remove one thread, as if it exited
    pub fn exit_thread(&self, pid: i64, tid: i64) {
        let mut state = self.state.lock();
        if let Some(process) = state.processes.iter_mut().find(|p| p.pid == pid) {
            process.threads.retain(|t| *t != tid);
        }
    }

    /// Make `open_thread` fail for a thread (e.g. access denied)
    pub fn refuse_open(&self, tid: u32) {
        self.state.lock().refuse_open.insert(tid);
    }

    /// Make `close_handle` fail for handles of a thread
    pub fn refuse_close(&self, tid: u32) {
        self.state.lock().refuse_close.insert(tid);
    }

    /// Suspend count as the kernel would see it
    pub fn count_of(&self, tid: u32) -> u32 {
        self.state.lock().counts.get(&tid).copied().unwrap_or(0)
    }

    /// Thread ids that received a suspend primitive, in call order
    pub fn suspend_log(&self) -> Vec<u32> {
        self.state.lock().suspend_log.clone()
    }

    /// Thread ids that received a resume primitive, in call order
    pub fn resume_log(&self) -> Vec<u32> {
        self.state.lock().resume_log.clone()
    }

    pub fn resume_calls(&self, tid: u32) -> usize {
        self.state
            .lock()
            .resume_log
            .iter()
            .filter(|t| **t == tid)
            .count()
    }

    /// Handles currently open (opened and not yet released)
    pub fn open_handles(&self) -> usize {
        self.state.lock().handles.len()
    }

    pub fn handles_opened(&self) -> usize {
        self.state.lock().opened
    }

    pub fn handles_closed(&self) -> usize {
        self.state.lock().closed
    }

    fn thread_exists(state: &SimState, tid: u32) -> bool {
        state
            .processes
            .iter()
            .any(|p| p.threads.iter().any(|t| *t == i64::from(tid)))
    }
}

impl NativeThreads for SimulatedOs {
    fn processes_by_name(&self, name: &str) -> Result<Vec<i64>, PlatformError> {
        Ok(self
            .state
            .lock()
            .processes
            .iter()
            .filter(|p| names_match(&p.name, name))
            .map(|p| p.pid)
            .collect())
    }

    fn threads_of(&self, pid: u32) -> Result<Vec<i64>, PlatformError> {
        self.state
            .lock()
            .processes
            .iter()
            .find(|p| p.pid == i64::from(pid))
            .map(|p| p.threads.clone())
            .ok_or(PlatformError::ProcessNotFound(pid))
    }

    fn open_thread(&self, tid: u32) -> Option<RawHandle> {
        let mut state = self.state.lock();
        if state.refuse_open.contains(&tid) || !Self::thread_exists(&state, tid) {
            return None;
        }
        let raw = state.next_handle;
        state.next_handle += 4;
        state.handles.insert(raw, tid);
        state.opened += 1;
        Some(RawHandle(raw))
    }

    fn suspend_thread(&self, handle: RawHandle) -> u32 {
        let mut state = self.state.lock();
        let Some(tid) = state.handles.get(&handle.0).copied() else {
            return u32::MAX;
        };
        state.suspend_log.push(tid);
        let count = state.counts.entry(tid).or_insert(0);
        let previous = *count;
        *count += 1;
        previous
    }

    fn resume_thread(&self, handle: RawHandle) -> u32 {
        let mut state = self.state.lock();
        let Some(tid) = state.handles.get(&handle.0).copied() else {
            return 0;
        };
        state.resume_log.push(tid);
        let count = state.counts.entry(tid).or_insert(0);
        *count = count.saturating_sub(1);
        *count
    }

    fn suspend_count(&self, handle: RawHandle) -> Option<u32> {
        let state = self.state.lock();
        let tid = state.handles.get(&handle.0)?;
        Some(state.counts.get(tid).copied().unwrap_or(0))
    }

    fn close_handle(&self, handle: RawHandle) -> bool {
        let mut state = self.state.lock();
        let Some(tid) = state.handles.remove(&handle.0) else {
            return false;
        };
        state.closed += 1;
        !state.refuse_close.contains(&tid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_preserves_spawn_order() {
        let os = SimulatedOs::new()
            .with_process("Foo", 7, &[1])
            .with_process("Other", 8, &[2])
            .with_process("foo.exe", 3, &[4]);
        assert_eq!(os.processes_by_name("Foo").unwrap(), vec![7, 3]);
        assert!(os.processes_by_name("Bar").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_process_threads() {
        let os = SimulatedOs::new();
        assert!(matches!(
            os.threads_of(99),
            Err(PlatformError::ProcessNotFound(99))
        ));
    }

    #[test]
    fn test_handle_bookkeeping() {
        let os = SimulatedOs::new().with_process("Foo", 1, &[10]);
        let handle = os.open_thread(10).expect("thread exists");
        assert_eq!(os.open_handles(), 1);
        assert_eq!(os.suspend_thread(handle), 0);
        assert_eq!(os.suspend_thread(handle), 1);
        assert_eq!(os.suspend_count(handle), Some(2));
        assert_eq!(os.resume_thread(handle), 1);
        assert!(os.close_handle(handle));
        assert!(!os.close_handle(handle), "double close must fail");
        assert_eq!(os.open_handles(), 0);
        assert!(os.open_thread(11).is_none());
    }
}
