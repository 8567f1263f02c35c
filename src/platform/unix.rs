//! Linux backend
//!
//! Linux has no per-thread suspend count. A stop signal delivered to any
//! thread stops the whole thread group, so the count reported here is 1 while
//! the thread is in the stopped state and 0 otherwise.

use super::{names_match, NativeThreads, PlatformError, RawHandle};
use parking_lot::Mutex;
use psutil::process::processes;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// The kernel keeps at most this many bytes of a process name in `comm`
const COMM_MAX_LEN: usize = 15;

#[derive(Debug, Clone, Copy)]
struct OpenThread {
    tgid: libc::pid_t,
    tid: libc::pid_t,
}

/// procfs + tgkill implementation of the native surface
#[derive(Debug)]
pub struct ProcfsThreads {
    handles: Mutex<HashMap<isize, OpenThread>>,
    next_handle: Mutex<isize>,
}

impl ProcfsThreads {
    pub fn new() -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
            next_handle: Mutex::new(1),
        }
    }

    fn lookup(&self, handle: RawHandle) -> Option<OpenThread> {
        self.handles.lock().get(&handle.0).copied()
    }
}

impl Default for ProcfsThreads {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeThreads for ProcfsThreads {
    fn processes_by_name(&self, name: &str) -> Result<Vec<i64>, PlatformError> {
        let all = processes().map_err(|err| PlatformError::ProcessList(err.to_string()))?;

        // Processes that vanish or deny access mid-scan are skipped
        let mut matched: Vec<i64> = all
            .into_iter()
            .filter_map(Result::ok)
            .filter(|process| {
                process
                    .name()
                    .map(|comm| image_matches(&comm, || full_image_names(process.pid()), name))
                    .unwrap_or(false)
            })
            .map(|process| i64::from(process.pid()))
            .collect();
        matched.sort_unstable();
        Ok(matched)
    }

    fn threads_of(&self, pid: u32) -> Result<Vec<i64>, PlatformError> {
        let entries = fs::read_dir(format!("/proc/{pid}/task")).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                PlatformError::ProcessNotFound(pid)
            } else {
                PlatformError::ThreadList {
                    pid,
                    message: err.to_string(),
                }
            }
        })?;

        let mut tids: Vec<i64> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().to_str()?.parse::<i64>().ok())
            .collect();
        tids.sort_unstable();
        Ok(tids)
    }

    fn open_thread(&self, tid: u32) -> Option<RawHandle> {
        let tid = libc::pid_t::try_from(tid).ok()?;
        let tgid = read_thread_group(tid)?;

        let raw = {
            let mut next = self.next_handle.lock();
            let raw = *next;
            *next += 1;
            raw
        };
        self.handles.lock().insert(raw, OpenThread { tgid, tid });
        Some(RawHandle(raw))
    }

    fn suspend_thread(&self, handle: RawHandle) -> u32 {
        let Some(thread) = self.lookup(handle) else {
            return u32::MAX;
        };
        let previous = stopped_count(thread.tid);
        let _ = send_thread_signal(thread.tgid, thread.tid, libc::SIGSTOP);
        previous
    }

    fn resume_thread(&self, handle: RawHandle) -> u32 {
        if let Some(thread) = self.lookup(handle) {
            let _ = send_thread_signal(thread.tgid, thread.tid, libc::SIGCONT);
        }
        0
    }

    fn suspend_count(&self, handle: RawHandle) -> Option<u32> {
        let thread = self.lookup(handle)?;
        thread_state(thread.tid).map(|state| u32::from(state == 'T'))
    }

    fn close_handle(&self, handle: RawHandle) -> bool {
        self.handles.lock().remove(&handle.0).is_some()
    }
}

/// Match a process name, looking past the truncated `comm` when needed
///
/// A `comm` at the length limit may be a prefix of the real image name, so
/// the executable path and argv[0] are consulted before giving up.
fn image_matches<F>(comm: &str, full_names: F, wanted: &str) -> bool
where
    F: FnOnce() -> Vec<String>,
{
    if names_match(comm, wanted) {
        return true;
    }
    if comm.len() < COMM_MAX_LEN {
        return false;
    }
    full_names()
        .iter()
        .any(|image| names_match(image, wanted))
}

/// Untruncated image names of a process: the executable and argv[0] basenames
fn full_image_names(pid: u32) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(exe) = fs::read_link(format!("/proc/{pid}/exe")) {
        names.extend(basename(&exe));
    }
    if let Ok(cmdline) = fs::read(format!("/proc/{pid}/cmdline")) {
        if let Some(argv0) = cmdline.split(|byte| *byte == 0).next() {
            let argv0 = String::from_utf8_lossy(argv0);
            names.extend(basename(Path::new(argv0.as_ref())));
        }
    }
    names
}

fn basename(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn stopped_count(tid: libc::pid_t) -> u32 {
    thread_state(tid)
        .map(|state| u32::from(state == 'T'))
        .unwrap_or(0)
}

/// Thread group (process) id of a thread, from /proc/<tid>/status
fn read_thread_group(tid: libc::pid_t) -> Option<libc::pid_t> {
    let status = fs::read_to_string(format!("/proc/{tid}/status")).ok()?;
    status
        .lines()
        .find_map(|line| line.strip_prefix("Tgid:"))
        .and_then(|value| value.trim().parse().ok())
}

/// Scheduler state letter of a thread, from /proc/<tid>/stat
fn thread_state(tid: libc::pid_t) -> Option<char> {
    let stat = fs::read_to_string(format!("/proc/{tid}/stat")).ok()?;
    parse_stat_state(&stat)
}

// comm may contain spaces and parentheses; the state follows the last ')'
fn parse_stat_state(stat: &str) -> Option<char> {
    let after_comm = &stat[stat.rfind(')')? + 1..];
    after_comm.trim_start().chars().next()
}

/// Safely send a signal to one thread
///
/// Encapsulates the unsafe tgkill syscall and returns Result instead of raw error code
fn send_thread_signal(
    tgid: libc::pid_t,
    tid: libc::pid_t,
    signal: libc::c_int,
) -> Result<(), libc::c_int> {
    let result = unsafe {
        libc::syscall(
            libc::SYS_tgkill,
            libc::c_long::from(tgid),
            libc::c_long::from(tid),
            libc::c_long::from(signal),
        )
    };
    if result == 0 {
        Ok(())
    } else {
        Err(get_last_errno())
    }
}

/// Get last error code
///
/// Encapsulates unsafe errno access
fn get_last_errno() -> libc::c_int {
    unsafe { *libc::__errno_location() }
}
