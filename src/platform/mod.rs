//! Native OS surface used by the suspend/resume engine
//!
//! Platform strategy:
//! - Windows: sysinfo for process names, ToolHelp snapshots for threads,
//!   OpenThread/SuspendThread/ResumeThread/CloseHandle for the primitives
//! - Linux: psutil for process names, procfs for threads, tgkill with
//!   SIGSTOP/SIGCONT for the primitives
//! - Tests: an in-memory simulated OS

pub mod simulated;
#[cfg(target_os = "linux")]
pub mod unix;
#[cfg(windows)]
pub mod windows;

use crate::error::{FreezeError, FreezeResult};
use std::sync::Arc;
use thiserror::Error;

/// Opaque native handle value returned by `open_thread`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(pub isize);

/// The six native capabilities the engine relies on.
///
/// Identifiers are reported as signed values so a misbehaving source can be
/// rejected by the node constructors instead of silently wrapping.
pub trait NativeThreads: Send + Sync {
    /// Every running process whose image name matches `name`, in OS order
    fn processes_by_name(&self, name: &str) -> Result<Vec<i64>, PlatformError>;

    /// Every thread the OS currently reports for `pid`, in OS order
    fn threads_of(&self, pid: u32) -> Result<Vec<i64>, PlatformError>;

    /// Open a handle with suspend/resume rights
    fn open_thread(&self, tid: u32) -> Option<RawHandle>;

    /// Suspend once; returns the previous suspend count
    fn suspend_thread(&self, handle: RawHandle) -> u32;

    /// Resume once; returns the suspend count remaining after the call
    fn resume_thread(&self, handle: RawHandle) -> u32;

    /// Current suspend count, or None when the OS cannot report it
    ///
    /// Must leave the count unchanged. A backend may read it with a balanced
    /// suspend/resume pair; that pair is not part of the resume loop.
    fn suspend_count(&self, handle: RawHandle) -> Option<u32>;

    /// Release a handle obtained from `open_thread`
    fn close_handle(&self, handle: RawHandle) -> bool;
}

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Failed to list processes: {0}")]
    ProcessList(String),
    #[error("Failed to list threads of process {pid}: {message}")]
    ThreadList { pid: u32, message: String },
    #[error("Process not found: {0}")]
    ProcessNotFound(u32),
    #[allow(dead_code)]
    #[error("Unsupported platform")]
    UnsupportedPlatform,
}

impl From<PlatformError> for FreezeError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::ProcessList(message) => FreezeError::Enumeration {
                message,
                target: "processes".to_string(),
                source: None,
            },
            PlatformError::ThreadList { pid, message } => FreezeError::Enumeration {
                message,
                target: format!("threads of {pid}"),
                source: None,
            },
            PlatformError::ProcessNotFound(pid) => FreezeError::Enumeration {
                message: format!("Process {pid} not found"),
                target: format!("threads of {pid}"),
                source: None,
            },
            PlatformError::UnsupportedPlatform => FreezeError::Platform {
                message: "no native thread suspension on this OS".to_string(),
            },
        }
    }
}

/// Compare an OS image name with a requested application name.
///
/// Case-insensitive; a trailing `.exe` on either side is ignored.
pub fn names_match(image: &str, wanted: &str) -> bool {
    fn clean(name: &str) -> String {
        let lower = name.trim().to_lowercase();
        match lower.strip_suffix(".exe") {
            Some(stripped) => stripped.to_string(),
            None => lower,
        }
    }

    let wanted = clean(wanted);
    !wanted.is_empty() && clean(image) == wanted
}

/// The backend for the current OS
pub fn native() -> FreezeResult<Arc<dyn NativeThreads>> {
    #[cfg(windows)]
    {
        Ok(Arc::new(windows::WindowsThreads::new()))
    }

    #[cfg(target_os = "linux")]
    {
        Ok(Arc::new(unix::ProcfsThreads::new()))
    }

    #[cfg(not(any(windows, target_os = "linux")))]
    {
        Err(PlatformError::UnsupportedPlatform.into())
    }
}
