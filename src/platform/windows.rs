//! Windows backend
//!
//! Process names come from a sysinfo snapshot; threads from a ToolHelp
//! snapshot; suspend/resume go through a THREAD_SUSPEND_RESUME handle.

use super::{names_match, NativeThreads, PlatformError, RawHandle};
use std::mem::size_of;
use sysinfo::{ProcessesToUpdate, System};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Thread32First, Thread32Next, TH32CS_SNAPTHREAD, THREADENTRY32,
};
use windows::Win32::System::Threading::{
    OpenThread, ResumeThread, SuspendThread, THREAD_SUSPEND_RESUME,
};

/// SuspendThread/ResumeThread report failure as (DWORD)-1
const PRIMITIVE_FAILED: u32 = u32::MAX;

#[derive(Debug, Default)]
pub struct WindowsThreads;

impl WindowsThreads {
    pub fn new() -> Self {
        Self
    }
}

impl NativeThreads for WindowsThreads {
    fn processes_by_name(&self, name: &str) -> Result<Vec<i64>, PlatformError> {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);

        let mut matched: Vec<i64> = system
            .processes()
            .values()
            .filter(|process| names_match(&process.name().to_string_lossy(), name))
            .map(|process| i64::from(process.pid().as_u32()))
            .collect();
        // sysinfo keeps processes in a map; sort for a stable lookup order
        matched.sort_unstable();
        Ok(matched)
    }

    fn threads_of(&self, pid: u32) -> Result<Vec<i64>, PlatformError> {
        let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0) }.map_err(|err| {
            PlatformError::ThreadList {
                pid,
                message: err.to_string(),
            }
        })?;

        let mut threads = Vec::new();
        let mut entry = THREADENTRY32 {
            dwSize: size_of::<THREADENTRY32>() as u32,
            ..Default::default()
        };

        // The snapshot covers every thread in the system; keep the ones owned by pid
        let mut more = unsafe { Thread32First(snapshot, &mut entry) }.is_ok();
        while more {
            if entry.th32OwnerProcessID == pid {
                threads.push(i64::from(entry.th32ThreadID));
            }
            more = unsafe { Thread32Next(snapshot, &mut entry) }.is_ok();
        }

        let _ = unsafe { CloseHandle(snapshot) };

        if threads.is_empty() {
            return Err(PlatformError::ProcessNotFound(pid));
        }
        Ok(threads)
    }

    fn open_thread(&self, tid: u32) -> Option<RawHandle> {
        let handle = unsafe { OpenThread(THREAD_SUSPEND_RESUME, false, tid) }.ok()?;
        if handle.is_invalid() {
            return None;
        }
        Some(RawHandle(handle.0))
    }

    fn suspend_thread(&self, handle: RawHandle) -> u32 {
        unsafe { SuspendThread(HANDLE(handle.0)) }
    }

    fn resume_thread(&self, handle: RawHandle) -> u32 {
        // ResumeThread returns the previous count
        match unsafe { ResumeThread(HANDLE(handle.0)) } {
            PRIMITIVE_FAILED => 0,
            previous => previous.saturating_sub(1),
        }
    }

    fn suspend_count(&self, handle: RawHandle) -> Option<u32> {
        // Peek: suspend once to learn the previous count, then undo it
        let previous = unsafe { SuspendThread(HANDLE(handle.0)) };
        if previous == PRIMITIVE_FAILED {
            return None;
        }
        let _ = unsafe { ResumeThread(HANDLE(handle.0)) };
        Some(previous)
    }

    fn close_handle(&self, handle: RawHandle) -> bool {
        unsafe { CloseHandle(HANDLE(handle.0)) }.is_ok()
    }
}
