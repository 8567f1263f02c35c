//! Ctrl-C / termination handling
//!
//! While a target is frozen an interrupt must thaw it instead of killing the
//! tool and leaving the game suspended. Handlers only raise a flag; the
//! freeze loop polls it.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// The flag raised by the installed handlers
pub fn interrupt_flag() -> &'static AtomicBool {
    &INTERRUPTED
}

/// Clears the flag when dropped
pub struct SignalGuard;

impl Drop for SignalGuard {
    fn drop(&mut self) {
        INTERRUPTED.store(false, Ordering::SeqCst);
    }
}

pub fn install() -> io::Result<SignalGuard> {
    INTERRUPTED.store(false, Ordering::SeqCst);

    #[cfg(unix)]
    {
        setup_unix_signal_handlers()?;
    }

    #[cfg(windows)]
    {
        setup_windows_signal_handler()?;
    }

    Ok(SignalGuard)
}

#[cfg(unix)]
fn setup_unix_signal_handlers() -> io::Result<()> {
    use std::sync::Once;

    static INIT: Once = Once::new();
    let mut result = Ok(());

    INIT.call_once(|| {
        result = unsafe { setup_signal_handlers_safe() };
    });

    result
}

#[cfg(unix)]
/// Safe signal handling setup function
/// Encapsulates unsafe code to ensure all safety checks are completed within the function
unsafe fn setup_signal_handlers_safe() -> io::Result<()> {
    extern "C" fn handler(signum: libc::c_int) {
        handle_unix_signal(signum);
    }

    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();

        // Set SA_RESTART flag to avoid interrupted system calls
        action.sa_flags = libc::SA_RESTART;
        action.sa_sigaction = handler as usize;
        libc::sigemptyset(&mut action.sa_mask as *mut libc::sigset_t);

        for signum in [libc::SIGINT, libc::SIGTERM] {
            if libc::sigaction(signum, &action, std::ptr::null_mut()) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
fn handle_unix_signal(signum: libc::c_int) {
    if signum == libc::SIGINT || signum == libc::SIGTERM {
        // Only an atomic store: async-signal-safe
        INTERRUPTED.store(true, Ordering::SeqCst);
    }
}

#[cfg(windows)]
fn setup_windows_signal_handler() -> io::Result<()> {
    use windows::Win32::Foundation::BOOL;
    use windows::Win32::System::Console::{
        SetConsoleCtrlHandler, CTRL_BREAK_EVENT, CTRL_CLOSE_EVENT, CTRL_C_EVENT,
    };

    unsafe extern "system" fn handler(ctrl_type: u32) -> BOOL {
        match ctrl_type {
            CTRL_C_EVENT | CTRL_BREAK_EVENT | CTRL_CLOSE_EVENT => {
                INTERRUPTED.store(true, Ordering::SeqCst);
                BOOL(1)
            }
            _ => BOOL(0),
        }
    }

    unsafe { SetConsoleCtrlHandler(Some(handler), true) }
        .map_err(|err| io::Error::other(err.to_string()))
}
