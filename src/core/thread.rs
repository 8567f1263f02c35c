use super::handle::ScopedHandle;
use super::pausable::Pausable;
use crate::error::{FreezeError, FreezeResult, IdKind};
use crate::platform::NativeThreads;
use std::fmt;
use std::sync::Arc;

/// One native thread, identified by its OS thread id.
///
/// Holds no native handle between calls: every suspend/resume opens a
/// fresh handle and releases it before returning.
pub struct ThreadHandle {
    id: u32,
    api: Arc<dyn NativeThreads>,
}

impl ThreadHandle {
    pub fn new(id: i64, api: Arc<dyn NativeThreads>) -> FreezeResult<Self> {
        let id = checked_id(IdKind::Thread, id)?;
        Ok(Self { id, api })
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Reject identifiers that cannot name a native object
pub(crate) fn checked_id(kind: IdKind, value: i64) -> FreezeResult<u32> {
    u32::try_from(value).map_err(|_| FreezeError::InvalidIdentifier { kind, value })
}

impl Pausable for ThreadHandle {
    fn suspend(&self) -> bool {
        let Some(handle) = ScopedHandle::open(self.api.as_ref(), self.id) else {
            return false;
        };
        // The previous count is informational only
        let _ = self.api.suspend_thread(handle.raw());
        handle.close()
    }

    fn resume(&self) -> bool {
        let Some(handle) = ScopedHandle::open(self.api.as_ref(), self.id) else {
            return false;
        };
        // Wake the thread fully, however many times it was suspended
        let mut count = self.api.suspend_count(handle.raw()).unwrap_or(1);
        while count > 0 {
            count = self.api.resume_thread(handle.raw());
        }
        handle.close()
    }
}

impl fmt::Display for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.id)
    }
}

impl fmt::Debug for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadHandle").field("id", &self.id).finish()
    }
}
