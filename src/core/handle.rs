use crate::platform::{NativeThreads, RawHandle};

/// A native thread handle that lives for one suspend/resume call.
///
/// `close` reports whether the release succeeded. A handle that is never
/// explicitly closed is released on drop, so no exit path leaks it.
pub(crate) struct ScopedHandle<'a> {
    api: &'a dyn NativeThreads,
    raw: RawHandle,
    released: bool,
}

impl<'a> ScopedHandle<'a> {
    /// Open `tid` with suspend/resume rights
    pub(crate) fn open(api: &'a dyn NativeThreads, tid: u32) -> Option<Self> {
        api.open_thread(tid).map(|raw| Self {
            api,
            raw,
            released: false,
        })
    }

    pub(crate) fn raw(&self) -> RawHandle {
        self.raw
    }

    pub(crate) fn close(mut self) -> bool {
        self.released = true;
        self.api.close_handle(self.raw)
    }
}

impl Drop for ScopedHandle<'_> {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.api.close_handle(self.raw);
        }
    }
}
