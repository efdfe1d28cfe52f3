//! The native engine seam
//!
//! `NativeEngine` describes the upstream `gsapi` surface the lifecycle manager
//! drives. The real library is bound in [`ffi`] behind the `native` feature;
//! tests substitute recording doubles.

use std::ffi::{c_char, c_int, c_void, CString};
use std::ptr::NonNull;

#[cfg(feature = "native")]
pub mod ffi;

#[cfg(feature = "native")]
pub use ffi::SystemEngine;

/// Name of the engine library for this target. Windows ships one DLL per
/// pointer width; other platforms use `libgs`.
#[cfg(all(windows, target_pointer_width = "64"))]
pub const LIBRARY_NAME: &str = "gsdll64";
#[cfg(all(windows, target_pointer_width = "32"))]
pub const LIBRARY_NAME: &str = "gsdll32";
#[cfg(not(windows))]
pub const LIBRARY_NAME: &str = "gs";

/// `stdin` callback: fill `buf` with up to `len` bytes, return the count (0 = EOF)
pub type StdinFn = unsafe extern "system" fn(caller_handle: *mut c_void, buf: *mut c_char, len: c_int) -> c_int;

/// `stdout`/`stderr` callback: consume `len` bytes of `buf`, return the count consumed
pub type StdoutFn = unsafe extern "system" fn(caller_handle: *mut c_void, buf: *const c_char, len: c_int) -> c_int;

/// Opaque handle to one live engine instance
///
/// Never cloned; consumed by [`NativeEngine::delete_instance`].
#[derive(Debug)]
pub struct InstanceHandle(NonNull<c_void>);

impl InstanceHandle {
    /// # Safety
    /// `ptr` must be an instance pointer returned by the engine (or a unique
    /// token for a test double) that has not yet been deleted.
    pub unsafe fn from_raw(ptr: NonNull<c_void>) -> Self {
        Self(ptr)
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.0.as_ptr()
    }
}

// The handle is only ever used under the manager's lock.
unsafe impl Send for InstanceHandle {}

/// Callback table bound to an instance for one run
#[derive(Clone, Copy)]
pub struct StdioCallbacks {
    /// Passed back verbatim as the first argument of every callback
    pub caller_handle: *mut c_void,
    pub stdin: StdinFn,
    pub stdout: StdoutFn,
    pub stderr: StdoutFn,
}

// `caller_handle` points at an `OutputBridge`, which is `Sync`.
unsafe impl Send for StdioCallbacks {}
unsafe impl Sync for StdioCallbacks {}

impl std::fmt::Debug for StdioCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdioCallbacks")
            .field("caller_handle", &self.caller_handle)
            .finish_non_exhaustive()
    }
}

impl StdioCallbacks {
    /// Invoke the stdout callback with `bytes`
    ///
    /// # Safety
    /// The object behind `caller_handle` must still be alive.
    pub unsafe fn write_stdout(&self, bytes: &[u8]) -> c_int {
        (self.stdout)(self.caller_handle, bytes.as_ptr().cast(), clamp_len(bytes.len()))
    }

    /// Invoke the stderr callback with `bytes`
    ///
    /// # Safety
    /// The object behind `caller_handle` must still be alive.
    pub unsafe fn write_stderr(&self, bytes: &[u8]) -> c_int {
        (self.stderr)(self.caller_handle, bytes.as_ptr().cast(), clamp_len(bytes.len()))
    }

    /// Invoke the stdin callback with a scratch buffer
    ///
    /// # Safety
    /// The object behind `caller_handle` must still be alive.
    pub unsafe fn read_stdin(&self, buf: &mut [u8]) -> c_int {
        (self.stdin)(self.caller_handle, buf.as_mut_ptr().cast(), clamp_len(buf.len()))
    }
}

/// Buffer length as the callback ABI's `int`; longer buffers are offered in part
fn clamp_len(len: usize) -> c_int {
    c_int::try_from(len).unwrap_or(c_int::MAX)
}

/// Engine build metadata, copied out of the native struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// e.g. "GPL Ghostscript"
    pub product: String,
    pub copyright: String,
    /// e.g. 10051 for 10.05.1, 871 for 8.71
    pub revision: i64,
    /// Build date as `yyyymmdd`
    pub revision_date: i64,
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.product, self.revision, self.revision_date)
    }
}

/// Upstream engine API
///
/// All methods return raw engine status codes; the manager translates them.
/// Implementations must tolerate being called from any thread, one instance
/// at a time.
pub trait NativeEngine: Send + Sync {
    /// Create the (single) engine instance
    fn new_instance(&self) -> Result<InstanceHandle, i32>;

    /// Route the instance's stdio through `callbacks` for the next run
    fn set_stdio(&self, handle: &InstanceHandle, callbacks: StdioCallbacks) -> i32;

    /// Initialize the interpreter and run it with `args` (`args[0]` ignored)
    fn init_with_args(&self, handle: &InstanceHandle, args: &[CString]) -> i32;

    /// Shut the interpreter down; required after `init_with_args`
    fn exit(&self, handle: &InstanceHandle) -> i32;

    /// Destroy the instance
    fn delete_instance(&self, handle: InstanceHandle);

    /// Library build metadata
    fn revision(&self) -> Result<Revision, i32>;
}

impl<E: NativeEngine + ?Sized> NativeEngine for std::sync::Arc<E> {
    fn new_instance(&self) -> Result<InstanceHandle, i32> {
        (**self).new_instance()
    }

    fn set_stdio(&self, handle: &InstanceHandle, callbacks: StdioCallbacks) -> i32 {
        (**self).set_stdio(handle, callbacks)
    }

    fn init_with_args(&self, handle: &InstanceHandle, args: &[CString]) -> i32 {
        (**self).init_with_args(handle, args)
    }

    fn exit(&self, handle: &InstanceHandle) -> i32 {
        (**self).exit(handle)
    }

    fn delete_instance(&self, handle: InstanceHandle) {
        (**self).delete_instance(handle)
    }

    fn revision(&self) -> Result<Revision, i32> {
        (**self).revision()
    }
}

/// Convert compiled arguments into NUL-terminated strings for the engine
pub fn to_c_args(args: &[String]) -> crate::Result<Vec<CString>> {
    args.iter()
        .enumerate()
        .map(|(i, a)| {
            CString::new(a.as_str()).map_err(|_| {
                let shown = crate::args::redacted(std::slice::from_ref(a)).remove(0);
                crate::Error::InvalidArgument(format!("argument {} contains a NUL byte: {:?}", i, shown))
            })
        })
        .collect()
}
