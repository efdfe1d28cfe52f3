//! Raw bindings to the Ghostscript interpreter API (`iapi.h`) and the
//! `NativeEngine` implementation over them.
//!
//! The library is linked by name: `gsdll64`/`gsdll32` on Windows depending on
//! the pointer width, `gs` elsewhere. Only one code path exists; the width is
//! resolved at compile time through `LIBRARY_NAME`.
//!
//! # Safety
//!
//! Everything in the `extern` block calls straight into C. The engine supports
//! a single instance per process, which `SystemEngine` enforces with a
//! process-wide claim on top of the manager's lock.

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_int, c_long, c_void, CStr, CString};
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{InstanceHandle, NativeEngine, Revision, StdioCallbacks, StdinFn, StdoutFn};
use crate::{Error, Result};

/// Mirror of `gsapi_revision_t`
#[repr(C)]
struct gsapi_revision_t {
    product: *const c_char,
    copyright: *const c_char,
    revision: c_long,
    revisiondate: c_long,
}

#[cfg_attr(all(windows, target_pointer_width = "64"), link(name = "gsdll64"))]
#[cfg_attr(all(windows, target_pointer_width = "32"), link(name = "gsdll32"))]
#[cfg_attr(not(windows), link(name = "gs"))]
extern "system" {
    fn gsapi_revision(pr: *mut gsapi_revision_t, len: c_int) -> c_int;

    fn gsapi_new_instance(pinstance: *mut *mut c_void, caller_handle: *mut c_void) -> c_int;

    fn gsapi_delete_instance(instance: *mut c_void);

    fn gsapi_set_stdio_with_handle(
        instance: *mut c_void,
        stdin_fn: StdinFn,
        stdout_fn: StdoutFn,
        stderr_fn: StdoutFn,
        caller_handle: *mut c_void,
    ) -> c_int;

    fn gsapi_init_with_args(instance: *mut c_void, argc: c_int, argv: *mut *mut c_char) -> c_int;

    fn gsapi_exit(instance: *mut c_void) -> c_int;
}

/// Set while a `SystemEngine` value exists
static CLAIMED: AtomicBool = AtomicBool::new(false);

/// The linked system Ghostscript library
///
/// At most one value exists per process, so at most one `EngineManager` can
/// drive the real library.
#[derive(Debug)]
pub struct SystemEngine {
    _claim: (),
}

impl SystemEngine {
    pub fn new() -> Result<Self> {
        CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::EngineInUse)?;
        log::debug!("claimed native engine library '{}'", super::LIBRARY_NAME);
        Ok(Self { _claim: () })
    }
}

impl Drop for SystemEngine {
    fn drop(&mut self) {
        CLAIMED.store(false, Ordering::Release);
    }
}

/// Copy a C string owned by the library into an owned `String`
fn owned_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: the library returns static NUL-terminated strings in its
    // revision struct; we copy immediately and never hold the pointer.
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

impl NativeEngine for SystemEngine {
    fn new_instance(&self) -> std::result::Result<InstanceHandle, i32> {
        let mut instance: *mut c_void = ptr::null_mut();
        // SAFETY: `instance` is a valid out-pointer; the caller handle is
        // supplied later through `gsapi_set_stdio_with_handle`.
        let code = unsafe { gsapi_new_instance(&mut instance, ptr::null_mut()) };
        if code < 0 {
            return Err(code);
        }
        match NonNull::new(instance) {
            // SAFETY: freshly created by the engine
            Some(ptr) => Ok(unsafe { InstanceHandle::from_raw(ptr) }),
            None => Err(crate::codes::ErrorCode::Fatal.raw()),
        }
    }

    fn set_stdio(&self, handle: &InstanceHandle, callbacks: StdioCallbacks) -> i32 {
        // SAFETY: the handle is live; the manager keeps the bridge behind
        // `caller_handle` alive until after the instance is deleted.
        unsafe {
            gsapi_set_stdio_with_handle(
                handle.as_ptr(),
                callbacks.stdin,
                callbacks.stdout,
                callbacks.stderr,
                callbacks.caller_handle,
            )
        }
    }

    fn init_with_args(&self, handle: &InstanceHandle, args: &[CString]) -> i32 {
        // The engine takes `char **` but does not modify the strings.
        let mut argv: Vec<*mut c_char> = args.iter().map(|a| a.as_ptr() as *mut c_char).collect();
        // SAFETY: `argv` and the `CString`s it points into outlive the call.
        unsafe { gsapi_init_with_args(handle.as_ptr(), argv.len() as c_int, argv.as_mut_ptr()) }
    }

    fn exit(&self, handle: &InstanceHandle) -> i32 {
        // SAFETY: the handle is live
        unsafe { gsapi_exit(handle.as_ptr()) }
    }

    fn delete_instance(&self, handle: InstanceHandle) {
        // SAFETY: the handle is live and consumed here
        unsafe { gsapi_delete_instance(handle.as_ptr()) }
    }

    fn revision(&self) -> std::result::Result<Revision, i32> {
        let mut raw = gsapi_revision_t {
            product: ptr::null(),
            copyright: ptr::null(),
            revision: 0,
            revisiondate: 0,
        };
        let len = std::mem::size_of::<gsapi_revision_t>() as c_int;
        // SAFETY: `raw` is a correctly sized, writable revision struct.
        let code = unsafe { gsapi_revision(&mut raw, len) };
        // A positive return is the struct size the library wanted instead.
        if code != 0 {
            return Err(if code < 0 { code } else { crate::codes::ErrorCode::Fatal.raw() });
        }
        Ok(Revision {
            product: owned_string(raw.product),
            copyright: owned_string(raw.copyright),
            revision: raw.revision as i64,
            revision_date: raw.revisiondate as i64,
        })
    }
}
