//! Recording stand-in for the native engine, shared by the integration tests

#![allow(dead_code)]

use gsdrive::{InstanceHandle, NativeEngine, Revision, StdioCallbacks};
use std::ffi::CString;
use std::path::Path;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Counts every native call, checks that at most one instance is ever live,
/// and optionally writes the output files a real run would produce.
#[derive(Default)]
pub struct RecordingEngine {
    pub created: AtomicUsize,
    pub bound: AtomicUsize,
    pub runs: AtomicUsize,
    pub exited: AtomicUsize,
    pub deleted: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,

    create_code: Option<i32>,
    bind_code: i32,
    run_code: i32,
    exit_code: i32,
    run_delay: Option<Duration>,
    render: bool,
    stdout: Vec<String>,
    stderr: Vec<String>,

    callbacks: Mutex<Option<StdioCallbacks>>,
    calls: Mutex<Vec<Vec<String>>>,
    sequence: Mutex<Vec<&'static str>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_create(mut self, code: i32) -> Self {
        self.create_code = Some(code);
        self
    }

    pub fn failing_bind(mut self, code: i32) -> Self {
        self.bind_code = code;
        self
    }

    pub fn run_code(mut self, code: i32) -> Self {
        self.run_code = code;
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    pub fn run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = Some(delay);
        self
    }

    /// Write page files for `-sOutputFile` during the run
    pub fn rendering(mut self) -> Self {
        self.render = true;
        self
    }

    pub fn stdout_line(mut self, text: &str) -> Self {
        self.stdout.push(text.to_string());
        self
    }

    pub fn stderr_line(mut self, text: &str) -> Self {
        self.stderr.push(text.to_string());
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Highest number of instances that were alive at the same time
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    /// Argument vectors of every run, in order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of the native calls in the order they happened
    pub fn sequence(&self) -> Vec<&'static str> {
        self.sequence.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.sequence.lock().unwrap().push(call);
    }

    pub fn last_call(&self) -> Vec<String> {
        self.calls().pop().expect("no run recorded")
    }

    fn write_pages(args: &[String]) {
        let value = |prefix: &str| {
            args.iter()
                .find_map(|a| a.strip_prefix(prefix))
                .map(|v| v.to_string())
        };
        let Some(output) = value("-sOutputFile=") else {
            return;
        };
        let first: u32 = value("-dFirstPage=").and_then(|v| v.parse().ok()).unwrap_or(1);
        let last: u32 = value("-dLastPage=").and_then(|v| v.parse().ok()).unwrap_or(first);

        if output.contains("%d") {
            // The engine numbers output files from 1 regardless of FirstPage
            for n in 1..=(last.saturating_sub(first) + 1) {
                let path = output.replace("%d", &n.to_string());
                std::fs::write(Path::new(&path), format!("page {}", first + n - 1)).unwrap();
            }
        } else {
            std::fs::write(Path::new(&output), b"document").unwrap();
        }
    }
}

impl NativeEngine for RecordingEngine {
    fn new_instance(&self) -> Result<InstanceHandle, i32> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.record("create");
        if let Some(code) = self.create_code {
            return Err(code);
        }
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(unsafe { InstanceHandle::from_raw(NonNull::dangling()) })
    }

    fn set_stdio(&self, _handle: &InstanceHandle, callbacks: StdioCallbacks) -> i32 {
        self.bound.fetch_add(1, Ordering::SeqCst);
        self.record("bind");
        if self.bind_code < 0 {
            return self.bind_code;
        }
        *self.callbacks.lock().unwrap() = Some(callbacks);
        0
    }

    fn init_with_args(&self, _handle: &InstanceHandle, args: &[CString]) -> i32 {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.record("run");
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        if let Some(cb) = *self.callbacks.lock().unwrap() {
            for line in &self.stdout {
                assert_eq!(unsafe { cb.write_stdout(line.as_bytes()) }, line.len() as i32);
            }
            for line in &self.stderr {
                assert_eq!(unsafe { cb.write_stderr(line.as_bytes()) }, line.len() as i32);
            }
        }
        if let Some(delay) = self.run_delay {
            std::thread::sleep(delay);
        }
        if self.render && self.run_code >= 0 {
            Self::write_pages(&args);
        }

        self.calls.lock().unwrap().push(args);
        self.run_code
    }

    fn exit(&self, _handle: &InstanceHandle) -> i32 {
        self.exited.fetch_add(1, Ordering::SeqCst);
        self.record("exit");
        self.exit_code
    }

    fn delete_instance(&self, _handle: InstanceHandle) {
        *self.callbacks.lock().unwrap() = None;
        self.live.fetch_sub(1, Ordering::SeqCst);
        self.deleted.fetch_add(1, Ordering::SeqCst);
        self.record("delete");
    }

    fn revision(&self) -> Result<Revision, i32> {
        Ok(Revision {
            product: "GPL Ghostscript".to_string(),
            copyright: "Copyright (C) 2025 Artifex Software, Inc.  All rights reserved.".to_string(),
            revision: 10051,
            revision_date: 20250312,
        })
    }
}
