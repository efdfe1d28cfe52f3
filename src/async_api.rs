use crate::manager::{ConversionReport, EngineManager};
use crate::native::{NativeEngine, Revision};
use crate::settings::ConversionSettings;
use crate::{Error, Result};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;

/// An async-friendly converter backed by worker threads.
///
/// Each call runs the blocking conversion on its own thread and replies
/// through a oneshot channel. Dropping the returned future (for example under
/// `tokio::time::timeout`) abandons the result; the worker still finishes the
/// run and tears the instance down, so the engine is never left half-open.
pub struct AsyncConverter<E: NativeEngine + 'static> {
    manager: Arc<EngineManager<E>>,
}

impl<E: NativeEngine + 'static> Clone for AsyncConverter<E> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
        }
    }
}

impl<E: NativeEngine + 'static> AsyncConverter<E> {
    pub fn new(manager: EngineManager<E>) -> Self {
        Self::from_shared(Arc::new(manager))
    }

    /// Share a manager that synchronous callers also use
    pub fn from_shared(manager: Arc<EngineManager<E>>) -> Self {
        Self { manager }
    }

    /// The underlying manager, for observers and synchronous calls
    pub fn manager(&self) -> &Arc<EngineManager<E>> {
        &self.manager
    }

    /// Convert `inputs` into `output` on a worker thread
    pub async fn convert(
        &self,
        output: String,
        inputs: Vec<String>,
        settings: ConversionSettings,
    ) -> Result<ConversionReport> {
        self.spawn("Convert", move |m| m.convert(&output, &inputs, &settings))
            .await
    }

    /// Async counterpart of [`EngineManager::generate_page_thumbs`]
    #[allow(clippy::too_many_arguments)]
    pub async fn generate_page_thumbs(
        &self,
        input: String,
        output: String,
        first_page: u32,
        last_page: u32,
        dpi_x: u32,
        dpi_y: u32,
        width: u32,
        height: u32,
    ) -> Result<ConversionReport> {
        self.spawn("Thumbnails", move |m| {
            m.generate_page_thumbs(&input, &output, first_page, last_page, dpi_x, dpi_y, width, height)
        })
        .await
    }

    /// Engine build metadata
    pub async fn revision(&self) -> Result<Revision> {
        self.spawn("Revision", |m| m.revision().cloned()).await
    }

    async fn spawn<T, F>(&self, what: &'static str, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&EngineManager<E>) -> Result<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let manager = self.manager.clone();
        thread::Builder::new()
            .name("gsdrive-worker".into())
            .spawn(move || {
                let res = job(&manager);
                // Receiver is gone when the caller gave up; the run is already torn down.
                if tx.send(res).is_err() {
                    log::debug!("{} result dropped: caller no longer waiting", what);
                }
            })
            .map_err(|e| Error::Other(format!("{} worker spawn failed: {}", what, e)))?;

        rx.await
            .map_err(|e| Error::Other(format!("{} canceled: {}", what, e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{InstanceHandle, StdioCallbacks};
    use crate::settings::Device;
    use std::ffi::CString;
    use std::ptr::NonNull;

    struct PanickyEngine;

    impl NativeEngine for PanickyEngine {
        fn new_instance(&self) -> std::result::Result<InstanceHandle, i32> {
            Ok(unsafe { InstanceHandle::from_raw(NonNull::dangling()) })
        }
        fn set_stdio(&self, _: &InstanceHandle, _: StdioCallbacks) -> i32 {
            0
        }
        fn init_with_args(&self, _: &InstanceHandle, _: &[CString]) -> i32 {
            panic!("engine crashed")
        }
        fn exit(&self, _: &InstanceHandle) -> i32 {
            0
        }
        fn delete_instance(&self, _: InstanceHandle) {}
        fn revision(&self) -> std::result::Result<Revision, i32> {
            Err(-100)
        }
    }

    #[tokio::test]
    async fn worker_panic_surfaces_as_canceled() {
        let conv = AsyncConverter::new(EngineManager::new(PanickyEngine));
        let settings = ConversionSettings::new(Device::PdfWrite).with_resolution(72, 72);
        let err = conv
            .convert("out.pdf".into(), vec!["in.ps".into()], settings)
            .await
            .unwrap_err();
        match err {
            Error::Other(msg) => assert!(msg.contains("canceled")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn revision_error_is_translated() {
        let conv = AsyncConverter::new(EngineManager::new(PanickyEngine));
        let err = conv.revision().await.unwrap_err();
        assert!(matches!(err, Error::Revision(crate::ErrorCode::Fatal)));
    }
}
