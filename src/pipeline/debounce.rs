use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::error::FieldError;

/// Trailing-edge debounce over a Tokio timer.
///
/// Each `schedule` aborts the armed timer and arms a new one; the callback
/// only ever sees the last value of a burst.
pub struct Debouncer<T> {
    delay: Duration,
    runtime: Handle,
    callback: Arc<dyn Fn(T) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, callback: F) -> Result<Self, FieldError>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| FieldError::NoRuntime)?;
        Ok(Self::with_runtime(runtime, delay, callback))
    }

    pub fn with_runtime<F>(runtime: Handle, delay: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            runtime,
            callback: Arc::new(callback),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&self, value: T) {
        let mut pending = self.lock();
        if let Some(timer) = pending.take() {
            timer.abort();
        }
        let callback = Arc::clone(&self.callback);
        let delay = self.delay;
        *pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            callback(value);
        }));
    }

    pub fn cancel(&self) {
        if let Some(timer) = self.lock().take() {
            timer.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
    }
}
