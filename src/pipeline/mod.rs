//! Debounce → validate → commit, shared by every property field.

mod debounce;
mod dispatcher;
mod error;
mod gateway;
mod state;
mod token;

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::domain::{CandidateValue, PropertyValue, Validator};
use crate::host::HostBinding;

pub use debounce::Debouncer;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{CommitStage, FieldError};
pub use gateway::{CommitGateway, CommitOutcome};
pub use state::ValidationState;
pub use token::{TokenCounter, ValidationToken};

use state::ValidationSlot;

/// The per-field pipeline: schedules candidates, validates the survivor of
/// each debounce window and commits it when valid.
///
/// Dropping it (or calling [`dispose`](Self::dispose)) disarms the timer;
/// validations already in flight resolve into nothing.
pub struct DeferredValidation<V: CandidateValue> {
    slot: Arc<ValidationSlot<V>>,
    dispatcher: Arc<Dispatcher<V>>,
    debouncer: Debouncer<Armed<V>>,
    activity: Activity,
}

/// A debounced candidate carries the activity it keeps alive, so an aborted
/// timer releases it when the runtime drops the task.
type Armed<V> = (ValidationToken, V, Busy);

impl<V: CandidateValue> DeferredValidation<V> {
    pub fn new(
        binding: HostBinding,
        validator: Option<Arc<dyn Validator<V>>>,
        initial_value: Option<PropertyValue>,
        delay: Duration,
    ) -> Result<Self, FieldError> {
        let runtime = Handle::try_current().map_err(|_| FieldError::NoRuntime)?;
        let slot = Arc::new(ValidationSlot::new());
        let dispatcher = Arc::new(Dispatcher::new(
            validator,
            CommitGateway::new(binding),
            initial_value,
            Arc::clone(&slot),
        ));

        let fire = {
            let dispatcher = Arc::clone(&dispatcher);
            let runtime = runtime.clone();
            move |(token, value, busy): Armed<V>| {
                let dispatcher = Arc::clone(&dispatcher);
                runtime.spawn(async move {
                    let _busy = busy;
                    match dispatcher.validate(token, value).await {
                        Ok(outcome) => tracing::debug!(?outcome, "validation round finished"),
                        Err(err) => dispatcher.gateway().binding().report(&err),
                    }
                });
            }
        };

        Ok(Self {
            slot,
            dispatcher,
            debouncer: Debouncer::with_runtime(runtime, delay, fire),
            activity: Activity::new(),
        })
    }

    /// Queues `value` behind the debounce delay. The returned token
    /// supersedes every earlier one, including validations already running.
    pub fn schedule(&self, value: V) -> ValidationToken {
        let token = self.slot.tokens.issue();
        tracing::debug!(
            %token,
            property = self.target_property(),
            ?value,
            "candidate scheduled"
        );
        self.debouncer.schedule((token, value, self.activity.enter()));
        token
    }

    /// Validates `value` right away, skipping the debounce delay. Host
    /// callback failures come back to the caller.
    pub async fn validate_now(&self, value: V) -> Result<DispatchOutcome, FieldError> {
        self.debouncer.cancel();
        let token = self.slot.tokens.issue();
        let _busy = self.activity.enter();
        self.dispatcher.validate(token, value).await
    }

    pub fn error_message(&self) -> Option<String> {
        self.slot.snapshot().error_message().map(str::to_string)
    }

    pub fn state(&self) -> ValidationState<V> {
        self.slot.snapshot()
    }

    pub fn latest_token(&self) -> Option<ValidationToken> {
        self.slot.tokens.latest()
    }

    pub fn target_property(&self) -> &str {
        self.dispatcher.gateway().binding().target_property()
    }

    pub fn delay(&self) -> Duration {
        self.debouncer.delay()
    }

    /// A timer is armed or a validation is still running. A cancelled timer
    /// counts until the runtime reaps its task.
    pub fn is_pending(&self) -> bool {
        self.activity.count() > 0
    }

    /// Resolves once nothing is pending.
    pub async fn settled(&self) {
        self.activity.idle().await;
    }

    pub fn dispose(&self) {
        self.debouncer.cancel();
        let mut state = self.slot.lock();
        if !state.is_disposed() {
            let next = state.disposed();
            *state = next;
            tracing::debug!(property = self.target_property(), "field disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.slot.snapshot().is_disposed()
    }
}

impl<V: CandidateValue> Drop for DeferredValidation<V> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<V: CandidateValue> std::fmt::Debug for DeferredValidation<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredValidation")
            .field("target_property", &self.target_property())
            .field("delay", &self.delay())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Armed timers plus running validations, published through a watch
/// channel so waiters wake on every change.
struct Activity(Arc<watch::Sender<usize>>);

impl Activity {
    fn new() -> Self {
        Self(Arc::new(watch::Sender::new(0)))
    }

    fn enter(&self) -> Busy {
        self.0.send_modify(|count| *count += 1);
        Busy(Arc::clone(&self.0))
    }

    fn count(&self) -> usize {
        *self.0.borrow()
    }

    async fn idle(&self) {
        let mut changes = self.0.subscribe();
        // The sender outlives this borrow, so the channel cannot close here.
        let _ = changes.wait_for(|count| *count == 0).await;
    }
}

struct Busy(Arc<watch::Sender<usize>>);

impl Drop for Busy {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count -= 1);
    }
}
