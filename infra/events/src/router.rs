use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{trace, warn};

/// Priority used by [`EventRouter::on`]. Lower runs first.
pub const DEFAULT_PRIORITY: i32 = 10;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), BoxError>;

/// Marker trait for types that can be dispatched through the [`EventRouter`].
///
/// Any type that is `Send + Sync + 'static` automatically implements this trait.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

type ErasedHandler = Arc<dyn Fn(&dyn Any) -> HandlerResult + Send + Sync>;

/// Identifies one registered handler; pass it to [`EventRouter::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

#[derive(Clone)]
struct Registration {
    id: HandlerId,
    name: Cow<'static, str>,
    priority: i32,
    handler: ErasedHandler,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// One handler that did not complete.
#[derive(Debug)]
pub struct HandlerFailure {
    pub handler: HandlerId,
    pub name: Cow<'static, str>,
    pub error: EventBusError,
}

/// Outcome of a single [`EventRouter::dispatch`] call.
#[derive(Debug)]
pub struct DispatchReport {
    pub event: &'static str,
    pub invoked: usize,
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub const fn succeeded(&self) -> usize {
        self.invoked - self.failures.len()
    }
}

#[derive(Debug, Default)]
struct RouterInner {
    handlers: RwLock<FxHashMap<TypeId, Vec<Registration>>>,
    next_id: AtomicU64,
}

/// Thread-safe synchronous event router.
///
/// Handlers are indexed by the [`TypeId`] of the event and kept sorted by
/// `(priority, registration order)`.
#[derive(Debug, Clone, Default)]
pub struct EventRouter {
    inner: Arc<RouterInner>,
}

impl EventRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of type `T` with [`DEFAULT_PRIORITY`].
    ///
    /// # Examples
    /// ```rust
    /// use lms_event_bus::EventRouter;
    ///
    /// struct Ping;
    ///
    /// let router = EventRouter::new();
    /// let id = router.on("noop", |_: &Ping| Ok(()));
    /// assert_eq!(router.handler_count::<Ping>(), 1);
    /// assert!(router.off(id));
    /// ```
    pub fn on<T, F>(&self, name: impl Into<Cow<'static, str>>, handler: F) -> HandlerId
    where
        T: Event,
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_with_priority(name, DEFAULT_PRIORITY, handler)
    }

    /// Registers `handler` for events of type `T`. Lower priorities run first;
    /// equal priorities run in registration order.
    pub fn on_with_priority<T, F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        priority: i32,
        handler: F,
    ) -> HandlerId
    where
        T: Event,
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
    {
        let id = HandlerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let name = name.into();
        let erased: ErasedHandler = Arc::new(move |event: &dyn Any| {
            event.downcast_ref::<T>().map_or_else(
                || Err(format!("expected {}", std::any::type_name::<T>()).into()),
                &handler,
            )
        });

        trace!(event = std::any::type_name::<T>(), handler = %name, priority, "Handler registered");

        let mut handlers = self.inner.handlers.write();
        let list = handlers.entry(TypeId::of::<T>()).or_default();
        // Ids are monotonic, so inserting after every entry of equal priority keeps
        // registration order stable.
        let position = list.partition_point(|existing| existing.priority <= priority);
        list.insert(position, Registration { id, name, priority, handler: erased });
        drop(handlers);

        id
    }

    /// Removes a handler. Returns `false` if the id is unknown.
    pub fn off(&self, id: HandlerId) -> bool {
        let mut handlers = self.inner.handlers.write();
        for list in handlers.values_mut() {
            if let Some(position) = list.iter().position(|r| r.id == id) {
                let removed = list.remove(position);
                trace!(handler = %removed.name, %id, "Handler removed");
                return true;
            }
        }
        false
    }

    /// Number of handlers registered for `T`.
    #[must_use]
    pub fn handler_count<T: Event>(&self) -> usize {
        self.inner.handlers.read().get(&TypeId::of::<T>()).map_or(0, Vec::len)
    }

    /// Runs every handler registered for `T` on the calling thread.
    ///
    /// The handler list is snapshotted before the first call, so handlers may
    /// register, remove, or dispatch without deadlocking.
    pub fn dispatch<T: Event>(&self, event: &T) -> DispatchReport {
        let event_name = std::any::type_name::<T>();
        let snapshot = self.inner.handlers.read().get(&TypeId::of::<T>()).cloned().unwrap_or_default();

        let mut report =
            DispatchReport { event: event_name, invoked: snapshot.len(), failures: Vec::new() };

        let erased: &dyn Any = event;
        for registration in snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| (registration.handler)(erased)));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => EventBusError::Handler {
                    message: err.to_string().into(),
                    context: Some(registration.name.clone()),
                },
                Err(payload) => EventBusError::Panicked {
                    message: panic_message(payload.as_ref()),
                    context: Some(registration.name.clone()),
                },
            };

            warn!(
                event = event_name,
                handler = %registration.name,
                id = %registration.id,
                error = %error,
                "Event handler failed"
            );
            report.failures.push(HandlerFailure {
                handler: registration.id,
                name: registration.name,
                error,
            });
        }

        trace!(
            event = event_name,
            invoked = report.invoked,
            failed = report.failures.len(),
            "Event dispatched"
        );
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Cow<'static, str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Cow::Borrowed(message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Cow::Owned(message.clone())
    } else {
        Cow::Borrowed("non-string panic payload")
    }
}
