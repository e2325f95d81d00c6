//! Self-refreshing fetch resources.
//!
//! A [`Resource`] owns the state of one query (`data`, `loading`, `error`),
//! reloads it on demand with [`Resource::refetch`] and, once mounted, on every
//! bus event it listens to. Responses are applied in ticket order: a response
//! older than the one already shown is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use menuiserie_events::{EventBus, EventName, Unsubscribe};
use menuiserie_infra::ServiceError;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Snapshot of a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: T,
    pub loading: bool,
    /// Message of the last failed load. Cleared by the next successful one.
    pub error: Option<String>,
}

impl<T: Default> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            loading: true,
            error: None,
        }
    }
}

/// Loads the current value of a resource.
#[async_trait::async_trait]
pub trait Loader<T>: Send + Sync {
    async fn load(&self) -> Result<T, ServiceError>;
}

struct Inner<T> {
    loader: Arc<dyn Loader<T>>,
    state: watch::Sender<FetchState<T>>,
    /// Last ticket handed out.
    issued: AtomicU64,
    /// Ticket of the response currently shown. Only written while the watch
    /// channel is locked, so reads and writes are ordered with state changes.
    applied: AtomicU64,
}

impl<T> Inner<T>
where
    T: Send + Sync + 'static,
{
    async fn run(self: Arc<Self>) {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_if_modified(|s| !std::mem::replace(&mut s.loading, true));

        let result = self.loader.load().await;

        self.state.send_if_modified(|s| {
            let applied = self.applied.load(Ordering::SeqCst);
            if ticket < applied {
                tracing::warn!(ticket, applied, "discarding stale response");
                return false;
            }

            self.applied.store(ticket, Ordering::SeqCst);
            match result {
                Ok(data) => {
                    s.data = data;
                    s.error = None;
                }
                Err(err) => {
                    tracing::warn!(ticket, error = %err, "load failed");
                    s.error = Some(err.to_string());
                }
            }
            s.loading = ticket < self.issued.load(Ordering::SeqCst);
            true
        });
    }
}

/// A query result kept up to date.
///
/// Dropping the resource removes its bus subscriptions; a load still in flight
/// completes into the dropped state and is discarded.
pub struct Resource<T> {
    inner: Arc<Inner<T>>,
    subscriptions: Vec<Unsubscribe>,
}

impl<T> core::fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resource")
            .field("issued", &self.inner.issued.load(Ordering::SeqCst))
            .field("applied", &self.inner.applied.load(Ordering::SeqCst))
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

impl<T> Resource<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    /// A resource that only loads when asked to.
    pub fn new(loader: Arc<dyn Loader<T>>) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            inner: Arc::new(Inner {
                loader,
                state,
                issued: AtomicU64::new(0),
                applied: AtomicU64::new(0),
            }),
            subscriptions: Vec::new(),
        }
    }

    /// Load once, then reload on each of `events`.
    ///
    /// Reloads triggered by the bus run on the runtime this is called from.
    pub async fn mount(loader: Arc<dyn Loader<T>>, bus: &EventBus, events: &[EventName]) -> Self {
        let mut resource = Self::new(loader);
        let runtime = Handle::current();

        for &event in events {
            let weak: Weak<Inner<T>> = Arc::downgrade(&resource.inner);
            let runtime = runtime.clone();
            let subscription = bus.subscribe(event, move |_payload| {
                if let Some(inner) = weak.upgrade() {
                    tracing::info!(event = %event, "refetch triggered");
                    runtime.spawn(inner.run());
                }
                Ok(())
            });
            resource.subscriptions.push(subscription);
        }

        resource.refetch().await;
        resource
    }

    /// Reload now and wait for this load to settle.
    pub async fn refetch(&self) {
        self.inner.clone().run().await;
    }

    pub fn state(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }
}

impl<T> Drop for Resource<T> {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use menuiserie_events::{Change, EntityKind};
    use tokio::sync::oneshot;

    /// Each load waits for the next scripted reply.
    struct Scripted {
        replies: Mutex<VecDeque<oneshot::Receiver<Result<Vec<u32>, ServiceError>>>>,
    }

    impl Scripted {
        fn new(count: usize) -> (Arc<Self>, Vec<oneshot::Sender<Result<Vec<u32>, ServiceError>>>) {
            let mut senders = Vec::new();
            let mut receivers = VecDeque::new();
            for _ in 0..count {
                let (tx, rx) = oneshot::channel();
                senders.push(tx);
                receivers.push_back(rx);
            }
            (
                Arc::new(Self {
                    replies: Mutex::new(receivers),
                }),
                senders,
            )
        }
    }

    #[async_trait::async_trait]
    impl Loader<Vec<u32>> for Scripted {
        async fn load(&self) -> Result<Vec<u32>, ServiceError> {
            let rx = self.replies.lock().unwrap().pop_front().expect("unscripted load");
            rx.await.expect("reply dropped")
        }
    }

    /// Counts loads and returns the count.
    #[derive(Default)]
    struct Counter(AtomicU64);

    #[async_trait::async_trait]
    impl Loader<Vec<u32>> for Counter {
        async fn load(&self) -> Result<Vec<u32>, ServiceError> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(vec![n as u32])
        }
    }

    fn failure() -> ServiceError {
        ServiceError::Missing {
            entity: "client",
            id: "42".to_string(),
        }
    }

    #[tokio::test]
    async fn starts_loading_with_empty_data() {
        let resource: Resource<Vec<u32>> = Resource::new(Arc::new(Counter::default()));
        let state = resource.state();
        assert!(state.loading);
        assert!(state.data.is_empty());
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn refetch_applies_data() {
        let resource: Resource<Vec<u32>> = Resource::new(Arc::new(Counter::default()));
        resource.refetch().await;
        resource.refetch().await;
        assert_eq!(
            resource.state(),
            FetchState {
                data: vec![2],
                loading: false,
                error: None
            }
        );
    }

    #[tokio::test]
    async fn failure_keeps_previous_data_and_records_message() {
        let (loader, mut replies) = Scripted::new(2);
        let resource: Resource<Vec<u32>> = Resource::new(loader);

        let first = replies.remove(0);
        let (_, _) = tokio::join!(resource.refetch(), async {
            first.send(Ok(vec![7])).unwrap();
        });
        let second = replies.remove(0);
        let (_, _) = tokio::join!(resource.refetch(), async {
            second.send(Err(failure())).unwrap();
        });

        let state = resource.state();
        assert_eq!(state.data, vec![7]);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("client 42 not found"));
    }

    #[tokio::test]
    async fn stale_response_never_overwrites_newer_one() {
        let (loader, mut replies) = Scripted::new(2);
        let resource: Resource<Vec<u32>> = Resource::new(loader);
        let newer = replies.pop().unwrap();
        let older = replies.pop().unwrap();

        let mut rx = resource.watch();
        tokio::join!(resource.refetch(), resource.refetch(), async {
            // Second request answers first.
            newer.send(Ok(vec![2])).unwrap();
            rx.wait_for(|s| s.data == vec![2]).await.unwrap();
            assert!(!resource.state().loading);
            older.send(Ok(vec![1])).unwrap();
        });

        let state = resource.state();
        assert_eq!(state.data, vec![2]);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn loading_stays_true_until_newest_ticket_lands() {
        let (loader, mut replies) = Scripted::new(2);
        let resource: Resource<Vec<u32>> = Resource::new(loader);
        let newer = replies.pop().unwrap();
        let older = replies.pop().unwrap();

        let mut rx = resource.watch();
        tokio::join!(resource.refetch(), resource.refetch(), async {
            older.send(Ok(vec![1])).unwrap();
            rx.wait_for(|s| s.data == vec![1]).await.unwrap();
            assert!(resource.state().loading);
            newer.send(Ok(vec![2])).unwrap();
        });

        assert_eq!(resource.state().data, vec![2]);
        assert!(!resource.state().loading);
    }

    #[tokio::test]
    async fn mounted_resource_reloads_on_events_and_stops_when_dropped() {
        let bus = EventBus::new();
        let loader = Arc::new(Counter::default());
        let events = EventName::all_for(EntityKind::Client);
        let resource: Resource<Vec<u32>> = Resource::mount(loader, &bus, &events).await;
        assert_eq!(resource.state().data, vec![1]);

        let mut rx = resource.watch();
        bus.notify(EventName::new(EntityKind::Client, Change::Refresh));
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| s.data == vec![2]))
            .await
            .unwrap()
            .unwrap();

        // Other entities do not trigger a reload.
        assert_eq!(bus.notify(EventName::new(EntityKind::Project, Change::Refresh)), 0);

        drop(rx);
        drop(resource);
        assert_eq!(bus.subscriber_count(EventName::new(EntityKind::Client, Change::Created)), 0);
        assert_eq!(bus.notify(EventName::new(EntityKind::Client, Change::Refresh)), 0);
    }
}
