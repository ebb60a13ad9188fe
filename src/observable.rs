use std::sync::{Arc, Mutex, MutexGuard};

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by `subscribe`, used to remove the observer again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct Inner<T> {
    value: T,
    observers: Vec<(Subscription, Observer<T>)>,
    next_id: u64,
}

/// Value container that notifies its observers synchronously on every `set`
///
/// Cloning yields another handle to the same value. Observers are called
/// outside the value lock, so an observer may read the container or
/// unsubscribe itself. Notifications and subscribe replays are serialized
/// by a second lock: an observer never sees an older value after a newer
/// one. Observers must not call `set` or `subscribe` on the same container.
pub struct Observable<T> {
    inner: Arc<Mutex<Inner<T>>>,
    notify: Arc<Mutex<()>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value: initial,
                observers: Vec::new(),
                next_id: 0,
            })),
            notify: Arc::new(Mutex::new(())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // Observers never run under this lock.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notifying(&self) -> MutexGuard<'_, ()> {
        self.notify.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Replace the value and notify every registered observer before returning
    pub fn set(&self, new_value: T) {
        let _notifying = self.notifying();
        let observers: Vec<Observer<T>> = {
            let mut inner = self.lock();
            inner.value = new_value.clone();
            inner.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
        };

        for observer in observers {
            observer(&new_value);
        }
    }

    /// Register an observer and replay the current value to it immediately
    ///
    /// A concurrent `set` waits until the replay has been delivered.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let observer: Observer<T> = Arc::new(observer);
        let _notifying = self.notifying();
        let (subscription, current) = {
            let mut inner = self.lock();
            let subscription = Subscription(inner.next_id);
            inner.next_id += 1;
            inner.observers.push((subscription, Arc::clone(&observer)));
            (subscription, inner.value.clone())
        };

        observer(&current);
        subscription
    }

    /// Returns false if the subscription was not registered
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut inner = self.lock();
        let before = inner.observers.len();
        inner.observers.retain(|(id, _)| *id != subscription);
        inner.observers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().observers.len()
    }

    pub fn read_only(&self) -> ReadOnlyObservable<T> {
        ReadOnlyObservable {
            inner: self.clone(),
        }
    }
}

/// View of an [`Observable`] without write access
pub struct ReadOnlyObservable<T> {
    inner: Observable<T>,
}

impl<T> Clone for ReadOnlyObservable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> ReadOnlyObservable<T> {
    pub fn get(&self) -> T {
        self.inner.get()
    }

    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.subscribe(observer)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.inner.unsubscribe(subscription)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }
}
