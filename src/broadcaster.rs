use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::binding;
use crate::config::{Config, DispatchPolicy};
use crate::error::Side;
use crate::listener::Listener;
use crate::receiver::{Core as ReceiverCore, Receiver};
use crate::RELAY_LOG_TARGET;

/// The shared part of a broadcaster: the list its receivers are bound to.
///
/// Receivers keep weak references to it, adapters reach it through a weak
/// reference too. Only the [`Broadcaster`] handle owns it.
pub(crate) struct Core<T: 'static> {
    subscribers: RefCell<Vec<Weak<ReceiverCore<T>>>>,
    config: Config,
}

impl<T: 'static> Core<T> {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            config,
        }
    }

    pub(crate) fn config(&self) -> Config {
        self.config
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub(crate) fn subscriber_position(&self, receiver: &Rc<ReceiverCore<T>>) -> Option<usize> {
        self.subscribers
            .borrow()
            .iter()
            .position(|subscriber| Weak::as_ptr(subscriber) == Rc::as_ptr(receiver))
    }

    pub(crate) fn push_subscriber(&self, receiver: Weak<ReceiverCore<T>>) {
        self.subscribers.borrow_mut().push(receiver);
    }

    pub(crate) fn remove_subscriber_at(&self, index: usize) {
        self.subscribers.borrow_mut().remove(index);
    }

    fn subscriber_at(&self, index: usize) -> Option<Weak<ReceiverCore<T>>> {
        self.subscribers.borrow().get(index).cloned()
    }

    fn last_subscriber(&self) -> Option<Weak<ReceiverCore<T>>> {
        self.subscribers.borrow().last().cloned()
    }

    /// Runs every subscriber with the payload.
    ///
    /// No borrow is held while a subscriber runs, so subscribers can bind,
    /// unbind and send from inside their callbacks.
    pub(crate) fn dispatch(self: &Rc<Self>, payload: &T) {
        tracing::trace!(target: RELAY_LOG_TARGET, subscribers = self.len(), policy = %self.config.dispatch, "dispatching");

        match self.config.dispatch {
            DispatchPolicy::Snapshot => self.dispatch_snapshot(payload),
            DispatchPolicy::Live => self.dispatch_live(payload),
        }
    }

    fn dispatch_snapshot(self: &Rc<Self>, payload: &T) {
        let snapshot = self.subscribers.borrow().clone();

        for subscriber in snapshot {
            let Some(receiver) = subscriber.upgrade() else {
                continue;
            };

            // An earlier subscriber may have unbound it.
            if receiver.has_sender(self) {
                receiver.run(payload);
            }
        }
    }

    fn dispatch_live(&self, payload: &T) {
        let mut cursor = 0;

        while let Some(subscriber) = self.subscriber_at(cursor) {
            cursor += 1;

            if let Some(receiver) = subscriber.upgrade() {
                receiver.run(payload);
            }
        }
    }
}

/// Sends payloads of type `T` to every bound [`Receiver`], in the order they
/// were bound.
///
/// The broadcaster owns the receivers it creates itself
/// ([`attach_callback`](Self::attach_callback),
/// [`attach_listener`](Self::attach_listener),
/// [`adopt`](Self::adopt)) and its incoming adapter. It only references the
/// receivers passed to [`bind`](Self::bind).
///
/// When it's dropped it unbinds every subscriber, then drops the receivers it
/// owns, then drops the incoming adapter.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use torrust_relay::{Broadcaster, Receiver};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let broadcaster = Broadcaster::<u32>::new();
/// let receiver = Receiver::from_fn({
///     let seen = seen.clone();
///     move |value: &u32| seen.borrow_mut().push(*value)
/// });
///
/// broadcaster.bind(&receiver);
/// broadcaster.send(&5);
///
/// assert_eq!(*seen.borrow(), vec![5]);
/// ```
pub struct Broadcaster<T: 'static> {
    core: Rc<Core<T>>,
    owned: RefCell<Vec<Receiver<T>>>,
    incoming: OnceCell<Receiver<T>>,
}

impl<T: 'static> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl<T: 'static> Broadcaster<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            core: Rc::new(Core::new(config)),
            owned: RefCell::new(Vec::new()),
            incoming: OnceCell::new(),
        }
    }

    pub(crate) fn core(&self) -> &Rc<Core<T>> {
        &self.core
    }

    #[must_use]
    pub fn config(&self) -> Config {
        self.core.config()
    }

    /// Sends the payload to every bound receiver.
    ///
    /// It returns after every receiver, and everything they forward to, has
    /// run. A callback that panics unwinds through this call.
    pub fn send(&self, payload: &T) {
        self.core.dispatch(payload);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        !self.is_empty()
    }

    /// Number of bound receivers, including the ones this broadcaster owns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Binds the receiver. Binding a receiver that is already bound does
    /// nothing.
    ///
    /// The broadcaster does not take ownership of the receiver.
    pub fn bind(&self, receiver: &Receiver<T>) {
        binding::attach(&self.core, receiver.core());
    }

    /// Unbinds the receiver.
    ///
    /// Returns `false` if it was not bound.
    #[must_use]
    pub fn unbind(&self, receiver: &Receiver<T>) -> bool {
        binding::release(&self.core, receiver.core())
    }

    #[must_use]
    pub fn is_bound(&self, receiver: &Receiver<T>) -> bool {
        binding::is_attached(&self.core, receiver.core())
    }

    /// Creates a receiver running the callback, binds it, and keeps it until
    /// the broadcaster is dropped.
    pub fn attach_callback<F>(&self, callback: F)
    where
        F: Fn(&T) + 'static,
    {
        let receiver = Receiver::with_config(self.config());
        receiver.set_callback(callback);

        self.adopt(receiver);
    }

    /// Same as [`attach_callback`](Self::attach_callback) for a [`Listener`].
    pub fn attach_listener<L>(&self, listener: L)
    where
        L: Listener<Event = T> + 'static,
    {
        self.attach_callback(move |event: &T| listener.on_event(event));
    }

    /// Binds the receiver and takes ownership of it. It will be dropped with
    /// the broadcaster.
    pub fn adopt(&self, receiver: Receiver<T>) {
        self.bind(&receiver);
        self.owned.borrow_mut().push(receiver);
    }

    /// Number of receivers owned by this broadcaster.
    #[must_use]
    pub fn owned_len(&self) -> usize {
        self.owned.borrow().len()
    }

    /// Makes every [`send`](Self::send) on this broadcaster also send on the
    /// target, after the subscribers bound before the chain.
    ///
    /// This broadcaster is bound to the target's
    /// [incoming adapter](Self::incoming_adapter). Chaining the same pair
    /// twice does nothing. Chaining a broadcaster to itself is ignored.
    pub fn chain_to(&self, target: &Broadcaster<T>) {
        if Rc::ptr_eq(&self.core, &target.core) {
            tracing::warn!(target: RELAY_LOG_TARGET, "ignoring a broadcaster chained to itself");
            return;
        }

        binding::attach(&self.core, target.incoming_adapter().core());
    }

    /// Removes a chain created with [`chain_to`](Self::chain_to).
    ///
    /// Returns `false` if the broadcasters were not chained.
    #[must_use]
    pub fn unchain_from(&self, target: &Broadcaster<T>) -> bool {
        match target.incoming.get() {
            Some(adapter) => binding::release(&self.core, adapter.core()),
            None => false,
        }
    }

    /// The receiver that re-sends everything it runs on this broadcaster.
    ///
    /// It's created on first use and owned by this broadcaster. Later calls
    /// return the same receiver.
    #[must_use]
    pub fn incoming_adapter(&self) -> &Receiver<T> {
        self.incoming.get_or_init(|| {
            let core = Rc::downgrade(&self.core);

            let adapter = Receiver::with_config(self.config());
            adapter.set_callback(move |payload: &T| {
                if let Some(core) = core.upgrade() {
                    core.dispatch(payload);
                }
            });

            tracing::trace!(target: RELAY_LOG_TARGET, "incoming adapter created");

            adapter
        })
    }
}

impl<T: 'static> Drop for Broadcaster<T> {
    fn drop(&mut self) {
        tracing::debug!(
            target: RELAY_LOG_TARGET,
            subscribers = self.core.len(),
            owned = self.owned.get_mut().len(),
            incoming_adapter = self.incoming.get().is_some(),
            "dropping broadcaster"
        );

        while let Some(subscriber) = self.core.last_subscriber() {
            match subscriber.upgrade() {
                Some(receiver) => binding::sever(&self.core, &receiver),
                None => binding::dangling(Side::Receiver),
            }
        }

        drop(std::mem::take(self.owned.get_mut()));

        drop(self.incoming.take());
    }
}

impl<T: 'static> fmt::Debug for Broadcaster<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.core.len())
            .field("owned", &self.owned.borrow().len())
            .field("incoming_adapter", &self.incoming.get().is_some())
            .field("config", &self.core.config)
            .finish()
    }
}
