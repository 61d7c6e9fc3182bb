use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::binding;
use crate::broadcaster::{Broadcaster, Core as BroadcasterCore};
use crate::config::Config;
use crate::error::{Error, Side};
use crate::listener::Listener;
use crate::RELAY_LOG_TARGET;

type Callback<T> = Rc<dyn Fn(&T)>;

/// The shared part of a receiver. Broadcasters keep weak references to it.
pub(crate) struct Core<T: 'static> {
    callback: RefCell<Option<Callback<T>>>,
    senders: RefCell<Vec<Weak<BroadcasterCore<T>>>>,
    outgoing: RefCell<Option<Broadcaster<T>>>,
    config: Config,
}

impl<T: 'static> Core<T> {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            callback: RefCell::new(None),
            senders: RefCell::new(Vec::new()),
            outgoing: RefCell::new(None),
            config,
        }
    }

    pub(crate) fn sender_count(&self) -> usize {
        self.senders.borrow().len()
    }

    pub(crate) fn has_sender(&self, sender: &Rc<BroadcasterCore<T>>) -> bool {
        self.sender_position(sender).is_some()
    }

    pub(crate) fn sender_position(&self, sender: &Rc<BroadcasterCore<T>>) -> Option<usize> {
        self.senders
            .borrow()
            .iter()
            .position(|bound| Weak::as_ptr(bound) == Rc::as_ptr(sender))
    }

    pub(crate) fn push_sender(&self, sender: Weak<BroadcasterCore<T>>) {
        self.senders.borrow_mut().push(sender);
    }

    pub(crate) fn remove_sender_at(&self, index: usize) {
        self.senders.borrow_mut().remove(index);
    }

    fn last_sender(&self) -> Option<Weak<BroadcasterCore<T>>> {
        self.senders.borrow().last().cloned()
    }

    /// Runs the callback, then forwards the payload through the outgoing
    /// broadcaster.
    pub(crate) fn run(&self, payload: &T) {
        let callback = self.callback.borrow().clone();
        if let Some(callback) = callback {
            callback(payload);
        }

        let outgoing = self.outgoing.borrow().as_ref().map(|broadcaster| Rc::clone(broadcaster.core()));
        if let Some(outgoing) = outgoing {
            outgoing.dispatch(payload);
        }
    }

    /// Returns the outgoing broadcaster, creating it on first use.
    fn outgoing_or_create(&self) -> Rc<BroadcasterCore<T>> {
        let mut outgoing = self.outgoing.borrow_mut();

        let broadcaster = outgoing.get_or_insert_with(|| {
            tracing::trace!(target: RELAY_LOG_TARGET, "outgoing broadcaster created");
            Broadcaster::with_config(self.config)
        });

        Rc::clone(broadcaster.core())
    }

    fn outgoing(&self) -> Option<Rc<BroadcasterCore<T>>> {
        self.outgoing.borrow().as_ref().map(|broadcaster| Rc::clone(broadcaster.core()))
    }

    fn unbind_all(self: &Rc<Self>) {
        while let Some(sender) = self.last_sender() {
            match sender.upgrade() {
                Some(broadcaster) => binding::sever(&broadcaster, self),
                None => binding::dangling(Side::Broadcaster),
            }
        }
    }
}

/// Receives payloads of type `T`.
///
/// Running a receiver calls its callback, if it has one, and then forwards
/// the payload to the receivers it [forwards to](Self::forward_to). Either
/// part can be missing.
///
/// A receiver can be bound to any number of [`Broadcaster`]s. When it's
/// dropped it unbinds from all of them and drops the broadcaster it uses to
/// forward.
pub struct Receiver<T: 'static> {
    core: Rc<Core<T>>,
}

impl<T: 'static> Default for Receiver<T> {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl<T: 'static> Receiver<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A receiver without callback. The configuration is used for the
    /// broadcaster it creates to forward.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            core: Rc::new(Core::new(config)),
        }
    }

    #[must_use]
    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(&T) + 'static,
    {
        let receiver = Self::new();
        receiver.set_callback(callback);
        receiver
    }

    #[must_use]
    pub fn from_listener<L>(listener: L) -> Self
    where
        L: Listener<Event = T> + 'static,
    {
        Self::from_fn(move |event: &T| listener.on_event(event))
    }

    pub(crate) fn core(&self) -> &Rc<Core<T>> {
        &self.core
    }

    #[must_use]
    pub fn config(&self) -> Config {
        self.core.config
    }

    /// Calls the callback and then forwards the payload.
    pub fn run(&self, payload: &T) {
        self.core.run(payload);
    }

    /// Replaces the callback. Bindings and forwards are kept.
    ///
    /// It can be called from inside the callback itself; the new callback is
    /// used from the next run.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(&T) + 'static,
    {
        *self.core.callback.borrow_mut() = Some(Rc::new(callback));
    }

    pub fn clear_callback(&self) {
        *self.core.callback.borrow_mut() = None;
    }

    #[must_use]
    pub fn has_callback(&self) -> bool {
        self.core.callback.borrow().is_some()
    }

    /// Forwards every payload this receiver runs to the other receiver, after
    /// its own callback.
    ///
    /// Forwarding to the same receiver twice does nothing. Forwarding a
    /// receiver to itself is ignored.
    pub fn forward_to(&self, other: &Receiver<T>) {
        if Rc::ptr_eq(&self.core, &other.core) {
            tracing::warn!(target: RELAY_LOG_TARGET, "ignoring a receiver forwarding to itself");
            return;
        }

        binding::attach(&self.core.outgoing_or_create(), &other.core);
    }

    /// Stops forwarding to the other receiver.
    ///
    /// Returns `false` if this receiver was not forwarding to it.
    #[must_use]
    pub fn stop_forwarding_to(&self, other: &Receiver<T>) -> bool {
        match self.core.outgoing() {
            Some(outgoing) => binding::release(&outgoing, &other.core),
            None => false,
        }
    }

    #[must_use]
    pub fn is_forwarding(&self) -> bool {
        self.core.outgoing().is_some_and(|outgoing| outgoing.len() > 0)
    }

    /// Binds this receiver to the broadcaster. It's the same binding as
    /// [`Broadcaster::bind`].
    pub fn bind_to(&self, broadcaster: &Broadcaster<T>) {
        broadcaster.bind(self);
    }

    /// Unbinds this receiver from the broadcaster.
    ///
    /// Returns `false` if it was not bound.
    #[must_use]
    pub fn unbind_from(&self, broadcaster: &Broadcaster<T>) -> bool {
        broadcaster.unbind(self)
    }

    /// Unbinds this receiver from the broadcaster.
    ///
    /// # Errors
    ///
    /// Will return `Error::NotBound` if it was not bound.
    ///
    /// # Panics
    ///
    /// Will panic if only one side of the binding exists.
    #[track_caller]
    pub fn try_unbind_from(&self, broadcaster: &Broadcaster<T>) -> Result<(), Error> {
        match binding::detach(broadcaster.core(), &self.core) {
            Err(err @ Error::MissingEdge { .. }) => binding::corrupted(&err),
            result => result,
        }
    }

    /// Unbinds this receiver from every broadcaster.
    pub fn unbind_all(&self) {
        self.core.unbind_all();
    }

    #[must_use]
    pub fn is_bound_to(&self, broadcaster: &Broadcaster<T>) -> bool {
        broadcaster.is_bound(self)
    }

    /// Number of broadcasters this receiver is bound to.
    #[must_use]
    pub fn sender_count(&self) -> usize {
        self.core.sender_count()
    }
}

impl<T: 'static> Drop for Receiver<T> {
    fn drop(&mut self) {
        tracing::trace!(
            target: RELAY_LOG_TARGET,
            senders = self.core.sender_count(),
            "dropping receiver"
        );

        self.core.unbind_all();

        let outgoing = self.core.outgoing.borrow_mut().take();
        drop(outgoing);
    }
}

impl<T: 'static> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("callback", &self.has_callback())
            .field("senders", &self.core.sender_count())
            .field("outgoing", &self.core.outgoing.borrow().as_ref().map(Broadcaster::len))
            .field("config", &self.core.config)
            .finish()
    }
}
