//! Edge operations between broadcasters and receivers.
//!
//! A binding is stored twice: the broadcaster lists the receiver as a
//! subscriber and the receiver lists the broadcaster as a sender. These are
//! the only functions that touch both lists, so both halves are always
//! created and removed together.
use std::panic::Location;
use std::rc::Rc;

use crate::broadcaster::Core as BroadcasterCore;
use crate::error::{Error, Side};
use crate::receiver::Core as ReceiverCore;
use crate::RELAY_LOG_TARGET;

/// Binds the pair. It does nothing if they are already bound.
///
/// Returns `true` when a new binding was created.
pub(crate) fn attach<T: 'static>(sender: &Rc<BroadcasterCore<T>>, receiver: &Rc<ReceiverCore<T>>) -> bool {
    if receiver.has_sender(sender) {
        return false;
    }

    receiver.push_sender(Rc::downgrade(sender));
    sender.push_subscriber(Rc::downgrade(receiver));

    tracing::trace!(target: RELAY_LOG_TARGET, subscribers = sender.len(), "receiver bound");

    true
}

pub(crate) fn is_attached<T: 'static>(sender: &Rc<BroadcasterCore<T>>, receiver: &Rc<ReceiverCore<T>>) -> bool {
    receiver.has_sender(sender)
}

/// Removes both halves of the binding.
///
/// # Errors
///
/// Will return `Error::NotBound` if neither half exists and
/// `Error::MissingEdge` if only one of them does. Nothing is removed in
/// either case.
#[track_caller]
pub(crate) fn detach<T: 'static>(sender: &Rc<BroadcasterCore<T>>, receiver: &Rc<ReceiverCore<T>>) -> Result<(), Error> {
    let location = Location::caller();

    match (receiver.sender_position(sender), sender.subscriber_position(receiver)) {
        (Some(sender_index), Some(subscriber_index)) => {
            receiver.remove_sender_at(sender_index);
            sender.remove_subscriber_at(subscriber_index);

            tracing::trace!(target: RELAY_LOG_TARGET, subscribers = sender.len(), "receiver unbound");

            Ok(())
        }
        (None, None) => Err(Error::NotBound { location }),
        (Some(_), None) => Err(Error::MissingEdge {
            side: Side::Broadcaster,
            location,
        }),
        (None, Some(_)) => Err(Error::MissingEdge {
            side: Side::Receiver,
            location,
        }),
    }
}

/// Unbinds on behalf of the side that owns the teardown. The binding must
/// exist.
///
/// # Panics
///
/// Will panic if either half of the binding is missing.
#[track_caller]
pub(crate) fn sever<T: 'static>(sender: &Rc<BroadcasterCore<T>>, receiver: &Rc<ReceiverCore<T>>) {
    if let Err(err) = detach(sender, receiver) {
        corrupted(&err);
    }
}

/// Unbinds on behalf of a caller that does not know whether the pair is
/// bound.
///
/// Returns `false`, without changes, if the receiver was not bound.
///
/// # Panics
///
/// Will panic if only one side of the binding exists.
#[track_caller]
pub(crate) fn release<T: 'static>(sender: &Rc<BroadcasterCore<T>>, receiver: &Rc<ReceiverCore<T>>) -> bool {
    match detach(sender, receiver) {
        Ok(()) => true,
        Err(Error::NotBound { .. }) => false,
        Err(err) => corrupted(&err),
    }
}

/// Reports an edge whose other end was dropped without unbinding.
///
/// # Panics
///
/// Always.
#[track_caller]
pub(crate) fn dangling(side: Side) -> ! {
    corrupted(&Error::MissingEdge {
        side,
        location: Location::caller(),
    })
}

/// Logs the violation and panics.
///
/// # Panics
///
/// Always.
#[track_caller]
pub(crate) fn corrupted(err: &Error) -> ! {
    tracing::error!(target: RELAY_LOG_TARGET, %err, "binding graph corrupted");

    panic!("{err}");
}
