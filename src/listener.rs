#[cfg(test)]
use mockall::automock;

/// A trait for handling the payloads a [`Receiver`](crate::Receiver) runs.
///
/// Closures don't need it: [`Receiver::from_fn`](crate::Receiver::from_fn)
/// and [`Broadcaster::attach_callback`](crate::Broadcaster::attach_callback)
/// take any `Fn(&T)`. Implement it for types that keep their own state.
#[cfg_attr(test, automock(type Event=u32;))]
pub trait Listener {
    type Event;

    /// Handles one payload. It's called synchronously from inside `send` or
    /// `run`.
    fn on_event(&self, event: &Self::Event);
}
