//! Typed broadcasters and receivers that can be wired together at runtime.
//!
//! A [`Broadcaster`] fans a payload out to every [`Receiver`] bound to it, in
//! binding order. A [`Receiver`] runs an optional callback and can forward the
//! payload to further receivers. Both sides keep track of the other, so
//! dropping either end removes the binding and nothing is ever invoked after
//! it has been dropped.
//!
//! ```text
//!                    +--------------+
//!   send(&event) --> | Broadcaster  | --> Receiver A --> callback
//!                    |              | --> Receiver B --> callback, then forward
//!                    |              | --> owned adapter (attach_callback)
//!                    +--------------+
//!                           |
//!                           | chain_to
//!                           v
//!                    +--------------+
//!                    | Broadcaster  | --> ...
//!                    +--------------+
//! ```
//!
//! Ownership rules:
//!
//! - Bindings are weak. A broadcaster never owns the receivers passed to
//!   [`Broadcaster::bind`] and a receiver never owns its broadcasters.
//! - Adapters are owned by whoever creates them: receivers created by
//!   [`Broadcaster::attach_callback`], the broadcaster's incoming adapter used
//!   by [`Broadcaster::chain_to`], and the outgoing broadcaster a receiver
//!   creates for [`Receiver::forward_to`].
//!
//! Payloads with more than one value are sent as tuples.
//!
//! The types are single-threaded (`!Send`, `!Sync`).
pub mod broadcaster;
pub mod bus;
pub mod config;
pub mod error;
pub mod listener;
pub mod receiver;

mod binding;

pub use broadcaster::Broadcaster;
pub use bus::{EventBus, SenderStatus};
pub use config::{Config, DispatchPolicy};
pub use error::Error;
pub use listener::Listener;
pub use receiver::Receiver;

/// Target for tracing crate logs.
pub const RELAY_LOG_TARGET: &str = "RELAY";
