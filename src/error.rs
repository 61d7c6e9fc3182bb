//! Errors returned when manipulating bindings.
use std::panic::Location;

use derive_more::Display;
use thiserror::Error;

/// The end of a binding whose edge was expected but not found.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    #[display("broadcaster")]
    Broadcaster,
    #[display("receiver")]
    Receiver,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Error returned by a strict unbind when the pair was never bound, or
    /// has already been unbound.
    #[error("the receiver is not bound to the broadcaster, {location}")]
    NotBound { location: &'static Location<'static> },

    /// Only one side of a binding exists. The binding graph is corrupted and
    /// the process can not continue safely.
    #[error("binding graph is inconsistent: the {side} side of the edge is missing, {location}")]
    MissingEdge {
        side: Side,
        location: &'static Location<'static>,
    },
}
