//! The crate-wide error taxonomy (see the design notes on error handling).
//!
//! [`association::client`](crate::association::client) and
//! [`association::server`](crate::association::server) raise their own,
//! more granular error enums for the establishment handshake; this
//! taxonomy is what the [`dul`](crate::dul) provider and
//! [`sm`](crate::sm)-driven bookkeeping surface once an association is
//! already up, so that a single `match` at the call site can tell a
//! dropped network apart from a rejected, released or aborted peer.

use snafu::Snafu;

use crate::pdu::{AssociationRJResult, AssociationRJSource};

/// A reason given by the peer in an A-ABORT PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortReason {
    pub source: u8,
    pub reason: u8,
}

/// Errors surfaced to the application once an association is running.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// the underlying transport failed or was closed unexpectedly
    #[snafu(display("network error: {source}"))]
    Network { source: std::io::Error },

    /// a malformed or out-of-sequence PDU was observed; the state
    /// machine has already reacted with AA-8
    #[snafu(display("protocol error: {message}"))]
    Protocol { message: String },

    /// the peer rejected the association request
    #[snafu(display(
        "association rejected (result: {result:?}, source: {source:?})"
    ))]
    Rejected {
        result: AssociationRJResult,
        source: AssociationRJSource,
    },

    /// the peer asked to release the association
    #[snafu(display("association released by peer"))]
    Released,

    /// the peer aborted the association
    #[snafu(display(
        "association aborted by peer (source {}, reason {})",
        reason.source,
        reason.reason
    ))]
    Aborted { reason: AbortReason },

    /// waiting for the next PDU exceeded `association.timeout`
    #[snafu(display("timed out waiting for a response from the peer"))]
    Timeout,

    /// the requested SOP class is not part of the accepted
    /// presentation context map
    #[snafu(display("SOP class `{sop_class_uid}` not supported by this association"))]
    ClassNotSupported { sop_class_uid: String },

    /// a user callback could not process the event; the core still
    /// owes the peer a response PDU
    #[snafu(display("application callback failed: {message}"))]
    EventHandling { message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
