//! DICOM association module
//!
//! This module contains the two ways of establishing an association
//! between DICOM nodes over a connected stream (usually TCP, but any
//! `Read + Write` works — including a caller-supplied TLS stream):
//!
//! - [`client`] drives the association requester side (PS 3.8 "SCU"):
//!   build an A-ASSOCIATE-RQ, negotiate presentation contexts, exchange
//!   DIMSE messages, then release or abort.
//! - [`server`] drives the association acceptor side (PS 3.8 "SCP"):
//!   accept an incoming A-ASSOCIATE-RQ, apply the negotiation algorithm
//!   of PS 3.8 Annex A, then serve DIMSE requests.
//!
//! Both sides record their [`sm::Role`](crate::sm::Role) at
//! construction time, since the standard's own transition table leaves
//! the next state after a release collision (AR-8) and the branch
//! taken on A-ASSOCIATE-RQ receipt (AE-6) ambiguous without it.

use snafu::Snafu;

use crate::pdu::{AssociationRJResult, AssociationRJSource, Pdu, PresentationContextResultReason};

pub mod client;
pub mod pdata;
pub mod scp;
pub mod server;
pub mod uid;

/// One negotiated presentation context, as recorded by either side
/// after the A-ASSOCIATE-AC has been sent or received.
///
/// Unlike [`PresentationContextResult`](crate::pdu::PresentationContextResult),
/// this also retains the abstract syntax that was originally proposed
/// for this id, which the wire result item does not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationContextNegotiated {
    pub id: u8,
    pub reason: PresentationContextResultReason,
    pub abstract_syntax: String,
    pub transfer_syntax: String,
}

impl PresentationContextNegotiated {
    /// Whether this context was accepted (`result_reason == 0`).
    pub fn is_accepted(&self) -> bool {
        self.reason == PresentationContextResultReason::Acceptance
    }
}

/// Errors common to both the requester and acceptor side of an
/// established association (as opposed to the handshake-specific
/// errors in [`client::Error`] and [`server::Error`]).
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// failed to send a PDU
    #[snafu(display("failed to send PDU: {source}"))]
    Send { source: crate::pdu::writer::Error },

    /// failed to receive a PDU
    #[snafu(display("failed to receive PDU: {source}"))]
    Receive { source: crate::pdu::reader::Error },

    /// failed to frame or reassemble a DIMSE message
    #[snafu(display("DIMSE framing error: {source}"))]
    Dimse { source: crate::dul::Error },

    #[snafu(display("unexpected response `{:?}`", pdu))]
    #[non_exhaustive]
    UnexpectedResponse { pdu: Pdu },

    #[snafu(display("unknown response `{:?}`", pdu))]
    #[non_exhaustive]
    UnknownResponse { pdu: Pdu },

    /// the peer released the association
    Released,

    /// the peer aborted the association
    #[snafu(display("association aborted by peer (source {source:?})"))]
    Aborted { source: AbortSource },

    /// the requested SOP class is not part of the accepted
    /// presentation context map
    #[snafu(display("SOP class `{sop_class_uid}` not supported by this association"))]
    ClassNotSupported { sop_class_uid: String },

    /// no presentation context with this id was accepted
    #[snafu(display("no accepted presentation context with id {id}"))]
    UnknownPresentationContext { id: u8 },

    /// the association was rejected by the peer
    Rejected {
        association_result: AssociationRJResult,
        association_source: AssociationRJSource,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The source/reason pair carried by an A-ABORT PDU, surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortSource(pub crate::pdu::AbortRQSource);

/// Walks an error's `source()` chain looking for an [`std::io::Error`]
/// that indicates a configured read timeout expired, as opposed to any
/// other I/O or protocol failure.
pub(crate) fn is_timeout_error<E>(err: &E) -> bool
where
    E: std::error::Error + 'static,
{
    let mut cur: &(dyn std::error::Error + 'static) = err;
    loop {
        if let Some(io_err) = cur.downcast_ref::<std::io::Error>() {
            return matches!(
                io_err.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            );
        }
        match cur.source() {
            Some(next) => cur = next,
            None => return false,
        }
    }
}

/// Best-effort wait for the peer to close the transport after this node
/// has sent A-ABORT or A-RELEASE-RP (STA_13), bounded by `timer` (the
/// ARTIM timer). A stream backed by a [`TcpStream`](std::net::TcpStream)
/// with a read timeout configured will actually return once that
/// timeout fires; on a generic `Read` without one, this reduces to a
/// single blocking read and the timer serves only to report whether the
/// wait overran its budget.
pub(crate) fn await_transport_close<W: std::io::Read>(
    stream: &mut W,
    timer: &mut crate::timer::Timer,
) {
    timer.start();
    let mut buf = [0u8; 1];
    match stream.read(&mut buf) {
        Ok(0) => tracing::debug!("transport closed, leaving Sta13"),
        Ok(_) => tracing::warn!("unexpected data received while awaiting transport close"),
        Err(source) => tracing::debug!(%source, "read error while awaiting transport close"),
    }
    if !timer.check() {
        tracing::warn!("ARTIM expired awaiting transport close");
    }
    timer.stop();
}
