//! This crates contains the types and methods needed to interact
//! with DICOM nodes through the upper layer protocol.
//!
//! This crate can be used as a base
//! for finite-state machines and higher-level helpers,
//! enabling the creation of concrete service class users (SCUs)
//! and service class providers (SCPs).
//!
//! - The [`address`] module
//!   provides an abstraction for working with compound addresses
//!   referring to application entities in a network.
//! - The [`pdu`] module
//!   provides data structures representing _protocol data units_,
//!   which are passed around as part of the DICOM network communication support.
//! - The [`association`] module
//!   comprises abstractions for establishing and negotiating associations
//!   between application entities,
//!   via the upper layer protocol, over any `Read + Write` stream.
//! - The [`sm`] module contains the explicit upper layer state machine
//!   (PS 3.8 Section 9.2): 13 states, 19 events, and the named actions
//!   between them.
//! - The [`timer`] module implements the ARTIM timer used to bound
//!   STA_2 and STA_13.
//! - The [`dul`] module frames and reassembles DIMSE messages on top of
//!   P-DATA-TF PDUs.

pub mod address;
pub mod association;
pub mod dul;
pub mod error;
pub mod pdu;
pub mod sm;
pub mod timer;

/// The current implementation class UID generically referring to DICOM-rs.
///
/// Automatically generated as per the standard, part 5, section B.2.
///
/// This UID may change in future versions,
/// even between patch versions.
pub const IMPLEMENTATION_CLASS_UID: &str = "2.25.156227610253341005307660858504280353500";

/// The current implementation version name generically referring to DICOM-rs.
///
/// This name may change in future versions,
/// even between patch versions.
pub const IMPLEMENTATION_VERSION_NAME: &str = "DICOM-rs 0.8.0";

// re-exports

pub use address::{AeAddr, FullAeAddr};
pub use association::client::{ClientAssociation, ClientAssociationOptions};
pub use association::server::{ServerAssociation, ServerAssociationOptions};
pub use error::Error;
pub use pdu::read_pdu;
pub use pdu::write_pdu;
pub use pdu::Pdu;
