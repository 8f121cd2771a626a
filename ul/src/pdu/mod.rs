//! PDU data types
//!
//! This module contains the tagged-variant representation of the seven DICOM
//! Upper Layer PDU types and of every sub-item that can appear inside them.
//! [`Pdu`] is produced by [`reader::read_pdu`] and consumed by
//! [`writer::write_pdu`]; unknown sub-items and unknown PDU types are kept
//! around as opaque byte blobs so that a decode-then-encode round trip is
//! always lossless.
use snafu::{Backtrace, Snafu};
use std::io::Write;

pub mod commands;
pub mod generated;
pub mod reader;
pub mod writer;

#[cfg(test)]
mod test;

pub use reader::read_pdu;
pub use reader::PDU_HEADER_SIZE;
pub use writer::write_pdu;

/// A-ASSOCIATE-RQ PDU contents.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct AssociationRQ {
    pub protocol_version: u16,
    pub calling_ae_title: String,
    pub called_ae_title: String,
    pub application_context_name: String,
    pub presentation_contexts: Vec<PresentationContextProposed>,
    pub user_variables: Vec<UserVariableItem>,
}

/// A-ASSOCIATE-AC PDU contents.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct AssociationAC {
    pub protocol_version: u16,
    pub application_context_name: String,
    pub called_ae_title: String,
    pub calling_ae_title: String,
    pub presentation_contexts: Vec<PresentationContextResult>,
    pub user_variables: Vec<UserVariableItem>,
}

/// A-ASSOCIATE-RJ PDU contents.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct AssociationRJ {
    pub result: AssociationRJResult,
    pub source: AssociationRJSource,
}

/// The seven Upper Layer PDU types, plus a catch-all for any PDU type code
/// this library does not recognize (Evt19 on the receiving side).
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum Pdu {
    AssociationRQ(AssociationRQ),
    AssociationAC(AssociationAC),
    AssociationRJ(AssociationRJ),
    PData { data: Vec<PDataValue> },
    ReleaseRQ,
    ReleaseRP,
    AbortRQ { source: AbortRQSource },
    Unknown { pdu_type: u8, data: Vec<u8> },
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct PresentationContextProposed {
    pub id: u8,
    pub abstract_syntax: String,
    pub transfer_syntaxes: Vec<String>,
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct PresentationContextResult {
    pub id: u8,
    pub reason: PresentationContextResultReason,
    pub transfer_syntax: String,
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum PresentationContextResultReason {
    Acceptance = 0,
    UserRejection = 1,
    NoReason = 2,
    AbstractSyntaxNotSupported = 3,
    TransferSyntaxesNotSupported = 4,
}

impl PresentationContextResultReason {
    pub fn from(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Acceptance),
            1 => Some(Self::UserRejection),
            2 => Some(Self::NoReason),
            3 => Some(Self::AbstractSyntaxNotSupported),
            4 => Some(Self::TransferSyntaxesNotSupported),
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AssociationRJResult {
    Permanent,
    Transient,
}

impl AssociationRJResult {
    pub fn from(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Permanent),
            2 => Some(Self::Transient),
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AssociationRJSource {
    ServiceUser(AssociationRJServiceUserReason),
    ServiceProviderASCE(AssociationRJServiceProviderASCEReason),
    ServiceProviderPresentation(AssociationRJServiceProviderPresentationReason),
}

impl AssociationRJSource {
    pub fn from(source: u8, reason: u8) -> Option<Self> {
        match source {
            1 => Some(Self::ServiceUser(match reason {
                1 => AssociationRJServiceUserReason::NoReasonGiven,
                2 => AssociationRJServiceUserReason::ApplicationContextNameNotSupported,
                3 => AssociationRJServiceUserReason::CallingAETitleNotRecognized,
                7 => AssociationRJServiceUserReason::CalledAETitleNotRecognized,
                other => AssociationRJServiceUserReason::Reserved(other),
            })),
            2 => Some(Self::ServiceProviderASCE(match reason {
                1 => AssociationRJServiceProviderASCEReason::NoReasonGiven,
                2 => AssociationRJServiceProviderASCEReason::ProtocolVersionNotSupported,
                _ => return None,
            })),
            3 => Some(Self::ServiceProviderPresentation(match reason {
                1 => AssociationRJServiceProviderPresentationReason::TemporaryCongestion,
                2 => AssociationRJServiceProviderPresentationReason::LocalLimitExceeded,
                other => AssociationRJServiceProviderPresentationReason::Reserved(other),
            })),
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AssociationRJServiceUserReason {
    NoReasonGiven,
    ApplicationContextNameNotSupported,
    CallingAETitleNotRecognized,
    CalledAETitleNotRecognized,
    Reserved(u8),
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AssociationRJServiceProviderASCEReason {
    NoReasonGiven,
    ProtocolVersionNotSupported,
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AssociationRJServiceProviderPresentationReason {
    TemporaryCongestion,
    LocalLimitExceeded,
    Reserved(u8),
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct PDataValue {
    pub presentation_context_id: u8,
    pub value_type: PDataValueType,
    pub is_last: bool,
    pub data: Vec<u8>,
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum PDataValueType {
    Command,
    Data,
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AbortRQSource {
    ServiceUser,
    ServiceProvider(AbortRQServiceProviderReason),
    Reserved,
}

impl AbortRQSource {
    pub fn from(source: u8, reason: u8) -> Option<Self> {
        match source {
            0 => Some(Self::ServiceUser),
            1 => Some(Self::Reserved),
            2 => Some(Self::ServiceProvider(match reason {
                0 => AbortRQServiceProviderReason::ReasonNotSpecified,
                1 => AbortRQServiceProviderReason::UnrecognizedPdu,
                2 => AbortRQServiceProviderReason::UnexpectedPdu,
                3 => AbortRQServiceProviderReason::Reserved,
                4 => AbortRQServiceProviderReason::UnrecognizedPduParameter,
                5 => AbortRQServiceProviderReason::UnexpectedPduParameter,
                6 => AbortRQServiceProviderReason::InvalidPduParameter,
                _ => return None,
            })),
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AbortRQServiceProviderReason {
    ReasonNotSpecified,
    UnrecognizedPdu,
    UnexpectedPdu,
    Reserved,
    UnrecognizedPduParameter,
    UnexpectedPduParameter,
    InvalidPduParameter,
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum PduVariableItem {
    Unknown(u8),
    ApplicationContext(String),
    PresentationContextProposed(PresentationContextProposed),
    PresentationContextResult(PresentationContextResult),
    UserVariables(Vec<UserVariableItem>),
}

/// User Information sub-items (the 0x50 item's payload), plus the
/// association-level Async Ops Window and Role Selection sub-items which
/// also live inside User Information per the standard.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum UserVariableItem {
    Unknown(u8, Vec<u8>),
    MaxLength(u32),
    ImplementationClassUID(String),
    ImplementationVersionName(String),
    /// Asynchronous Operations Window sub-item (0x53): max operations
    /// invoked/performed. Negotiated but never throttled by this crate.
    AsynchronousOperationsWindow(AsynchronousOperationsWindowItem),
    /// SCP/SCU Role Selection sub-item (0x54).
    ScpScuRoleSelection(ScpScuRoleSelectionItem),
    SopClassExtendedNegotiationSubItem(String, Vec<u8>),
    /// User Identity Negotiation request sub-item (0x58).
    UserIdentityItem(UserIdentity),
    /// User Identity Negotiation response sub-item (0x59).
    UserIdentityServerResponse(Vec<u8>),
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct AsynchronousOperationsWindowItem {
    pub max_ops_invoked: u16,
    pub max_ops_performed: u16,
}

#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct ScpScuRoleSelectionItem {
    pub sop_class_uid: String,
    pub scu_role: bool,
    pub scp_role: bool,
}

/// The value of the User-Identity-Type field of a User Identity Negotiation
/// request sub-item.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum UserIdentityType {
    Username,
    UsernameAndPassword,
    Kerberos,
    Saml,
    Jwt,
}

impl UserIdentityType {
    pub fn from(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Username),
            2 => Some(Self::UsernameAndPassword),
            3 => Some(Self::Kerberos),
            4 => Some(Self::Saml),
            5 => Some(Self::Jwt),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Username => 1,
            Self::UsernameAndPassword => 2,
            Self::Kerberos => 3,
            Self::Saml => 4,
            Self::Jwt => 5,
        }
    }
}

/// User Identity Negotiation request sub-item (0x58) contents.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct UserIdentity {
    positive_response_requested: bool,
    identity_type: UserIdentityType,
    primary_field: Vec<u8>,
    secondary_field: Vec<u8>,
}

impl UserIdentity {
    pub fn new(
        positive_response_requested: bool,
        identity_type: UserIdentityType,
        primary_field: Vec<u8>,
        secondary_field: Vec<u8>,
    ) -> Self {
        UserIdentity {
            positive_response_requested,
            identity_type,
            primary_field,
            secondary_field,
        }
    }

    pub fn username(username: impl Into<Vec<u8>>, positive_response_requested: bool) -> Self {
        UserIdentity::new(
            positive_response_requested,
            UserIdentityType::Username,
            username.into(),
            Vec::new(),
        )
    }

    pub fn username_password(
        username: impl Into<Vec<u8>>,
        password: impl Into<Vec<u8>>,
        positive_response_requested: bool,
    ) -> Self {
        UserIdentity::new(
            positive_response_requested,
            UserIdentityType::UsernameAndPassword,
            username.into(),
            password.into(),
        )
    }

    pub fn identity_type(&self) -> UserIdentityType {
        self.identity_type
    }

    pub fn positive_response_requested(&self) -> bool {
        self.positive_response_requested
    }

    pub fn primary_field(&self) -> &[u8] {
        &self.primary_field
    }

    pub fn secondary_field(&self) -> &[u8] {
        &self.secondary_field
    }
}

/// Errors that can occur while serializing a [`Pdu`] to its wire form.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WriteError {
    #[snafu(display("Could not write PDU field `{}`", field))]
    WriteField {
        field: &'static str,
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not write {} reserved bytes", bytes))]
    WriteReserved {
        bytes: u32,
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not write chunk `{}`", name))]
    WriteChunk {
        name: &'static str,
        #[snafu(backtrace)]
        source: WriteChunkError,
    },
    #[snafu(display("Could not encode text field `{}`", field))]
    EncodeField {
        field: &'static str,
        #[snafu(backtrace)]
        source: dicom_encoding::text::EncodeTextError,
    },
}

#[derive(Debug, Snafu)]
pub enum WriteChunkError {
    #[snafu(display("Failed to build chunk"))]
    BuildChunk {
        #[snafu(backtrace)]
        source: Box<WriteError>,
    },
    #[snafu(display("Failed to write chunk length"))]
    WriteLength {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write chunk data"))]
    WriteData {
        backtrace: Backtrace,
        source: std::io::Error,
    },
}
