//! Association requester module
//!
//! See [`ClientAssociationOptions`] for how to request and establish an
//! association with a remote service class provider (SCP).

use std::{
    borrow::Cow,
    io::{Read, Write},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use snafu::{ensure, OptionExt, ResultExt, Snafu};

use crate::{
    association::{
        await_transport_close, is_timeout_error, pdata::PDataWriter, uid::trim_uid, AbortSource,
        PresentationContextNegotiated,
    },
    dul::{self, DimseMessage, DimseReassembler},
    pdu::{
        reader::DEFAULT_MAX_PDU, AbortRQSource, AssociationAC,
        AssociationRJ, AssociationRQ, Pdu, PDataValueType, PresentationContextProposed,
        PresentationContextResultReason, ScpScuRoleSelectionItem, UserIdentity, UserVariableItem,
    },
    sm::{self, Action, Event, Role, State},
    timer::Timer,
    IMPLEMENTATION_CLASS_UID, IMPLEMENTATION_VERSION_NAME,
};

/// The default time to wait for the peer's next PDU before giving up.
///
/// This is `association.timeout` in the concurrency model: distinct
/// from ARTIM, which only bounds STA_2 and STA_13.
pub const DEFAULT_ASSOCIATION_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// missing abstract syntax to begin negotiation
    MissingAbstractSyntax,

    /// could not connect to the service class provider
    Connect { source: std::io::Error },

    /// failed to configure the socket's read timeout
    ConfigureSocket { source: std::io::Error },

    /// failed to send association request
    SendRequest { source: crate::pdu::writer::Error },

    /// failed to receive association response
    ReceiveResponse { source: crate::pdu::reader::Error },

    #[snafu(display("unexpected response from SCP `{:?}`", pdu))]
    #[non_exhaustive]
    UnexpectedResponse { pdu: Pdu },

    #[snafu(display("unknown response from SCP `{:?}`", pdu))]
    #[non_exhaustive]
    UnknownResponse { pdu: Pdu },

    #[snafu(display("protocol version mismatch: expected {}, got {}", expected, got))]
    ProtocolVersionMismatch { expected: u16, got: u16 },

    /// the association was rejected by the service class provider
    Rejected {
        association_result: crate::pdu::AssociationRJResult,
        association_source: crate::pdu::AssociationRJSource,
    },

    /// no presentation contexts accepted by the service class provider
    NoAcceptedPresentationContexts,

    /// the requested SOP class is not part of the accepted association
    #[snafu(display("SOP class `{sop_class_uid}` not supported by this association"))]
    ClassNotSupported { sop_class_uid: String },

    /// failed to send a PDU message
    #[non_exhaustive]
    Send { source: crate::pdu::writer::Error },

    /// failed to receive a PDU message
    #[non_exhaustive]
    Receive { source: crate::pdu::reader::Error },

    /// failed to frame or reassemble a DIMSE message
    Dimse { source: dul::Error },

    /// the association was aborted by the peer
    Aborted { source: AbortSource },

    /// the association was released by the peer
    Released,

    /// the peer did not respond within `association.timeout`
    Timeout,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A DICOM association builder for the requester (SCU) role.
/// The final outcome is a [`ClientAssociation`].
///
/// # Example
///
/// ```no_run
/// # use dicom_ul::association::client::ClientAssociationOptions;
///
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let association = ClientAssociationOptions::new()
///    .with_abstract_syntax("1.2.840.10008.1.1")
///    .with_transfer_syntax("1.2.840.10008.1.2.1")
///    .establish("127.0.0.1:104")?;
/// # Ok(())
/// # }
/// ```
///
/// The SCU will admit by default the transfer syntaxes
/// _Implicit VR Little Endian_ and _Explicit VR Little Endian_.
/// Other transfer syntaxes can be requested via `with_transfer_syntax`.
#[derive(Debug, Clone)]
pub struct ClientAssociationOptions {
    calling_ae_title: Cow<'static, str>,
    called_ae_title: Cow<'static, str>,
    application_context_name: Cow<'static, str>,
    abstract_syntax_uids: Vec<Cow<'static, str>>,
    transfer_syntax_uids: Vec<Cow<'static, str>>,
    role_selection: Vec<ScpScuRoleSelectionItem>,
    user_identity: Option<UserIdentity>,
    protocol_version: u16,
    max_pdu_length: u32,
    association_timeout: Duration,
}

impl Default for ClientAssociationOptions {
    fn default() -> Self {
        ClientAssociationOptions {
            calling_ae_title: "THIS-SCU".into(),
            called_ae_title: "ANY-SCP".into(),
            application_context_name: "1.2.840.10008.3.1.1.1".into(),
            abstract_syntax_uids: Vec::new(),
            transfer_syntax_uids: Vec::new(),
            role_selection: Vec::new(),
            user_identity: None,
            protocol_version: 1,
            max_pdu_length: DEFAULT_MAX_PDU,
            association_timeout: DEFAULT_ASSOCIATION_TIMEOUT,
        }
    }
}

impl ClientAssociationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define the calling application entity title for the association
    /// (this node). The default is `THIS-SCU`.
    pub fn calling_ae_title<T>(mut self, calling_ae_title: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.calling_ae_title = calling_ae_title.into();
        self
    }

    /// Define the called application entity title (the target node).
    /// The default is `ANY-SCP`.
    pub fn called_ae_title<T>(mut self, called_ae_title: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.called_ae_title = called_ae_title.into();
        self
    }

    /// Include this abstract syntax in the list of proposed
    /// presentation contexts.
    pub fn with_abstract_syntax<T>(mut self, abstract_syntax_uid: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.abstract_syntax_uids.push(abstract_syntax_uid.into());
        self
    }

    /// Include this transfer syntax in each proposed presentation context.
    pub fn with_transfer_syntax<T>(mut self, transfer_syntax_uid: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.transfer_syntax_uids.push(transfer_syntax_uid.into());
        self
    }

    /// Propose a SCP/SCU role selection for the given SOP class.
    pub fn with_role_selection(mut self, sop_class_uid: impl Into<String>, scu_role: bool, scp_role: bool) -> Self {
        self.role_selection.push(ScpScuRoleSelectionItem {
            sop_class_uid: sop_class_uid.into(),
            scu_role,
            scp_role,
        });
        self
    }

    /// Propose a user identity for this association.
    pub fn user_identity(mut self, identity: UserIdentity) -> Self {
        self.user_identity = Some(identity);
        self
    }

    /// Override the maximum expected PDU length. 0 means unbounded.
    pub fn max_pdu_length(mut self, value: u32) -> Self {
        self.max_pdu_length = value;
        self
    }

    /// Override how long to wait for the peer's next PDU once
    /// established (`association.timeout`). Does not affect ARTIM.
    pub fn association_timeout(mut self, timeout: Duration) -> Self {
        self.association_timeout = timeout;
        self
    }

    fn build_request(&self) -> Result<(Pdu, Vec<PresentationContextProposed>)> {
        ensure!(!self.abstract_syntax_uids.is_empty(), MissingAbstractSyntaxSnafu);

        let mut transfer_syntax_uids = self.transfer_syntax_uids.clone();
        if transfer_syntax_uids.is_empty() {
            transfer_syntax_uids.push("1.2.840.10008.1.2.1".into()); // Explicit VR LE
            transfer_syntax_uids.push("1.2.840.10008.1.2".into()); // Implicit VR LE
        }

        let presentation_contexts: Vec<_> = self
            .abstract_syntax_uids
            .iter()
            .enumerate()
            .map(|(i, abstract_syntax)| PresentationContextProposed {
                id: (i * 2 + 1) as u8,
                abstract_syntax: abstract_syntax.to_string(),
                transfer_syntaxes: transfer_syntax_uids.iter().map(|u| u.to_string()).collect(),
            })
            .collect();

        let mut user_variables = vec![
            UserVariableItem::MaxLength(self.max_pdu_length),
            UserVariableItem::ImplementationClassUID(IMPLEMENTATION_CLASS_UID.to_string()),
            UserVariableItem::ImplementationVersionName(IMPLEMENTATION_VERSION_NAME.to_string()),
        ];
        for role in &self.role_selection {
            user_variables.push(UserVariableItem::ScpScuRoleSelection(role.clone()));
        }
        if let Some(identity) = &self.user_identity {
            user_variables.push(UserVariableItem::UserIdentityItem(identity.clone()));
        }

        let pdu = Pdu::AssociationRQ(AssociationRQ {
            protocol_version: self.protocol_version,
            calling_ae_title: self.calling_ae_title.to_string(),
            called_ae_title: self.called_ae_title.to_string(),
            application_context_name: self.application_context_name.to_string(),
            presentation_contexts: presentation_contexts.clone(),
            user_variables,
        });

        Ok((pdu, presentation_contexts))
    }

    /// Initiate the TCP connection and negotiate the association.
    ///
    /// The socket's read timeout is set to `association.timeout` before
    /// negotiation begins, so that a peer which stops responding at any
    /// point (handshake, DIMSE exchange, or release) surfaces
    /// [`Error::Timeout`] instead of blocking forever.
    pub fn establish<A: ToSocketAddrs>(self, address: A) -> Result<ClientAssociation<TcpStream>> {
        let socket = TcpStream::connect(address).context(ConnectSnafu)?;
        socket
            .set_read_timeout(Some(self.association_timeout))
            .context(ConfigureSocketSnafu)?;
        self.establish_with(socket)
    }

    /// Negotiate the association over an already-connected stream.
    ///
    /// Use this to run the protocol over a TLS-wrapped socket: the
    /// core never speaks TLS itself, the caller connects and completes
    /// the TLS handshake first.
    pub fn establish_with<W: Read + Write>(self, mut stream: W) -> Result<ClientAssociation<W>> {
        let (request, presentation_contexts) = self.build_request()?;

        // Sta1 -(Evt1/AE-1)-> Sta4 -(Evt2/AE-2)-> Sta5
        let (action, state) = sm::transition(State::Sta1, Event::Evt1, Role::Requester).unwrap();
        debug_assert_eq!(action, Action::Ae1);
        let (action, state) = sm::transition(state, Event::Evt2, Role::Requester).unwrap();
        debug_assert_eq!(action, Action::Ae2);

        crate::pdu::write_pdu(&mut stream, &request).context(SendRequestSnafu)?;

        let response = crate::pdu::read_pdu(&mut stream, self.max_pdu_length, true).map_err(|source| {
            if is_timeout_error(&source) {
                Error::Timeout
            } else {
                Error::ReceiveResponse { source }
            }
        })?;

        match response {
            Pdu::AssociationAC(AssociationAC {
                protocol_version: peer_version,
                presentation_contexts: accepted,
                user_variables,
                ..
            }) => {
                tracing::debug!(
                    called_ae_title = %self.called_ae_title,
                    "association accepted"
                );
                // Evt3/AE-3 -> Sta6
                let (action, state) = sm::transition(state, Event::Evt3, Role::Requester).unwrap();
                debug_assert_eq!(action, Action::Ae3);

                ensure!(
                    self.protocol_version == peer_version,
                    ProtocolVersionMismatchSnafu {
                        expected: self.protocol_version,
                        got: peer_version,
                    }
                );

                let peer_max_pdu = user_variables
                    .iter()
                    .find_map(|v| match v {
                        UserVariableItem::MaxLength(n) => Some(*n),
                        _ => None,
                    })
                    .unwrap_or(0);
                let max_pdu_length = negotiate_max_pdu(self.max_pdu_length, peer_max_pdu);

                ensure!(
                    accepted.iter().any(|c| c.reason == PresentationContextResultReason::Acceptance),
                    NoAcceptedPresentationContextsSnafu
                );

                let contexts: Vec<_> = accepted
                    .into_iter()
                    .map(|result| {
                        let abstract_syntax = presentation_contexts
                            .iter()
                            .find(|p| p.id == result.id)
                            .map(|p| p.abstract_syntax.clone())
                            .unwrap_or_default();
                        PresentationContextNegotiated {
                            id: result.id,
                            reason: result.reason,
                            abstract_syntax,
                            transfer_syntax: trim_uid(result.transfer_syntax.into()).into_owned(),
                        }
                    })
                    .collect();

                Ok(ClientAssociation {
                    stream,
                    presentation_contexts: contexts,
                    requestor_max_pdu_length: self.max_pdu_length,
                    acceptor_max_pdu_length: peer_max_pdu,
                    max_pdu_length,
                    association_timeout: self.association_timeout,
                    state,
                    closed: false,
                })
            }
            Pdu::AssociationRJ(AssociationRJ { result, source }) => {
                // Evt4/AE-4 -> Sta1
                let (action, _) = sm::transition(state, Event::Evt4, Role::Requester).unwrap();
                debug_assert_eq!(action, Action::Ae4);
                tracing::warn!(?result, ?source, "association rejected by acceptor");
                Err(Error::Rejected {
                    association_result: result,
                    association_source: source,
                })
            }
            pdu @ (Pdu::AbortRQ { .. }
            | Pdu::ReleaseRQ
            | Pdu::AssociationRQ(..)
            | Pdu::PData { .. }
            | Pdu::ReleaseRP) => Err(Error::UnexpectedResponse { pdu }),
            pdu @ Pdu::Unknown { .. } => Err(Error::UnknownResponse { pdu }),
        }
    }
}

fn negotiate_max_pdu(local: u32, peer: u32) -> u32 {
    match (local, peer) {
        (0, 0) => 0,
        (0, p) => p,
        (l, 0) => l,
        (l, p) => l.min(p),
    }
}

/// A DICOM upper layer association, from the perspective of the
/// requester (SCU).
#[derive(Debug)]
pub struct ClientAssociation<W> {
    stream: W,
    presentation_contexts: Vec<PresentationContextNegotiated>,
    requestor_max_pdu_length: u32,
    acceptor_max_pdu_length: u32,
    max_pdu_length: u32,
    association_timeout: Duration,
    state: State,
    closed: bool,
}

impl<W> ClientAssociation<W> {
    /// The presentation contexts negotiated, accepted or not.
    pub fn presentation_contexts(&self) -> &[PresentationContextNegotiated] {
        &self.presentation_contexts
    }

    /// The maximum PDU length this node advertised.
    pub fn requestor_max_pdu_length(&self) -> u32 {
        self.requestor_max_pdu_length
    }

    /// The maximum PDU length the peer advertised.
    pub fn acceptor_max_pdu_length(&self) -> u32 {
        self.acceptor_max_pdu_length
    }

    /// Find the accepted presentation context for a SOP class (abstract
    /// syntax) UID, if any.
    pub fn get_scu(&self, sop_class_uid: &str) -> Result<&PresentationContextNegotiated> {
        self.presentation_contexts
            .iter()
            .find(|c| c.is_accepted() && c.abstract_syntax == sop_class_uid)
            .context(ClassNotSupportedSnafu {
                sop_class_uid: sop_class_uid.to_string(),
            })
    }

    /// The current state of the upper layer state machine.
    pub fn state(&self) -> State {
        self.state
    }
}

impl<W> ClientAssociation<W>
where
    W: Read + Write,
{
    /// Send a raw PDU to the acceptor.
    pub fn send(&mut self, msg: &Pdu) -> Result<()> {
        crate::pdu::write_pdu(&mut self.stream, msg).context(SendSnafu)
    }

    /// Read the next raw PDU from the acceptor.
    pub fn receive(&mut self) -> Result<Pdu> {
        crate::pdu::read_pdu(&mut self.stream, self.max_pdu_length, true).context(ReceiveSnafu)
    }

    /// Begin streaming the data set portion of a DIMSE message for the
    /// given presentation context, fragmenting automatically to fit
    /// the negotiated maximum PDU length.
    pub fn send_pdata(&mut self, presentation_context_id: u8) -> PDataWriter<&mut W> {
        PDataWriter::new(&mut self.stream, presentation_context_id, self.max_pdu_length)
    }

    /// Begin streaming the command set portion of a DIMSE message.
    pub fn send_command(&mut self, presentation_context_id: u8) -> PDataWriter<&mut W> {
        PDataWriter::with_value_type(
            &mut self.stream,
            presentation_context_id,
            PDataValueType::Command,
            self.max_pdu_length,
        )
    }

    /// Send a complete DIMSE message (command set, plus optional data
    /// set), fragmented into P-DATA-TF PDUs.
    pub fn send_dimse(&mut self, message: &DimseMessage) -> Result<()> {
        dul::send(&mut self.stream, message, self.max_pdu_length).context(DimseSnafu)
    }

    /// Receive one complete DIMSE message, reassembling PDVs across as
    /// many P-DATA-TF PDUs as required.
    pub fn receive_dimse(&mut self) -> Result<DimseMessage> {
        let mut reassembler = DimseReassembler::new();
        loop {
            match dul::recv_one(&mut self.stream, self.max_pdu_length, &mut reassembler) {
                Ok(Some(message)) => return Ok(message),
                Ok(None) => continue,
                Err(source) => {
                    if is_timeout_error(&source) {
                        let _ = self.abort_with_source(AbortRQSource::ServiceUser);
                        return Err(Error::Timeout);
                    }
                    // AA-8: a malformed DIMSE stream is a protocol error,
                    // not something to leave the peer hanging on.
                    let _ = self.abort_with_source(AbortRQSource::ServiceProvider(
                        crate::pdu::AbortRQServiceProviderReason::UnexpectedPduParameter,
                    ));
                    return Err(Error::Dimse { source });
                }
            }
        }
    }

    /// Gracefully release the association, handling the case where the
    /// peer released at the same time (release collision).
    pub fn release(&mut self) -> Result<()> {
        tracing::debug!("releasing association");
        crate::pdu::write_pdu(&mut self.stream, &Pdu::ReleaseRQ).context(SendSnafu)?;
        // Evt11/AR-1 -> Sta7
        let (action, state) = sm::transition(self.state, Event::Evt11, Role::Requester).unwrap();
        debug_assert_eq!(action, Action::Ar1);
        self.state = state;

        loop {
            let pdu = self.read_pdu_with_timeout()?;
            match pdu {
                Pdu::ReleaseRP => {
                    // Evt13/AR-3 -> Sta1
                    let (action, state) =
                        sm::transition(self.state, Event::Evt13, Role::Requester).unwrap();
                    debug_assert_eq!(action, Action::Ar3);
                    self.state = state;
                    break;
                }
                Pdu::ReleaseRQ => {
                    // release collision: Evt12/AR-8 -> Sta9, local response Evt14/AR-9 -> Sta11
                    let (action, s9) =
                        sm::transition(self.state, Event::Evt12, Role::Requester).unwrap();
                    debug_assert_eq!(action, Action::Ar8);
                    self.state = s9;
                    crate::pdu::write_pdu(&mut self.stream, &Pdu::ReleaseRP).context(SendSnafu)?;
                    let (action, s11) =
                        sm::transition(self.state, Event::Evt14, Role::Requester).unwrap();
                    debug_assert_eq!(action, Action::Ar9);
                    self.state = s11;

                    let final_pdu = self.read_pdu_with_timeout()?;
                    ensure!(matches!(final_pdu, Pdu::ReleaseRP), UnexpectedResponseSnafu {
                        pdu: final_pdu,
                    });
                    // Evt13/AR-3 -> Sta1
                    let (action, state) =
                        sm::transition(self.state, Event::Evt13, Role::Requester).unwrap();
                    debug_assert_eq!(action, Action::Ar3);
                    self.state = state;
                    break;
                }
                pdu @ (Pdu::AbortRQ { .. } | Pdu::PData { .. }) => {
                    return UnexpectedResponseSnafu { pdu }.fail();
                }
                pdu => return UnexpectedResponseSnafu { pdu }.fail(),
            }
        }

        let _ = self.stream.flush();
        self.closed = true;
        Ok(())
    }

    /// Read the next PDU, translating a read timeout into [`Error::Timeout`]
    /// rather than letting it surface as an opaque I/O failure.
    fn read_pdu_with_timeout(&mut self) -> Result<Pdu> {
        crate::pdu::read_pdu(&mut self.stream, self.max_pdu_length, true).map_err(|source| {
            if is_timeout_error(&source) {
                Error::Timeout
            } else {
                Error::Receive { source }
            }
        })
    }

    /// Forcibly abort the association (AA-1, local A-ABORT request).
    ///
    /// Per the standard, a locally-requested abort always carries
    /// service-user source; there is no reason code to negotiate. No
    /// response is expected from the peer.
    pub fn abort(&mut self) -> Result<()> {
        self.abort_with_source(AbortRQSource::ServiceUser)
    }

    /// Abort with an explicit source/reason, for protocol-error paths
    /// (AA-7/AA-8) that must report a service-provider reason rather
    /// than the user-initiated one `abort` always sends.
    pub(crate) fn abort_with_source(&mut self, source: AbortRQSource) -> Result<()> {
        // Evt15: local A-ABORT request. At Sta13 already, the table says
        // AA-6 (ignore) rather than sending a second A-ABORT.
        let (action, next_state) = sm::transition(self.state, Event::Evt15, Role::Requester)
            .unwrap_or((Action::Aa1, State::Sta13));

        if action == Action::Aa6 {
            self.closed = true;
            return Ok(());
        }

        tracing::debug!(?source, "aborting association");
        let pdu = Pdu::AbortRQ { source };
        let result = crate::pdu::write_pdu(&mut self.stream, &pdu).context(SendSnafu);
        self.state = next_state;
        self.closed = true;

        if self.state == State::Sta13 {
            let mut timer = Timer::default();
            await_transport_close(&mut self.stream, &mut timer);
        }

        result
    }
}

impl<W> Drop for ClientAssociation<W>
where
    W: Read + Write,
{
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.release();
        }
    }
}
