//! Association acceptor module
//!
//! See [`ServerAssociationOptions`] for how to accept an incoming
//! association as a service class provider (SCP).

use std::{
    io::{Read, Write},
    net::{TcpListener, TcpStream},
};

use snafu::{ensure, OptionExt, ResultExt, Snafu};

use crate::{
    association::{
        await_transport_close,
        pdata::PDataWriter,
        scp::{choose_supported, is_supported},
        uid::trim_uid,
        AbortSource, PresentationContextNegotiated,
    },
    dul::{self, DimseMessage, DimseReassembler},
    pdu::{
        reader::DEFAULT_MAX_PDU, AbortRQServiceProviderReason, AbortRQSource, AssociationAC,
        AssociationRJ, AssociationRJServiceUserReason, AssociationRJSource, AssociationRQ, Pdu,
        PDataValueType, PresentationContextResult, PresentationContextResultReason,
        UserVariableItem,
    },
    sm::{self, Action, Event, Role, State},
    timer::Timer,
    IMPLEMENTATION_CLASS_UID, IMPLEMENTATION_VERSION_NAME,
};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// could not bind to the given address
    Bind { source: std::io::Error },

    /// could not accept an incoming transport connection
    Accept { source: std::io::Error },

    /// failed to receive the initial A-ASSOCIATE-RQ
    ReceiveRequest { source: crate::pdu::reader::Error },

    /// failed to send the association response
    SendResponse { source: crate::pdu::writer::Error },

    #[snafu(display("unexpected first PDU from requestor `{:?}`", pdu))]
    #[non_exhaustive]
    UnexpectedRequest { pdu: Pdu },

    /// the calling application context name is not supported
    #[snafu(display("application context `{name}` not supported"))]
    UnsupportedApplicationContext { name: String },

    /// the calling AE title is not allowed by this node's access control
    #[snafu(display("calling AE title `{calling_ae_title}` not allowed"))]
    NotAllowed { calling_ae_title: String },

    /// no presentation context could be negotiated
    NoAcceptablePresentationContexts,

    /// failed to send a PDU message
    #[non_exhaustive]
    Send { source: crate::pdu::writer::Error },

    /// failed to receive a PDU message
    #[non_exhaustive]
    Receive { source: crate::pdu::reader::Error },

    /// failed to frame or reassemble a DIMSE message
    Dimse { source: dul::Error },

    /// the requested SOP class is not part of the accepted association
    #[snafu(display("SOP class `{sop_class_uid}` not supported by this association"))]
    ClassNotSupported { sop_class_uid: String },

    /// there is no accepted presentation context with the given id
    #[snafu(display("no accepted presentation context with id {id}"))]
    UnknownPresentationContext { id: u8 },

    /// the requestor did not send an A-ASSOCIATE-RQ within the ARTIM
    /// timeout
    Timeout,

    #[snafu(display("unexpected PDU `{:?}`", pdu))]
    #[non_exhaustive]
    UnexpectedResponse { pdu: Pdu },

    /// the association was aborted by the peer
    Aborted { source: AbortSource },

    /// the association was released by the peer
    Released,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Decides whether an incoming association request is admissible, before
/// any presentation context negotiation takes place.
///
/// Implementations only inspect the calling/called AE titles; rejecting
/// on the application context name or the set of proposed abstract
/// syntaxes is handled by [`ServerAssociationOptions`] itself.
pub trait AccessControl {
    /// Whether an association from `calling_ae_title` to
    /// `called_ae_title` should be accepted.
    fn accepts(&self, calling_ae_title: &str, called_ae_title: &str) -> bool;
}

/// An [`AccessControl`] which admits every requestor.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAny;

impl AccessControl for AcceptAny {
    fn accepts(&self, _calling_ae_title: &str, _called_ae_title: &str) -> bool {
        true
    }
}

/// An [`AccessControl`] which admits only a fixed allow-list of calling
/// AE titles.
#[derive(Debug, Clone)]
pub struct AcceptCallingAeTitle {
    allowed: Vec<String>,
}

impl AcceptCallingAeTitle {
    pub fn new(allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        AcceptCallingAeTitle {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl AccessControl for AcceptCallingAeTitle {
    fn accepts(&self, calling_ae_title: &str, _called_ae_title: &str) -> bool {
        self.allowed.iter().any(|ae| ae == calling_ae_title)
    }
}

/// A builder for a DICOM association acceptor (SCP).
///
/// # Example
///
/// ```no_run
/// # use dicom_ul::association::server::ServerAssociationOptions;
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let listener = std::net::TcpListener::bind("0.0.0.0:104")?;
/// for stream in listener.incoming() {
///     let association = ServerAssociationOptions::new()
///         .ae_title("MY-SCP")
///         .with_abstract_syntax("1.2.840.10008.1.1")
///         .establish(stream?)?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ServerAssociationOptions<A = AcceptAny> {
    ae_title: std::borrow::Cow<'static, str>,
    application_context_name: std::borrow::Cow<'static, str>,
    abstract_syntax_uids: Vec<std::borrow::Cow<'static, str>>,
    transfer_syntax_uids: Vec<std::borrow::Cow<'static, str>>,
    accept_called_ae_title: bool,
    access_control: A,
    max_pdu_length: u32,
    protocol_version: u16,
}

impl Default for ServerAssociationOptions<AcceptAny> {
    fn default() -> Self {
        ServerAssociationOptions {
            ae_title: "ANY-SCP".into(),
            application_context_name: "1.2.840.10008.3.1.1.1".into(),
            abstract_syntax_uids: Vec::new(),
            transfer_syntax_uids: Vec::new(),
            accept_called_ae_title: false,
            access_control: AcceptAny,
            max_pdu_length: DEFAULT_MAX_PDU,
            protocol_version: 1,
        }
    }
}

impl ServerAssociationOptions<AcceptAny> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A> ServerAssociationOptions<A> {
    /// Define this node's application entity title. Ignored unless
    /// [`accept_called_ae_title`](Self::accept_called_ae_title) is set.
    pub fn ae_title<T>(mut self, ae_title: T) -> Self
    where
        T: Into<std::borrow::Cow<'static, str>>,
    {
        self.ae_title = ae_title.into();
        self
    }

    /// Only accept requests whose called AE title matches this node's.
    pub fn accept_called_ae_title(mut self) -> Self {
        self.accept_called_ae_title = true;
        self
    }

    /// Admit this abstract syntax during presentation context negotiation.
    pub fn with_abstract_syntax<T>(mut self, abstract_syntax_uid: T) -> Self
    where
        T: Into<std::borrow::Cow<'static, str>>,
    {
        self.abstract_syntax_uids.push(abstract_syntax_uid.into());
        self
    }

    /// Admit this transfer syntax during presentation context negotiation,
    /// in addition to whatever the transfer syntax registry supports.
    pub fn with_transfer_syntax<T>(mut self, transfer_syntax_uid: T) -> Self
    where
        T: Into<std::borrow::Cow<'static, str>>,
    {
        self.transfer_syntax_uids.push(transfer_syntax_uid.into());
        self
    }

    /// Override the maximum expected PDU length. 0 means unbounded.
    pub fn max_pdu_length(mut self, value: u32) -> Self {
        self.max_pdu_length = value;
        self
    }

    /// Replace the access control policy used to admit or reject
    /// incoming requests ahead of presentation context negotiation.
    pub fn with_access_control<A2: AccessControl>(
        self,
        access_control: A2,
    ) -> ServerAssociationOptions<A2> {
        ServerAssociationOptions {
            ae_title: self.ae_title,
            application_context_name: self.application_context_name,
            abstract_syntax_uids: self.abstract_syntax_uids,
            transfer_syntax_uids: self.transfer_syntax_uids,
            accept_called_ae_title: self.accept_called_ae_title,
            access_control,
            max_pdu_length: self.max_pdu_length,
            protocol_version: self.protocol_version,
        }
    }
}

impl<A> ServerAssociationOptions<A>
where
    A: AccessControl,
{
    /// Accept a single incoming connection from a bound [`TcpListener`].
    ///
    /// The socket's read timeout is set to the ARTIM duration, so that
    /// waits bound to STA_2 and STA_13 (awaiting A-ASSOCIATE-RQ, and
    /// awaiting transport close after a release or abort) actually
    /// return instead of blocking forever on an unresponsive peer.
    pub fn accept(&self, listener: &TcpListener) -> Result<ServerAssociation<TcpStream>>
    where
        A: Clone,
    {
        let (stream, _addr) = listener.accept().context(AcceptSnafu)?;
        stream
            .set_read_timeout(Some(crate::timer::DEFAULT_ARTIM_DURATION))
            .context(AcceptSnafu)?;
        self.clone().establish(stream)
    }

    /// Run the accept algorithm (PS 3.8 Annex A) over an already-open
    /// stream, negotiating presentation contexts and, on success,
    /// sending the A-ASSOCIATE-AC.
    pub fn establish<W: Read + Write>(self, mut stream: W) -> Result<ServerAssociation<W>> {
        // Sta1 -(Evt5/AE-5)-> Sta2, ARTIM armed for the duration of this call
        let mut timer = Timer::default();
        timer.start();
        let (action, state) = sm::transition(State::Sta1, Event::Evt5, Role::Acceptor).unwrap();
        debug_assert_eq!(action, Action::Ae5);

        let request = crate::pdu::read_pdu(&mut stream, self.max_pdu_length, true)
            .context(ReceiveRequestSnafu)?;

        ensure!(timer.check(), TimeoutSnafu);

        let (AssociationRQ {
            protocol_version: peer_version,
            calling_ae_title,
            called_ae_title,
            application_context_name,
            presentation_contexts: proposed,
            user_variables,
        }, state) = match request {
            Pdu::AssociationRQ(rq) => {
                // Evt6/AE-6 -> Sta3
                let (action, state) = sm::transition(state, Event::Evt6, Role::Acceptor).unwrap();
                debug_assert_eq!(action, Action::Ae6);
                (rq, state)
            }
            pdu => {
                self.reject_with_abort(&mut stream);
                return UnexpectedRequestSnafu { pdu }.fail();
            }
        };
        timer.stop();

        if application_context_name.as_str() != self.application_context_name.as_ref() {
            self.reject(
                &mut stream,
                AssociationRJSource::ServiceUser(
                    AssociationRJServiceUserReason::ApplicationContextNameNotSupported,
                ),
            )?;
            return UnsupportedApplicationContextSnafu {
                name: application_context_name,
            }
            .fail();
        }

        if self.accept_called_ae_title && called_ae_title.as_str() != self.ae_title.as_ref() {
            self.reject(
                &mut stream,
                AssociationRJSource::ServiceUser(
                    AssociationRJServiceUserReason::CalledAETitleNotRecognized,
                ),
            )?;
            return NotAllowedSnafu { calling_ae_title }.fail();
        }

        if !self
            .access_control
            .accepts(&calling_ae_title, &called_ae_title)
        {
            self.reject(
                &mut stream,
                AssociationRJSource::ServiceUser(
                    AssociationRJServiceUserReason::CallingAETitleNotRecognized,
                ),
            )?;
            return NotAllowedSnafu { calling_ae_title }.fail();
        }

        let mut default_transfer_syntaxes: Vec<String> = self
            .transfer_syntax_uids
            .iter()
            .map(|s| s.to_string())
            .collect();
        if default_transfer_syntaxes.is_empty() {
            default_transfer_syntaxes.push("1.2.840.10008.1.2.1".to_string());
            default_transfer_syntaxes.push("1.2.840.10008.1.2".to_string());
        }

        let mut negotiated = Vec::with_capacity(proposed.len());
        let mut results = Vec::with_capacity(proposed.len());
        for pc in &proposed {
            let abstract_ok = self.abstract_syntax_uids.is_empty()
                || self
                    .abstract_syntax_uids
                    .iter()
                    .any(|a| a.as_ref() == pc.abstract_syntax.as_str());

            let chosen_ts = if abstract_ok {
                choose_supported(pc.transfer_syntaxes.iter())
                    .or_else(|| choose_supported(default_transfer_syntaxes.iter()))
            } else {
                None
            };

            let reason = if !abstract_ok {
                PresentationContextResultReason::AbstractSyntaxNotSupported
            } else if chosen_ts.is_none() {
                PresentationContextResultReason::TransferSyntaxesNotSupported
            } else {
                PresentationContextResultReason::Acceptance
            };

            let transfer_syntax = chosen_ts
                .cloned()
                .unwrap_or_else(|| "1.2.840.10008.1.2".to_string());

            negotiated.push(PresentationContextNegotiated {
                id: pc.id,
                reason: reason.clone(),
                abstract_syntax: pc.abstract_syntax.clone(),
                transfer_syntax: trim_uid(transfer_syntax.clone().into()).into_owned(),
            });
            results.push(PresentationContextResult {
                id: pc.id,
                reason,
                transfer_syntax,
            });
        }

        if !negotiated.iter().any(PresentationContextNegotiated::is_accepted) {
            self.reject(
                &mut stream,
                AssociationRJSource::ServiceUser(AssociationRJServiceUserReason::NoReasonGiven),
            )?;
            return NoAcceptablePresentationContextsSnafu.fail();
        }

        let peer_max_pdu = user_variables
            .iter()
            .find_map(|v| match v {
                UserVariableItem::MaxLength(n) => Some(*n),
                _ => None,
            })
            .unwrap_or(0);
        let max_pdu_length = negotiate_max_pdu(self.max_pdu_length, peer_max_pdu);

        let response = Pdu::AssociationAC(AssociationAC {
            protocol_version: peer_version.min(self.protocol_version),
            application_context_name: self.application_context_name.to_string(),
            called_ae_title,
            calling_ae_title,
            presentation_contexts: results,
            user_variables: vec![
                UserVariableItem::MaxLength(self.max_pdu_length),
                UserVariableItem::ImplementationClassUID(IMPLEMENTATION_CLASS_UID.to_string()),
                UserVariableItem::ImplementationVersionName(
                    IMPLEMENTATION_VERSION_NAME.to_string(),
                ),
            ],
        });

        // Evt7/AE-7 -> Sta6
        let (action, state) = sm::transition(state, Event::Evt7, Role::Acceptor).unwrap();
        debug_assert_eq!(action, Action::Ae7);
        tracing::debug!(calling_ae_title = %calling_ae_title, "association accepted");
        crate::pdu::write_pdu(&mut stream, &response).context(SendResponseSnafu)?;

        Ok(ServerAssociation {
            stream,
            presentation_contexts: negotiated,
            requestor_max_pdu_length: peer_max_pdu,
            acceptor_max_pdu_length: self.max_pdu_length,
            max_pdu_length,
            state,
            closed: false,
        })
    }

    fn reject<W: Read + Write>(&self, stream: &mut W, source: AssociationRJSource) -> Result<()> {
        tracing::warn!(?source, "rejecting association request");
        let pdu = Pdu::AssociationRJ(AssociationRJ {
            result: crate::pdu::AssociationRJResult::Permanent,
            source,
        });
        // Evt8/AE-8 -> Sta13, ARTIM restarted for the close wait
        let (action, next_state) = sm::transition(State::Sta3, Event::Evt8, Role::Acceptor).unwrap();
        debug_assert_eq!(action, Action::Ae8);
        let result = crate::pdu::write_pdu(stream, &pdu).context(SendResponseSnafu);
        if next_state == State::Sta13 {
            let mut timer = Timer::default();
            await_transport_close(stream, &mut timer);
        }
        result
    }

    fn reject_with_abort<W: Read + Write>(&self, stream: &mut W) {
        // AA-7: send A-ABORT, stay/arrive at Sta13 awaiting transport close.
        let pdu = Pdu::AbortRQ {
            source: AbortRQSource::ServiceProvider(AbortRQServiceProviderReason::UnexpectedPdu),
        };
        let _ = crate::pdu::write_pdu(stream, &pdu);
        let mut timer = Timer::default();
        await_transport_close(stream, &mut timer);
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
/// acceptor (SCP).
#[derive(Debug)]
pub struct ServerAssociation<W> {
    stream: W,
    presentation_contexts: Vec<PresentationContextNegotiated>,
    requestor_max_pdu_length: u32,
    acceptor_max_pdu_length: u32,
    max_pdu_length: u32,
    state: State,
    closed: bool,
}

impl<W> ServerAssociation<W> {
    /// The presentation contexts negotiated, accepted or not.
    pub fn presentation_contexts(&self) -> &[PresentationContextNegotiated] {
        &self.presentation_contexts
    }

    /// The maximum PDU length the requestor advertised.
    pub fn requestor_max_pdu_length(&self) -> u32 {
        self.requestor_max_pdu_length
    }

    /// The maximum PDU length this node advertised.
    pub fn acceptor_max_pdu_length(&self) -> u32 {
        self.acceptor_max_pdu_length
    }

    /// Find the accepted presentation context for a SOP class (abstract
    /// syntax) UID, if any.
    pub fn presentation_context_for(
        &self,
        sop_class_uid: &str,
    ) -> Result<&PresentationContextNegotiated> {
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

impl<W> ServerAssociation<W>
where
    W: Read + Write,
{
    /// Send a raw PDU to the requestor.
    pub fn send(&mut self, msg: &Pdu) -> Result<()> {
        crate::pdu::write_pdu(&mut self.stream, msg).context(SendSnafu)
    }

    /// Read the next raw PDU from the requestor.
    pub fn receive(&mut self) -> Result<Pdu> {
        crate::pdu::read_pdu(&mut self.stream, self.max_pdu_length, true).context(ReceiveSnafu)
    }

    /// Begin streaming the data set portion of a DIMSE message.
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

    /// Receive one complete DIMSE message, or notice a release/abort
    /// request from the requestor.
    pub fn receive_dimse(&mut self) -> Result<DimseMessage> {
        let mut reassembler = DimseReassembler::new();
        loop {
            let pdu = crate::pdu::read_pdu(&mut self.stream, self.max_pdu_length, true)
                .context(ReceiveSnafu)?;
            match pdu {
                Pdu::PData { data } => match reassembler.feed(data) {
                    Ok(Some(message)) => return Ok(message),
                    Ok(None) => {}
                    Err(source) => {
                        // AA-8: a malformed DIMSE stream is a protocol error.
                        let _ = self.abort_with_source(AbortRQSource::ServiceProvider(
                            AbortRQServiceProviderReason::UnexpectedPduParameter,
                        ));
                        return Err(Error::Dimse { source });
                    }
                },
                Pdu::ReleaseRQ => {
                    self.handle_release_request()?;
                    return ReleasedSnafu.fail();
                }
                Pdu::AbortRQ { source } => {
                    // Evt16: acknowledge, do not send a second A-ABORT.
                    let (_, state) = sm::transition(self.state, Event::Evt16, Role::Acceptor)
                        .unwrap_or((Action::Aa3, State::Sta1));
                    self.state = state;
                    self.closed = true;
                    return AbortedSnafu {
                        source: AbortSource(source),
                    }
                    .fail();
                }
                pdu => return UnexpectedResponseSnafu { pdu }.fail(),
            }
        }
    }

    /// Respond to an A-RELEASE-RQ received outside of
    /// [`receive_dimse`](Self::receive_dimse) (for example, one observed
    /// directly via [`receive`](Self::receive)).
    pub fn handle_release_request(&mut self) -> Result<()> {
        // Evt12/AR-2 -> Sta8
        let (action, state) = sm::transition(self.state, Event::Evt12, Role::Acceptor).unwrap();
        debug_assert_eq!(action, Action::Ar2);
        self.state = state;

        crate::pdu::write_pdu(&mut self.stream, &Pdu::ReleaseRP).context(SendSnafu)?;
        let _ = self.stream.flush();

        // local response Evt14/AR-4 -> Sta13, ARTIM armed awaiting close
        let (action, state) = sm::transition(self.state, Event::Evt14, Role::Acceptor).unwrap();
        debug_assert_eq!(action, Action::Ar4);
        self.state = state;
        self.closed = true;

        let mut timer = Timer::default();
        await_transport_close(&mut self.stream, &mut timer);
        Ok(())
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
    fn abort_with_source(&mut self, source: AbortRQSource) -> Result<()> {
        // Evt15: local A-ABORT request. At Sta13 already, the table says
        // AA-6 (ignore) rather than sending a second A-ABORT.
        let (action, next_state) = sm::transition(self.state, Event::Evt15, Role::Acceptor)
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

impl<W> Drop for ServerAssociation<W>
where
    W: Read + Write,
{
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.abort_with_source(AbortRQSource::ServiceProvider(
                AbortRQServiceProviderReason::ReasonNotSpecified,
            ));
        }
    }
}
