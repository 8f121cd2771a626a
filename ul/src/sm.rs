//! The upper layer state machine (PS 3.8 Section 9.2).
//!
//! This module models the association life cycle as an explicit,
//! data-driven transition table: 13 [`State`]s, 19 [`Event`]s, and the
//! named [`Action`]s the standard assigns to each reachable pair. The
//! table itself lives in [`transition`] and is consulted by the
//! [`dul`](crate::dul) provider; this module does not perform I/O, it
//! only decides what should happen next.
//!
//! The role recorded at association establishment
//! (requester or acceptor) disambiguates the one transition whose next
//! state the standard leaves implicit: AR-8, the release collision.
//! See the crate's design notes for why role is never inferred from
//! the state alone.

/// The 13 states of the upper layer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Sta1: idle.
    Sta1,
    /// Sta2: transport connection open, awaiting A-ASSOCIATE-RQ (acceptor).
    Sta2,
    /// Sta3: awaiting local A-ASSOCIATE response primitive.
    Sta3,
    /// Sta4: awaiting transport connection to open (requester).
    Sta4,
    /// Sta5: awaiting A-ASSOCIATE-AC or -RJ.
    Sta5,
    /// Sta6: association established, data transfer.
    Sta6,
    /// Sta7: awaiting A-RELEASE-RP.
    Sta7,
    /// Sta8: awaiting local A-RELEASE response primitive.
    Sta8,
    /// Sta9: release collision, requester side, awaiting local response.
    Sta9,
    /// Sta10: release collision, acceptor side, awaiting A-RELEASE-RP.
    Sta10,
    /// Sta11: release collision, requester side, awaiting A-RELEASE-RP.
    Sta11,
    /// Sta12: release collision, acceptor side, awaiting local response.
    Sta12,
    /// Sta13: awaiting transport connection close.
    Sta13,
}

/// The 19 events that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Evt1: local A-ASSOCIATE request primitive.
    Evt1,
    /// Evt2: transport connect confirmation.
    Evt2,
    /// Evt3: A-ASSOCIATE-AC PDU received.
    Evt3,
    /// Evt4: A-ASSOCIATE-RJ PDU received.
    Evt4,
    /// Evt5: transport connection indication.
    Evt5,
    /// Evt6: A-ASSOCIATE-RQ PDU received.
    Evt6,
    /// Evt7: local A-ASSOCIATE response primitive (accept).
    Evt7,
    /// Evt8: local A-ASSOCIATE response primitive (reject).
    Evt8,
    /// Evt9: local P-DATA request primitive.
    Evt9,
    /// Evt10: P-DATA-TF PDU received.
    Evt10,
    /// Evt11: local A-RELEASE request primitive.
    Evt11,
    /// Evt12: A-RELEASE-RQ PDU received.
    Evt12,
    /// Evt13: A-RELEASE-RP PDU received.
    Evt13,
    /// Evt14: local A-RELEASE response primitive.
    Evt14,
    /// Evt15: local A-ABORT request primitive.
    Evt15,
    /// Evt16: A-ABORT PDU received.
    Evt16,
    /// Evt17: transport connection closed.
    Evt17,
    /// Evt18: ARTIM timer expired.
    Evt18,
    /// Evt19: unrecognized or invalid PDU received.
    Evt19,
}

/// The side of the association a state machine instance plays.
///
/// Recorded once at association establishment time and never inferred
/// from the current state, so that AE-6 and AR-8 (the two transitions
/// whose destination depends on role) can be resolved unambiguously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Requester,
    Acceptor,
}

/// The named actions of PS 3.8 Table 9-10, grouped by class.
///
/// Each variant is a direction to the caller (the DUL provider), not a
/// side effect performed by this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// AE-1: issue transport connect request.
    Ae1,
    /// AE-2: send A-ASSOCIATE-RQ.
    Ae2,
    /// AE-3: issue A-ASSOCIATE confirmation (accept) to the user.
    Ae3,
    /// AE-4: issue A-ASSOCIATE confirmation (reject) and close transport.
    Ae4,
    /// AE-5: issue transport connection response, start ARTIM.
    Ae5,
    /// AE-6: stop ARTIM; issue A-ASSOCIATE indication if acceptable,
    /// otherwise send A-ASSOCIATE-RJ and start ARTIM.
    Ae6,
    /// AE-7: send A-ASSOCIATE-AC.
    Ae7,
    /// AE-8: send A-ASSOCIATE-RJ, start ARTIM.
    Ae8,
    /// DT-1: send P-DATA-TF.
    Dt1,
    /// DT-2: issue P-DATA indication to the user.
    Dt2,
    /// AR-1: send A-RELEASE-RQ.
    Ar1,
    /// AR-2: issue A-RELEASE indication.
    Ar2,
    /// AR-3: issue A-RELEASE confirmation, close transport.
    Ar3,
    /// AR-4: send A-RELEASE-RP, start ARTIM.
    Ar4,
    /// AR-5: stop ARTIM, close transport.
    Ar5,
    /// AR-6: issue P-DATA indication while release is pending.
    Ar6,
    /// AR-7: send P-DATA-TF while release is pending.
    Ar7,
    /// AR-8: issue A-RELEASE indication (collision); next state depends
    /// on [`Role`].
    Ar8,
    /// AR-9: send A-RELEASE-RP (collision, acceptor side converging).
    Ar9,
    /// AR-10: issue A-RELEASE confirmation (collision).
    Ar10,
    /// AA-1: send A-ABORT (service user source), start ARTIM.
    Aa1,
    /// AA-2: stop ARTIM, close transport.
    Aa2,
    /// AA-3: issue A-ABORT or A-P-ABORT indication, close transport.
    Aa3,
    /// AA-4: issue A-P-ABORT indication.
    Aa4,
    /// AA-5: stop ARTIM.
    Aa5,
    /// AA-6: ignore the PDU.
    Aa6,
    /// AA-7: send A-ABORT.
    Aa7,
    /// AA-8: send A-ABORT (service provider source), issue A-P-ABORT
    /// indication, start ARTIM. The protocol-error branch.
    Aa8,
}

/// Look up the transition for `(event, state)`.
///
/// Returns `None` for a pair the standard does not reach in practice;
/// per the standard's own note, this is implementation-defined and
/// MUST NOT panic. Callers that receive `None` should treat it as a
/// protocol error (fire an implicit AA-8) rather than crash.
pub fn transition(state: State, event: Event, role: Role) -> Option<(Action, State)> {
    use Action::*;
    use Event::*;
    use State::*;

    Some(match (state, event) {
        (Sta1, Evt1) => (Ae1, Sta4),
        (Sta1, Evt5) => (Ae5, Sta2),

        (Sta2, Evt6) => (
            Ae6,
            match role {
                Role::Acceptor => Sta3,
                Role::Requester => Sta13,
            },
        ),
        (Sta2, Evt16) => (Aa2, Sta1),
        (Sta2, Evt17) => (Aa5, Sta1),
        (Sta2, Evt18) => (Aa2, Sta1),
        (Sta2, _) => (Aa1, Sta13),

        (Sta3, Evt7) => (Ae7, Sta6),
        (Sta3, Evt8) => (Ae8, Sta13),
        (Sta3, Evt15) => (Aa1, Sta13),
        (Sta3, Evt16) => (Aa3, Sta1),
        (Sta3, Evt17) => (Aa4, Sta1),
        (Sta3, _) => (Aa8, Sta13),

        (Sta4, Evt2) => (Ae2, Sta5),
        (Sta4, Evt15) => (Aa2, Sta1),
        (Sta4, _) => (Aa4, Sta1),

        (Sta5, Evt3) => (Ae3, Sta6),
        (Sta5, Evt4) => (Ae4, Sta1),
        (Sta5, Evt15) => (Aa1, Sta13),
        (Sta5, Evt16) => (Aa3, Sta1),
        (Sta5, Evt17) => (Aa4, Sta1),
        (Sta5, _) => (Aa8, Sta13),

        (Sta6, Evt9) => (Dt1, Sta6),
        (Sta6, Evt10) => (Dt2, Sta6),
        (Sta6, Evt11) => (Ar1, Sta7),
        (Sta6, Evt12) => (Ar2, Sta8),
        (Sta6, Evt15) => (Aa1, Sta13),
        (Sta6, Evt16) => (Aa3, Sta1),
        (Sta6, Evt17) => (Aa4, Sta1),
        (Sta6, _) => (Aa8, Sta13),

        (Sta7, Evt10) => (Ar6, Sta7),
        (Sta7, Evt12) => (
            Ar8,
            match role {
                Role::Requester => Sta9,
                Role::Acceptor => Sta10,
            },
        ),
        (Sta7, Evt13) => (Ar3, Sta1),
        (Sta7, Evt15) => (Aa1, Sta13),
        (Sta7, Evt16) => (Aa3, Sta1),
        (Sta7, Evt17) => (Aa4, Sta1),
        (Sta7, _) => (Aa8, Sta13),

        (Sta8, Evt9) => (Ar7, Sta8),
        (Sta8, Evt14) => (Ar4, Sta13),
        (Sta8, Evt15) => (Aa1, Sta13),
        (Sta8, Evt16) => (Aa3, Sta1),
        (Sta8, Evt17) => (Aa4, Sta1),
        (Sta8, _) => (Aa8, Sta13),

        (Sta9, Evt14) => (Ar9, Sta11),
        (Sta9, Evt15) => (Aa1, Sta13),
        (Sta9, Evt16) => (Aa3, Sta1),
        (Sta9, Evt17) => (Aa4, Sta1),
        (Sta9, _) => (Aa8, Sta13),

        (Sta10, Evt13) => (Ar10, Sta12),
        (Sta10, Evt15) => (Aa1, Sta13),
        (Sta10, Evt16) => (Aa3, Sta1),
        (Sta10, Evt17) => (Aa4, Sta1),
        (Sta10, _) => (Aa8, Sta13),

        (Sta11, Evt13) => (Ar3, Sta1),
        (Sta11, Evt15) => (Aa1, Sta13),
        (Sta11, Evt16) => (Aa3, Sta1),
        (Sta11, Evt17) => (Aa4, Sta1),
        (Sta11, _) => (Aa8, Sta13),

        (Sta12, Evt14) => (Ar4, Sta13),
        (Sta12, Evt15) => (Aa1, Sta13),
        (Sta12, Evt16) => (Aa3, Sta1),
        (Sta12, Evt17) => (Aa4, Sta1),
        (Sta12, _) => (Aa8, Sta13),

        (Sta13, Evt6) => (Aa7, Sta13),
        (Sta13, Evt15) => (Aa6, Sta13),
        (Sta13, Evt16) => (Aa2, Sta1),
        (Sta13, Evt17) => (Aa2, Sta1),
        (Sta13, Evt18) => (Aa2, Sta1),
        (Sta13, Evt19) => (Aa7, Sta13),
        (Sta13, _) => (Aa6, Sta13),

        (Sta1, _) => return None,
    })
}

impl State {
    /// Whether a peer PDU is expected to arrive from the network while
    /// in this state (as opposed to only local primitives or transport
    /// events).
    pub fn awaits_pdu(self) -> bool {
        !matches!(self, State::Sta1 | State::Sta4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn establishment_requester_happy_path() {
        let role = Role::Requester;
        let (a, s) = transition(State::Sta1, Event::Evt1, role).unwrap();
        assert_eq!((a, s), (Action::Ae1, State::Sta4));
        let (a, s) = transition(s, Event::Evt2, role).unwrap();
        assert_eq!((a, s), (Action::Ae2, State::Sta5));
        let (a, s) = transition(s, Event::Evt3, role).unwrap();
        assert_eq!((a, s), (Action::Ae3, State::Sta6));
    }

    #[test]
    fn establishment_acceptor_happy_path() {
        let role = Role::Acceptor;
        let (a, s) = transition(State::Sta1, Event::Evt5, role).unwrap();
        assert_eq!((a, s), (Action::Ae5, State::Sta2));
        let (a, s) = transition(s, Event::Evt6, role).unwrap();
        assert_eq!((a, s), (Action::Ae6, State::Sta3));
        let (a, s) = transition(s, Event::Evt7, role).unwrap();
        assert_eq!((a, s), (Action::Ae7, State::Sta6));
    }

    #[test]
    fn release_collision_diverges_by_role_then_converges() {
        let (a, requester_next) = transition(State::Sta7, Event::Evt12, Role::Requester).unwrap();
        assert_eq!((a, requester_next), (Action::Ar8, State::Sta9));
        let (a, acceptor_next) = transition(State::Sta7, Event::Evt12, Role::Acceptor).unwrap();
        assert_eq!((a, acceptor_next), (Action::Ar8, State::Sta10));

        // requester: Sta9 -(Evt14)-> Sta11 -(Evt13)-> Sta1
        let (_, s) = transition(requester_next, Event::Evt14, Role::Requester).unwrap();
        assert_eq!(s, State::Sta11);
        let (_, s) = transition(s, Event::Evt13, Role::Requester).unwrap();
        assert_eq!(s, State::Sta1);

        // acceptor: Sta10 -(Evt13)-> Sta12 -(Evt14)-> Sta13
        let (_, s) = transition(acceptor_next, Event::Evt13, Role::Acceptor).unwrap();
        assert_eq!(s, State::Sta12);
        let (_, s) = transition(s, Event::Evt14, Role::Acceptor).unwrap();
        assert_eq!(s, State::Sta13);
    }

    #[test]
    fn unexpected_pdu_in_data_transfer_fires_aa8() {
        let (a, s) = transition(State::Sta6, Event::Evt6, Role::Acceptor).unwrap();
        assert_eq!((a, s), (Action::Aa8, State::Sta13));
        let (a, s) = transition(State::Sta6, Event::Evt19, Role::Requester).unwrap();
        assert_eq!((a, s), (Action::Aa8, State::Sta13));
    }

    #[test]
    fn idle_never_sends_a_pdu() {
        // every action reachable from Sta1 only opens a transport or
        // arms the timer; no PDU is sent.
        for evt in [Event::Evt1, Event::Evt5] {
            let (action, _) = transition(State::Sta1, evt, Role::Requester).unwrap();
            assert!(matches!(action, Action::Ae1 | Action::Ae5));
        }
    }

    #[test]
    fn sta13_ignores_further_pdus_without_crashing() {
        let (a, s) = transition(State::Sta13, Event::Evt10, Role::Acceptor).unwrap();
        assert_eq!((a, s), (Action::Aa6, State::Sta13));
    }

    #[test]
    fn abort_after_aa_leaves_socket_closed_state() {
        // AA-2/AA-3/AA-4/AR-3 all land on Sta1, which callers close
        // their socket upon entering.
        let (_, s) = transition(State::Sta6, Event::Evt16, Role::Acceptor).unwrap();
        assert_eq!(s, State::Sta1);
        let (_, s) = transition(State::Sta7, Event::Evt13, Role::Requester).unwrap();
        assert_eq!(s, State::Sta1);
    }

    #[test]
    fn abort_received_acknowledges_rather_than_re_aborting() {
        // Evt16 (A-ABORT PDU received) must never fall through to the
        // AA-1/AA-8 catch-alls, which would send a second A-ABORT.
        let (a, s) = transition(State::Sta2, Event::Evt16, Role::Acceptor).unwrap();
        assert_eq!((a, s), (Action::Aa2, State::Sta1));
        for state in [
            State::Sta3,
            State::Sta5,
            State::Sta6,
            State::Sta7,
            State::Sta8,
            State::Sta9,
            State::Sta10,
            State::Sta11,
            State::Sta12,
        ] {
            let (a, s) = transition(state, Event::Evt16, Role::Requester).unwrap();
            assert_eq!((a, s), (Action::Aa3, State::Sta1), "state {state:?}");
        }
        let (a, s) = transition(State::Sta13, Event::Evt16, Role::Acceptor).unwrap();
        assert_eq!((a, s), (Action::Aa2, State::Sta1));
    }

    #[test]
    fn sta13_sends_abort_on_new_association_or_bad_pdu() {
        let (a, s) = transition(State::Sta13, Event::Evt6, Role::Acceptor).unwrap();
        assert_eq!((a, s), (Action::Aa7, State::Sta13));
        let (a, s) = transition(State::Sta13, Event::Evt19, Role::Acceptor).unwrap();
        assert_eq!((a, s), (Action::Aa7, State::Sta13));
    }
}
