use std::net::TcpListener;
use std::thread;

use dicom_dictionary_std::uids::{SECONDARY_CAPTURE_IMAGE_STORAGE, VERIFICATION};
use dicom_ul::association::client::Error as ClientError;
use dicom_ul::association::server::{AcceptAny, ServerAssociationOptions};
use dicom_ul::pdu::PresentationContextResultReason;
use dicom_ul::{ClientAssociationOptions, Pdu};

/// An acceptor with no configured abstract syntaxes accepts whatever
/// presentation contexts the requester proposes.
#[test]
fn promiscuous_scp_accepts_any_abstract_syntax() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let scp_handle = thread::spawn(move || {
        let options = ServerAssociationOptions::new()
            .ae_title("PROMISCUOUS-SCP")
            .with_access_control(AcceptAny);
        let mut association = options.accept(&listener).unwrap();

        assert!(association.presentation_contexts().iter().any(|pc| {
            pc.abstract_syntax == SECONDARY_CAPTURE_IMAGE_STORAGE
                && pc.reason == PresentationContextResultReason::Acceptance
        }));

        match association.receive().unwrap() {
            Pdu::ReleaseRQ => association.send(&Pdu::ReleaseRP).unwrap(),
            pdu => panic!("unexpected PDU from requester: {:?}", pdu),
        }
    });

    let mut association = ClientAssociationOptions::new()
        .calling_ae_title("STORE-SCU")
        .called_ae_title("PROMISCUOUS-SCP")
        .with_abstract_syntax(SECONDARY_CAPTURE_IMAGE_STORAGE)
        .establish(addr)
        .unwrap();

    assert_eq!(association.presentation_contexts().len(), 1);

    association.release().unwrap();
    scp_handle.join().unwrap();
}

/// An acceptor restricted to one abstract syntax has nothing to accept
/// when the requester proposes only a different one, so it sends
/// A-ASSOCIATE-RJ and the requester's handshake fails with `Rejected`.
#[test]
fn restricted_scp_rejects_unsupported_abstract_syntax() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let scp_handle = thread::spawn(move || {
        let options = ServerAssociationOptions::new()
            .ae_title("RESTRICTED-SCP")
            .with_abstract_syntax(VERIFICATION)
            .with_access_control(AcceptAny);
        assert!(options.accept(&listener).is_err());
    });

    let error = ClientAssociationOptions::new()
        .calling_ae_title("STORE-SCU")
        .called_ae_title("RESTRICTED-SCP")
        .with_abstract_syntax(SECONDARY_CAPTURE_IMAGE_STORAGE)
        .establish(addr)
        .unwrap_err();

    assert!(matches::matches!(error, ClientError::Rejected { .. }));

    scp_handle.join().unwrap();
}
