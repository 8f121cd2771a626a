use std::net::TcpListener;
use std::thread;

use dicom_dictionary_std::uids::VERIFICATION;
use dicom_ul::association::server::{AcceptAny, ServerAssociationOptions};
use dicom_ul::pdu::PresentationContextResultReason;
use dicom_ul::{ClientAssociationOptions, Pdu};

#[test]
fn scu_scp_association_release() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let scp_handle = thread::spawn(move || {
        let options = ServerAssociationOptions::new()
            .ae_title("SOME-SCP")
            .with_abstract_syntax(VERIFICATION)
            .with_access_control(AcceptAny);
        let mut association = options.accept(&listener).unwrap();

        assert_eq!(association.presentation_contexts().len(), 1);
        assert!(association
            .presentation_contexts()
            .iter()
            .all(|pc| pc.reason == PresentationContextResultReason::Acceptance));

        match association.receive().unwrap() {
            Pdu::ReleaseRQ => {
                association.send(&Pdu::ReleaseRP).unwrap();
            }
            pdu => panic!("unexpected PDU from requester: {:?}", pdu),
        }
    });

    let mut association = ClientAssociationOptions::new()
        .calling_ae_title("SOME-SCU")
        .called_ae_title("SOME-SCP")
        .with_abstract_syntax(VERIFICATION)
        .establish(addr)
        .unwrap();

    assert_eq!(association.presentation_contexts().len(), 1);
    assert_eq!(
        association.presentation_contexts()[0].abstract_syntax,
        VERIFICATION
    );

    association.release().unwrap();

    scp_handle.join().unwrap();
}

#[test]
fn scu_association_requires_an_abstract_syntax() {
    let err = ClientAssociationOptions::new()
        .calling_ae_title("SOME-SCU")
        .called_ae_title("SOME-SCP")
        .establish("127.0.0.1:1")
        .unwrap_err();

    assert!(matches::matches!(
        err,
        dicom_ul::association::client::Error::MissingAbstractSyntax
    ));
}

#[test]
fn scu_scp_negotiate_max_pdu_length() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let scp_handle = thread::spawn(move || {
        let options = ServerAssociationOptions::new()
            .ae_title("SOME-SCP")
            .with_abstract_syntax(VERIFICATION)
            .max_pdu_length(4096)
            .with_access_control(AcceptAny);
        let mut association = options.accept(&listener).unwrap();

        assert_eq!(association.receive().unwrap(), Pdu::ReleaseRQ);
        association.send(&Pdu::ReleaseRP).unwrap();
    });

    let mut association = ClientAssociationOptions::new()
        .calling_ae_title("SOME-SCU")
        .called_ae_title("SOME-SCP")
        .with_abstract_syntax(VERIFICATION)
        .max_pdu_length(16_384)
        .establish(addr)
        .unwrap();

    // the negotiated length is the minimum of both proposals
    assert_eq!(association.acceptor_max_pdu_length(), 4096);

    association.release().unwrap();
    scp_handle.join().unwrap();
}
