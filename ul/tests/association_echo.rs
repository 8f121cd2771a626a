use std::io::Cursor;
use std::net::TcpListener;
use std::thread;

use dicom_dictionary_std::{tags, uids::VERIFICATION};
use dicom_object::InMemDicomObject;
use dicom_transfer_syntax_registry::entries;
use dicom_ul::association::server::{AcceptAny, ServerAssociationOptions};
use dicom_ul::pdu::commands::DatasetForbiddenCommand;
use dicom_ul::pdu::generated::{CEchoRq, CEchoRsp};
use dicom_ul::{ClientAssociationOptions, Pdu};

/// A full SCU/SCP round trip of a C-ECHO-RQ/RSP pair over a loopback
/// socket, exercising the established association rather than the
/// codec in isolation.
#[test]
fn c_echo_roundtrip() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let scp_handle = thread::spawn(move || {
        let options = ServerAssociationOptions::new()
            .ae_title("ECHO-SCP")
            .with_abstract_syntax(VERIFICATION)
            .with_access_control(AcceptAny);
        let mut association = options.accept(&listener).unwrap();
        let pc_id = association.presentation_contexts()[0].id;

        let Pdu::PData { data } = association.receive().unwrap() else {
            panic!("expected a P-DATA-TF PDU carrying the C-ECHO-RQ command");
        };
        assert_eq!(data.len(), 1);
        let command = InMemDicomObject::read_dataset_with_ts(
            Cursor::new(&data[0].data),
            &entries::IMPLICIT_VR_LITTLE_ENDIAN.erased(),
        )
        .unwrap();
        let message_id = command
            .element(tags::MESSAGE_ID)
            .unwrap()
            .value()
            .to_int::<u16>()
            .unwrap();

        let response = CEchoRsp::builder()
            .message_id_being_responded_to(message_id)
            .affected_sop_class_uid(VERIFICATION)
            .status(0)
            .build();
        association.send(&response.pdu(pc_id).unwrap()).unwrap();

        match association.receive().unwrap() {
            Pdu::ReleaseRQ => association.send(&Pdu::ReleaseRP).unwrap(),
            pdu => panic!("unexpected PDU from requester: {:?}", pdu),
        }
    });

    let mut association = ClientAssociationOptions::new()
        .calling_ae_title("ECHO-SCU")
        .called_ae_title("ECHO-SCP")
        .with_abstract_syntax(VERIFICATION)
        .establish(addr)
        .unwrap();
    let pc_id = association.presentation_contexts()[0].id;

    let request = CEchoRq::builder()
        .message_id(1)
        .affected_sop_class_uid(VERIFICATION)
        .build();
    association.send(&request.pdu(pc_id).unwrap()).unwrap();

    let Pdu::PData { data } = association.receive().unwrap() else {
        panic!("expected a P-DATA-TF PDU carrying the C-ECHO-RSP command");
    };
    assert_eq!(data.len(), 1);
    let response = InMemDicomObject::read_dataset_with_ts(
        Cursor::new(&data[0].data),
        &entries::IMPLICIT_VR_LITTLE_ENDIAN.erased(),
    )
    .unwrap();
    let status = response
        .element(tags::STATUS)
        .unwrap()
        .value()
        .to_int::<u16>()
        .unwrap();
    assert_eq!(status, 0);

    association.release().unwrap();
    scp_handle.join().unwrap();
}
