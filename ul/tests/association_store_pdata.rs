//! A full C-STORE interaction (command + large data set) driven through
//! `send_dimse`/`receive_dimse`, which fragments and reassembles PDVs
//! across as many P-DATA-TF PDUs as the negotiated `max_pdu_length`
//! requires.
use std::net::TcpListener;
use std::thread;

use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids::SECONDARY_CAPTURE_IMAGE_STORAGE};
use dicom_object::InMemDicomObject;
use dicom_transfer_syntax_registry::entries::IMPLICIT_VR_LITTLE_ENDIAN;
use dicom_ul::association::server::{AcceptAny, ServerAssociationOptions};
use dicom_ul::dul::DimseMessage;
use dicom_ul::pdu::commands::Command;
use dicom_ul::pdu::generated::{CStoreRq, CStoreRsp};
use dicom_ul::ClientAssociationOptions;

const SOP_INSTANCE_UID: &str = "2.25.74320942257366560001029850331948705672";
const STUDY_INSTANCE_UID: &str = "2.25.272620270218608159498737797752592743030";
const SERIES_INSTANCE_UID: &str = "2.25.325162285992071091624723217127749500558";

fn to_bytes_implicit_vr_le(obj: &InMemDicomObject) -> Vec<u8> {
    let mut data = Vec::new();
    obj.write_dataset_with_ts(&mut data, &IMPLICIT_VR_LITTLE_ENDIAN.erased())
        .unwrap();
    data
}

fn from_bytes_implicit_vr_le(data: impl AsRef<[u8]>) -> InMemDicomObject {
    InMemDicomObject::read_dataset_with_ts(data.as_ref(), &IMPLICIT_VR_LITTLE_ENDIAN.erased())
        .unwrap()
}

fn image_object() -> InMemDicomObject {
    InMemDicomObject::from_element_iter([
        DataElement::new(tags::SOP_CLASS_UID, VR::UI, SECONDARY_CAPTURE_IMAGE_STORAGE),
        DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, SOP_INSTANCE_UID),
        DataElement::new(tags::STUDY_INSTANCE_UID, VR::UI, STUDY_INSTANCE_UID),
        DataElement::new(tags::SERIES_INSTANCE_UID, VR::UI, SERIES_INSTANCE_UID),
        DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(3_u16)),
        DataElement::new(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, "RGB"),
        DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(300_u16)),
        DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(400_u16)),
        DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(8_u16)),
        DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(8_u16)),
        DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(8_u16)),
        DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U8(vec![0x5c_u8; 400 * 300 * 3].into()),
        ),
    ])
}

/// Negotiate a deliberately small `max_pdu_length` so that the pixel
/// data alone spans many P-DATA-TF PDUs, then check that both ends
/// reassemble it back into the exact bytes sent.
#[test]
fn c_store_large_dataset_fragments_across_many_pdus() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let scp_handle = thread::spawn(move || {
        let options = ServerAssociationOptions::new()
            .ae_title("STORE-SCP")
            .accept_called_ae_title()
            .with_abstract_syntax(SECONDARY_CAPTURE_IMAGE_STORAGE)
            .max_pdu_length(4096)
            .with_access_control(AcceptAny);
        let mut association = options.accept(&listener).unwrap();
        let pc_id = association.presentation_contexts()[0].id;

        let message = association.receive_dimse().unwrap();
        assert_eq!(message.presentation_context_id, pc_id);
        let data = message.data.expect("C-STORE-RQ must carry a data set");
        let obj = from_bytes_implicit_vr_le(&data);
        assert_eq!(
            obj.element(tags::SOP_INSTANCE_UID)
                .unwrap()
                .value()
                .to_str()
                .unwrap(),
            SOP_INSTANCE_UID,
        );
        assert_eq!(
            obj.element(tags::ROWS).unwrap().value().to_int::<u16>().unwrap(),
            300,
        );

        let response = CStoreRsp::builder()
            .message_id_being_responded_to(1)
            .affected_sop_class_uid(SECONDARY_CAPTURE_IMAGE_STORAGE)
            .affected_sop_instance_uid(SOP_INSTANCE_UID)
            .status(0)
            .build();
        association
            .send_dimse(&DimseMessage {
                presentation_context_id: pc_id,
                command: response.encode(false).unwrap(),
                data: None,
            })
            .unwrap();

        match association.receive().unwrap() {
            dicom_ul::Pdu::ReleaseRQ => association.handle_release_request().unwrap(),
            pdu => panic!("unexpected PDU from requester: {:?}", pdu),
        }
    });

    let mut association = ClientAssociationOptions::new()
        .calling_ae_title("STORE-SCU")
        .called_ae_title("STORE-SCP")
        .with_abstract_syntax(SECONDARY_CAPTURE_IMAGE_STORAGE)
        .max_pdu_length(4096)
        .establish(addr)
        .unwrap();
    let pc_id = association.presentation_contexts()[0].id;

    let request = CStoreRq::builder()
        .message_id(1)
        .affected_sop_class_uid(SECONDARY_CAPTURE_IMAGE_STORAGE)
        .affected_sop_instance_uid(SOP_INSTANCE_UID)
        .build();
    let obj_data = to_bytes_implicit_vr_le(&image_object());
    // at a 4096-byte max PDU, a ~360000-byte pixel data element alone
    // forces dozens of P-DATA-TF PDUs to carry the data set.
    assert!(obj_data.len() > 16 * 4096);

    association
        .send_dimse(&DimseMessage {
            presentation_context_id: pc_id,
            command: request.encode(true).unwrap(),
            data: Some(obj_data),
        })
        .unwrap();

    let response = association.receive_dimse().unwrap();
    assert!(response.data.is_none());
    let rsp_cmd = from_bytes_implicit_vr_le(&response.command);
    assert_eq!(
        rsp_cmd
            .element(tags::AFFECTED_SOP_INSTANCE_UID)
            .unwrap()
            .value()
            .to_str()
            .unwrap(),
        SOP_INSTANCE_UID,
    );
    assert_eq!(
        rsp_cmd
            .element(tags::STATUS)
            .unwrap()
            .value()
            .to_int::<u16>()
            .unwrap(),
        0x0000,
    );

    association.release().unwrap();
    scp_handle.join().unwrap();
}
