use crate::pdu::reader::*;
use crate::pdu::writer::*;
use crate::pdu::*;
use std::io::Cursor;

#[test]
fn can_read_write_associate_rq() -> Result<()> {
    let association_rq = Pdu::AssociationRQ(AssociationRQ {
        protocol_version: 1,
        calling_ae_title: "calling ae".to_string(),
        called_ae_title: "called ae".to_string(),
        application_context_name: "1.2.840.10008.3.1.1.1".to_string(),
        presentation_contexts: vec![
            PresentationContextProposed {
                id: 1,
                abstract_syntax: "abstract 1".to_string(),
                transfer_syntaxes: vec!["transfer 1".to_string(), "transfer 2".to_string()],
            },
            PresentationContextProposed {
                id: 3,
                abstract_syntax: "abstract 2".to_string(),
                transfer_syntaxes: vec!["transfer 3".to_string(), "transfer 4".to_string()],
            },
        ],
        user_variables: vec![
            UserVariableItem::MaxLength(16384),
            UserVariableItem::ImplementationClassUID("class uid".to_string()),
            UserVariableItem::ImplementationVersionName("version name".to_string()),
            UserVariableItem::AsynchronousOperationsWindow(AsynchronousOperationsWindowItem {
                max_ops_invoked: 1,
                max_ops_performed: 1,
            }),
            UserVariableItem::ScpScuRoleSelection(ScpScuRoleSelectionItem {
                sop_class_uid: "1.2.840.10008.5.1.4.1.1.7".to_string(),
                scu_role: true,
                scp_role: false,
            }),
            UserVariableItem::UserIdentityItem(UserIdentity::username_password(
                b"alice".to_vec(),
                b"secret".to_vec(),
                true,
            )),
        ],
    });

    let mut bytes = vec![0u8; 0];
    write_pdu(&mut bytes, &association_rq).unwrap();

    let result = read_pdu(&mut Cursor::new(&bytes), MAXIMUM_PDU_SIZE, true)?;

    match result {
        Pdu::AssociationRQ(AssociationRQ {
            protocol_version,
            calling_ae_title,
            called_ae_title,
            application_context_name,
            presentation_contexts,
            user_variables,
        }) => {
            assert_eq!(protocol_version, 1);
            assert_eq!(calling_ae_title, "calling ae");
            assert_eq!(called_ae_title, "called ae");
            assert_eq!(application_context_name, "1.2.840.10008.3.1.1.1");
            assert_eq!(presentation_contexts.len(), 2);
            assert_eq!(presentation_contexts[0].abstract_syntax, "abstract 1");
            assert_eq!(presentation_contexts[0].transfer_syntaxes.len(), 2);
            assert_eq!(presentation_contexts[1].abstract_syntax, "abstract 2");
            assert_eq!(user_variables.len(), 6);
            assert!(matches!(user_variables[0], UserVariableItem::MaxLength(16384)));
            assert!(matches!(
                user_variables[3],
                UserVariableItem::AsynchronousOperationsWindow(_)
            ));
            assert!(matches!(
                user_variables[4],
                UserVariableItem::ScpScuRoleSelection(_)
            ));
            assert!(matches!(
                user_variables[5],
                UserVariableItem::UserIdentityItem(_)
            ));
        }
        other => panic!("unexpected PDU: {:?}", other),
    }

    Ok(())
}

#[test]
fn can_read_write_pdata() -> Result<()> {
    let pdata_rq = Pdu::PData {
        data: vec![PDataValue {
            presentation_context_id: 3,
            value_type: PDataValueType::Command,
            is_last: true,
            data: vec![0, 0, 0, 0],
        }],
    };

    let mut bytes = vec![0u8; 0];
    write_pdu(&mut bytes, &pdata_rq).unwrap();

    let result = read_pdu(&mut Cursor::new(&bytes), MAXIMUM_PDU_SIZE, true)?;

    match result {
        Pdu::PData { data } => {
            assert_eq!(data.len(), 1);
            assert_eq!(data[0].presentation_context_id, 3);
            assert!(matches!(data[0].value_type, PDataValueType::Command));
            assert!(data[0].is_last);
            assert_eq!(data[0].data, vec![0, 0, 0, 0]);
        }
        other => panic!("unexpected PDU: {:?}", other),
    }

    Ok(())
}

#[test]
fn can_read_write_association_rj() -> Result<()> {
    let rj = Pdu::AssociationRJ(AssociationRJ {
        result: AssociationRJResult::Permanent,
        source: AssociationRJSource::ServiceUser(
            AssociationRJServiceUserReason::CalledAETitleNotRecognized,
        ),
    });

    let mut bytes = vec![];
    write_pdu(&mut bytes, &rj).unwrap();
    let result = read_pdu(&mut Cursor::new(&bytes), MAXIMUM_PDU_SIZE, true)?;
    assert_eq!(result, rj);

    Ok(())
}

#[test]
fn unknown_pdu_type_round_trips() -> Result<()> {
    let pdu = Pdu::Unknown {
        pdu_type: 0x99,
        data: vec![1, 2, 3, 4],
    };

    let mut bytes = vec![];
    write_pdu(&mut bytes, &pdu).unwrap();
    let result = read_pdu(&mut Cursor::new(&bytes), MAXIMUM_PDU_SIZE, true)?;
    assert_eq!(result, pdu);

    Ok(())
}
