//! The DIMSE framer: turns a command set (+ optional data set) into an
//! ordered sequence of P-DATA-TF PDUs bounded by `max_pdu_length`, and
//! reassembles incoming PDVs back into whole DIMSE messages.
//!
//! This is the piece referred to in the overview as the DUL provider's
//! DIMSE reassembler and the association layer's send fragmentation.
//! It does not own a socket; [`association::client`](crate::association::client)
//! and [`association::server`](crate::association::server) call into it
//! around their own `send`/`receive`.

use std::io::{Read, Write};

use dicom_object::InMemDicomObject;
use dicom_transfer_syntax_registry::entries;
use snafu::{ResultExt, Snafu};

use crate::pdu::{read_pdu, write_pdu, PDataValue, PDataValueType, Pdu, PDU_HEADER_SIZE};

/// The fixed tag of Command Data Set Type (0000,0800), read with a
/// manual lookup so that this module does not have to depend on the
/// standard attribute dictionary for a single well-known tag.
const COMMAND_DATA_SET_TYPE: dicom_core::Tag = dicom_core::Tag(0x0000, 0x0800);

/// Command Data Set Type value meaning "no data set follows".
const NO_DATA_SET: u16 = 0x0101;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("failed to send PDU"))]
    Send { source: crate::pdu::writer::Error },
    #[snafu(display("failed to receive PDU"))]
    Receive { source: crate::pdu::reader::Error },
    #[snafu(display("expected a P-DATA-TF PDU, got `{:?}`", pdu))]
    NotPData { pdu: Pdu },
    #[snafu(display("could not decode the command set"))]
    DecodeCommand { source: dicom_object::ReadError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// One fully reassembled DIMSE message.
///
/// The command set is always Implicit VR Little Endian, per the
/// standard; the data set (if present) is encoded in the presentation
/// context's negotiated transfer syntax, which the caller already
/// knows from the `presentation_context_id`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DimseMessage {
    pub presentation_context_id: u8,
    pub command: Vec<u8>,
    pub data: Option<Vec<u8>>,
}

/// Accumulates PDVs, possibly spread across several P-DATA-TF PDUs,
/// into one complete [`DimseMessage`].
///
/// A message is complete once a last-command-fragment has been seen
/// and either Command Data Set Type says there is no data set, or a
/// last-data-fragment has also been seen.
#[derive(Debug, Default)]
pub struct DimseReassembler {
    pc_id: Option<u8>,
    command: Vec<u8>,
    command_done: bool,
    data: Vec<u8>,
    data_started: bool,
    data_done: bool,
}

impl DimseReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the PDVs of one incoming P-DATA-TF PDU. Returns the
    /// completed message once the framing invariants are satisfied,
    /// after which this reassembler is ready for the next message.
    pub fn feed(&mut self, values: Vec<PDataValue>) -> Result<Option<DimseMessage>> {
        for v in values {
            let pc_id = *self.pc_id.get_or_insert(v.presentation_context_id);
            // a PC id switch mid-message cannot happen per the data model
            // invariant; treat it defensively as starting a fresh message
            if pc_id != v.presentation_context_id {
                *self = Self::default();
                self.pc_id = Some(v.presentation_context_id);
            }
            match v.value_type {
                PDataValueType::Command => {
                    self.command.extend_from_slice(&v.data);
                    if v.is_last {
                        self.command_done = true;
                    }
                }
                PDataValueType::Data => {
                    self.data_started = true;
                    self.data.extend_from_slice(&v.data);
                    if v.is_last {
                        self.data_done = true;
                    }
                }
            }
        }

        if !self.command_done {
            return Ok(None);
        }

        let has_dataset = self.command_has_dataset()?;
        if has_dataset && !self.data_done {
            return Ok(None);
        }

        let pc_id = self.pc_id.expect("command fragment implies a PC id");
        let message = DimseMessage {
            presentation_context_id: pc_id,
            command: std::mem::take(&mut self.command),
            data: if has_dataset {
                Some(std::mem::take(&mut self.data))
            } else {
                None
            },
        };
        *self = Self::default();
        Ok(Some(message))
    }

    fn command_has_dataset(&self) -> Result<bool> {
        let obj = InMemDicomObject::read_dataset_with_ts(
            &self.command[..],
            &entries::IMPLICIT_VR_LITTLE_ENDIAN.erased(),
        )
        .context(DecodeCommandSnafu)?;
        let value = obj
            .element(COMMAND_DATA_SET_TYPE)
            .ok()
            .and_then(|e| e.value().to_int::<u16>().ok())
            .unwrap_or(NO_DATA_SET);
        Ok(value != NO_DATA_SET)
    }
}

/// Read one P-DATA-TF PDU from the wire and feed it to `reassembler`.
pub fn recv_one<R: Read>(
    reader: &mut R,
    max_pdu_length: u32,
    reassembler: &mut DimseReassembler,
) -> Result<Option<DimseMessage>> {
    let pdu = read_pdu(reader, max_pdu_length, true).context(ReceiveSnafu)?;
    match pdu {
        Pdu::PData { data } => reassembler.feed(data),
        other => NotPDataSnafu { pdu: other }.fail(),
    }
}

/// The maximum number of data bytes a single PDV can carry given a
/// negotiated `max_pdu_length`. `max_pdu_length` bounds the PDU body
/// (the declared length field, not counting the 6-byte PDU header);
/// within that body a lone PDV spends 4 bytes on its own length field
/// plus 2 bytes of control header (pc_id, header byte) before any
/// value bytes, so the value is capped at `max_pdu_length - 6`.
fn max_fragment_len(max_pdu_length: u32) -> usize {
    (max_pdu_length.max(PDU_HEADER_SIZE + 1) - PDU_HEADER_SIZE) as usize
}

fn send_fragments<W: Write>(
    writer: &mut W,
    pc_id: u8,
    value_type: PDataValueType,
    bytes: &[u8],
    max_pdu_length: u32,
) -> Result<()> {
    let chunk_len = max_fragment_len(max_pdu_length).max(1);
    if bytes.is_empty() {
        let pdu = Pdu::PData {
            data: vec![PDataValue {
                presentation_context_id: pc_id,
                value_type,
                is_last: true,
                data: Vec::new(),
            }],
        };
        return write_pdu(writer, &pdu).context(SendSnafu);
    }
    let mut offset = 0;
    while offset < bytes.len() {
        let end = (offset + chunk_len).min(bytes.len());
        let is_last = end == bytes.len();
        let pdu = Pdu::PData {
            data: vec![PDataValue {
                presentation_context_id: pc_id,
                value_type,
                is_last,
                data: bytes[offset..end].to_vec(),
            }],
        };
        write_pdu(writer, &pdu).context(SendSnafu)?;
        offset = end;
    }
    Ok(())
}

/// Fragment and send one DIMSE message as an ordered sequence of
/// P-DATA-TF PDUs: command fragments precede data fragments, each PDV
/// body is at most `max_pdu_length - 6` bytes, and there is exactly
/// one PDV per P-DATA-TF PDU.
pub fn send(
    writer: &mut impl Write,
    message: &DimseMessage,
    max_pdu_length: u32,
) -> Result<()> {
    send_fragments(
        writer,
        message.presentation_context_id,
        PDataValueType::Command,
        &message.command,
        max_pdu_length,
    )?;
    if let Some(data) = &message.data {
        send_fragments(
            writer,
            message.presentation_context_id,
            PDataValueType::Data,
            data,
            max_pdu_length,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_bytes(has_dataset: bool) -> Vec<u8> {
        use dicom_core::{dicom_value, DataElement, VR};
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(
            COMMAND_DATA_SET_TYPE,
            VR::US,
            dicom_value!(if has_dataset { 0x0001u16 } else { NO_DATA_SET }),
        ));
        let mut buf = Vec::new();
        obj.write_dataset_with_ts(&mut buf, &entries::IMPLICIT_VR_LITTLE_ENDIAN.erased())
            .unwrap();
        buf
    }

    #[test]
    fn reassembles_command_only_message() {
        let cmd = command_bytes(false);
        let mut r = DimseReassembler::new();
        let msg = r
            .feed(vec![PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Command,
                is_last: true,
                data: cmd.clone(),
            }])
            .unwrap()
            .expect("message should be complete");
        assert_eq!(msg.presentation_context_id, 1);
        assert_eq!(msg.command, cmd);
        assert_eq!(msg.data, None);
    }

    #[test]
    fn waits_for_dataset_fragment_before_completing() {
        let cmd = command_bytes(true);
        let mut r = DimseReassembler::new();
        let not_yet = r
            .feed(vec![PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Command,
                is_last: true,
                data: cmd.clone(),
            }])
            .unwrap();
        assert!(not_yet.is_none());

        let msg = r
            .feed(vec![PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Data,
                is_last: true,
                data: vec![1, 2, 3, 4],
            }])
            .unwrap()
            .expect("message should now be complete");
        assert_eq!(msg.data, Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn fragments_large_dataset_within_pdu_budget() {
        let cmd = command_bytes(true);
        let data = vec![7u8; 10_000];
        let msg = DimseMessage {
            presentation_context_id: 5,
            command: cmd,
            data: Some(data.clone()),
        };
        let max_pdu_length = 1024;
        let mut buf = Vec::new();
        send(&mut buf, &msg, max_pdu_length).unwrap();

        let mut cursor = &buf[..];
        let mut reassembler = DimseReassembler::new();
        let mut result = None;
        let mut pdu_count = 0;
        while result.is_none() {
            let pdu = read_pdu(&mut cursor, max_pdu_length, true).unwrap();
            pdu_count += 1;
            match pdu {
                Pdu::PData { data } => {
                    for v in &data {
                        assert!(v.data.len() as u32 <= max_pdu_length - PDU_HEADER_SIZE);
                    }
                    result = reassembler.feed(data).unwrap();
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(pdu_count >= 10, "expected fragmentation into >=10 PDUs, got {pdu_count}");
        assert_eq!(result.unwrap().data, Some(data));
    }
}
