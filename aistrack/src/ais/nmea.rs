//! NMEA 0183 VDM/VDO sentence framing and fragment reassembly.
//!
//! Sentence layout:
//! `!AIVDM,<count>,<number>,<seq id>,<channel>,<payload>,<fill bits>*<checksum>`
//!
//! An optional NMEA 4.0 tag block (`\...\`) before the sentence is ignored.

use std::collections::HashMap;

use tracing::trace;

use super::payload::decode_payload;
use super::{AisReport, DecodeError, MessageDecoder};

/// Upper bound on concurrently pending multi-fragment messages.
const MAX_PENDING_MESSAGES: usize = 64;

/// Number of comma-separated fields in a VDM/VDO sentence.
const SENTENCE_FIELDS: usize = 7;

/// Largest legal fill-bit count.
const MAX_FILL_BITS: u8 = 5;

/// One parsed sentence, borrowing from the input line.
#[derive(Debug, PartialEq)]
struct Sentence<'a> {
    count: u8,
    number: u8,
    sequence_id: &'a str,
    channel: &'a str,
    payload: &'a str,
    fill_bits: u8,
}

#[derive(Debug)]
struct PendingMessage {
    count: u8,
    next: u8,
    payload: String,
}

/// Stateful decoder for a stream of AIVDM/AIVDO sentences.
#[derive(Debug, Default)]
pub struct NmeaDecoder {
    /// Keyed by (sequence id, channel).
    pending: HashMap<(String, String), PendingMessage>,
}

impl NmeaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of multi-fragment messages awaiting further fragments.
    pub fn pending_messages(&self) -> usize {
        self.pending.len()
    }

    fn reassemble(&mut self, sentence: &Sentence<'_>) -> Result<Option<String>, DecodeError> {
        let key = (
            sentence.sequence_id.to_string(),
            sentence.channel.to_string(),
        );

        if sentence.number == 1 {
            if self.pending.len() >= MAX_PENDING_MESSAGES {
                trace!(pending = self.pending.len(), "Dropping stale AIS fragments");
                self.pending.clear();
            }
            self.pending.insert(
                key,
                PendingMessage {
                    count: sentence.count,
                    next: 2,
                    payload: sentence.payload.to_string(),
                },
            );
            return Ok(None);
        }

        let in_sequence = self
            .pending
            .get(&key)
            .is_some_and(|p| p.count == sentence.count && p.next == sentence.number);
        if !in_sequence {
            self.pending.remove(&key);
            return Err(DecodeError::FragmentSequence {
                number: sentence.number,
                count: sentence.count,
            });
        }

        if sentence.number == sentence.count {
            return Ok(self.pending.remove(&key).map(|mut p| {
                p.payload.push_str(sentence.payload);
                p.payload
            }));
        }

        if let Some(pending) = self.pending.get_mut(&key) {
            pending.payload.push_str(sentence.payload);
            pending.next += 1;
        }
        Ok(None)
    }
}

impl MessageDecoder for NmeaDecoder {
    fn decode(&mut self, line: &str) -> Result<Option<AisReport>, DecodeError> {
        let sentence = parse_sentence(line)?;

        if sentence.count == 1 {
            return decode_payload(sentence.payload, sentence.fill_bits).map(Some);
        }

        match self.reassemble(&sentence)? {
            Some(payload) => decode_payload(&payload, sentence.fill_bits).map(Some),
            None => Ok(None),
        }
    }
}

fn strip_tag_block(line: &str) -> Result<&str, DecodeError> {
    match line.strip_prefix('\\') {
        Some(rest) => rest
            .split_once('\\')
            .map(|(_, sentence)| sentence)
            .ok_or_else(|| DecodeError::Framing("unterminated tag block".to_string())),
        None => Ok(line),
    }
}

fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

fn parse_sentence(line: &str) -> Result<Sentence<'_>, DecodeError> {
    let line = strip_tag_block(line.trim())?;

    let body = line
        .strip_prefix('!')
        .or_else(|| line.strip_prefix('$'))
        .ok_or_else(|| DecodeError::Framing("missing start delimiter".to_string()))?;

    let (body, expected) = body
        .split_once('*')
        .ok_or_else(|| DecodeError::Framing("missing checksum".to_string()))?;
    let expected = expected
        .get(..2)
        .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        .ok_or_else(|| DecodeError::Framing(format!("bad checksum field {:?}", expected)))?;
    let computed = checksum(body);
    if computed != expected {
        return Err(DecodeError::Checksum { expected, computed });
    }

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() != SENTENCE_FIELDS {
        return Err(DecodeError::Framing(format!(
            "expected {} fields, found {}",
            SENTENCE_FIELDS,
            fields.len()
        )));
    }

    let tag = fields[0];
    if tag.len() != 5 || !(tag.ends_with("VDM") || tag.ends_with("VDO")) {
        return Err(DecodeError::Framing(format!("not a VDM/VDO sentence: {}", tag)));
    }

    let count = parse_field::<u8>(fields[1], "fragment count")?;
    let number = parse_field::<u8>(fields[2], "fragment number")?;
    if count == 0 || number == 0 || number > count {
        return Err(DecodeError::Framing(format!(
            "fragment {} of {}",
            number, count
        )));
    }

    let fill_bits = parse_field::<u8>(fields[6], "fill bits")?;
    if fill_bits > MAX_FILL_BITS {
        return Err(DecodeError::Framing(format!("fill bits {}", fill_bits)));
    }

    Ok(Sentence {
        count,
        number,
        sequence_id: fields[3],
        channel: fields[4],
        payload: fields[5],
        fill_bits,
    })
}

fn parse_field<T: std::str::FromStr>(value: &str, name: &str) -> Result<T, DecodeError> {
    value
        .parse()
        .map_err(|_| DecodeError::Framing(format!("bad {} {:?}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITION: &str = "!AIVDM,1,1,,B,177KQJ5000G?tO`K>RA1wUbN0TKH,0*5C";
    const STATIC_1: &str =
        "!AIVDM,2,1,3,B,53m=TP42;=`0h5Pd0010th58H`u8@00000000016<Pj:<5Wd0=0QDQiCP000,0*49";
    const STATIC_2: &str = "!AIVDM,2,2,3,B,00000000000,2*24";

    #[test]
    fn test_single_fragment_sentence() {
        let mut decoder = NmeaDecoder::new();
        let report = decoder.decode(POSITION).unwrap().unwrap();
        assert_eq!(report.mmsi, 477553000);
        assert_eq!(report.msg_type, 1);
    }

    #[test]
    fn test_two_fragment_message() {
        let mut decoder = NmeaDecoder::new();
        assert_eq!(decoder.decode(STATIC_1).unwrap(), None);
        assert_eq!(decoder.pending_messages(), 1);

        let report = decoder.decode(STATIC_2).unwrap().unwrap();
        assert_eq!(report.msg_type, 5);
        assert_eq!(report.mmsi, 257123456);
        assert_eq!(report.ship_name.as_deref(), Some("POLARFJORD"));
        assert_eq!(decoder.pending_messages(), 0);
    }

    #[test]
    fn test_orphan_fragment_is_rejected() {
        let mut decoder = NmeaDecoder::new();
        assert_eq!(
            decoder.decode(STATIC_2).unwrap_err(),
            DecodeError::FragmentSequence {
                number: 2,
                count: 2
            }
        );
    }

    #[test]
    fn test_bad_checksum() {
        let mut decoder = NmeaDecoder::new();
        let corrupted = POSITION.replace("*5C", "*5D");
        assert_eq!(
            decoder.decode(&corrupted).unwrap_err(),
            DecodeError::Checksum {
                expected: 0x5D,
                computed: 0x5C
            }
        );
    }

    #[test]
    fn test_tag_block_and_whitespace_are_ignored() {
        let mut decoder = NmeaDecoder::new();
        let line = format!("\\s:2573135,c:1718452800*0A\\{}\r\n", POSITION);
        let report = decoder.decode(&line).unwrap().unwrap();
        assert_eq!(report.mmsi, 477553000);
    }

    #[test]
    fn test_non_ais_sentence_is_rejected() {
        let mut decoder = NmeaDecoder::new();
        // $GPGLL sentence with a valid checksum
        let body = "GPGLL,4916.45,N,12311.12,W,225444,A";
        let line = format!("${}*{:02X}", body, checksum(body));
        assert!(matches!(
            decoder.decode(&line),
            Err(DecodeError::Framing(_))
        ));
        assert!(matches!(
            decoder.decode("garbage"),
            Err(DecodeError::Framing(_))
        ));
        assert!(matches!(decoder.decode(""), Err(DecodeError::Framing(_))));
    }

    #[test]
    fn test_own_vessel_sentences_decode() {
        let body = "AIVDO,1,1,,B,177KQJ5000G?tO`K>RA1wUbN0TKH,0";
        let line = format!("!{}*{:02X}", body, checksum(body));
        let mut decoder = NmeaDecoder::new();
        assert!(decoder.decode(&line).unwrap().is_some());
    }

    #[test]
    fn test_parse_sentence_fields() {
        let sentence = parse_sentence(STATIC_1).unwrap();
        assert_eq!(sentence.count, 2);
        assert_eq!(sentence.number, 1);
        assert_eq!(sentence.sequence_id, "3");
        assert_eq!(sentence.channel, "B");
        assert_eq!(sentence.fill_bits, 0);
    }
}
