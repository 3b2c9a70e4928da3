//! 6-bit armored payload decoding.

use super::{AisReport, DecodeError};
use crate::ship::Dimensions;

/// Longitude/latitude resolution: 1/10000 minute.
const POSITION_SCALE: f64 = 600_000.0;

/// In-band "not available" markers.
const LON_NOT_AVAILABLE: i64 = 181 * 600_000;
const LAT_NOT_AVAILABLE: i64 = 91 * 600_000;
const SOG_NOT_AVAILABLE: u64 = 1023;
const COG_NOT_AVAILABLE: u64 = 3600;
const HEADING_NOT_AVAILABLE: u64 = 511;
const TURN_NOT_AVAILABLE: i64 = -128;

/// Largest ROT indicator that encodes an actual rate.
const TURN_MAX_INDICATOR: i64 = 126;

/// ROT indicator = 4.733 * sqrt(rate in degrees/minute).
const TURN_FACTOR: f64 = 4.733;

/// Unpacked payload bits with bounds-checked field access.
struct BitReader {
    bits: Vec<bool>,
}

impl BitReader {
    fn new(payload: &str, fill_bits: u8) -> Result<Self, DecodeError> {
        let mut bits = Vec::with_capacity(payload.len() * 6);
        for c in payload.chars() {
            let value = unarmor(c)?;
            for shift in (0..6).rev() {
                bits.push((value >> shift) & 1 == 1);
            }
        }
        let keep = bits.len().saturating_sub(fill_bits as usize);
        bits.truncate(keep);
        Ok(Self { bits })
    }

    fn len(&self) -> usize {
        self.bits.len()
    }

    fn require(&self, end: usize) -> Result<(), DecodeError> {
        if end > self.bits.len() {
            return Err(DecodeError::Truncated {
                needed: end,
                available: self.bits.len(),
            });
        }
        Ok(())
    }

    fn uint(&self, start: usize, len: usize) -> Result<u64, DecodeError> {
        self.require(start + len)?;
        Ok(self.bits[start..start + len]
            .iter()
            .fold(0u64, |acc, &bit| (acc << 1) | bit as u64))
    }

    /// Two's-complement field.
    fn int(&self, start: usize, len: usize) -> Result<i64, DecodeError> {
        let raw = self.uint(start, len)?;
        let sign = 1u64 << (len - 1);
        Ok(if raw & sign != 0 {
            raw as i64 - (1i64 << len)
        } else {
            raw as i64
        })
    }

    /// 6-bit ASCII text with `@` padding and trailing spaces removed.
    fn text(&self, start: usize, len: usize) -> Result<Option<String>, DecodeError> {
        self.require(start + len)?;
        let mut text = String::with_capacity(len / 6);
        for offset in (start..start + len).step_by(6) {
            let v = self.uint(offset, 6)? as u8;
            text.push(if v < 32 { (v + 64) as char } else { v as char });
        }
        let trimmed = text.trim_end_matches('@').trim_end();
        Ok(if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        })
    }
}

fn unarmor(c: char) -> Result<u8, DecodeError> {
    let code = c as u32;
    let valid = (48..=87).contains(&code) || (96..=119).contains(&code);
    if !valid {
        return Err(DecodeError::Armor(c));
    }
    let mut v = code - 48;
    if v > 40 {
        v -= 8;
    }
    Ok(v as u8)
}

/// Decode an armored payload into a report.
pub fn decode_payload(payload: &str, fill_bits: u8) -> Result<AisReport, DecodeError> {
    let reader = BitReader::new(payload, fill_bits)?;
    let msg_type = reader.uint(0, 6)? as u8;
    let mmsi = reader.uint(8, 30)? as u32;
    let mut report = AisReport::new(msg_type, mmsi);

    match msg_type {
        1..=3 => decode_class_a_position(&reader, &mut report)?,
        5 => decode_static_voyage(&reader, &mut report)?,
        18 => decode_class_b_position(&reader, &mut report)?,
        19 => {
            decode_class_b_position(&reader, &mut report)?;
            report.ship_name = reader.text(143, 120)?;
            report.ship_type = ship_type(reader.uint(263, 8)?);
            report.dimensions = dimensions(&reader, 271)?;
        }
        24 => decode_static_data(&reader, &mut report)?,
        other => return Err(DecodeError::UnsupportedType(other)),
    }

    Ok(report)
}

fn decode_class_a_position(reader: &BitReader, report: &mut AisReport) -> Result<(), DecodeError> {
    report.nav_status = Some(reader.uint(38, 4)? as u8);
    report.turn_rate = turn_rate(reader.int(42, 8)?);
    report.speed = speed(reader.uint(50, 10)?);
    report.lon = longitude(reader.int(61, 28)?);
    report.lat = latitude(reader.int(89, 27)?);
    report.course = course(reader.uint(116, 12)?);
    report.heading = heading(reader.uint(128, 9)?);
    Ok(())
}

fn decode_class_b_position(reader: &BitReader, report: &mut AisReport) -> Result<(), DecodeError> {
    report.speed = speed(reader.uint(46, 10)?);
    report.lon = longitude(reader.int(57, 28)?);
    report.lat = latitude(reader.int(85, 27)?);
    report.course = course(reader.uint(112, 12)?);
    report.heading = heading(reader.uint(124, 9)?);
    Ok(())
}

fn decode_static_voyage(reader: &BitReader, report: &mut AisReport) -> Result<(), DecodeError> {
    report.ais_version = Some(reader.uint(38, 2)? as u8);
    report.imo = match reader.uint(40, 30)? {
        0 => None,
        imo => Some(imo as u32),
    };
    report.callsign = reader.text(70, 42)?;
    report.ship_name = reader.text(112, 120)?;
    report.ship_type = ship_type(reader.uint(232, 8)?);
    report.dimensions = dimensions(reader, 240)?;
    report.destination = reader.text(302, 120)?;
    Ok(())
}

fn decode_static_data(reader: &BitReader, report: &mut AisReport) -> Result<(), DecodeError> {
    match reader.uint(38, 2)? {
        0 => {
            report.ship_name = reader.text(40, 120)?;
        }
        1 => {
            report.ship_type = ship_type(reader.uint(40, 8)?);
            report.callsign = reader.text(90, 42)?;
            report.dimensions = dimensions(reader, 132)?;
        }
        part => {
            return Err(DecodeError::Framing(format!(
                "type 24 part number {} (payload {} bits)",
                part,
                reader.len()
            )))
        }
    }
    Ok(())
}

/// Bow, stern, port, starboard at 9/9/6/6 bits from `start`.
fn dimensions(reader: &BitReader, start: usize) -> Result<Dimensions, DecodeError> {
    Ok(Dimensions::new(
        reader.uint(start, 9)? as f64,
        reader.uint(start + 9, 9)? as f64,
        reader.uint(start + 18, 6)? as f64,
        reader.uint(start + 24, 6)? as f64,
    ))
}

fn ship_type(raw: u64) -> Option<u16> {
    match raw {
        0 => None,
        code => Some(code as u16),
    }
}

fn longitude(raw: i64) -> Option<f64> {
    (raw != LON_NOT_AVAILABLE).then(|| raw as f64 / POSITION_SCALE)
}

fn latitude(raw: i64) -> Option<f64> {
    (raw != LAT_NOT_AVAILABLE).then(|| raw as f64 / POSITION_SCALE)
}

fn speed(raw: u64) -> Option<f64> {
    (raw != SOG_NOT_AVAILABLE).then(|| raw as f64 / 10.0)
}

fn course(raw: u64) -> Option<f64> {
    (raw != COG_NOT_AVAILABLE).then(|| raw as f64 / 10.0)
}

fn heading(raw: u64) -> Option<f64> {
    (raw != HEADING_NOT_AVAILABLE).then_some(raw as f64)
}

fn turn_rate(raw: i64) -> Option<f64> {
    if raw == TURN_NOT_AVAILABLE || raw.abs() > TURN_MAX_INDICATOR {
        return None;
    }
    let rate = (raw as f64 / TURN_FACTOR).powi(2);
    Some(if raw < 0 { -rate } else { rate })
}
