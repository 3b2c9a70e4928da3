//! Per-vessel accumulation of decoded AIS messages.
//!
//! Position and static data arrive in different message types. The tracker
//! folds each report into the vessel's track so a position report never
//! erases the name or dimensions learned from an earlier static report.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::ais::AisReport;
use crate::ship::{ShipRecord, ShipType};

/// Live tracks keyed by MMSI, with time-to-live expiry.
#[derive(Debug)]
pub struct Tracker {
    tracks: HashMap<u32, ShipRecord>,
    ttl: chrono::Duration,
}

impl Tracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tracks: HashMap::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Merge a decoded report observed at `now`.
    pub fn update(&mut self, report: &AisReport, now: DateTime<Utc>) {
        let track = self
            .tracks
            .entry(report.mmsi)
            .or_insert_with(|| ShipRecord::new(report.mmsi, now));
        merge(track, report);
        track.last_updated = now;
    }

    /// Drop tracks last updated more than the TTL before `now`.
    ///
    /// Returns the number of tracks removed.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.tracks.len();
        let ttl = self.ttl;
        self.tracks.retain(|_, track| now - track.last_updated <= ttl);
        before - self.tracks.len()
    }

    /// Copy of all current tracks.
    pub fn tracks(&self) -> Vec<ShipRecord> {
        self.tracks.values().cloned().collect()
    }

    pub fn get(&self, mmsi: u32) -> Option<&ShipRecord> {
        self.tracks.get(&mmsi)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Position reports restate every kinematic field; static reports only
/// overwrite what they carry.
fn merge(track: &mut ShipRecord, report: &AisReport) {
    track.ais_type = Some(report.msg_type);

    match report.msg_type {
        1..=3 | 18 | 19 => {
            track.lon = report.lon;
            track.lat = report.lat;
            track.heading = report.heading;
            track.course = report.course;
            track.speed = report.speed;
            if report.msg_type <= 3 {
                track.turn_rate = report.turn_rate;
                track.nav_status = report.nav_status;
            }
        }
        _ => {}
    }

    if let Some(code) = report.ship_type {
        track.ship_type = Some(ShipType::Code(code));
    }
    if !report.dimensions.is_empty() {
        track.dimensions = report.dimensions;
    }
    overwrite(&mut track.ship_name, &report.ship_name);
    overwrite(&mut track.callsign, &report.callsign);
    overwrite(&mut track.destination, &report.destination);
    if report.imo.is_some() {
        track.imo = report.imo;
    }
    if report.ais_version.is_some() {
        track.ais_version = report.ais_version;
    }
}

fn overwrite(field: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *field = Some(value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::Dimensions;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    fn position(mmsi: u32, lon: f64, lat: f64) -> AisReport {
        AisReport {
            lon: Some(lon),
            lat: Some(lat),
            heading: Some(45.0),
            ..AisReport::new(1, mmsi)
        }
    }

    fn static_report(mmsi: u32) -> AisReport {
        AisReport {
            ship_name: Some("POLARFJORD".to_string()),
            ship_type: Some(70),
            dimensions: Dimensions::new(100.0, 50.0, 10.0, 12.0),
            ..AisReport::new(5, mmsi)
        }
    }

    #[test]
    fn test_latest_position_wins() {
        let mut tracker = Tracker::new(Duration::from_secs(3600));
        tracker.update(&position(123456789, 10.0, 60.0), at(0));
        tracker.update(&position(123456789, 10.1, 60.1), at(5));

        assert_eq!(tracker.len(), 1);
        let track = tracker.get(123456789).unwrap();
        assert_eq!(track.position(), Some((10.1, 60.1)));
        assert_eq!(track.last_updated, at(5));
    }

    #[test]
    fn test_static_and_position_data_combine() {
        let mut tracker = Tracker::new(Duration::from_secs(3600));
        tracker.update(&static_report(42), at(0));
        tracker.update(&position(42, 5.0, 60.0), at(1));

        let track = tracker.get(42).unwrap();
        assert_eq!(track.ship_name.as_deref(), Some("POLARFJORD"));
        assert_eq!(track.ship_type, Some(ShipType::Code(70)));
        assert_eq!(track.dimensions, Dimensions::new(100.0, 50.0, 10.0, 12.0));
        assert_eq!(track.position(), Some((5.0, 60.0)));
        assert_eq!(track.ais_type, Some(1));

        // A later static report keeps the position
        tracker.update(&static_report(42), at(2));
        assert_eq!(tracker.get(42).unwrap().position(), Some((5.0, 60.0)));
    }

    #[test]
    fn test_unavailable_heading_clears_previous_heading() {
        let mut tracker = Tracker::new(Duration::from_secs(3600));
        tracker.update(&position(7, 5.0, 60.0), at(0));

        let mut report = position(7, 5.0, 60.0);
        report.heading = None;
        tracker.update(&report, at(1));
        assert_eq!(tracker.get(7).unwrap().heading, None);
    }

    #[test]
    fn test_evict_expired() {
        let mut tracker = Tracker::new(Duration::from_secs(60));
        tracker.update(&position(1, 5.0, 60.0), at(0));
        tracker.update(&position(2, 5.0, 60.0), at(30));

        assert_eq!(tracker.evict_expired(at(60)), 0);
        assert_eq!(tracker.evict_expired(at(61)), 1);
        assert!(tracker.get(1).is_none());
        assert!(tracker.get(2).is_some());
        assert_eq!(tracker.evict_expired(at(1000)), 1);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_update_refreshes_ttl() {
        let mut tracker = Tracker::new(Duration::from_secs(60));
        tracker.update(&position(1, 5.0, 60.0), at(0));
        tracker.update(&static_report(1), at(50));
        assert_eq!(tracker.evict_expired(at(100)), 0);
    }
}
