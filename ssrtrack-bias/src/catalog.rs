//! Event catalog handling: observation-mode attribution for bias packets.
//!
//! The catalog lists observations and ACIS bias packets in time order. A
//! bias packet is taken in preparation for the observation that follows it,
//! so its label is the mode of the next observation in the catalog.
#![allow(clippy::missing_errors_doc)]

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use ssrtrack_core::MissionTime;

use crate::error::{Error, Result};
use crate::interval::Interval;
use crate::policy::ConcernPolicy;

/// Label given to bias packets with no following observation.
pub const UNATTRIBUTED_LABEL: &str = "UNK";

/// Catalog event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// A science observation; its label is the instrument mode.
    Observation,
    /// An ACIS bias packet.
    BiasPacket,
    /// Anything else the catalog returns.
    Other(String),
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Observation" => Self::Observation,
            "ACIS BIAS Packet" => Self::BiasPacket,
            _ => Self::Other(value),
        }
    }
}

impl From<EventKind> for String {
    fn from(value: EventKind) -> Self {
        value.to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Observation => f.write_str("Observation"),
            Self::BiasPacket => f.write_str("ACIS BIAS Packet"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEvent {
    /// Event start.
    pub start: MissionTime,
    /// Event stop.
    pub stop: MissionTime,
    /// Event type.
    pub kind: EventKind,
    /// Observation mode (observations only).
    #[serde(default)]
    pub label: String,
    /// Catalog duration text, `DDD:HH:MM:SS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Parses a catalog duration `DDD:HH:MM:SS[.s]` into seconds.
pub fn parse_catalog_duration(text: &str) -> Result<f64> {
    let invalid = || Error::InvalidDuration(text.to_string());
    let fields: Vec<f64> = text
        .trim()
        .split(':')
        .map(|field| field.trim().parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<_>>()?;
    let &[days, hours, minutes, seconds] = fields.as_slice() else {
        return Err(invalid());
    };
    if fields.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(invalid());
    }
    Ok(days * 86_400.0 + hours * 3_600.0 + minutes * 60.0 + seconds)
}

/// Reads a JSON array of catalog events.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEvent>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Parses a JSON array of catalog events.
pub fn catalog_from_json(json: &str) -> Result<Vec<CatalogEvent>> {
    Ok(serde_json::from_str(json)?)
}

/// Turns the bias packets of a catalog into classified intervals.
///
/// Events are put in start order, then walked backwards so each bias packet
/// picks up the label of the next observation after it. Bias packets after
/// the last observation are labelled [`UNATTRIBUTED_LABEL`].
pub fn attribute_bias_intervals(
    events: &[CatalogEvent],
    policy: &ConcernPolicy,
) -> Result<Vec<Interval>> {
    let mut ordered: Vec<&CatalogEvent> = events.iter().collect();
    ordered.sort_by_key(|event| event.start);

    let mut current_label = UNATTRIBUTED_LABEL;
    let mut intervals = Vec::new();
    for event in ordered.into_iter().rev() {
        match &event.kind {
            EventKind::Observation => current_label = event.label.as_str(),
            EventKind::BiasPacket => {
                let interval = match &event.duration {
                    Some(text) => Interval::with_duration(
                        event.start,
                        event.stop,
                        current_label,
                        parse_catalog_duration(text)?,
                        policy,
                    ),
                    None => Interval::new(event.start, event.stop, current_label, policy),
                };
                intervals.push(interval);
            }
            EventKind::Other(_) => {}
        }
    }
    intervals.reverse();
    log::debug!(
        "attributed {} bias interval(s) from {} catalog event(s)",
        intervals.len(),
        events.len()
    );
    Ok(intervals)
}
