//! Flex power transition event detection.
use hifitime::Epoch;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use gnss_rs::prelude::SV;

use crate::meta::{flex_sats, CapabilityTable};
use crate::observable::Observable;
use crate::observation::Observations;
use crate::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of samples a raw detection must trail the previously kept one
/// by, before it counts as a new event rather than the same burst.
const BURST_WINDOW: usize = 10;

/// Lookback depth of the step comparison: filters single sample noise
/// while remaining responsive to genuine transitions.
const LOOKBACK: usize = 4;

/// Transmit power transition kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventType {
    /// Transmit power stepped up
    Start,
    /// Transmit power stepped down
    End,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Start => f.write_str("Start"),
            Self::End => f.write_str("End"),
        }
    }
}

/// One detected flex power transition. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlexEvent {
    /// Station that observed the transition
    pub station: String,
    /// Transition instant
    pub epoch: Epoch,
    /// Transition kind
    pub event_type: EventType,
    /// Triggering GPS vehicle
    pub sv: SV,
}

/// Collapses bursts of raw detection indices: sorted, the first index is
/// always kept, then an index is kept only when it trails the previously
/// kept one by more than [BURST_WINDOW] samples. Nearby samples of one
/// true step all exceed the threshold, only the first represents the event.
pub fn collapse_bursts(indices: &[usize]) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();

    let mut kept = Vec::<usize>::new();
    for index in sorted {
        match kept.last() {
            Some(&last) => {
                if index > last + BURST_WINDOW {
                    kept.push(index);
                }
            },
            None => kept.push(index),
        }
    }
    kept
}

/// Scans the signal strength series of every flex capable vehicle in view
/// for relative step transitions.
///
/// A sample triggers a Start when it exceeds the sample [LOOKBACK] steps
/// earlier by more than `frac` and clears `start_floor`; an End when it
/// falls short by more than `frac` and still clears `end_floor`. Raw index
/// lists have set semantics per kind, shared across vehicles. Returns the
/// burst collapsed start and end indices and the event table, sorted by
/// time, one row per kept index per kind.
///
/// Both an empty capable set and empty event lists are valid outcomes.
pub fn find_flex_events(
    table: &CapabilityTable,
    station: &str,
    obs: &Observations,
    code: &Observable,
    start_floor: f64,
    end_floor: f64,
    frac: f64,
) -> (Vec<usize>, Vec<usize>, Vec<FlexEvent>) {
    let gps_flex = flex_sats(table, obs);

    #[cfg(feature = "log")]
    debug!("{}: {} flex capable vehicles in view", station, gps_flex.len());

    // first triggering vehicle per raw index, per kind
    let mut start_hits = BTreeMap::<usize, SV>::new();
    let mut end_hits = BTreeMap::<usize, SV>::new();

    for sv in gps_flex {
        let values = obs.signal(sv, code);

        for i in LOOKBACK..values.len() {
            let (v, prev) = match (values[i], values[i - LOOKBACK]) {
                (Some(v), Some(prev)) => (v, prev),
                _ => continue, // masked or not observed
            };

            if v > prev * (1.0 + frac) && v > start_floor {
                start_hits.entry(i).or_insert(sv);
            } else if v < prev * (1.0 - frac) && v > end_floor {
                end_hits.entry(i).or_insert(sv);
            }
        }
    }

    let start_raw: Vec<usize> = start_hits.keys().copied().collect();
    let end_raw: Vec<usize> = end_hits.keys().copied().collect();

    let starts = collapse_bursts(&start_raw);
    let ends = collapse_bursts(&end_raw);

    let mut events = Vec::<FlexEvent>::new();
    for (kept, hits, event_type) in [
        (&starts, &start_hits, EventType::Start),
        (&ends, &end_hits, EventType::End),
    ] {
        for index in kept.iter() {
            events.push(FlexEvent {
                station: station.to_string(),
                epoch: obs.epoch[*index],
                event_type,
                sv: hits[index],
            });
        }
    }

    events.sort_by(|a, b| {
        (a.epoch, a.sv, a.event_type).cmp(&(b.epoch, b.sv, b.event_type))
    });
    events.dedup_by(|a, b| a.epoch == b.epoch && a.sv == b.sv && a.event_type == b.event_type);

    (starts, ends, events)
}

/// Writes the event table as delimited text, one row per event,
/// `Time` serialized through hifitime (ISO-8601 with timescale).
pub fn csv_export(path: &Path, events: &[FlexEvent]) -> Result<(), Error> {
    let mut fd = File::create(path)?;
    writeln!(fd, "Station, Time, Event Type, GPS Satellite")?;
    for event in events {
        writeln!(
            fd,
            "{}, {}, {}, {}",
            event.station, event.epoch, event.event_type, event.sv
        )?;
    }
    Ok(())
}
