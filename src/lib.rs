//! GPS flex power event detection.
//!
//! Certain GPS hardware generations (Block IIR-M onwards) can dynamically
//! redistribute transmit power between signals. This crate takes a ground
//! station's observation series and a satellite orbit series over one
//! processing window, computes the receiver to satellite geometry, and
//! scans the signal strength of every flex capable vehicle in view for
//! transmit power transitions.
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

#[macro_use]
extern crate lazy_static;

#[cfg(feature = "log")]
#[macro_use]
extern crate log;

use thiserror::Error;

use gnss::prelude::SV;

pub mod angles;
pub mod cfg;
pub mod coords;
pub mod event;
pub mod meta;
pub mod observable;
pub mod observation;
pub mod orbit;

#[cfg(test)]
mod tests;

/// 3D position
pub type Vector3D = (f64, f64, f64);

pub mod prelude {
    pub use crate::cfg::Config;
    pub use crate::coords::Angles;
    pub use crate::event::{csv_export, find_flex_events, EventType, FlexEvent};
    pub use crate::meta::{flex_sats, Block, CapabilityTable, SatCapability};
    pub use crate::observable::Observable;
    pub use crate::observation::{ObsKey, Observations};
    pub use crate::orbit::{OrbitKey, Orbits, PositionUnit};
    pub use crate::{run, Error, Vector3D};
    // Pub re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
}

/// Structural errors. Per sample numerical edge cases (missing vehicles,
/// below mask samples, degenerate geometry, non converged height
/// iterations) never surface here: they are absorbed as undefined values.
#[derive(Debug, Error)]
pub enum Error {
    #[error("observation and orbit time axes cannot be aligned")]
    TimeAxisMismatch,
    #[error("epochs are not strictly increasing for {0}")]
    NonMonotonicEpochs(SV),
    #[error("invalid station identifier \"{0}\"")]
    InvalidStationId(String),
    #[error("empty input series")]
    EmptySeries,
    #[error("file i/o error")]
    IoError(#[from] std::io::Error),
}

use crate::cfg::Config;
use crate::event::FlexEvent;
use crate::meta::CapabilityTable;
use crate::observation::Observations;
use crate::orbit::Orbits;

/// Runs the whole detection pipeline over one processing window:
/// fills fine cadence elevation angles, applies the elevation mask and
/// scans for transitions. The returned table is sorted by time; empty
/// output is a valid outcome, not an error.
///
/// Per satellite scans are independent of each other and run
/// sequentially; all inputs are fully materialized before any
/// computation starts.
pub fn run(
    cfg: &Config,
    table: &CapabilityTable,
    orbits: &Orbits,
    observations: &mut Observations,
    rec_pos_m: Vector3D,
) -> Result<Vec<FlexEvent>, Error> {
    cfg.validate()?;

    angles::fill_elevation_angles(observations, orbits, rec_pos_m)?;

    let masked = observations.mask_elevation(cfg.min_elevation);

    let (_, _, events) = event::find_flex_events(
        table,
        &cfg.station_id,
        &masked,
        &cfg.observation_code,
        cfg.start_floor,
        cfg.end_floor,
        cfg.frac,
    );

    Ok(events)
}
