//! Fine cadence signal strength observation series.
use hifitime::{Duration, Epoch};
use std::collections::{BTreeMap, HashMap};

use gnss_rs::prelude::{Constellation, SV};

use crate::observable::Observable;
use crate::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [ObsEntry] indexer
#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObsKey {
    /// Spacecraft described as [SV]
    pub sv: SV,
    /// Epoch
    pub epoch: Epoch,
}

/// One observation sample: signal strength per [Observable], in dB-Hz.
/// A satellite that is not observed at a given epoch simply has no entry,
/// never a zero value.
pub type ObsEntry = HashMap<Observable, f64>;

/// Station day observation series on a regular fine time grid
/// (typically 30 s). Geometry is attached through the `elevation`
/// column-append contract and starts out empty.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observations {
    /// 9 character RINEX3 station identifier
    pub station: String,
    /// Regular fine time grid
    pub epoch: Vec<Epoch>,
    /// Time between successive grid points
    pub epoch_interval: Duration,
    /// Satellite vehicles observed at least once
    pub sv: Vec<SV>,
    /// Signal content, sorted per [ObsKey]
    pub data: BTreeMap<ObsKey, ObsEntry>,
    /// Elevation angle column [°], appended by the angle filling pass
    pub elevation: BTreeMap<ObsKey, f64>,
}

impl Observations {
    /// Builds a series from `(epoch, sv, observable, value)` records.
    /// The station identifier must be the 9 character RINEX3 form.
    /// Epochs must be fed in ascending order per satellite.
    pub fn new(
        station: &str,
        records: Vec<(Epoch, SV, Observable, f64)>,
    ) -> Result<Self, Error> {
        if station.len() != 9 {
            return Err(Error::InvalidStationId(station.to_string()));
        }
        if records.is_empty() {
            return Err(Error::EmptySeries);
        }

        let mut epochs = Vec::<Epoch>::new();
        let mut vehicles = Vec::<SV>::new();
        let mut data = BTreeMap::<ObsKey, ObsEntry>::new();
        let mut last_seen = HashMap::<SV, Epoch>::new();

        for (epoch, sv, observable, value) in records {
            if let Some(prev) = last_seen.get(&sv) {
                if epoch < *prev {
                    return Err(Error::NonMonotonicEpochs(sv));
                }
            }
            last_seen.insert(sv, epoch);

            if !epochs.contains(&epoch) {
                epochs.push(epoch);
            }
            if !vehicles.contains(&sv) {
                vehicles.push(sv);
            }
            data.entry(ObsKey { sv, epoch })
                .or_default()
                .insert(observable, value);
        }

        epochs.sort();
        let epoch_interval = if epochs.len() > 1 {
            epochs[1] - epochs[0]
        } else {
            Duration::default()
        };

        Ok(Self {
            station: station.to_string(),
            epoch: epochs,
            epoch_interval,
            sv: vehicles,
            data,
            elevation: BTreeMap::new(),
        })
    }
    /// Returns the fine time grid iterator.
    pub fn epoch(&self) -> impl Iterator<Item = Epoch> + '_ {
        self.epoch.iter().copied()
    }
    /// Returns first epoch
    pub fn first_epoch(&self) -> Option<Epoch> {
        self.epoch.first().copied()
    }
    /// Returns last epoch
    pub fn last_epoch(&self) -> Option<Epoch> {
        self.epoch.last().copied()
    }
    /// Returns a unique [SV] iterator
    pub fn sv(&self) -> impl Iterator<Item = SV> + '_ {
        self.sv.iter().copied()
    }
    /// Returns the GPS vehicles in view
    pub fn gps_sv(&self) -> impl Iterator<Item = SV> + '_ {
        self.sv().filter(|sv| sv.constellation == Constellation::GPS)
    }
    /// Returns the signal strength series for one satellite and observable,
    /// aligned to the fine time grid. Missing samples are None.
    pub fn signal(&self, sv: SV, observable: &Observable) -> Vec<Option<f64>> {
        self.epoch
            .iter()
            .map(|epoch| {
                self.data
                    .get(&ObsKey { sv, epoch: *epoch })
                    .and_then(|entry| entry.get(observable))
                    .copied()
            })
            .collect()
    }
    /// Returns the elevation angle attached to `(sv, epoch)`, if any.
    pub fn elevation_deg(&self, sv: SV, epoch: Epoch) -> Option<f64> {
        self.elevation.get(&ObsKey { sv, epoch }).copied()
    }
    /// Attaches one elevation angle. This is the only mutation other
    /// components perform on an observation series.
    pub fn set_elevation(&mut self, sv: SV, epoch: Epoch, deg: f64) {
        self.elevation.insert(ObsKey { sv, epoch }, deg);
    }
    /// Copies and returns [Self] with all samples whose elevation is
    /// undefined or does not exceed `min_el_deg` removed. Removed samples
    /// become undefined and can never trigger a threshold.
    pub fn mask_elevation(&self, min_el_deg: f64) -> Self {
        let mut masked = self.clone();
        masked.data.retain(|key, _| {
            self.elevation
                .get(key)
                .map_or(false, |el| *el > min_el_deg)
        });
        masked
    }
}
