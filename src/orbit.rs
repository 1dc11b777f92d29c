//! Coarse cadence satellite position series (ECEF).
use hifitime::{Duration, Epoch};
use std::collections::{BTreeMap, HashMap};

use gnss_rs::prelude::SV;

use crate::coords::{all_angles, Angles};
use crate::{Error, Vector3D};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unit of the `(x, y, z)` coordinates carried by an [Orbits] stream.
/// Declared once per stream, never auto detected.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PositionUnit {
    /// ECEF meters
    Meters,
    /// ECEF kilometers (SP3 convention)
    #[default]
    Kilometers,
}

/// Position entry indexer
#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitKey {
    /// Spacecraft described as [SV]
    pub sv: SV,
    /// Epoch
    pub epoch: Epoch,
}

/// Satellite position series at coarse cadence (typically 15 minutes).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Orbits {
    /// Coordinate unit declared for this stream
    pub unit: PositionUnit,
    /// [`Epoch`]s where at least one position is provided
    pub epoch: Vec<Epoch>,
    /// Sampling interval, ie., time between successive [`Epoch`]s
    pub epoch_interval: Duration,
    /// Satellite vehicles
    pub sv: Vec<SV>,
    /// Position vectors, sorted per [OrbitKey]
    pub data: BTreeMap<OrbitKey, Vector3D>,
}

impl Orbits {
    /// Builds an orbit series from `(epoch, sv, position)` records in the
    /// declared unit. Epochs must be strictly increasing per satellite.
    pub fn new(unit: PositionUnit, records: Vec<(Epoch, SV, Vector3D)>) -> Result<Self, Error> {
        if records.is_empty() {
            return Err(Error::EmptySeries);
        }

        let mut epochs = Vec::<Epoch>::new();
        let mut vehicles = Vec::<SV>::new();
        let mut data = BTreeMap::<OrbitKey, Vector3D>::new();
        let mut last_seen = HashMap::<SV, Epoch>::new();

        for (epoch, sv, position) in records {
            if let Some(prev) = last_seen.get(&sv) {
                if epoch <= *prev {
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
            data.insert(OrbitKey { sv, epoch }, position);
        }

        epochs.sort();
        let epoch_interval = if epochs.len() > 1 {
            epochs[1] - epochs[0]
        } else {
            Duration::default()
        };

        Ok(Self {
            unit,
            epoch: epochs,
            epoch_interval,
            sv: vehicles,
            data,
        })
    }
    /// Returns a unique Epoch iterator
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
    /// Returns an Iterator over SV position vectors in the declared unit.
    pub fn sv_position(&self) -> impl Iterator<Item = (Epoch, SV, Vector3D)> + '_ {
        self.data.iter().map(|(k, v)| (k.epoch, k.sv, *v))
    }
    /// Returns the position of one satellite at one epoch, in kilometers.
    pub fn position_km(&self, sv: SV, epoch: Epoch) -> Option<Vector3D> {
        let (x, y, z) = *self.data.get(&OrbitKey { sv, epoch })?;
        match self.unit {
            PositionUnit::Kilometers => Some((x, y, z)),
            PositionUnit::Meters => Some((x / 1.0E3, y / 1.0E3, z / 1.0E3)),
        }
    }
    /// Returns the position of one satellite at one epoch, in meters.
    pub fn position_m(&self, sv: SV, epoch: Epoch) -> Option<Vector3D> {
        let (x, y, z) = *self.data.get(&OrbitKey { sv, epoch })?;
        match self.unit {
            PositionUnit::Meters => Some((x, y, z)),
            PositionUnit::Kilometers => Some((x * 1.0E3, y * 1.0E3, z * 1.0E3)),
        }
    }
    /// Returns the coarse epochs and positions (km) of one satellite,
    /// in chronological order.
    pub fn sv_track(&self, sv: SV) -> Vec<(Epoch, Vector3D)> {
        self.epoch
            .iter()
            .filter_map(|epoch| Some((*epoch, self.position_km(sv, *epoch)?)))
            .collect()
    }
    /// Returns an Iterator over the full [Angles] set of every position
    /// sample, for a receiver `rec_pos_m` given in ECEF meters. Degenerate
    /// geometry yields NaN angles, never an error.
    pub fn sv_angles(&self, rec_pos_m: Vector3D) -> impl Iterator<Item = (Epoch, SV, Angles)> + '_ {
        self.data.keys().filter_map(move |key| {
            let sat_km = self.position_km(key.sv, key.epoch)?;
            Some((key.epoch, key.sv, all_angles(rec_pos_m, sat_km)))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coords::llh2xyz;
    use gnss_rs::prelude::Constellation;
    use std::str::FromStr;

    #[test]
    fn unit_conversion() {
        let t0 = Epoch::from_str("2021-06-01T00:00:00 GPST").unwrap();
        let g05 = SV::new(Constellation::GPS, 5);
        let km = Orbits::new(
            PositionUnit::Kilometers,
            vec![(t0, g05, (10000.0, -20000.0, 15000.0))],
        )
        .unwrap();
        assert_eq!(km.position_km(g05, t0), Some((10000.0, -20000.0, 15000.0)));
        assert_eq!(
            km.position_m(g05, t0),
            Some((10000.0E3, -20000.0E3, 15000.0E3))
        );

        let m = Orbits::new(
            PositionUnit::Meters,
            vec![(t0, g05, (10000.0E3, -20000.0E3, 15000.0E3))],
        )
        .unwrap();
        assert_eq!(m.position_km(g05, t0), Some((10000.0, -20000.0, 15000.0)));
    }

    #[test]
    fn non_monotonic() {
        let t0 = Epoch::from_str("2021-06-01T00:00:00 GPST").unwrap();
        let g05 = SV::new(Constellation::GPS, 5);
        let result = Orbits::new(
            PositionUnit::Kilometers,
            vec![
                (t0, g05, (1.0, 1.0, 1.0)),
                (t0, g05, (2.0, 2.0, 2.0)),
            ],
        );
        assert!(matches!(result, Err(Error::NonMonotonicEpochs(_))));
    }

    #[test]
    fn angles_zenith_satellite() {
        let t0 = Epoch::from_str("2021-06-01T00:00:00 GPST").unwrap();
        let g05 = SV::new(Constellation::GPS, 5);

        let lat = 0.6_f64;
        let lon = -1.8_f64;
        let rec_m = llh2xyz(lat, lon, 1000.0);
        let sat_m = llh2xyz(lat, lon, 20200.0E3);

        let orbits = Orbits::new(
            PositionUnit::Kilometers,
            vec![(t0, g05, (sat_m.0 / 1.0E3, sat_m.1 / 1.0E3, sat_m.2 / 1.0E3))],
        )
        .unwrap();

        let angles: Vec<_> = orbits.sv_angles(rec_m).collect();
        assert_eq!(angles.len(), 1);
        let (epoch, sv, set) = angles[0];
        assert_eq!(epoch, t0);
        assert_eq!(sv, g05);
        assert!((set.elevation_deg - 90.0).abs() < 1.0E-6);
        // normal vs geocentric radial tilt keeps nadir slightly off zero
        assert!((set.nadir_deg).abs() < 0.05);
    }
}
