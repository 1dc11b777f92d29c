//! Fine cadence elevation angle filling.
//!
//! Orbit products come at coarse cadence (typically 15 minutes) while
//! signal observations come at fine cadence (typically 30 seconds).
//! This pass walks the fine grid per satellite and attaches an elevation
//! angle to every observation sample: linear interpolation between two
//! bracketing orbit epochs in the interior, rate extrapolation over the
//! trailing interval of the day where no bracketing epoch exists.
use gnss_rs::prelude::SV;

use crate::coords::el_ang;
use crate::observation::Observations;
use crate::orbit::Orbits;
use crate::{Error, Vector3D};

/// Fallback slope [°/sample] when no prior rate is available.
pub const DEFAULT_EDGE_SLOPE: f64 = 0.1;

/// Per sample angular rate over the last two filled samples,
/// [DEFAULT_EDGE_SLOPE] when no history exists.
pub fn edge_slope(filled: &[f64]) -> f64 {
    if filled.len() >= 2 {
        filled[filled.len() - 1] - filled[filled.len() - 2]
    } else {
        DEFAULT_EDGE_SLOPE
    }
}

/// Pulls an extrapolated elevation back into valid range: anything past
/// ±90° becomes ±89°.
pub fn clamp_extrapolated(deg: f64) -> f64 {
    if deg > 90.0 {
        89.0
    } else if deg < -90.0 {
        -89.0
    } else {
        deg
    }
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        },
    }
}

fn elevation_deg(rec_pos_m: Vector3D, sat_km: Vector3D) -> f64 {
    el_ang(
        rec_pos_m,
        (sat_km.0 * 1.0E3, sat_km.1 * 1.0E3, sat_km.2 * 1.0E3),
    )
    .to_degrees()
}

/// Attaches an elevation angle to every observation sample of every GPS
/// vehicle, for a receiver at `rec_pos_m` (ECEF meters).
/// Coarse intervals are filled with 31 point linear ramps, the last point
/// dropped so interval boundaries are never duplicated; the trailing
/// interval is extrapolated and clamped. Errors when the orbit grid never
/// intersects the observation grid.
pub fn fill_elevation_angles(
    obs: &mut Observations,
    orbits: &Orbits,
    rec_pos_m: Vector3D,
) -> Result<(), Error> {
    let fine_grid = obs.epoch.clone();
    let vehicles: Vec<SV> = obs.gps_sv().collect();

    let mut attached = 0_usize;

    for sv in vehicles {
        let track = orbits.sv_track(sv);
        if track.is_empty() {
            #[cfg(feature = "log")]
            debug!("{}: no orbit data", sv);
            continue;
        }

        let n_orb = track.len();
        let mut filled = Vec::<f64>::with_capacity(fine_grid.len());
        let mut orb_count = 0_usize;

        for t in fine_grid.iter() {
            if filled.len() >= fine_grid.len() || orb_count >= n_orb {
                break;
            }
            if *t != track[orb_count].0 {
                continue;
            }

            let i0 = elevation_deg(rec_pos_m, track[orb_count].1);

            if orb_count == n_orb - 1 {
                // no trailing orbit epoch: extrapolate with the recent rate
                let i1 = clamp_extrapolated(i0 + 30.0 * edge_slope(&filled));
                filled.extend(linspace(i0, i1, 30));
            } else {
                let i1 = elevation_deg(rec_pos_m, track[orb_count + 1].1);
                let ramp = linspace(i0, i1, 31);
                filled.extend_from_slice(&ramp[..30]);
            }
            orb_count += 1;
        }

        filled.truncate(fine_grid.len());

        #[cfg(feature = "log")]
        debug!("{}: {} elevation points", sv, filled.len());

        for (t, el) in fine_grid.iter().zip(filled.iter()) {
            obs.set_elevation(sv, *t, *el);
        }
        attached += filled.len();
    }

    if attached == 0 {
        #[cfg(feature = "log")]
        error!("orbit and observation grids never intersect");
        return Err(Error::TimeAxisMismatch);
    }
    Ok(())
}
