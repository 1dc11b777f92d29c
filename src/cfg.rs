//! Processing configuration.
use crate::observable::Observable;
use crate::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One detection run configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Observation code to scan, e.g. "S1W" or "S2W"
    pub observation_code: Observable,
    /// Minimum level [dB-Hz] at which to search for event starts
    pub start_floor: f64,
    /// Minimum level [dB-Hz] at which to search for event ends
    pub end_floor: f64,
    /// Fractional increase/decrease identifying a Start/End
    pub frac: f64,
    /// Minimum elevation angle [°], samples at or below are ignored
    pub min_elevation: f64,
    /// 9 character RINEX3 station identifier
    pub station_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            observation_code: Observable::default(),
            start_floor: 30.0,
            end_floor: 30.0,
            frac: 0.05,
            min_elevation: 10.0,
            station_id: String::new(),
        }
    }
}

impl Config {
    /// Structural validation: only shape errors surface,
    /// threshold tuning is the operator's call.
    pub fn validate(&self) -> Result<(), Error> {
        if self.station_id.len() != 9 {
            return Err(Error::InvalidStationId(self.station_id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.observation_code.to_string(), "S1W");
        assert_eq!(cfg.frac, 0.05);
        assert_eq!(cfg.start_floor, 30.0);
        assert!(cfg.validate().is_err()); // station still unset
    }

    #[test]
    fn station_validation() {
        let cfg = Config {
            station_id: "MDO100USA".to_string(),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_roundtrip() {
        let cfg = Config {
            station_id: "ALIC00AUS".to_string(),
            ..Default::default()
        };
        let content = serde_json::to_string(&cfg).unwrap();
        let parsed: Config = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, cfg);
    }
}
