#[cfg(test)]
mod test {
    use crate::coords::llh2xyz;
    use crate::prelude::*;
    use std::str::FromStr;

    const LAT: f64 = 0.6; // radians
    const LON: f64 = 0.3;

    fn receiver() -> Vector3D {
        llh2xyz(LAT, LON, 0.0)
    }

    /// Static zenith satellite, km scaled.
    fn sat_km() -> Vector3D {
        let (x, y, z) = llh2xyz(LAT, LON, 20200.0E3);
        (x / 1.0E3, y / 1.0E3, z / 1.0E3)
    }

    /// 96 orbit epochs at 15', the standard daily product.
    fn day_orbits(t0: Epoch, sv: SV) -> Orbits {
        let records = (0..96)
            .map(|k| (t0 + Duration::from_seconds(900.0 * k as f64), sv, sat_km()))
            .collect();
        Orbits::new(PositionUnit::Kilometers, records).unwrap()
    }

    /// Full 2880 sample station day at 30 s, signal stepped up
    /// over [step_up, step_down).
    fn day_observations(t0: Epoch, sv: SV, step_up: usize, step_down: usize) -> Observations {
        let code = Observable::from_str("S1W").unwrap();
        let records = (0..2880)
            .map(|k| {
                let level = if k >= step_up && k < step_down {
                    52.0
                } else {
                    45.0
                };
                (
                    t0 + Duration::from_seconds(30.0 * k as f64),
                    sv,
                    code.clone(),
                    level,
                )
            })
            .collect();
        Observations::new("MDO100USA", records).unwrap()
    }

    fn config() -> Config {
        Config {
            station_id: "MDO100USA".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn full_day_step_detection() {
        let t0 = Epoch::from_str("2021-06-01T00:00:00 GPST").unwrap();
        let g05 = SV::new(Constellation::GPS, 5);

        let orbits = day_orbits(t0, g05);
        let mut obs = day_observations(t0, g05, 1000, 1100);

        let events = run(
            &config(),
            CapabilityTable::builtin(),
            &orbits,
            &mut obs,
            receiver(),
        )
        .unwrap();

        assert_eq!(events.len(), 2);

        assert_eq!(events[0].event_type, EventType::Start);
        assert_eq!(events[0].sv, g05);
        assert_eq!(
            events[0].epoch,
            t0 + Duration::from_seconds(30.0 * 1000.0)
        );

        assert_eq!(events[1].event_type, EventType::End);
        assert_eq!(
            events[1].epoch,
            t0 + Duration::from_seconds(30.0 * 1100.0)
        );

        // geometry was attached across the whole grid
        let filled = obs
            .epoch()
            .filter(|t| obs.elevation_deg(g05, *t).is_some())
            .count();
        assert_eq!(filled, 2880);
        // zenith satellite: elevation stays near 90° through the interior
        let mid = obs
            .elevation_deg(g05, t0 + Duration::from_seconds(30.0 * 1440.0))
            .unwrap();
        assert!((mid - 90.0).abs() < 1.0E-6);
    }

    #[test]
    fn flat_day_yields_no_events() {
        let t0 = Epoch::from_str("2021-06-01T00:00:00 GPST").unwrap();
        let g05 = SV::new(Constellation::GPS, 5);

        let orbits = day_orbits(t0, g05);
        let mut obs = day_observations(t0, g05, 0, 0); // flat 45 dB-Hz

        let events = run(
            &config(),
            CapabilityTable::builtin(),
            &orbits,
            &mut obs,
            receiver(),
        )
        .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn non_capable_vehicle_day() {
        let t0 = Epoch::from_str("2021-06-01T00:00:00 GPST").unwrap();
        // PRN 13: Block IIR, no flex capability
        let g13 = SV::new(Constellation::GPS, 13);

        let orbits = day_orbits(t0, g13);
        let mut obs = day_observations(t0, g13, 1000, 1100);

        let events = run(
            &config(),
            CapabilityTable::builtin(),
            &orbits,
            &mut obs,
            receiver(),
        )
        .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn elevation_mask_suppresses_detection() {
        let t0 = Epoch::from_str("2021-06-01T00:00:00 GPST").unwrap();
        let g05 = SV::new(Constellation::GPS, 5);

        let orbits = day_orbits(t0, g05);
        let mut obs = day_observations(t0, g05, 1000, 1100);

        // zenith satellite never clears an impossible mask
        let cfg = Config {
            min_elevation: 95.0,
            ..config()
        };
        let events = run(
            &cfg,
            CapabilityTable::builtin(),
            &orbits,
            &mut obs,
            receiver(),
        )
        .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn misaligned_station_day() {
        let t0 = Epoch::from_str("2021-06-01T00:00:00 GPST").unwrap();
        let g05 = SV::new(Constellation::GPS, 5);

        // orbit grid shifted off the observation grid
        let orbits = day_orbits(t0 + Duration::from_seconds(7.0), g05);
        let mut obs = day_observations(t0, g05, 1000, 1100);

        let result = run(
            &config(),
            CapabilityTable::builtin(),
            &orbits,
            &mut obs,
            receiver(),
        );
        assert!(matches!(result, Err(Error::TimeAxisMismatch)));
    }

    #[test]
    fn invalid_station_rejected() {
        let t0 = Epoch::from_str("2021-06-01T00:00:00 GPST").unwrap();
        let g05 = SV::new(Constellation::GPS, 5);

        let orbits = day_orbits(t0, g05);
        let mut obs = day_observations(t0, g05, 0, 0);

        let cfg = Config {
            station_id: "MDO1".to_string(),
            ..Default::default()
        };
        let result = run(
            &cfg,
            CapabilityTable::builtin(),
            &orbits,
            &mut obs,
            receiver(),
        );
        assert!(matches!(result, Err(Error::InvalidStationId(_))));
    }
}
