//! GPS satellite metadata: hardware blocks and historical SVN/PRN assignments.
use hifitime::Epoch;
use itertools::Itertools;
use thiserror::Error;

use gnss_rs::prelude::{Constellation, SV};

use crate::observation::Observations;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("unknown block type \"{0}\"")]
    UnknownBlock(String),
}

/// GPS hardware generation. Flex power transmission only exists
/// from Block IIR-M onwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Block {
    I,
    II,
    IIA,
    IIR,
    IIRM,
    IIF,
    IIIA,
}

impl Block {
    /// True for hardware generations capable of flex power transmission.
    pub fn is_flex_capable(&self) -> bool {
        matches!(self, Self::IIRM | Self::IIF | Self::IIIA)
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::I => f.write_str("GPS-I"),
            Self::II => f.write_str("GPS-II"),
            Self::IIA => f.write_str("GPS-IIA"),
            Self::IIR => f.write_str("GPS-IIR"),
            Self::IIRM => f.write_str("GPS-IIR-M"),
            Self::IIF => f.write_str("GPS-IIF"),
            Self::IIIA => f.write_str("GPS-IIIA"),
        }
    }
}

impl std::str::FromStr for Block {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "GPS-I" => Ok(Self::I),
            "GPS-II" => Ok(Self::II),
            "GPS-IIA" => Ok(Self::IIA),
            "GPS-IIR" => Ok(Self::IIR),
            "GPS-IIR-M" => Ok(Self::IIRM),
            "GPS-IIF" => Ok(Self::IIF),
            "GPS-IIIA" => Ok(Self::IIIA),
            _ => Err(ParsingError::UnknownBlock(s.to_string())),
        }
    }
}

/// One historical PRN assignment of a space vehicle.
/// A vehicle may occupy several PRN slots over its life,
/// each described by one record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatCapability {
    /// Space Vehicle Number: permanent hardware identifier
    pub svn: u16,
    /// Hardware generation
    pub block: Block,
    /// PRN slot occupied during the validity interval
    pub prn: u8,
    /// Start of the PRN assignment
    pub valid_from: Epoch,
    /// End of the PRN assignment, open ended when None
    pub valid_to: Option<Epoch>,
}

impl SatCapability {
    /// True when this PRN assignment overlaps [start, end].
    pub fn overlaps(&self, start: Epoch, end: Epoch) -> bool {
        self.valid_from <= end && self.valid_to.map_or(true, |t| t >= start)
    }
}

/// Historical SVN/PRN assignment table, loaded once and immutable for a run.
/// Always passed explicitly so synthetic tables can be injected in tests;
/// [CapabilityTable::builtin] ships the known GPS history.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CapabilityTable {
    records: Vec<SatCapability>,
}

fn flight(svn: u16, block: Block, prn: u8, from: (i32, u8, u8), to: Option<(i32, u8, u8)>) -> SatCapability {
    SatCapability {
        svn,
        block,
        prn,
        valid_from: Epoch::from_gregorian_utc_at_midnight(from.0, from.1, from.2),
        valid_to: to.map(|(y, m, d)| Epoch::from_gregorian_utc_at_midnight(y, m, d)),
    }
}

lazy_static! {
    /// Known GPS SVN/PRN assignment history, IIR generation onwards.
    static ref BUILTIN: CapabilityTable = CapabilityTable::new(vec![
        // Block IIR
        flight(41, Block::IIR, 14, (2000, 11, 10), Some((2020, 10, 1))),
        flight(43, Block::IIR, 13, (1997, 7, 23), None),
        flight(44, Block::IIR, 28, (2000, 7, 16), None),
        flight(45, Block::IIR, 21, (2003, 3, 31), None),
        flight(46, Block::IIR, 11, (1999, 10, 7), Some((2020, 6, 1))),
        flight(47, Block::IIR, 22, (2003, 12, 21), None),
        flight(51, Block::IIR, 20, (2000, 5, 11), None),
        flight(54, Block::IIR, 18, (2001, 1, 30), Some((2019, 10, 1))),
        flight(56, Block::IIR, 16, (2003, 1, 29), None),
        flight(59, Block::IIR, 19, (2004, 3, 20), None),
        flight(60, Block::IIR, 23, (2004, 6, 23), Some((2020, 3, 1))),
        flight(61, Block::IIR, 2, (2004, 11, 6), None),
        // Block IIR-M
        flight(48, Block::IIRM, 7, (2008, 3, 24), None),
        flight(50, Block::IIRM, 5, (2009, 8, 27), None),
        flight(52, Block::IIRM, 31, (2006, 10, 12), None),
        flight(53, Block::IIRM, 17, (2005, 12, 16), None),
        flight(55, Block::IIRM, 15, (2007, 10, 31), None),
        flight(57, Block::IIRM, 29, (2008, 4, 2), None),
        flight(58, Block::IIRM, 12, (2006, 12, 13), None),
        // Block IIF
        flight(62, Block::IIF, 25, (2010, 8, 27), None),
        flight(63, Block::IIF, 1, (2011, 10, 14), None),
        flight(64, Block::IIF, 30, (2014, 5, 30), None),
        flight(65, Block::IIF, 24, (2012, 11, 14), None),
        flight(66, Block::IIF, 27, (2013, 6, 21), None),
        flight(67, Block::IIF, 6, (2014, 6, 10), None),
        flight(68, Block::IIF, 9, (2014, 9, 17), None),
        flight(69, Block::IIF, 3, (2014, 12, 12), None),
        flight(70, Block::IIF, 32, (2016, 2, 12), None),
        flight(71, Block::IIF, 26, (2015, 4, 20), None),
        flight(72, Block::IIF, 8, (2015, 8, 12), None),
        flight(73, Block::IIF, 10, (2015, 12, 9), None),
        // Block IIIA
        flight(74, Block::IIIA, 4, (2019, 1, 9), None),
        flight(75, Block::IIIA, 18, (2020, 1, 13), None),
        flight(76, Block::IIIA, 23, (2020, 4, 1), None),
        flight(77, Block::IIIA, 14, (2021, 3, 27), None),
        flight(78, Block::IIIA, 11, (2021, 8, 16), None),
    ]);
}

impl CapabilityTable {
    /// Builds a table from explicit records.
    pub fn new(records: Vec<SatCapability>) -> Self {
        Self { records }
    }
    /// Returns the shipped GPS assignment history.
    pub fn builtin() -> &'static CapabilityTable {
        &BUILTIN
    }
    /// Iterates all assignment records.
    pub fn records(&self) -> impl Iterator<Item = &SatCapability> + '_ {
        self.records.iter()
    }
    /// Resolves the PRN slot a vehicle occupied during [start, end].
    /// When several assignments overlap the window, the first table entry
    /// wins. None when the vehicle held no slot in the window.
    pub fn prn_during(&self, svn: u16, start: Epoch, end: Epoch) -> Option<u8> {
        self.records
            .iter()
            .find(|r| r.svn == svn && r.overlaps(start, end))
            .map(|r| r.prn)
    }
    /// Returns flex capable PRNs over [start, end], as GPS [SV]s.
    pub fn flex_prns(&self, start: Epoch, end: Epoch) -> Vec<SV> {
        let svns: Vec<u16> = self
            .records
            .iter()
            .filter(|r| r.block.is_flex_capable())
            .map(|r| r.svn)
            .unique()
            .collect();

        let mut prns = Vec::<SV>::new();
        for svn in svns {
            if let Some(prn) = self.prn_during(svn, start, end) {
                let sv = SV::new(Constellation::GPS, prn);
                if !prns.contains(&sv) {
                    prns.push(sv);
                }
            }
        }
        prns
    }
}

/// Intersects the GPS satellites visible in `obs` with the PRNs that are
/// flex capable over the observation window. Empty output simply means no
/// flex capable vehicle was in view.
pub fn flex_sats(table: &CapabilityTable, obs: &Observations) -> Vec<SV> {
    let (start, end) = match (obs.first_epoch(), obs.last_epoch()) {
        (Some(start), Some(end)) => (start, end),
        _ => return Vec::new(),
    };
    let capable = table.flex_prns(start, end);
    obs.gps_sv().filter(|sv| capable.contains(sv)).collect()
}
