use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("unknown observable \"{0}\"")]
    UnknownObservable(String),
    #[error("malformed observable \"{0}\"")]
    MalformedDescriptor(String),
}

/// Observable describes the supported GNSS signal observations.
/// Flex power scanning operates on [Observable::SSI] series, other
/// kinds are carried so observation streams keep their full content.
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash, Ord, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Observable {
    /// Carrier phase observation
    Phase(String),
    /// Doppler shift observation
    Doppler(String),
    /// Signal strength observation [dB-Hz]
    SSI(String),
    /// Pseudo range observation
    PseudoRange(String),
}

impl Default for Observable {
    fn default() -> Self {
        Self::SSI("S1W".to_string())
    }
}

impl Observable {
    pub fn is_phase_observable(&self) -> bool {
        matches!(self, Self::Phase(_))
    }
    pub fn is_doppler_observable(&self) -> bool {
        matches!(self, Self::Doppler(_))
    }
    pub fn is_ssi_observable(&self) -> bool {
        matches!(self, Self::SSI(_))
    }
    pub fn is_pseudorange_observable(&self) -> bool {
        matches!(self, Self::PseudoRange(_))
    }
    /// Returns the carrier/code descriptor, e.g. "1W" for "S1W"
    pub fn code(&self) -> Option<String> {
        match self {
            Self::Phase(c) | Self::Doppler(c) | Self::SSI(c) | Self::PseudoRange(c) => {
                if c.len() == 3 {
                    Some(c[1..].to_string())
                } else {
                    None
                }
            },
        }
    }
}

impl std::fmt::Display for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Phase(c) | Self::Doppler(c) | Self::SSI(c) | Self::PseudoRange(c) => {
                write!(f, "{}", c)
            },
        }
    }
}

impl std::str::FromStr for Observable {
    type Err = ParsingError;
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let content = content.trim().to_uppercase();
        if content.len() < 2 || content.len() > 3 {
            return Err(ParsingError::MalformedDescriptor(content));
        }
        match content.chars().next() {
            Some('L') => Ok(Self::Phase(content)),
            Some('D') => Ok(Self::Doppler(content)),
            Some('S') => Ok(Self::SSI(content)),
            Some('C') | Some('P') => Ok(Self::PseudoRange(content)),
            _ => Err(ParsingError::UnknownObservable(content)),
        }
    }
}
