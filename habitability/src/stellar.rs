//! Host-star parameters.

use std::fmt;
use std::str::FromStr;

use exo_math::Measurement;
use serde::{Deserialize, Serialize};

/// Main-sequence spectral class, hottest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpectralType {
    O,
    B,
    A,
    F,
    G,
    K,
    M,
}

impl SpectralType {
    /// All classes in decreasing temperature order.
    pub const ALL: [SpectralType; 7] = [
        SpectralType::O,
        SpectralType::B,
        SpectralType::A,
        SpectralType::F,
        SpectralType::G,
        SpectralType::K,
        SpectralType::M,
    ];
}

impl fmt::Display for SpectralType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let str = match self {
            SpectralType::O => "O",
            SpectralType::B => "B",
            SpectralType::A => "A",
            SpectralType::F => "F",
            SpectralType::G => "G",
            SpectralType::K => "K",
            SpectralType::M => "M",
        };
        write!(f, "{}", str)
    }
}

impl FromStr for SpectralType {
    type Err = String;

    /// Parse the leading class letter, so `"G2V"` reads as `G`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let letter = s
            .trim()
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .ok_or_else(|| "Empty spectral type".to_string())?;
        match letter {
            'O' => Ok(SpectralType::O),
            'B' => Ok(SpectralType::B),
            'A' => Ok(SpectralType::A),
            'F' => Ok(SpectralType::F),
            'G' => Ok(SpectralType::G),
            'K' => Ok(SpectralType::K),
            'M' => Ok(SpectralType::M),
            _ => Err(format!(
                "Unknown spectral type: {}. Valid options: O, B, A, F, G, K, M",
                s
            )),
        }
    }
}

/// Stellar parameters; absent values stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StellarParameters {
    /// Mass in solar masses
    pub mass: Option<Measurement>,
    /// Radius in solar radii
    pub radius: Option<Measurement>,
    /// Luminosity in solar luminosities
    pub luminosity: Option<Measurement>,
    /// Effective temperature in kelvin
    pub temperature: Option<Measurement>,
    pub spectral_type: Option<SpectralType>,
}

impl StellarParameters {
    pub fn with_mass(mut self, mass: Measurement) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn with_radius(mut self, radius: Measurement) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_luminosity(mut self, luminosity: Measurement) -> Self {
        self.luminosity = Some(luminosity);
        self
    }

    pub fn with_temperature(mut self, temperature: Measurement) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_spectral_type(mut self, spectral_type: SpectralType) -> Self {
        self.spectral_type = Some(spectral_type);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectral_type_parse() {
        assert_eq!("G".parse::<SpectralType>().unwrap(), SpectralType::G);
        assert_eq!("m".parse::<SpectralType>().unwrap(), SpectralType::M);
        assert_eq!(" K5V ".parse::<SpectralType>().unwrap(), SpectralType::K);
        assert!("X".parse::<SpectralType>().is_err());
        assert!("".parse::<SpectralType>().is_err());
    }

    #[test]
    fn test_spectral_type_display_roundtrip() {
        for class in SpectralType::ALL {
            assert_eq!(class.to_string().parse::<SpectralType>().unwrap(), class);
        }
    }

    #[test]
    fn test_ordering_is_hot_to_cool() {
        assert!(SpectralType::O < SpectralType::G);
        assert!(SpectralType::K < SpectralType::M);
    }

    #[test]
    fn test_builder_leaves_missing_fields_absent() {
        let star = StellarParameters::default()
            .with_mass(Measurement::exact(1.0))
            .with_spectral_type(SpectralType::G);
        assert!(star.mass.is_some());
        assert!(star.radius.is_none());
        assert!(star.luminosity.is_none());
        assert!(star.temperature.is_none());
    }
}
