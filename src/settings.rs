use std::{fmt, fs::File, path::Path, str::FromStr};

use plotters::style::RGBColor;
use serde::Deserialize;
use strum_macros::EnumIter;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(r#"simulation {0} is not recognized, expected "09_18", "17_11" or "37_11""#)]
    SimulationId(String),
    #[error("failed to read the style sheet")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize the style sheet")]
    Json(#[from] serde_json::Error),
}
type Result<T> = std::result::Result<T, SettingsError>;

/// Lenient selection criterion: effective radius threshold [kpc]
pub const RE_LENIENT_KPC: f64 = 1.0;
/// Lenient selection criterion: effective surface brightness threshold [mag arcsec^-2]
pub const MU_E_LENIENT: f64 = 24.0;
/// Fiducial selection criterion: effective radius threshold [kpc]
pub const RE_FIDUCIAL_KPC: f64 = 1.5;
/// Fiducial selection criterion: effective surface brightness threshold [mag arcsec^-2]
pub const MU_E_FIDUCIAL: f64 = 24.5;

/// Edge padding factor shared by the paper figures
pub const AX_LIMIT_EDGE_ADJUSTMENT: f64 = 1.0;

const RE_LIMITS_KPC: (f64, f64) = (0.5, 5.8);
const MU_E_LIMITS: (f64, f64) = (23.5, 29.0);

/// Figure limits of the effective radius axis [kpc]
pub fn re_limits() -> (f64, f64) {
    (
        RE_LIMITS_KPC.0 * AX_LIMIT_EDGE_ADJUSTMENT,
        RE_LIMITS_KPC.1 * AX_LIMIT_EDGE_ADJUSTMENT,
    )
}
/// Figure limits of the surface brightness axis [mag arcsec^-2]
pub fn mu_e_limits() -> (f64, f64) {
    (
        MU_E_LIMITS.0 * AX_LIMIT_EDGE_ADJUSTMENT,
        MU_E_LIMITS.1 * AX_LIMIT_EDGE_ADJUSTMENT,
    )
}

/// Local Group zoom simulation realization
#[derive(EnumIter, Clone, Copy, PartialEq, Eq, Debug)]
pub enum SimulationId {
    Lg0918,
    Lg1711,
    Lg3711,
}
impl SimulationId {
    /// Catalogue label of the realization
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationId::Lg0918 => "09_18",
            SimulationId::Lg1711 => "17_11",
            SimulationId::Lg3711 => "37_11",
        }
    }
    /// Marker shape and colour of the realization
    pub fn style(&self) -> SimStyle {
        let (marker, color) = match self {
            SimulationId::Lg0918 => (Marker::Circle, colorous::TABLEAU10[0]),
            SimulationId::Lg1711 => (Marker::Triangle, colorous::TABLEAU10[1]),
            SimulationId::Lg3711 => (Marker::Dot, colorous::TABLEAU10[2]),
        };
        SimStyle {
            marker,
            color: RGBColor(color.r, color.g, color.b),
        }
    }
}
impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
impl FromStr for SimulationId {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "09_18" => Ok(SimulationId::Lg0918),
            "17_11" => Ok(SimulationId::Lg1711),
            "37_11" => Ok(SimulationId::Lg3711),
            _ => Err(SettingsError::SimulationId(s.to_string())),
        }
    }
}

/// Scatter marker shape
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Marker {
    Circle,
    Triangle,
    Square,
    Diamond,
    Dot,
}
impl Marker {
    /// Marker area boost, the dot marker being drawn at twice the area
    pub fn area_boost(&self) -> f64 {
        match self {
            Marker::Dot => 2.,
            _ => 1.,
        }
    }
}

/// Per-simulation scatter styling
#[derive(Clone, Copy, Debug)]
pub struct SimStyle {
    pub marker: Marker,
    pub color: RGBColor,
}

/// Figure style sheet overrides
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PaperStyle {
    /// Figure width [px]
    pub width: u32,
    /// Figure height [px]
    pub height: u32,
    /// Marker area at 1kpc from the nearest host [px^2]
    pub marker_size_prefactor: f64,
    /// Exponent of the inverse power-law marker scaling
    pub dist_index: f64,
}
impl Default for PaperStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            marker_size_prefactor: 2.5 * 2525.,
            dist_index: 0.7,
        }
    }
}
impl PaperStyle {
    /// Loads the style sheet, a missing file falls back to the default style
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Ok(serde_json::from_reader(file)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn simulation_id_round_trip() {
        for sim_id in SimulationId::iter() {
            assert_eq!(sim_id.as_str().parse::<SimulationId>().unwrap(), sim_id);
        }
    }

    #[test]
    fn unknown_simulation_id() {
        assert!("47_11".parse::<SimulationId>().is_err());
    }

    #[test]
    fn missing_style_sheet_is_default() {
        let style = PaperStyle::load("no_such_style_sheet.json").unwrap();
        assert_eq!(style, PaperStyle::default());
    }

    #[test]
    fn fiducial_cuts_are_stricter() {
        assert!(RE_FIDUCIAL_KPC > RE_LENIENT_KPC);
        assert!(MU_E_FIDUCIAL > MU_E_LENIENT);
    }
}
