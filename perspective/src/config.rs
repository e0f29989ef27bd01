//! Tuning parameters of the perspective engine, read from TOML.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub z_order: ZOrderConfig,
    pub rotation: RotationConfig,
    pub snapping: SnappingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZOrderConfig {
    /// How far outside a sector a vector may lie and still count as inside, in sector
    /// coordinates. `0.0` is exact.
    pub sector_tolerance: f64,
}

impl Default for ZOrderConfig {
    fn default() -> Self {
        Self {
            sector_tolerance: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Degrees an infinite vanishing point turns per fine rotation step.
    pub fine_step: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { fine_step: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnappingConfig {
    /// While the pointer is closer than this to every snapping line, the previously chosen line
    /// is kept.
    pub tolerance: f64,
    /// A dragged vanishing point closer than this to another one snaps onto it.
    pub vp_distance: f64,
}

impl Default for SnappingConfig {
    fn default() -> Self {
        Self {
            tolerance: 10.0,
            vp_distance: 5.0,
        }
    }
}

impl Config {
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml).context("Failed to parse the perspective configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.z_order.sector_tolerance >= 0.0) {
            bail!(
                "z_order.sector_tolerance must not be negative: {}",
                self.z_order.sector_tolerance
            );
        }
        if !(self.rotation.fine_step.is_finite() && self.rotation.fine_step >= 0.0) {
            bail!(
                "rotation.fine_step must be a non-negative number of degrees: {}",
                self.rotation.fine_step
            );
        }
        if !(self.snapping.tolerance >= 0.0) {
            bail!(
                "snapping.tolerance must not be negative: {}",
                self.snapping.tolerance
            );
        }
        if !(self.snapping.vp_distance >= 0.0) {
            bail!(
                "snapping.vp_distance must not be negative: {}",
                self.snapping.vp_distance
            );
        }
        Ok(())
    }
}
