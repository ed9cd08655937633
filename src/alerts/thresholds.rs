use serde::{Deserialize, Serialize};

use crate::error::{ClimboxError, ClimboxResult};

/// Single-sided limits: danger when `value >= danger`, warning when `value >= warning`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpperLimits {
    pub warning: f64,
    pub danger: f64,
}

impl UpperLimits {
    #[must_use]
    pub fn new(warning: f64, danger: f64) -> Self {
        Self { warning, danger }
    }

    fn validate(self, name: &str) -> ClimboxResult<Self> {
        if !self.warning.is_finite() || !self.danger.is_finite() {
            return Err(ClimboxError::InvalidConfig(format!(
                "threshold `{name}` must be finite"
            )));
        }
        if self.warning > self.danger {
            return Err(ClimboxError::InvalidConfig(format!(
                "threshold `{name}` warning must be <= danger"
            )));
        }
        Ok(self)
    }
}

/// Two-sided band; values at or beyond either edge trip the level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandLimits {
    pub low_warning: f64,
    pub low_danger: f64,
    pub high_warning: f64,
    pub high_danger: f64,
}

impl BandLimits {
    fn validate(self, name: &str) -> ClimboxResult<Self> {
        for (value, field) in [
            (self.low_warning, "low_warning"),
            (self.low_danger, "low_danger"),
            (self.high_warning, "high_warning"),
            (self.high_danger, "high_danger"),
        ] {
            if !value.is_finite() {
                return Err(ClimboxError::InvalidConfig(format!(
                    "threshold `{name}.{field}` must be finite"
                )));
            }
        }
        if !(self.low_danger <= self.low_warning
            && self.low_warning < self.high_warning
            && self.high_warning <= self.high_danger)
        {
            return Err(ClimboxError::InvalidConfig(format!(
                "threshold `{name}` must satisfy low_danger <= low_warning < high_warning <= high_danger"
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_wind_kmh")]
    pub wind_kmh: UpperLimits,
    #[serde(default = "default_rainfall_mm")]
    pub rainfall_mm: UpperLimits,
    #[serde(default = "default_water_temp")]
    pub water_temp: BandLimits,
    /// Suspended-solids sensor proxy; units follow the sensor calibration.
    #[serde(default = "default_tss")]
    pub tss: UpperLimits,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            wind_kmh: default_wind_kmh(),
            rainfall_mm: default_rainfall_mm(),
            water_temp: default_water_temp(),
            tss: default_tss(),
        }
    }
}

impl Thresholds {
    pub fn validate(self) -> ClimboxResult<Self> {
        self.wind_kmh.validate("wind_kmh")?;
        self.rainfall_mm.validate("rainfall_mm")?;
        self.water_temp.validate("water_temp")?;
        self.tss.validate("tss")?;
        Ok(self)
    }

    #[must_use]
    pub fn with_wind_kmh(mut self, limits: UpperLimits) -> Self {
        self.wind_kmh = limits;
        self
    }

    #[must_use]
    pub fn with_rainfall_mm(mut self, limits: UpperLimits) -> Self {
        self.rainfall_mm = limits;
        self
    }

    #[must_use]
    pub fn with_water_temp(mut self, limits: BandLimits) -> Self {
        self.water_temp = limits;
        self
    }

    #[must_use]
    pub fn with_tss(mut self, limits: UpperLimits) -> Self {
        self.tss = limits;
        self
    }
}

fn default_wind_kmh() -> UpperLimits {
    UpperLimits::new(30.0, 50.0)
}

fn default_rainfall_mm() -> UpperLimits {
    UpperLimits::new(10.0, 50.0)
}

fn default_water_temp() -> BandLimits {
    BandLimits {
        low_warning: 24.0,
        low_danger: 20.0,
        high_warning: 32.0,
        high_danger: 34.0,
    }
}

fn default_tss() -> UpperLimits {
    UpperLimits::new(100.0, 200.0)
}
