//! Unit newtypes shared by the billing, physics and simulation code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};

/// Additive quantity stored in a base unit, displayed in kilo-units past 1000.
macro_rules! scalar_unit {
    ($name:ident, $base:literal, $kilo:literal) => {
        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;
            fn mul(self, factor: f64) -> Self {
                Self(self.0 * factor)
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::default(), Add::add)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.0.abs() >= 1000.0 {
                    write!(f, concat!("{:.2} ", $kilo), self.0 / 1000.0)
                } else {
                    write!(f, concat!("{:.1} ", $base), self.0)
                }
            }
        }
    };
}

/// Electrical power, stored in watts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd, Default)]
pub struct Power(pub f64);

impl Power {
    pub fn watts(w: f64) -> Self {
        Self(w)
    }

    pub fn as_watts(&self) -> f64 {
        self.0
    }

    pub fn as_kilowatts(&self) -> f64 {
        self.0 / 1000.0
    }

    /// Energy drawn when this power is sustained for `hours`.
    pub fn over_hours(self, hours: f64) -> Energy {
        Energy(self.0 * hours)
    }
}

scalar_unit!(Power, "W", "kW");

/// Electrical energy, stored in watt-hours
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd, Default)]
pub struct Energy(pub f64);

impl Energy {
    pub fn kilowatt_hours(kwh: f64) -> Self {
        Self(kwh * 1000.0)
    }

    pub fn as_kilowatt_hours(&self) -> f64 {
        self.0 / 1000.0
    }
}

scalar_unit!(Energy, "Wh", "kWh");

/// Ambient temperature in °C
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Temperature(pub f64);

impl Temperature {
    pub fn celsius(c: f64) -> Self {
        Self(c)
    }

    pub fn as_celsius(&self) -> f64 {
        self.0
    }

    /// Signed deviation from `reference`, as a fraction of it.
    pub fn relative_to(&self, reference: Temperature) -> f64 {
        (self.0 - reference.0) / reference.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

/// Share in 0-100 %
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd, Default)]
pub struct Percentage(pub f64);

impl Percentage {
    pub fn from_ratio(ratio: f64) -> Self {
        Self((ratio * 100.0).clamp(0.0, 100.0))
    }

    /// `part` as a share of `whole`; zero when `whole` is not positive.
    pub fn of(part: f64, whole: f64) -> Self {
        if whole > 0.0 {
            Self::from_ratio(part / whole)
        } else {
            Self::default()
        }
    }

    pub fn as_percent(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}
