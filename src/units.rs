#![allow(missing_docs)]

//! This module defines the physical quantities used to convert fuel use into hydrogen demand.

/// Represents a dimensionless quantity.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, derive_more::Add, derive_more::Sub)]
pub struct Dimensionless(pub f64);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            derive_more::Add,
            derive_more::Sub,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                $name(iter.map(|x| x.0).sum())
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Emissions);
unit_struct!(Energy);
unit_struct!(Hydrogen);
unit_struct!(Volume);

// Derived quantities
unit_struct!(EmissionsPerEnergy);
unit_struct!(EnergyPerHydrogen);
unit_struct!(HydrogenPerVolume);

// Division rules
impl_div!(Emissions, EmissionsPerEnergy, Energy);
impl_div!(Energy, EnergyPerHydrogen, Hydrogen);

impl std::ops::Mul<HydrogenPerVolume> for Volume {
    type Output = Hydrogen;
    fn mul(self, rhs: HydrogenPerVolume) -> Hydrogen {
        Hydrogen(self.0 * rhs.0)
    }
}

/// Metric tons to kilograms
pub const KG_PER_TONNE: f64 = 1000.0;

/// Pounds to kilograms
pub const KG_PER_LB: f64 = 0.453_592;

/// British thermal units per million British thermal units
pub const BTU_PER_MMBTU: f64 = 1e6;

/// US gallons per barrel
pub const GALLONS_PER_BARREL: f64 = 42.0;

/// Convert a hydrogen heating value in Btu per pound into mmBtu per kilogram of hydrogen
pub fn energy_per_kg_hydrogen(btu_per_lb: f64) -> EnergyPerHydrogen {
    EnergyPerHydrogen(btu_per_lb / KG_PER_LB / BTU_PER_MMBTU)
}
