//! Recoverable data-quality and allocation warnings raised while running a model year.
//!
//! Warnings never abort a stage. They are collected into a [`WarningLog`] which travels with the
//! stage's output, is summarised in the program log and written to `warnings.csv`.
use crate::facility::{CategoryID, FacilityID};
use crate::region::RegionID;
use indexmap::IndexMap;
use log::{debug, warn};
use strum::EnumDiscriminants;

/// A recoverable problem encountered while processing a model year
#[derive(Debug, Clone, PartialEq, derive_more::Display, EnumDiscriminants)]
#[strum_discriminants(name(WarningKind), derive(strum::Display, Hash, PartialOrd, Ord))]
pub enum StageWarning {
    /// A unit reported a fuel with no emission factor
    #[display("Unknown fuel type '{fuel}' for unit '{unit}' of facility {facility}; fuel skipped")]
    UnknownFuel {
        /// The facility reporting the fuel
        facility: FacilityID,
        /// The unit reporting the fuel
        unit: String,
        /// The unrecognised fuel name
        fuel: String,
    },
    /// A unit reported no fuel type so the default fuel was assumed
    #[display("No fuel type reported for unit '{unit}' of facility {facility}; assuming {fuel}")]
    DefaultFuelAssumed {
        /// The facility reporting the unit
        facility: FacilityID,
        /// The unit without a fuel type
        unit: String,
        /// The fuel which was assumed
        fuel: String,
    },
    /// None of a unit's fuels could be recognised
    #[display("Unit '{unit}' of facility {facility} has no recognised fuel; unit skipped")]
    NoRecognisedFuel {
        /// The facility reporting the unit
        facility: FacilityID,
        /// The skipped unit
        unit: String,
    },
    /// A facility lies outside every load zone
    #[display("Facility {facility} ({demand:.3} kg) lies outside all load zones")]
    OutsideZones {
        /// The excluded facility
        facility: FacilityID,
        /// Hydrogen demand excluded from zone totals (kg)
        demand: f64,
    },
    /// A facility lies outside every grid cell
    #[display("Facility {facility} ({demand:.3} kg) lies outside the demand grid")]
    OutsideGrid {
        /// The excluded facility
        facility: FacilityID,
        /// Hydrogen demand excluded from grid totals (kg)
        demand: f64,
    },
    /// Fine units which received no allocation because their reference weight is zero
    #[display("{count} fine unit(s) in {region} have zero reference weight")]
    ZeroWeightUnits {
        /// The coarse unit containing the fine units
        region: RegionID,
        /// The number of zero-weight fine units
        count: usize,
    },
    /// Demand for a coarse unit could not be redistributed because it has no weighted fine units
    #[display("{demand:.3} kg of demand in {region} has no fine units with non-zero weight")]
    NoWeightForRegion {
        /// The coarse unit
        region: RegionID,
        /// Hydrogen demand which could not be allocated (kg)
        demand: f64,
    },
    /// Demand allocated to a zone which is not part of the modelled zone set
    #[display("Demand allocated to unknown zone '{zone}' dropped ({demand:.3} kg)")]
    UnknownZone {
        /// The unknown zone name
        zone: String,
        /// Hydrogen demand dropped (kg)
        demand: f64,
    },
    /// A top-down shortfall with no extra facilities to inject it into
    #[display(
        "Shortfall of {shortfall:.3} mmBtu for category {category} in {region} not allocated: \
         no extra facilities listed"
    )]
    UnallocatedShortfall {
        /// The industry category
        category: CategoryID,
        /// The survey region
        region: RegionID,
        /// The unallocated energy (mmBtu)
        shortfall: f64,
    },
}

/// Warnings collected by a pipeline stage
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WarningLog(Vec<StageWarning>);

impl WarningLog {
    /// Record a new warning
    pub fn push(&mut self, warning: StageWarning) {
        debug!("{warning}");
        self.0.push(warning);
    }

    /// Iterate over the warnings in the order they were raised
    pub fn iter(&self) -> impl Iterator<Item = &StageWarning> {
        self.0.iter()
    }

    /// The number of warnings
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no warnings have been raised
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of warnings of each kind, ordered by kind
    pub fn counts(&self) -> IndexMap<WarningKind, usize> {
        let mut counts: IndexMap<WarningKind, usize> = IndexMap::new();
        for warning in &self.0 {
            *counts.entry(WarningKind::from(warning)).or_default() += 1;
        }
        counts.sort_keys();

        counts
    }

    /// Write a summary of the warning counts to the program log
    pub fn log_summary(&self, context: &str) {
        for (kind, count) in self.counts() {
            warn!("{context}: {count} warning(s) of kind {kind}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = StageWarning::UnknownFuel {
            facility: "F1".into(),
            unit: "GP-1".into(),
            fuel: "Mystery Gas".into(),
        };
        assert_eq!(
            warning.to_string(),
            "Unknown fuel type 'Mystery Gas' for unit 'GP-1' of facility F1; fuel skipped"
        );

        let warning = StageWarning::ZeroWeightUnits {
            region: "CA".into(),
            count: 2,
        };
        assert_eq!(
            warning.to_string(),
            "2 fine unit(s) in CA have zero reference weight"
        );
    }

    #[test]
    fn test_warning_log_counts() {
        let mut log = WarningLog::default();
        assert!(log.is_empty());
        log.push(StageWarning::OutsideZones {
            facility: "F1".into(),
            demand: 1.0,
        });
        log.push(StageWarning::UnknownZone {
            zone: "CAN_BC".into(),
            demand: 2.0,
        });
        log.push(StageWarning::OutsideZones {
            facility: "F2".into(),
            demand: 0.0,
        });

        assert_eq!(log.len(), 3);
        let counts = log.counts();
        assert_eq!(counts[&WarningKind::OutsideZones], 2);
        assert_eq!(counts[&WarningKind::UnknownZone], 1);
        assert_eq!(WarningKind::OutsideZones.to_string(), "OutsideZones");
    }
}
