//! Reconciliation of bottom-up facility estimates against top-down survey totals.
//!
//! For each surveyed (category, region) pair the eligible energy of matching activity records is
//! compared with the survey total. Overestimates are scaled down; shortfalls are injected as
//! synthetic records evenly split across facilities known to be missing from the bottom-up data.
use crate::facility::{ActivityRecord, CategoryID, FacilityID, FacilitySite};
use crate::fuel::FuelID;
use crate::region::RegionID;
use crate::units::{Dimensionless, Energy};
use crate::warning::{StageWarning, WarningLog};
use float_cmp::approx_eq;
use log::info;

/// Name given to the unit of injected synthetic records
pub const SYNTHETIC_UNIT_NAME: &str = "unreported";

/// A top-down energy total for a category in a region
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyTotal {
    /// The industry category
    pub category: CategoryID,
    /// The reference sub-region covered by the survey
    pub region: RegionID,
    /// Energy consumed (mmBtu)
    pub energy: Energy,
}

/// The correction applied to a (category, region) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Correction {
    /// Totals agreed, or there was no bottom-up estimate to correct
    #[strum(serialize = "none")]
    None,
    /// Bottom-up records were scaled down
    #[strum(serialize = "scaled")]
    Scaled,
    /// Synthetic records were added to make up a shortfall
    #[strum(serialize = "injected")]
    Injected,
    /// A shortfall could not be corrected
    #[strum(serialize = "unresolved")]
    Unresolved,
}

/// The comparison of bottom-up and top-down totals for one (category, region) pair
#[derive(Debug, Clone, PartialEq)]
pub struct DiscrepancyResult {
    /// The industry category
    pub category: CategoryID,
    /// The survey region
    pub region: RegionID,
    /// Sum of eligible bottom-up energy (mmBtu)
    pub bottom_up: Energy,
    /// Survey energy (mmBtu)
    pub top_down: Energy,
    /// The correction chosen for this pair
    pub correction: Correction,
}

impl DiscrepancyResult {
    /// Bottom-up minus top-down (positive for an overestimate)
    pub fn difference(&self) -> Energy {
        self.bottom_up - self.top_down
    }

    /// The ratio `top_down / bottom_up`, undefined when there is no bottom-up estimate
    pub fn correction_factor(&self) -> Option<Dimensionless> {
        (self.bottom_up.value() > 0.0).then(|| self.top_down / self.bottom_up)
    }
}

/// The outcome of reconciling a set of activity records
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Corrected records, including any synthetic ones
    pub records: Vec<ActivityRecord>,
    /// Discrepancies before correction
    pub before: Vec<DiscrepancyResult>,
    /// Discrepancies after correction
    pub after: Vec<DiscrepancyResult>,
}

/// Whether a record counts towards the bottom-up total of a survey
fn is_eligible(record: &ActivityRecord, survey: &SurveyTotal) -> bool {
    !record.excluded && record.category == survey.category && record.region == survey.region
}

/// The eligible bottom-up energy for a survey
fn bottom_up_total(records: &[ActivityRecord], survey: &SurveyTotal) -> Energy {
    records
        .iter()
        .filter(|record| is_eligible(record, survey))
        .map(|record| record.energy)
        .sum()
}

/// Reconciles activity records against survey totals
pub struct Reconciler<'a> {
    surveys: &'a [SurveyTotal],
    extra_facilities: &'a [FacilitySite],
    default_fuel: &'a FuelID,
}

impl<'a> Reconciler<'a> {
    /// Create a new [`Reconciler`].
    ///
    /// # Arguments
    ///
    /// * `surveys` - Top-down totals to reconcile against
    /// * `extra_facilities` - Facilities known to exist but absent from the bottom-up data
    /// * `default_fuel` - The fuel assumed for synthetic records
    pub fn new(
        surveys: &'a [SurveyTotal],
        extra_facilities: &'a [FacilitySite],
        default_fuel: &'a FuelID,
    ) -> Self {
        Self {
            surveys,
            extra_facilities,
            default_fuel,
        }
    }

    /// Reconcile `records` against every survey total
    pub fn reconcile(
        &self,
        mut records: Vec<ActivityRecord>,
        warnings: &mut WarningLog,
    ) -> Reconciliation {
        let mut before = Vec::with_capacity(self.surveys.len());
        let mut after = Vec::with_capacity(self.surveys.len());

        for survey in self.surveys {
            let bottom_up = bottom_up_total(&records, survey);
            let correction = self.correct(survey, bottom_up, &mut records, warnings);
            if correction != Correction::None {
                info!(
                    "Reconciled {} in {}: bottom-up {:.1} mmBtu, top-down {:.1} mmBtu ({correction})",
                    survey.category,
                    survey.region,
                    bottom_up.value(),
                    survey.energy.value()
                );
            }

            before.push(DiscrepancyResult {
                category: survey.category.clone(),
                region: survey.region.clone(),
                bottom_up,
                top_down: survey.energy,
                correction,
            });
            after.push(DiscrepancyResult {
                category: survey.category.clone(),
                region: survey.region.clone(),
                bottom_up: bottom_up_total(&records, survey),
                top_down: survey.energy,
                correction,
            });
        }

        Reconciliation {
            records,
            before,
            after,
        }
    }

    /// Apply the correction for a single survey, returning which correction was applied
    fn correct(
        &self,
        survey: &SurveyTotal,
        bottom_up: Energy,
        records: &mut Vec<ActivityRecord>,
        warnings: &mut WarningLog,
    ) -> Correction {
        let top_down = survey.energy;
        if bottom_up.value() <= 0.0 || approx_eq!(f64, bottom_up.value(), top_down.value()) {
            return Correction::None;
        }

        if bottom_up > top_down {
            let factor = top_down / bottom_up;
            for record in records
                .iter_mut()
                .filter(|record| is_eligible(record, survey))
            {
                record.energy = record.energy * factor;
            }
            return Correction::Scaled;
        }

        let shortfall = top_down - bottom_up;
        let targets: Vec<_> = self
            .extra_facilities
            .iter()
            .filter(|site| site.category == survey.category && site.region == survey.region)
            .collect();
        if targets.is_empty() {
            warnings.push(StageWarning::UnallocatedShortfall {
                category: survey.category.clone(),
                region: survey.region.clone(),
                shortfall: shortfall.value(),
            });
            return Correction::Unresolved;
        }

        let share = shortfall / Dimensionless(targets.len() as f64);
        records.extend(targets.into_iter().map(|site| self.synthetic_record(site, share)));

        Correction::Injected
    }

    fn synthetic_record(&self, site: &FacilitySite, energy: Energy) -> ActivityRecord {
        ActivityRecord {
            facility_id: site.id.clone(),
            unit: SYNTHETIC_UNIT_NAME.to_string(),
            category: site.category.clone(),
            region: site.region.clone(),
            fuel: self.default_fuel.clone(),
            energy,
            excluded: false,
            synthetic: true,
        }
    }
}

/// Get the IDs of the facilities which received synthetic records
pub fn synthetic_facilities(records: &[ActivityRecord]) -> impl Iterator<Item = &FacilityID> {
    records
        .iter()
        .filter(|record| record.synthetic)
        .map(|record| &record.facility_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{activity_record, extra_facilities};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn survey(energy: f64) -> SurveyTotal {
        SurveyTotal {
            category: "331".into(),
            region: "R1".into(),
            energy: Energy(energy),
        }
    }

    fn records_totalling(activity_record: &ActivityRecord, total: f64) -> Vec<ActivityRecord> {
        let mut first = activity_record.clone();
        first.energy = Energy(total * 0.25);
        let mut second = activity_record.clone();
        second.unit = "U2".into();
        second.energy = Energy(total * 0.75);
        vec![first, second]
    }

    #[rstest]
    fn test_overestimate_scaled(
        activity_record: ActivityRecord,
        extra_facilities: Vec<FacilitySite>,
    ) {
        let surveys = [survey(800.0)];
        let fuel = FuelID::new("Natural Gas");
        let reconciler = Reconciler::new(&surveys, &extra_facilities, &fuel);
        let records = records_totalling(&activity_record, 1000.0);
        let mut warnings = WarningLog::default();

        let result = reconciler.reconcile(records.clone(), &mut warnings);
        assert_eq!(result.records.len(), 2);
        for (old, new) in records.iter().zip(&result.records) {
            assert_approx_eq!(f64, new.energy.value(), old.energy.value() * 0.8);
        }

        let before = &result.before[0];
        assert_eq!(before.correction, Correction::Scaled);
        assert_eq!(before.difference(), Energy(200.0));
        assert_approx_eq!(f64, before.correction_factor().unwrap().0, 0.8);
        assert_approx_eq!(f64, result.after[0].bottom_up.value(), 800.0);
        assert!(warnings.is_empty());
    }

    #[rstest]
    fn test_underestimate_injected(
        activity_record: ActivityRecord,
        extra_facilities: Vec<FacilitySite>,
    ) {
        let surveys = [survey(800.0)];
        let fuel = FuelID::new("Natural Gas");
        let reconciler = Reconciler::new(&surveys, &extra_facilities, &fuel);
        let records = records_totalling(&activity_record, 500.0);
        let mut warnings = WarningLog::default();

        let result = reconciler.reconcile(records, &mut warnings);
        let injected: Vec<_> = result.records.iter().filter(|r| r.synthetic).collect();

        // Only the two extra facilities in the same category and region receive a share
        assert_eq!(injected.len(), 2);
        for record in &injected {
            assert_approx_eq!(f64, record.energy.value(), 150.0);
            assert_eq!(record.fuel, fuel);
        }
        let total: f64 = injected.iter().map(|r| r.energy.value()).sum();
        assert_approx_eq!(f64, total, 300.0);
        assert_eq!(result.before[0].correction, Correction::Injected);
        assert_approx_eq!(f64, result.after[0].bottom_up.value(), 800.0);
        assert_eq!(synthetic_facilities(&result.records).count(), 2);
    }

    #[rstest]
    fn test_underestimate_without_extras(activity_record: ActivityRecord) {
        let surveys = [survey(800.0)];
        let fuel = FuelID::new("Natural Gas");
        let reconciler = Reconciler::new(&surveys, &[], &fuel);
        let records = records_totalling(&activity_record, 500.0);
        let mut warnings = WarningLog::default();

        let result = reconciler.reconcile(records.clone(), &mut warnings);
        assert_eq!(result.records, records);
        assert_eq!(result.before[0].correction, Correction::Unresolved);
        assert!(matches!(
            warnings.iter().next(),
            Some(StageWarning::UnallocatedShortfall { .. })
        ));
    }

    #[rstest]
    #[case(0.0)]
    #[case(800.0)]
    fn test_no_correction(
        activity_record: ActivityRecord,
        extra_facilities: Vec<FacilitySite>,
        #[case] bottom_up: f64,
    ) {
        let surveys = [survey(800.0)];
        let fuel = FuelID::new("Natural Gas");
        let reconciler = Reconciler::new(&surveys, &extra_facilities, &fuel);
        let records = if bottom_up > 0.0 {
            records_totalling(&activity_record, bottom_up)
        } else {
            Vec::new()
        };
        let mut warnings = WarningLog::default();

        let result = reconciler.reconcile(records.clone(), &mut warnings);
        assert_eq!(result.records, records);
        assert_eq!(result.before[0].correction, Correction::None);
        assert_eq!(result.before[0].correction_factor().is_none(), bottom_up == 0.0);
    }

    #[rstest]
    fn test_excluded_records_ignored(
        activity_record: ActivityRecord,
        extra_facilities: Vec<FacilitySite>,
    ) {
        let surveys = [survey(800.0)];
        let fuel = FuelID::new("Natural Gas");
        let reconciler = Reconciler::new(&surveys, &extra_facilities, &fuel);
        let mut records = records_totalling(&activity_record, 800.0);
        let mut biofuel = activity_record.clone();
        biofuel.excluded = true;
        biofuel.energy = Energy(1000.0);
        records.push(biofuel);
        let mut warnings = WarningLog::default();

        let result = reconciler.reconcile(records.clone(), &mut warnings);
        assert_eq!(result.before[0].correction, Correction::None);
        assert_eq!(result.records, records);
    }
}
