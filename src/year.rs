//! Code for working with model years.
use crate::input::is_sorted_and_unique;
use anyhow::{Result, ensure};
use std::ops::RangeInclusive;

/// The years for which projection data is available
pub const VALID_YEARS: RangeInclusive<u32> = 2023..=2050;

/// Check that the given model years are valid.
///
/// Years must be non-empty, in order, unique and within [`VALID_YEARS`].
pub fn check_model_years(years: &[u32]) -> Result<()> {
    ensure!(!years.is_empty(), "No model years provided");
    ensure!(
        is_sorted_and_unique(years),
        "Model years must be in order and unique"
    );
    for year in years {
        ensure!(
            VALID_YEARS.contains(year),
            "Year {year} is outside the valid range ({}-{})",
            VALID_YEARS.start(),
            VALID_YEARS.end()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[2030], true)]
    #[case(&[2023, 2050], true)]
    #[case(&[], false)]
    #[case(&[2040, 2030], false)]
    #[case(&[2030, 2030], false)]
    #[case(&[2022], false)]
    #[case(&[2051], false)]
    fn test_check_model_years(#[case] years: &[u32], #[case] valid: bool) {
        assert_eq!(check_model_years(years).is_ok(), valid);
    }
}
