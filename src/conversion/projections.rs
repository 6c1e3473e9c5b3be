//! Projections of vehicle efficiency and activity used to estimate transport hydrogen demand.
//!
//! All projections are relative to the 2023 base year of the fuel-use data.
use crate::year::VALID_YEARS;
use anyhow::{Context, Result, ensure};
use log::debug;

/// The year of the base fuel-use data
const BASE_YEAR: u32 = 2023;

/// Average on-road fuel economy of US light-duty vehicles in the base year (mpg)
const LDV_MPG_BASE: f64 = 22.6;

/// Projected heavy-duty diesel fuel economy (mpg), one entry per year from 2023 to 2050
const HDV_MPG_BY_YEAR: [f64; 28] = [
    6.259011, 6.360165, 6.470843, 6.589664, 6.714928, 6.836287, 6.954601, 7.068473, 7.178148,
    7.282597, 7.3777, 7.462639, 7.53763, 7.603401, 7.660309, 7.708639, 7.750559, 7.787107,
    7.819769, 7.846699, 7.869397, 7.88855, 7.905129, 7.92081, 7.935941, 7.950862, 7.966321,
    7.982552,
];

/// Projected light-duty vehicle-miles travelled (billions), one entry per year from 2023 to 2050
const LD_VMT_BY_YEAR: [f64; 28] = [
    2540.002441, 2549.398193, 2547.35083, 2552.27832, 2560.690674, 2564.727295, 2560.838867,
    2550.160156, 2538.888184, 2524.38623, 2513.166504, 2504.722168, 2494.232422, 2480.870605,
    2469.888672, 2461.147461, 2452.884766, 2447.28125, 2444.361572, 2443.996338, 2444.437988,
    2447.431152, 2453.515381, 2463.175537, 2475.763184, 2489.99292, 2505.494385, 2524.001465,
];

/// Projected heavy-duty vehicle-miles travelled (billions), one entry per year from 2023 to 2050
const HD_VMT_BY_YEAR: [f64; 28] = [
    186.77066, 187.000778, 188.452835, 190.68486, 192.556381, 194.116348, 194.965881, 195.397522,
    195.893646, 196.827133, 197.409042, 197.923721, 198.56163, 198.940033, 199.573639, 200.202545,
    200.718475, 201.372726, 202.111191, 202.838333, 203.409256, 203.777603, 203.913666,
    204.187134, 204.440094, 204.417526, 204.473785, 205.137848,
];

/// Fuel economy of a vehicle class in the two anchor years of a linear projection
struct EfficiencyAnchors {
    icev_2020: f64,
    icev_2050: f64,
    fcev_2020: f64,
    fcev_2050: f64,
}

/// Light-duty: mean of car and light truck economy (mpg / mpge)
const LD_ANCHORS: EfficiencyAnchors = EfficiencyAnchors {
    icev_2020: (33.0 + 23.0) / 2.0,
    icev_2050: (40.0 + 30.0) / 2.0,
    fcev_2020: (83.0 + 60.0) / 2.0,
    fcev_2050: (138.0 + 95.0) / 2.0,
};

/// Heavy-duty reference trucks (mpg / mpge)
const HD_ANCHORS: EfficiencyAnchors = EfficiencyAnchors {
    icev_2020: 7.6,
    icev_2050: 7.7,
    fcev_2020: 8.5,
    fcev_2050: 11.2,
};

impl EfficiencyAnchors {
    /// Efficiency of fuel-cell vehicles relative to combustion vehicles, interpolated linearly
    /// between 2020 and 2050
    fn relative_efficiency(&self, year: u32) -> f64 {
        let start = self.fcev_2020 / self.icev_2020;
        let end = self.fcev_2050 / self.icev_2050;
        start + (end - start) / 30.0 * (f64::from(year) - 2020.0)
    }
}

/// Look up a value from a table with one entry per valid year
fn table_value(table: &[f64], year: u32) -> Result<f64> {
    ensure!(
        VALID_YEARS.contains(&year),
        "No projection data for year {year}"
    );
    let index = (year - BASE_YEAR) as usize;
    table
        .get(index)
        .copied()
        .with_context(|| format!("No projection data for year {year}"))
}

/// The relative change of a tabulated quantity from the base year to `year`
fn relative_change(table: &[f64], year: u32) -> Result<f64> {
    let base = table_value(table, BASE_YEAR)?;
    Ok((table_value(table, year)? - base) / base)
}

/// Relative change in light-duty fuel economy from the base year, from a linear fit of
/// historical average fuel economy
fn ldv_mpg_change(year: u32) -> Result<f64> {
    ensure!(
        VALID_YEARS.contains(&year),
        "No projection data for year {year}"
    );
    let projected = 0.1352 * (f64::from(year) - 2000.0) + 19.731;
    Ok((projected - LDV_MPG_BASE) / LDV_MPG_BASE)
}

/// Transport assumptions for a single model year
#[derive(Debug, Clone, PartialEq)]
pub struct TransportParameters {
    /// Light-duty fuel-cell efficiency relative to combustion vehicles
    pub ld_relative_efficiency: f64,
    /// Heavy-duty fuel-cell efficiency relative to combustion vehicles
    pub hd_relative_efficiency: f64,
    /// Relative change in light-duty fuel economy since the base year
    pub ld_mpg_change: f64,
    /// Relative change in heavy-duty fuel economy since the base year
    pub hd_mpg_change: f64,
    /// Relative change in light-duty vehicle-miles travelled since the base year
    pub ld_vmt_change: f64,
    /// Relative change in heavy-duty vehicle-miles travelled since the base year
    pub hd_vmt_change: f64,
}

impl TransportParameters {
    /// Calculate the transport assumptions for a model year
    pub fn for_year(year: u32) -> Result<Self> {
        let params = Self {
            ld_relative_efficiency: LD_ANCHORS.relative_efficiency(year),
            hd_relative_efficiency: HD_ANCHORS.relative_efficiency(year),
            ld_mpg_change: ldv_mpg_change(year)?,
            hd_mpg_change: relative_change(&HDV_MPG_BY_YEAR, year)?,
            ld_vmt_change: relative_change(&LD_VMT_BY_YEAR, year)?,
            hd_vmt_change: relative_change(&HD_VMT_BY_YEAR, year)?,
        };
        debug!("Transport parameters for {year}: {params:?}");

        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[test]
    fn test_base_year_has_no_change() {
        let params = TransportParameters::for_year(BASE_YEAR).unwrap();
        assert_eq!(params.hd_mpg_change, 0.0);
        assert_eq!(params.ld_vmt_change, 0.0);
        assert_eq!(params.hd_vmt_change, 0.0);
        assert_approx_eq!(
            f64,
            params.ld_mpg_change,
            (0.1352 * 23.0 + 19.731 - 22.6) / 22.6
        );
    }

    #[rstest]
    #[case(2020, 71.5 / 28.0)]
    #[case(2050, 116.5 / 35.0)]
    fn test_ld_relative_efficiency_anchors(#[case] year: u32, #[case] expected: f64) {
        assert_approx_eq!(
            f64,
            LD_ANCHORS.relative_efficiency(year),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_hd_relative_efficiency_increases() {
        let early = TransportParameters::for_year(2025).unwrap();
        let late = TransportParameters::for_year(2050).unwrap();
        assert!(late.hd_relative_efficiency > early.hd_relative_efficiency);
        assert_approx_eq!(
            f64,
            late.hd_mpg_change,
            (7.982552 - 6.259011) / 6.259011
        );
    }

    #[rstest]
    #[case(2022)]
    #[case(2051)]
    fn test_out_of_range(#[case] year: u32) {
        assert_error!(
            TransportParameters::for_year(year),
            format!("No projection data for year {year}")
        );
    }
}
