//! Fuels burned by industrial units, with their emission factors and growth projections.
use crate::id::define_id_type;
use crate::units::{Dimensionless, EmissionsPerEnergy};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use std::collections::HashMap;

define_id_type! {FuelID}

/// A map of [`Fuel`]s, keyed by fuel ID
pub type FuelMap = IndexMap<FuelID, Fuel>;

/// A fuel which may be displaced by hydrogen
#[derive(Debug, Clone, PartialEq)]
pub struct Fuel {
    /// Unique fuel name (e.g. "Natural Gas")
    pub id: FuelID,
    /// Mass of CO2 emitted per unit of energy (kg/mmBtu)
    pub emission_factor: EmissionsPerEnergy,
    /// Biofuels cannot be displaced by hydrogen and are excluded from demand projections
    pub is_biofuel: bool,
    /// The growth category used to project consumption of this fuel, if any
    pub growth_category: Option<String>,
}

/// Fuels together with their alternative names and growth projections
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FuelTable {
    fuels: FuelMap,
    aliases: HashMap<String, FuelID>,
    growth: HashMap<(String, u32), Dimensionless>,
}

impl FuelTable {
    /// Create a new [`FuelTable`].
    ///
    /// Every alias must refer to a known fuel and must not shadow a fuel name.
    pub fn new(
        fuels: FuelMap,
        aliases: HashMap<String, FuelID>,
        growth: HashMap<(String, u32), Dimensionless>,
    ) -> Result<Self> {
        for (alias, fuel_id) in &aliases {
            ensure!(
                fuels.contains_key(fuel_id),
                "Alias '{alias}' refers to unknown fuel {fuel_id}"
            );
            ensure!(
                !fuels.contains_key(alias.as_str()),
                "Alias '{alias}' has the same name as a fuel"
            );
        }

        Ok(Self {
            fuels,
            aliases,
            growth,
        })
    }

    /// Look up a fuel by name or alias
    pub fn resolve(&self, name: &str) -> Option<&Fuel> {
        let name = name.trim();
        self.fuels
            .get(name)
            .or_else(|| self.fuels.get(self.aliases.get(name)?))
    }

    /// Look up a fuel by name or alias, returning an error if it is unknown
    pub fn resolve_required(&self, name: &str) -> Result<&Fuel> {
        self.resolve(name)
            .with_context(|| format!("Unknown fuel type '{name}'"))
    }

    /// Get a fuel by ID
    pub fn get(&self, id: &FuelID) -> Option<&Fuel> {
        self.fuels.get(id)
    }

    /// Iterate over the fuels
    pub fn iter(&self) -> impl Iterator<Item = &Fuel> {
        self.fuels.values()
    }

    /// The projected growth in consumption of the fuel for the given year, relative to the base
    /// year.
    ///
    /// Fuels with no growth category, or with no growth data for `year`, do not grow.
    pub fn growth_factor(&self, fuel: &Fuel, year: u32) -> Dimensionless {
        fuel.growth_category
            .as_ref()
            .and_then(|category| self.growth.get(&(category.clone(), year)))
            .copied()
            .unwrap_or(Dimensionless(1.0))
    }
}
