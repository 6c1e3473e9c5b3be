//! Estimates hourly hydrogen demand from on-road transport and heavy industry by load zone.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod allocation;
pub mod cli;
pub mod combine;
pub mod conversion;
pub mod demand;
pub mod facility;
pub mod fuel;
pub mod grid;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod region;
pub mod settings;
pub mod shape;
pub mod temporal;
pub mod units;
pub mod warning;
pub mod year;
pub mod zone;

#[cfg(test)]
mod fixture;

/// Get the folder where program configuration files are stored
pub fn get_h2demand_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No config dir on this platform, so use the working directory
        return PathBuf::new();
    };
    config_dir.push("h2demand");

    config_dir
}
