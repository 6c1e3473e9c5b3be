//! Conversion of source activity (emissions, fuel use) into energy and then hydrogen demand.
pub mod industry;
pub mod projections;
pub mod transport;
