//! # Worked example
//! Local population density estimates for a handful of query locations,
//! see the test at the bottom of this file.
pub mod population_density;
