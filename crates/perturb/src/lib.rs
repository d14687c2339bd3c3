//! `perturb` command-line front end
//!
//! Loads a YAML study, samples the uncertain parameters, runs one of the
//! built-in models through `perturb_core` and writes the aggregated data.

pub mod logging;
pub mod models;
pub mod report;
pub mod study;
pub mod util;

pub use logging::init_logging;
pub use study::StudyFile;

#[cfg(test)]
mod tests;
