//! End-to-end tests for the `perturb` front end
//!
//! - `study_run` - Built-in models run from YAML studies

mod study_run;
