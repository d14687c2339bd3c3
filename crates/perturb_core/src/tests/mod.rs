//! Scenario tests for the execution and aggregation pipeline
//!
//! Tests are organized by topic:
//! - `binder` - Node matrices bound onto nominal parameter values
//! - `dispatch` - Worker pool ordering, progress and display sessions
//! - `display` - Xvfb startup checks and the `DISPLAY` handoff to models
//! - `regularity` - Length checks for non-adaptive outputs
//! - `interpolate` - Merging adaptive outputs onto a shared time base
//! - `assemble` - Folding results into the aggregate dataset
//! - `runner` - End-to-end runs through `RunModel`

mod fixtures;

mod dispatch;
mod display;
mod interpolate;
