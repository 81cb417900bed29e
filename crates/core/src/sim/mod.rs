//! Driving a full run: loading an image, executing it under a chosen cache
//! replacement policy, and reporting hit-rate statistics.
//!
//! Narrowed from the teacher's `sim` module (which owned kernel-image
//! loading and a `PipelineDispatch`-driven `Simulator`): here there is one
//! register+fragment image format and one single-issue execution loop, so
//! loading, running, and reporting are split into three small modules
//! instead of one `Simulator` god-object.

/// Parsing the binary input image into registers and RAM fragments.
pub mod image;

/// Formatting hit-rate reports for the CLI.
pub mod report;

/// Running one policy's worth of simulation against a fresh cache and RAM.
pub mod simulator;

pub use image::{Fragment, Image, ImageError, RegisterImage};
pub use report::{format_header, format_rate_line};
pub use simulator::{run_policy, PolicyKind, RunReport, RunStats, WindowRequest};
