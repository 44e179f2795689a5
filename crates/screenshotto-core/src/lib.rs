//! screenshotto-core: Screenshot capture, naming and scheduling
//!
//! This library holds everything behind the `screenshotto` command: the
//! forgiving config file, filename templates, whole-desktop capture, the
//! schedule file and its run loop, and the logging pipeline.

pub mod capture;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod naming;
pub mod schedule;
pub mod util;
pub mod writer;
