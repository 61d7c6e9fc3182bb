//! Helpers shared by the Torrust relay tests.
pub mod logging;
pub mod recorder;
