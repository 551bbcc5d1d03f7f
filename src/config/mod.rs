//! Configuration and path management for liftlog

pub mod paths;
pub mod settings;

pub use paths::LiftlogPaths;
pub use settings::Settings;
