pub mod alarm;
pub mod behavior;
pub mod capture;
pub mod config;
pub mod detector;
pub mod model;
pub mod save;
pub mod tone;

pub use behavior::Behavior;
pub use config::DetectorConfig;
