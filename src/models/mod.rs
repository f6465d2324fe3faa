pub mod ewma;
pub mod garch;

pub use ewma::EwmaEstimator;
pub use garch::{Garch11, GarchParams, VolatilityForecast};
