pub mod config;
pub mod error;
pub mod export;
pub mod feed;
pub mod models;
pub mod report;
pub mod series;
pub mod simulation;
pub mod solver;
pub mod stats;

pub use error::RiskError;
pub use models::ewma::EwmaEstimator;
pub use models::garch::{Garch11, GarchParams, VolatilityForecast};
pub use report::RiskReport;
pub use series::{PricePoint, ReturnSeries};
pub use simulation::{MonteCarloRiskEngine, SimulationResult, SimulationSpec};
