pub mod lags;
pub mod manager;
pub mod traits;

pub use lags::LagConfig;
pub use manager::{AppConfig, ConfigManager};
pub use traits::ConfigSection;
