pub mod progress_config;

pub use progress_config::ProgressConfig;
