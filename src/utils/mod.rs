/// Logger setup
pub mod logger;
