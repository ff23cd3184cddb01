pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod format;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod scorer;
pub mod table;
pub mod youtube;
