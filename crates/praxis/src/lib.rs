pub mod assistant;
pub mod config;
pub mod conversation;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod planner;
pub mod scoring;
pub mod telemetry;
