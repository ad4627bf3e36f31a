pub mod models;
pub mod scoring;
pub mod services;
