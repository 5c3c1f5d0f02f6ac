pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod outputs;
pub mod pipeline;
pub mod quality;
pub mod types;
