pub mod pipeline;
pub mod query;
pub mod render;
