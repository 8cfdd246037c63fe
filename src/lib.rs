pub mod actions;
pub mod classifier;
pub mod gesture;
pub mod pipeline;
pub mod recording;
pub mod replay;
pub mod settings;
pub mod types;
