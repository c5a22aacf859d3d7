pub mod batch;
pub mod cli;
pub mod codec;
pub mod config;
pub mod discovery;
pub mod edit_gate;
pub mod engine;
pub mod generate;
pub mod layout;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod sink;
pub mod util;
