pub mod args;
pub mod config;
mod error;
pub mod loader;
mod pipeline;

pub use error::Error;
pub use pipeline::run;
