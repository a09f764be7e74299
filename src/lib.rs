pub mod catalog;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod prompts;

// Layered boundaries: use cases over ports, adapters in infra
pub mod app;
pub mod infra;

pub use app::{Clerk, ClerkPorts};
pub use config::AppConfig;
pub use error::{ClerkError, Result};
