pub mod assemble;
pub mod config;
pub mod error;
pub mod extract;
pub mod timeline;
pub mod validation;

pub mod types;

pub use crate::config::{Settings, TimelineConfig};
pub use crate::error::{ConfigError, TimelineError};
pub use crate::timeline::{build_timeline, TimelineRequest};
