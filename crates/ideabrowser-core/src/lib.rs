//! IdeaBrowser Core Library
//!
//! Request validation, configuration, and the process bridge that runs the
//! external analysis collaborator.

pub mod analysis;
pub mod bridge;
pub mod config;
pub mod error;

pub use analysis::model::{AnalysisRequest, AnalysisResult};
pub use analysis::parse_request;
pub use bridge::{AnalysisRunner, ProcessBridge};
pub use config::{BridgeConfig, ServerConfig};
pub use error::{IdeaError, IdeaResult};
