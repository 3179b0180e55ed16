pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use commentator::engine::ManagedEngine;
use commentator::gemini::GeminiClient;
use commentator::live::Analyst;

/// Engine and model shared by every live connection.
pub type SharedAnalyst = Arc<Analyst<ManagedEngine, GeminiClient>>;
