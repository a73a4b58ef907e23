pub mod assistant;
pub mod credit_gate;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod services;
pub mod traits;
