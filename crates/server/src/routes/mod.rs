pub mod analysis_ws;
pub mod games;
pub mod health;
