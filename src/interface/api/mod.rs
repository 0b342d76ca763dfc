//! API interface implementations

pub mod call_dto;
pub mod call_handler;
pub mod metrics_handler;
pub mod router;

pub use call_handler::AppState;
pub use metrics_handler::init_metrics;
pub use router::build_router;
