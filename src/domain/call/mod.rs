//! Call bounded context - manages the lifecycle of calls

pub mod entity;
pub mod repository;
pub mod value_object;

pub use entity::{CallKind, CallMessages, CallParticipant, CallRecord};
pub use repository::CallRepository;
pub use value_object::{CallInstructions, CallStatus, CallType};
