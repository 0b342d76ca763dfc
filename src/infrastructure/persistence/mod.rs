//! Persistence implementations

pub mod memory;

pub use memory::{
    InMemoryCallRepository, InMemoryMessageRepository, InMemoryRoomRepository,
    InMemoryUserRepository,
};
