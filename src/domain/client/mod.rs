//! Client registry - who can place and receive calls

pub mod entity;
pub mod repository;

pub use entity::Client;
pub use repository::ClientRepository;
