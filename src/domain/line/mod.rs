//! Lines - named channels that own at most one bridge conference

pub mod entity;
pub mod repository;

pub use entity::Line;
pub use repository::LineRepository;
