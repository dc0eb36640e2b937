//! Repository implementations, one per entity

pub mod message;
pub mod order;
pub mod product;
pub mod user;

pub use message::MessageRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;
