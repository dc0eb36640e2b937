//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod message;
pub mod order;
pub mod product;
pub mod user;

// Re-export commonly used models
pub use message::{ChatMessage, MessageRole};
pub use order::{CreateOrderRequest, Order, OrderItem, OrderStatus, UpdateOrderDetails};
pub use product::{CreateProductRequest, Product, UpdateProductRequest};
pub use user::{CreateUserRequest, User};
