//! `shoestock-core` — catalog domain building blocks.
//!
//! This crate contains **pure domain** primitives (no storage concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{FieldError, IdParseError};
pub use id::{BrandId, CategoryId, ShoeId, SkuId};
