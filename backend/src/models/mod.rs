//! Database models for the Estoque platform
//!
//! Row types map 1:1 onto table columns; the `*Detail` types are the joined
//! shapes returned by the API.

pub mod category;
pub mod company;
pub mod movement;
pub mod product;
pub mod user;

pub use category::*;
pub use company::*;
pub use movement::*;
pub use product::*;
pub use user::*;
