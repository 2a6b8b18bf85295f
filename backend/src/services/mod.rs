//! Business logic services for the Estoque platform

pub mod auth;
pub mod category;
pub mod company;
pub mod movement;
pub mod product;
pub mod user;

pub use auth::AuthService;
pub use category::CategoryService;
pub use company::CompanyService;
pub use movement::{MovementError, MovementService, NewMovement};
pub use product::ProductService;
pub use user::UserService;
