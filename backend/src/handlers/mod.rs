//! HTTP handlers for the Estoque API

use axum::Json;
use axum_extra::extract::WithRejection;

use crate::error::AppError;

pub mod auth;
pub mod category;
pub mod company;
pub mod health;
pub mod movement;
pub mod product;
pub mod user;

pub use auth::*;
pub use category::*;
pub use company::*;
pub use health::*;
pub use movement::*;
pub use product::*;
pub use user::*;

/// JSON request body whose parse failures are reported as [`AppError`]
pub type JsonBody<T> = WithRejection<Json<T>, AppError>;
