//! # Stockroom Server
//!
//! An axum router exposing owner-scoped asset CRUD:
//!
//! | Method | Path | |
//! |---|---|---|
//! | POST | `/assets` | create, 201 |
//! | GET | `/assets?ownerId&category&limit&offset` | list, newest first |
//! | GET | `/assets/{id}` | read one |
//! | PATCH | `/assets/{id}` | partial update |
//! | DELETE | `/assets/{id}` | hard delete, 204 |
//! | POST/GET | `/assets/{id}/image` | attach / download an image |
//! | POST/GET | `/assets/{id}/records` | tags, status and activity entries |
//!
//! Every JSON response uses the envelope in [`response`].

mod api;

pub mod auth;
pub mod error;
pub mod extract;
pub mod jwt;
pub mod response;
pub mod secrets;
pub mod server;
pub mod state;

pub use server::*;

pub mod prelude {
    pub use crate::auth::*;
    pub use crate::jwt::*;
    pub use crate::response::Envelope;
    pub use crate::secrets::*;
    pub use crate::server::{StockroomServer, StockroomServerConfig};
    pub use crate::state::*;
}
