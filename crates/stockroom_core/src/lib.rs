pub mod access;
pub mod asset;
pub mod error;
pub mod input;
pub mod records;
pub mod traits;
pub mod validation;

pub mod prelude {
    pub use super::access::*;
    pub use super::asset::*;
    pub use super::error::*;
    pub use super::input::*;
    pub use super::records::*;
    pub use super::traits::*;
}
