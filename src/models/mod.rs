//! Data models for the Horas application.
//!
//! Wire format is camelCase JSON, matching the frontend interfaces exactly.

mod convocation;
mod draft;
mod message;
mod operation;
mod slot;
mod tco;
mod user;
mod version;

pub use convocation::*;
pub use draft::*;
pub use message::*;
pub use operation::*;
pub use slot::*;
pub use tco::*;
pub use user::*;
pub use version::*;
