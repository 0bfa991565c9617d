//! Domain models for the dental-lab client.
//!
//! Everything except [`Role`] and [`Permission`] is owned by the backend;
//! the client holds transient copies only.

mod activity;
mod catalog;
mod clinic;
mod inventory;
mod laborzettel;
mod patient;
mod requests;
mod role;
mod user;

pub use activity::*;
pub use catalog::*;
pub use clinic::*;
pub use inventory::*;
pub use laborzettel::*;
pub use patient::*;
pub use requests::*;
pub use role::*;
pub use user::*;
