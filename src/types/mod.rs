// IR Hub shared type definitions
// Each submodule defines types used across the service.

pub mod bookmark;
pub mod caller;
pub mod category;
pub mod comment;
pub mod errors;
pub mod page;
pub mod settings;
pub mod user;
pub mod vote;
