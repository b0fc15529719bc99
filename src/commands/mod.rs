// ABOUTME: Command module exports
// ABOUTME: Organizes all CLI-callable commands by category

pub mod connection;
pub mod discovery;
pub mod profiles;

pub use connection::*;
pub use discovery::*;
pub use profiles::*;
