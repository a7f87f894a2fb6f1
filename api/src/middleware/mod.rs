pub mod cors;
pub mod security;

pub use cors::*;
pub use security::*;
