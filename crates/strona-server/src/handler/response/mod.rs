//! Response types for HTTP handlers.

mod authentications;
mod errors;
mod monitors;

pub use authentications::*;
pub use errors::*;
pub use monitors::*;
