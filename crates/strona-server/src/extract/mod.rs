//! Request extractors that reject with the server's JSON error body.

mod reject;

pub use self::reject::{Form, FormOrJson, Json};
