//! Drop-in replacements for the axum body extractors.
//!
//! Each one turns the axum rejection into a 400 [`Error`] with a short client
//! message; the raw parser output is kept as logged context.
//!
//! [`Error`]: crate::handler::Error

mod enhanced_form;
mod enhanced_json;
mod form_or_json;

pub use self::enhanced_form::Form;
pub use self::enhanced_json::Json;
pub use self::form_or_json::FormOrJson;

/// Keeps parser messages to a single bounded line.
fn sanitize_error_message(message: &str) -> String {
    let lines = message.lines().take(3).collect::<Vec<_>>();
    lines.join(" ").chars().take(200).collect()
}
