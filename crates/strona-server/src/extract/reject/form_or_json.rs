//! Body extractor accepting either a urlencoded form or JSON.

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::{Form, Json};
use crate::handler::Error;

/// Deserializes the body as JSON when the request says so, and as an
/// `application/x-www-form-urlencoded` form otherwise.
///
/// Any other content type is rejected by the form branch with a 400.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct FormOrJson<T>(pub T);

impl<T> FormOrJson<T> {
    /// Consumes the wrapper and returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

fn has_json_content_type(req: &Request) -> bool {
    let Some(content_type) = req.headers().get(CONTENT_TYPE) else {
        return false;
    };

    content_type
        .to_str()
        .ok()
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if has_json_content_type(&req) {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}
