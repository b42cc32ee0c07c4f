//! Registration body extractor accepting JSON or HTML form encoding.

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};

use crate::error::Error;
use crate::registry::RegistrationRequest;

use super::error::ApiError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A registration body, decoded according to its `Content-Type`.
///
/// Form-encoded bodies are decoded as forms; anything else must be JSON.
#[derive(Debug)]
pub struct RegistrationPayload(pub RegistrationRequest);

impl<S> FromRequest<S> for RegistrationPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(body) = Form::<RegistrationRequest>::from_request(req, state)
                .await
                .map_err(|rejection| Error::invalid_request(rejection.body_text()))?;
            Ok(Self(body))
        } else {
            let Json(body) = Json::<RegistrationRequest>::from_request(req, state)
                .await
                .map_err(|rejection| Error::invalid_request(rejection.body_text()))?;
            Ok(Self(body))
        }
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE))
}
