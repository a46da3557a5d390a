//! `Json<T>`: request extractor and response body backed by [`JsonConverter`].
//!
//! Extraction uses the converter the registration layer put into the request
//! extensions. Responses are written with the converter the layer scoped
//! around the handler. Without a registered converter both directions use
//! `JsonConverter::default()`.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json as AxumJson;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::converter::JsonConverter;
use crate::errors::JsonError;

const APPLICATION_JSON: &str = "application/json";

/// A JSON request or response body converted by the registered [`JsonConverter`].
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = JsonError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let converter = req
            .extensions()
            .get::<Arc<JsonConverter>>()
            .cloned()
            .unwrap_or_default();

        if converter.config().parse_options().require_content_type
            && !is_json_content_type(req.headers())
        {
            return Err(JsonError::UnsupportedMediaType);
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| JsonError::Body {
                status: rejection.status().as_u16(),
                message: rejection.body_text(),
            })?;

        converter.read_slice(&bytes).map(Json)
    }
}

/// `application/json` or any `application/*+json` type.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

tokio::task_local! {
    /// Converter registered on the router handling the current request.
    static REGISTERED: Arc<JsonConverter>;
}

/// Run `handler` with `converter` as the one `Json<T>` responses are written with.
pub(crate) async fn with_registered<F: Future>(converter: Arc<JsonConverter>, handler: F) -> F::Output {
    REGISTERED.scope(converter, handler).await
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize + 'static,
{
    fn into_response(self) -> Response {
        let rendered = REGISTERED
            .try_with(|converter| converter.write_to_vec(&self.0))
            .unwrap_or_else(|_| JsonConverter::default().write_to_vec(&self.0));
        match rendered {
            Ok(bytes) => (
                [(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))],
                bytes,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response body: {}", e);
                e.into_response()
            }
        }
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            AxumJson(json!({
                "success": false,
                "error": self.to_string()
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(content_type: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        h
    }

    #[test]
    fn recognizes_json_content_types() {
        assert!(is_json_content_type(&headers("application/json")));
        assert!(is_json_content_type(&headers("application/json; charset=utf-8")));
        assert!(is_json_content_type(&headers("Application/JSON")));
        assert!(is_json_content_type(&headers("application/problem+json")));
    }

    #[test]
    fn rejects_other_content_types() {
        assert!(!is_json_content_type(&HeaderMap::new()));
        assert!(!is_json_content_type(&headers("text/plain")));
        assert!(!is_json_content_type(&headers("text/json")));
        assert!(!is_json_content_type(&headers("application/jsonx")));
    }

    #[test]
    fn error_response_uses_status_and_message() {
        let response = JsonError::UnsupportedMediaType.into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let response = JsonError::EmptyMessage.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[derive(Debug)]
    struct Opaque;

    impl Serialize for Opaque {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("opaque"))
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn response_outside_a_registered_scope_uses_default_converter() {
        let response = Json(json!({"a": [1, 2]})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            APPLICATION_JSON
        );
        assert_eq!(body_text(response).await, r#"{"a":[1,2]}"#);
    }

    #[tokio::test]
    async fn response_inside_a_registered_scope_uses_that_converter() {
        let converter = JsonConverter::builder()
            .config(
                crate::config::JsonConfig::builder()
                    .to_json::<Opaque, _>(|_| Ok(json!({"ok": true})))
                    .build(),
            )
            .build();

        let response = with_registered(Arc::new(converter), async {
            Json(Opaque).into_response()
        })
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"ok":true}"#);

        let response = Json(Opaque).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
