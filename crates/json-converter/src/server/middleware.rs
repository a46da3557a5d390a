//! Registration of a [`JsonConverter`] with an axum router.
//!
//! The converter runs as the outermost layer, ahead of every handler and
//! inner layer. It is placed in the request extensions for `Json<T>`
//! extraction and scoped around the inner service so `Json<T>` responses are
//! written with it.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{self as axum_mw, Next},
    response::Response,
    Router,
};

use super::extract::with_registered;
use crate::converter::JsonConverter;

/// Install `converter` on `router`.
pub fn register<S>(router: Router<S>, converter: Arc<JsonConverter>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(axum_mw::from_fn_with_state(converter, convert_messages))
}

/// Extension methods for registering a converter on a [`Router`].
pub trait RouterExt<S> {
    fn with_json_converter(self, converter: Arc<JsonConverter>) -> Self;
}

impl<S> RouterExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_json_converter(self, converter: Arc<JsonConverter>) -> Self {
        register(self, converter)
    }
}

/// Axum middleware that routes JSON bodies through the registered converter.
pub async fn convert_messages(
    State(converter): State<Arc<JsonConverter>>,
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut().insert(converter.clone());
    with_registered(converter, next.run(req)).await
}
