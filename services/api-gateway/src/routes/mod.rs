use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::*, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/geocode", get(geocode).fallback(method_not_allowed))
        .route(
            "/places/autocomplete",
            post(places_autocomplete).fallback(method_not_allowed),
        )
        .route(
            "/identity/inquiries",
            post(create_inquiry).fallback(method_not_allowed),
        )
        .route("/upload", post(upload_file).fallback(method_not_allowed))
        .route("/property", get(property_lookup).fallback(method_not_allowed))
}
