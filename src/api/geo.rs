use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::actor::Actor;
use crate::core::geo::{classify, Coordinate, GeoCheck};

#[derive(Deserialize, ToSchema)]
pub struct ClassifyRequest {
    /// Recorded position, typically the device fix
    pub a: Option<Coordinate>,
    /// Reference position, typically the site location
    pub b: Option<Coordinate>,
}

/* =========================
Standalone compliance check
========================= */
/// Swagger doc for classify_positions endpoint
#[utoipa::path(
    post,
    path = "/api/geo/classify",
    request_body(
        content = ClassifyRequest,
        description = "Two optional positions to compare",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Distance and compliance class", body = GeoCheck),
        (status = 400, description = "Malformed coordinates", body = Object, example = json!({
            "message": "invalid input: latitude 95 out of range"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Geo"
)]
pub async fn classify_positions(
    _actor: Actor,
    payload: web::Json<ClassifyRequest>,
) -> actix_web::Result<impl Responder> {
    let check = classify(payload.a, payload.b)?;
    Ok(HttpResponse::Ok().json(check))
}
