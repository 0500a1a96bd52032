use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::core::error::CoreError;

/// Mean Earth radius in meters for the great-circle distance.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Within this distance of the site a position counts as on-site.
const ON_SITE_M: f64 = 250.0;
/// Between `ON_SITE_M` and this limit the position is flagged but tolerated.
const WARN_LIMIT_M: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    #[schema(example = 45.0)]
    pub lat: f64,
    #[schema(example = 9.0)]
    pub lng: f64,
}

impl Coordinate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(CoreError::invalid("coordinates must be finite numbers"));
        }
        if self.lat.abs() > 90.0 {
            return Err(CoreError::invalid(format!(
                "latitude {} out of range",
                self.lat
            )));
        }
        if self.lng.abs() > 180.0 {
            return Err(CoreError::invalid(format!(
                "longitude {} out of range",
                self.lng
            )));
        }
        Ok(())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceClass {
    Ok,
    Warn,
    Violation,
    /// One or both positions were never captured; there is no distance to
    /// compare against the thresholds.
    NoGps,
}

/// Outcome of comparing two positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoCheck {
    #[schema(example = "OK")]
    pub class: ComplianceClass,
    /// Meters between the two positions; absent when the class is `NO_GPS`.
    #[schema(example = 180.5, nullable = true)]
    pub distance_m: Option<f64>,
}

/// Classify the distance between two optional positions.
///
/// Missing positions degrade to `NO_GPS` rather than erroring; malformed
/// ones are rejected up front so a garbage fix never reaches the buckets.
pub fn classify(a: Option<Coordinate>, b: Option<Coordinate>) -> Result<GeoCheck, CoreError> {
    if let Some(coord) = &a {
        coord.validate()?;
    }
    if let Some(coord) = &b {
        coord.validate()?;
    }

    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Ok(GeoCheck {
                class: ComplianceClass::NoGps,
                distance_m: None,
            });
        }
    };

    let distance = haversine_m(a, b);
    let class = if distance < ON_SITE_M {
        ComplianceClass::Ok
    } else if distance <= WARN_LIMIT_M {
        ComplianceClass::Warn
    } else {
        ComplianceClass::Violation
    };

    Ok(GeoCheck {
        class,
        distance_m: Some(distance),
    })
}

/// Haversine great-circle distance in meters.
fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);

    // h can creep past 1.0 on antipodal rounding; clamp before asin
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}
