//! Help-point endpoint logic: creation and the nearby query.
//!
//! Handlers in [`crate::api`] stay thin; the request-to-store translation
//! and the response shaping live here so they can be exercised directly
//! against a [`Database`].

use nearbyaid_shared::constants::DEFAULT_MAX_DISTANCE_M;
use nearbyaid_shared::error::ValidationReason;
use nearbyaid_shared::protocol::{CreateAidRequest, HelpPointView, NearbyResponse};
use nearbyaid_shared::validation::{parse_number, validate_new_aid};
use nearbyaid_shared::{GeoPoint, ValidationError};
use nearbyaid_store::{Database, NewHelpPoint};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ServerError;

/// Raw query string of `GET /api/aid/nearby`.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    #[serde(rename = "maxDistance")]
    pub max_distance: Option<String>,
}

/// A parsed radius query. Coordinates are not range-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub center: GeoPoint,
    pub max_distance_m: f64,
}

impl NearbyQuery {
    pub fn from_params(params: &NearbyParams) -> Result<Self, ValidationError> {
        let lat = required(params.lat.as_deref(), "lat")?;
        let lng = required(params.lng.as_deref(), "lng")?;

        let lat = parse_number("lat", lat)?;
        let lng = parse_number("lng", lng)?;
        let max_distance_m = match params.max_distance.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_MAX_DISTANCE_M,
            Some(raw) => parse_number("maxDistance", raw)?,
        };
        if max_distance_m < 0.0 {
            return Err(ValidationError::new(
                "maxDistance",
                ValidationReason::OutOfRange,
            ));
        }

        Ok(Self {
            center: GeoPoint::from_lat_lng(lat, lng),
            max_distance_m,
        })
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::missing(field)),
    }
}

/// Run one radius query and resolve every publisher to its public summary.
pub fn find_nearby(db: &Database, query: &NearbyQuery) -> Result<NearbyResponse, ServerError> {
    const CONTEXT: &str = "Server error during nearby search";

    let points = db
        .find_near(&query.center, query.max_distance_m)
        .map_err(|e| ServerError::from_store(CONTEXT, e))?;

    let publisher_ids: Vec<Uuid> = points.iter().map(|p| p.publisher_id).collect();
    let publishers = db
        .publishers_for(&publisher_ids)
        .map_err(|e| ServerError::from_store(CONTEXT, e))?;

    let data: Vec<HelpPointView> = points
        .into_iter()
        .filter_map(|point| match publishers.get(&point.publisher_id) {
            Some(publisher) => Some(point.into_view(publisher.clone())),
            None => {
                warn!(id = %point.id, "help point has no publisher, skipping");
                None
            }
        })
        .collect();

    Ok(NearbyResponse {
        success: true,
        count: data.len(),
        data,
    })
}

/// Validate and store a help point on behalf of `publisher`.
pub fn create_aid(
    db: &Database,
    publisher: Uuid,
    req: &CreateAidRequest,
) -> Result<HelpPointView, ServerError> {
    const CONTEXT: &str = "Server error while creating help point";

    let draft = validate_new_aid(req)?;
    let point = db
        .create_help_point(&NewHelpPoint {
            draft,
            publisher_id: publisher,
        })
        .map_err(|e| ServerError::from_store(CONTEXT, e))?;
    let owner = db
        .get_user(publisher)
        .map_err(|e| ServerError::from_store(CONTEXT, e))?;

    info!(
        id = %point.id,
        category = %point.category,
        publisher = %publisher,
        "Help point created"
    );

    Ok(point.into_view(owner.summary()))
}
