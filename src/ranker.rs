//! Proximity ranking: distance to every candidate, radius filter, stable sort.
//!
//! Flow:  validate query + radius → haversine per candidate → round to 0.1 km
//!        → keep `distance <= radius` → stable ascending sort
//!
//! The ranker is a pure function over its inputs. Where candidates come from
//! is the caller's business (see `catalog`).

use serde::Serialize;
use std::fmt;

use crate::geo::{haversine_km, round_km, GeoPoint};

/// Radius used when the caller does not give one.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Anything with an identity and a position on the map.
pub trait Located {
    fn id(&self) -> String;
    fn location(&self) -> GeoPoint;
}

impl<T: Located + ?Sized> Located for &T {
    fn id(&self) -> String {
        (**self).id()
    }

    fn location(&self) -> GeoPoint {
        (**self).location()
    }
}

/// A candidate annotated with its distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult<T> {
    #[serde(flatten)]
    pub entity: T,
    /// Great-circle distance in km, rounded to one decimal.
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Which point an invalid coordinate belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointRef {
    Query,
    Candidate(String),
}

impl fmt::Display for PointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query point"),
            Self::Candidate(id) => write!(f, "candidate '{}'", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateField {
    Latitude,
    Longitude,
}

impl fmt::Display for CoordinateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latitude => write!(f, "latitude (-90..90)"),
            Self::Longitude => write!(f, "longitude (-180..180)"),
        }
    }
}

/// Input rejected by the ranker.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NearbyError {
    #[error("Invalid {field} for {point}: {value}")]
    InvalidCoordinate {
        point: PointRef,
        field: CoordinateField,
        value: f64,
    },
    #[error("Invalid radius: {0} (must be a finite, non-negative number of km)")]
    InvalidRadius(f64),
}

/// Rank `candidates` by distance from `query`, keeping those within `radius_km`.
///
/// Distances are rounded to 0.1 km before the radius comparison, so a
/// candidate reported at 3.4 km is kept for a 3.4 km radius. Equal distances
/// keep their input order.
pub fn find_nearby<T, I>(
    query: GeoPoint,
    candidates: I,
    radius_km: f64,
) -> Result<Vec<RankedResult<T>>, NearbyError>
where
    I: IntoIterator<Item = T>,
    T: Located,
{
    query.validate(PointRef::Query)?;
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(NearbyError::InvalidRadius(radius_km));
    }

    let mut ranked = Vec::new();
    for entity in candidates {
        let point = entity.location();
        point.validate(PointRef::Candidate(entity.id()))?;
        let distance_km = round_km(haversine_km(query, point));
        ranked.push(RankedResult { entity, distance_km });
    }

    ranked.retain(|r| r.distance_km <= radius_km);
    // sort_by is stable: ties stay in input order
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    Ok(ranked)
}
