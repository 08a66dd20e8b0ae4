//! Shared coordinate and frame utilities

pub mod coordinates;

pub use coordinates::{
    EARTH_RADIUS_KM, Geodetic, MAX_GEOCENTRIC_KM, MIN_GEOCENTRIC_KM, ScaleMode, ecef_to_geodetic,
    eci_to_ecef_km, eci_to_geodetic, gmst_rad, scene_to_lat_lon, transform, visual_altitude_km,
};
