use crate::error::Error;

use std::f64::consts::PI;

use geo::MapCoords;
use geo_types::{Coord, Geometry};

/// Radius of the sphere used by EPSG:3857.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which web mercator becomes a square, `atan(sinh(π))` in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

pub const WEB_MERCATOR: i32 = 3857;
pub const WGS84: i32 = 4326;
const GOOGLE_MERCATOR: i32 = 900_913;

/// Projects a longitude/latitude pair in degrees onto web mercator metres.
pub fn lonlat_to_mercator(coord: Coord<f64>) -> Coord<f64> {
    let latitude = coord.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    Coord {
        x: EARTH_RADIUS * coord.x.to_radians(),
        y: EARTH_RADIUS * (PI / 4.0 + latitude.to_radians() / 2.0).tan().ln(),
    }
}

/// Maps a geometry stored in `srid` into EPSG:3857.
pub fn to_web_mercator(srid: i32, geometry: Geometry<f64>) -> Result<Geometry<f64>, Error> {
    match srid {
        WEB_MERCATOR | GOOGLE_MERCATOR => Ok(geometry),
        WGS84 => Ok(geometry.map_coords(lonlat_to_mercator)),
        other => Err(Error::UnsupportedSrid(other)),
    }
}
