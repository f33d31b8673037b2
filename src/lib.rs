//! # Tile Dump
//!
//! Fixture generators for vector tile development.
//!
//! ## Current features
//!
//! Two command line tools share this crate:
//!
//! * `tile-dump` queries every layer of a TileMill source (such as OpenMapTiles data)
//!   in PostGIS for a single tile, reprojects the features to EPSG:3857 web mercator
//!   and writes them to a Rust file as one inline geometry literal.
//! * `wkt2rs` turns WKT rows exported from a spatial database
//!   (`psql -t -c "select 'CoastLine', ST_AsText(geom) ..."`) into the same kind of
//!   literal.
//!
//! The literals use a small brace grammar (see [`literal`]) which the [`geom!`] macro
//! evaluates, so the generated fixtures compile as-is in tests:
//!
//! ```
//! use tile_dump::{geom, parse_wkt, to_literal};
//!
//! let geometry = parse_wkt("MULTIPOINT ((10 40), (40 30))").unwrap();
//! assert_eq!("MultiPoint{{10.0, 40.0}, {40.0, 30.0}}", to_literal(&geometry).unwrap());
//! assert_eq!(geometry, geom!(MultiPoint{{10.0, 40.0}, {40.0, 30.0}}));
//! ```
//!
//! ## Known Limitations
//!
//! Only 2D geometries are supported. Reprojection is limited to EPSG:4326 and
//! EPSG:3857 sources, which covers the usual PostGIS imports of OSM data.

#![deny(warnings)]

// TODO: remove once async fn in traits can be used with Send bounds
use async_trait::async_trait;

pub use geo_types;

pub mod dump;
pub mod error;
pub mod fixture;
pub mod literal;
pub mod reproject;
mod scanner;
pub mod tile;
pub mod tm2;
pub mod wkt;

pub use error::Error;
pub use literal::{parse_literal, to_literal, write_literal};
pub use tile::{TileCoord, TileFormat};
pub use self::wkt::{parse_ewkt, parse_wkt};

use std::ops::RangeInclusive;

use geo_types::{Coord, Geometry};

/// A single geometry returned by a [`TileSource`], in the projection it is stored in.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub layer: String,
    pub srid: i32,
    pub geometry: Geometry<f64>,
}

/// The provider abstraction: anything that can list the features of a layer
/// intersecting a tile.
#[async_trait]
pub trait TileSource: Sized {
    /// Name of the source, used to name generated fixtures.
    fn name(&self) -> &str;

    /// Layer ids in the order they are rendered.
    fn layer_ids(&self) -> Vec<&str>;

    /// Zoom levels the source is meant to be rendered at.
    fn zoom_range(&self) -> RangeInclusive<u8> {
        0..=tile::MAX_ZOOM
    }

    /// Fetches the features of `layer` for a slippy map tile in XYZ format.
    async fn tile_features(&self, layer: &str, tile: TileCoord) -> Result<Vec<Feature>, Error>;
}

/// Tile extent in EPSG:3857 metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Computes the web mercator extent of a tile, grown by `buffer_size` pixels of a
/// `pixel_scale` wide tile on every side.
pub fn get_epsg_3857_tile_bounds(
    pixel_scale: i64,
    zoom: u8,
    x: u32,
    y: u32,
    buffer_size: i64,
) -> TileBounds {
    let (west, north) = slippy_map_tilenames::tile2lonlat(x, y, zoom);
    let (east, south) = slippy_map_tilenames::tile2lonlat(x + 1, y + 1, zoom);
    let north_west = reproject::lonlat_to_mercator(Coord { x: west, y: north });
    let south_east = reproject::lonlat_to_mercator(Coord { x: east, y: south });

    let buffer = (south_east.x - north_west.x) / pixel_scale as f64 * buffer_size as f64;

    TileBounds {
        west: north_west.x - buffer,
        south: south_east.y - buffer,
        east: south_east.x + buffer,
        north: north_west.y + buffer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const HALF_WORLD: f64 = 20_037_508.342_789_244;

    #[test]
    fn test_world_tile_bounds() {
        let bounds = get_epsg_3857_tile_bounds(256, 0, 0, 0, 0);
        assert_approx_eq!(-HALF_WORLD, bounds.west, 1e-3);
        assert_approx_eq!(-HALF_WORLD, bounds.south, 1e-3);
        assert_approx_eq!(HALF_WORLD, bounds.east, 1e-3);
        assert_approx_eq!(HALF_WORLD, bounds.north, 1e-3);
    }

    #[test]
    fn test_quadrant_tile_bounds() {
        // north east quarter of the world
        let bounds = get_epsg_3857_tile_bounds(256, 1, 1, 0, 0);
        assert_approx_eq!(0.0, bounds.west, 1e-3);
        assert_approx_eq!(0.0, bounds.south, 1e-3);
        assert_approx_eq!(HALF_WORLD, bounds.east, 1e-3);
        assert_approx_eq!(HALF_WORLD, bounds.north, 1e-3);
    }

    #[test]
    fn test_buffered_tile_bounds() {
        // 64 px of a 256 px tile is a quarter of the tile width
        let bounds = get_epsg_3857_tile_bounds(256, 1, 0, 1, 64);
        let quarter = HALF_WORLD / 4.0;
        assert_approx_eq!(-HALF_WORLD - quarter, bounds.west, 1e-3);
        assert_approx_eq!(-HALF_WORLD - quarter, bounds.south, 1e-3);
        assert_approx_eq!(quarter, bounds.east, 1e-3);
        assert_approx_eq!(quarter, bounds.north, 1e-3);
    }
}
