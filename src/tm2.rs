/// TileMill Layer Source YAML Format
///
/// Further reading: https://tilemill-project.github.io/tilemill/docs/manual/adding-layers/
use crate::error::Error;
use crate::tile::{TileCoord, MAX_ZOOM};
use crate::wkt::parse_ewkt;
use crate::{get_epsg_3857_tile_bounds, reproject, Feature, TileSource};

use std::collections::HashSet;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::Deserialize;

// TODO: remove once async fn in traits can be used with Send bounds
use async_trait::async_trait;

use futures::TryStreamExt;
use log::debug;
use sqlx::{query, PgPool, Row};

/// Size of a rendering pixel in metres, as defined by OGC WMS.
const STANDARD_PIXEL_SIZE: f64 = 0.00028;

/// A TileMill (.tm2source) data structure.
///
/// Note: The current data structure is not entirely complete. Keys tile-dump does not
/// need, such as layer descriptions, fields and `srs`, are ignored.
#[derive(Clone, Deserialize, Debug)]
pub struct TM2Source {
    pub name: String,
    pub pixel_scale: i64,
    #[serde(rename = "Layer")]
    pub layers: Vec<DataLayer>,
    pub attribution: String,
    #[serde(rename = "minzoom")]
    pub min_zoom: i64,
    #[serde(rename = "maxzoom")]
    pub max_zoom: i64,
    pub center: [f64; 3],
    pub bounds: [f64; 4],
}

#[derive(Clone, Deserialize, Debug)]
pub struct DataLayer {
    pub id: String,
    pub properties: DataLayerProperties,
    #[serde(rename = "Datasource")]
    pub source: LayerSource,
}

#[derive(Clone, Deserialize, Debug)]
pub struct LayerSource {
    /// A table name or a `(SELECT ...) AS alias` subquery.
    pub table: String,
    #[serde(default = "default_geometry_field")]
    pub geometry_field: String,
    /// SRID of the geometry column. Tile envelopes are transformed into it, and rows
    /// whose geometry carries no SRID are assumed to be in it.
    #[serde(default = "default_srid")]
    pub srid: i32,
}

fn default_geometry_field() -> String {
    String::from("geometry")
}

fn default_srid() -> i32 {
    reproject::WEB_MERCATOR
}

#[derive(Clone, Deserialize, Debug)]
pub struct DataLayerProperties {
    #[serde(rename = "buffer-size")]
    pub buffer_size: i64,
}

impl TM2Source {
    /// Constructs a new TM2Source using a TM2 format YAML string
    pub fn from(data: &str) -> Result<TM2Source, Error> {
        let mut result: TM2Source = serde_yaml::from_str(data)?;

        for layer in result.layers.iter_mut() {
            layer.source.table = layer.source.table.trim().to_owned();
        }

        Ok(result)
    }

    /// Reads a TM2Source from a `data.yml` file.
    pub fn from_file(path: &Path) -> Result<TM2Source, Error> {
        let data = fs::read_to_string(path)?;
        TM2Source::from(&data)
    }

    /// Checks the source for mistakes that would only surface as SQL errors later.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |message: String| Err(Error::InvalidSource(message));

        if self.layers.is_empty() {
            return invalid(format!("'{}' defines no layers", self.name));
        }
        if self.pixel_scale <= 0 {
            return invalid(format!("pixel_scale must be positive, got {}", self.pixel_scale));
        }
        let max_zoom = i64::from(MAX_ZOOM);
        if !(0..=max_zoom).contains(&self.min_zoom) || !(0..=max_zoom).contains(&self.max_zoom) {
            return invalid(format!("zoom levels must be between 0 and {max_zoom}"));
        }
        if self.min_zoom > self.max_zoom {
            return invalid(format!(
                "minzoom {} is greater than maxzoom {}",
                self.min_zoom, self.max_zoom
            ));
        }

        let mut ids = HashSet::new();
        for layer in &self.layers {
            if !ids.insert(layer.id.as_str()) {
                return invalid(format!("layer '{}' is defined twice", layer.id));
            }
            if layer.properties.buffer_size < 0 {
                return invalid(format!(
                    "layer '{}' has a negative buffer-size",
                    layer.id
                ));
            }
            if layer.source.table.is_empty() {
                return invalid(format!("layer '{}' has no table", layer.id));
            }
        }

        Ok(())
    }

    pub fn layer(&self, id: &str) -> Option<&DataLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }
}

impl LayerSource {
    fn from_clause(&self) -> String {
        let table = self.table.trim();
        if table.starts_with('(') && table.ends_with(')') {
            // Postgres insists on an alias for subqueries
            format!("{} AS layer", table)
        } else {
            table.to_owned()
        }
    }
}

impl DataLayer {
    /// SQL returning one EWKT geometry per row. Parameters, in order: the unbuffered
    /// tile bounds (west, south, east, north), zoom, pixel width, scale denominator and
    /// the buffered tile bounds. Rows outside the buffered tile are always filtered out,
    /// whether or not the layer SQL uses `!bbox!` itself.
    fn features_sql(&self) -> String {
        let geom = &self.source.geometry_field;
        let base_query = format!(
            "SELECT ST_AsEWKT({}) FROM {} WHERE {} IS NOT NULL AND {} && !bbox!",
            geom,
            self.source.from_clause(),
            geom,
            geom
        );

        base_query
            .replace("!bbox_nobuffer!", &self.envelope_sql(1))
            .replace("z(!scale_denominator!)", "$5")
            .replace("!pixel_width!", "$6")
            .replace("!scale_denominator!", "$7")
            .replace("!bbox!", &self.envelope_sql(8))
    }

    /// EPSG:3857 box bound to the four parameters starting at `$first`, in the layer SRID.
    fn envelope_sql(&self, first: usize) -> String {
        let envelope = format!(
            "ST_SetSRID(ST_MakeBox2D(ST_Point(${}, ${}), ST_Point(${}, ${})), {})",
            first,
            first + 1,
            first + 2,
            first + 3,
            reproject::WEB_MERCATOR
        );
        match self.source.srid {
            reproject::WEB_MERCATOR => envelope,
            srid => format!("ST_Transform({}, {})", envelope, srid),
        }
    }
}

/// Serves the layers of a [`TM2Source`] from a PostGIS database.
///
/// The database connection info present in layers is ignored; it is up to the caller
/// to point the pool at the right database.
pub struct PostgisSource {
    source: TM2Source,
    pool: PgPool,
}

impl PostgisSource {
    pub fn new(source: TM2Source, pool: PgPool) -> PostgisSource {
        PostgisSource { source, pool }
    }

    pub fn source(&self) -> &TM2Source {
        &self.source
    }
}

#[async_trait]
impl TileSource for PostgisSource {
    fn name(&self) -> &str {
        &self.source.name
    }

    fn layer_ids(&self) -> Vec<&str> {
        self.source
            .layers
            .iter()
            .map(|layer| layer.id.as_str())
            .collect()
    }

    fn zoom_range(&self) -> RangeInclusive<u8> {
        let clamp = |zoom: i64| zoom.clamp(0, i64::from(MAX_ZOOM)) as u8;
        clamp(self.source.min_zoom)..=clamp(self.source.max_zoom)
    }

    async fn tile_features(&self, layer: &str, tile: TileCoord) -> Result<Vec<Feature>, Error> {
        let layer = self
            .source
            .layer(layer)
            .ok_or_else(|| Error::UnknownLayer(layer.to_owned()))?;

        let pixel_scale = self.source.pixel_scale;
        let tile_bounds = get_epsg_3857_tile_bounds(pixel_scale, tile.z, tile.x, tile.y, 0);
        let buffered_bounds = get_epsg_3857_tile_bounds(
            pixel_scale,
            tile.z,
            tile.x,
            tile.y,
            layer.properties.buffer_size,
        );
        let pixel_width = (tile_bounds.east - tile_bounds.west) / pixel_scale as f64;

        let sql = layer.features_sql();
        debug!("querying layer {} for {}: {}", layer.id, tile, sql);

        let mut conn = self.pool.acquire().await?;
        let mut rows = query(&sql)
            .bind(tile_bounds.west)
            .bind(tile_bounds.south)
            .bind(tile_bounds.east)
            .bind(tile_bounds.north)
            .bind(i32::from(tile.z))
            .bind(pixel_width)
            .bind(pixel_width / STANDARD_PIXEL_SIZE)
            .bind(buffered_bounds.west)
            .bind(buffered_bounds.south)
            .bind(buffered_bounds.east)
            .bind(buffered_bounds.north)
            .fetch(&mut *conn);

        let mut features = Vec::new();
        while let Some(row) = rows.try_next().await? {
            let ewkt: String = row.try_get(0)?;
            let (srid, geometry) = parse_ewkt(&ewkt)?;
            features.push(Feature {
                layer: layer.id.clone(),
                srid: srid.unwrap_or(layer.source.srid),
                geometry,
            });
        }
        debug!("layer {} returned {} features", layer.id, features.len());

        Ok(features)
    }
}
