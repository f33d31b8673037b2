use crate::error::Error;
use crate::reproject::to_web_mercator;
use crate::tile::TileCoord;
use crate::TileSource;

use geo_types::{Geometry, GeometryCollection};
use log::{info, warn};

/// Collects the features of every layer of `source` intersecting `tile` into a single
/// web mercator collection.
///
/// Layers are visited in source order. When `layers` is given only those ids are
/// dumped; an id the source does not know is an error. Features that are collections
/// themselves are flattened into the result.
pub async fn collect_tile<S: TileSource>(
    source: &S,
    tile: TileCoord,
    layers: Option<&[String]>,
) -> Result<Geometry<f64>, Error> {
    let layer_ids = source.layer_ids();
    if let Some(wanted) = layers {
        if let Some(unknown) = wanted.iter().find(|id| !layer_ids.contains(&id.as_str())) {
            return Err(Error::UnknownLayer(unknown.clone()));
        }
    }

    let zoom_range = source.zoom_range();
    if !zoom_range.contains(&tile.z) {
        warn!(
            "tile {} is outside the zoom range {}-{} of {}",
            tile,
            zoom_range.start(),
            zoom_range.end(),
            source.name()
        );
    }

    let mut collection = Vec::new();
    for layer in layer_ids {
        if let Some(wanted) = layers {
            if !wanted.iter().any(|id| id == layer) {
                continue;
            }
        }

        let features = source.tile_features(layer, tile).await?;
        info!("{}: {} features in layer {}", tile, features.len(), layer);

        for feature in features {
            match to_web_mercator(feature.srid, feature.geometry)? {
                Geometry::GeometryCollection(GeometryCollection(members)) => {
                    collection.extend(members)
                }
                geometry => collection.push(geometry),
            }
        }
    }

    Ok(Geometry::GeometryCollection(GeometryCollection(collection)))
}
