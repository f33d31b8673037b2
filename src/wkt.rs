//! Well-Known Text reader.
//!
//! Parsing is left to the `wkt` crate. On top of it this module strips the PostGIS
//! `SRID=<n>;` prefix and refuses what has no 2D `geo_types` counterpart.

use crate::error::Error;

use std::str::FromStr;

use geo_types::Geometry;
use wkt::types::{Coord, Point};
use wkt::Wkt;

/// Parses a single WKT geometry.
pub fn parse_wkt(wkt: &str) -> Result<Geometry<f64>, Error> {
    let parsed = Wkt::<f64>::from_str(wkt.trim()).map_err(|e| Error::Wkt(e.to_owned()))?;
    check_2d(&parsed)?;
    Geometry::try_from(parsed).map_err(|e| Error::Wkt(e.to_string()))
}

/// Parses WKT with an optional PostGIS `SRID=<n>;` prefix.
pub fn parse_ewkt(ewkt: &str) -> Result<(Option<i32>, Geometry<f64>), Error> {
    let (srid, wkt) = split_srid(ewkt)?;
    Ok((srid, parse_wkt(wkt)?))
}

fn split_srid(ewkt: &str) -> Result<(Option<i32>, &str), Error> {
    let ewkt = ewkt.trim_start();
    let has_prefix = ewkt
        .get(..5)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("SRID="));
    if !has_prefix {
        return Ok((None, ewkt));
    }

    let (srid, wkt) = ewkt[5..]
        .split_once(';')
        .ok_or_else(|| Error::Wkt(String::from("SRID prefix must end with ';'")))?;
    let srid = srid
        .trim()
        .parse::<i32>()
        .map_err(|_| Error::Wkt(format!("invalid SRID '{}'", srid.trim())))?;
    Ok((Some(srid), wkt))
}

fn check_2d(wkt: &Wkt<f64>) -> Result<(), Error> {
    match wkt {
        Wkt::Point(point) => check_point(point),
        Wkt::LineString(line_string) => check_coords(&line_string.0),
        Wkt::Polygon(polygon) => polygon.0.iter().try_for_each(|ring| check_coords(&ring.0)),
        Wkt::MultiPoint(multi_point) => multi_point.0.iter().try_for_each(check_point),
        Wkt::MultiLineString(multi_line_string) => multi_line_string
            .0
            .iter()
            .try_for_each(|line_string| check_coords(&line_string.0)),
        Wkt::MultiPolygon(multi_polygon) => multi_polygon.0.iter().try_for_each(|polygon| {
            polygon.0.iter().try_for_each(|ring| check_coords(&ring.0))
        }),
        Wkt::GeometryCollection(collection) => collection.0.iter().try_for_each(check_2d),
    }
}

fn check_point(point: &Point<f64>) -> Result<(), Error> {
    match &point.0 {
        Some(coord) => check_coords(std::slice::from_ref(coord)),
        None => Err(Error::Wkt(String::from(
            "POINT EMPTY has no 2D representation",
        ))),
    }
}

fn check_coords(coords: &[Coord<f64>]) -> Result<(), Error> {
    if coords.iter().any(|c| c.z.is_some() || c.m.is_some()) {
        return Err(Error::Wkt(String::from(
            "only 2D coordinates are supported",
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::to_literal;
    use geo_types::{line_string, point, polygon, LineString, MultiPoint, MultiPolygon, Polygon};

    #[test]
    fn test_point() {
        assert_eq!(
            Geometry::Point(point!(x: 1.5, y: -2.0)),
            parse_wkt("POINT(1.5 -2)").unwrap()
        );
        assert_eq!(
            Geometry::Point(point!(x: 1.0, y: 2.0)),
            parse_wkt("  POINT (1 2)  ").unwrap()
        );
    }

    #[test]
    fn test_line_string_and_polygon() {
        assert_eq!(
            Geometry::LineString(line_string![(x: 30.0, y: 10.0), (x: 10.0, y: 30.0), (x: 40.0, y: 40.0)]),
            parse_wkt("LINESTRING (30 10, 10 30, 40 40)").unwrap()
        );

        let expected = Polygon::new(
            line_string![(x: 35.0, y: 10.0), (x: 45.0, y: 45.0), (x: 15.0, y: 40.0), (x: 35.0, y: 10.0)],
            vec![line_string![(x: 20.0, y: 30.0), (x: 35.0, y: 35.0), (x: 30.0, y: 20.0), (x: 20.0, y: 30.0)]],
        );
        assert_eq!(
            Geometry::Polygon(expected),
            parse_wkt("POLYGON ((35 10, 45 45, 15 40, 35 10),(20 30, 35 35, 30 20, 20 30))")
                .unwrap()
        );
    }

    #[test]
    fn test_multi_point() {
        let expected = Geometry::MultiPoint(MultiPoint(vec![
            point!(x: 10.0, y: 40.0),
            point!(x: 40.0, y: 30.0),
        ]));
        assert_eq!(expected, parse_wkt("MULTIPOINT ((10 40), (40 30))").unwrap());
    }

    #[test]
    fn test_multi_polygon() {
        let geometry = parse_wkt(
            "MULTIPOLYGON (((30 20, 45 40, 10 40, 30 20)), ((15 5, 40 10, 10 20, 5 10, 15 5)))",
        )
        .unwrap();
        match geometry {
            Geometry::MultiPolygon(MultiPolygon(polygons)) => {
                assert_eq!(2, polygons.len());
                assert_eq!(4, polygons[0].exterior().0.len());
                assert_eq!(5, polygons[1].exterior().0.len());
                assert!(polygons[1].interiors().is_empty());
            }
            other => panic!("expected a multipolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_collection() {
        let geometry = parse_wkt(
            "GEOMETRYCOLLECTION (POINT (4 6), LINESTRING (4 6, 7 10), GEOMETRYCOLLECTION EMPTY)",
        )
        .unwrap();
        assert_eq!(
            "Collection{Point{4.0, 6.0}, LineString{{4.0, 6.0}, {7.0, 10.0}}, Collection{}}",
            to_literal(&geometry).unwrap()
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(
            Geometry::MultiPolygon(MultiPolygon(vec![])),
            parse_wkt("MULTIPOLYGON EMPTY").unwrap()
        );
        assert_eq!(
            Geometry::LineString(LineString(vec![])),
            parse_wkt("LINESTRING EMPTY").unwrap()
        );
        assert_eq!("Polygon{}", to_literal(&parse_wkt("POLYGON EMPTY").unwrap()).unwrap());
    }

    #[test]
    fn test_empty_points_rejected() {
        assert!(matches!(parse_wkt("POINT EMPTY"), Err(Error::Wkt(_))));
        assert!(matches!(
            parse_wkt("GEOMETRYCOLLECTION (POINT EMPTY, POINT (1 2))"),
            Err(Error::Wkt(_))
        ));
    }

    #[test]
    fn test_ewkt() {
        let (srid, geometry) = parse_ewkt("SRID=4326;POINT(-122.4 37.8)").unwrap();
        assert_eq!(Some(4326), srid);
        assert_eq!(Geometry::Point(point!(x: -122.4, y: 37.8)), geometry);

        let (srid, _) = parse_ewkt("POLYGON((0 0,1 0,1 1,0 0))").unwrap();
        assert_eq!(None, srid);

        assert!(parse_ewkt("SRID=4326.5;POINT(0 0)").is_err());
        assert!(parse_ewkt("SRID=4326 POINT(0 0)").is_err());
    }

    #[test]
    fn test_dimensions_rejected() {
        assert!(matches!(parse_wkt("POINT Z (1 2 3)"), Err(Error::Wkt(_))));
        assert!(matches!(
            parse_wkt("LINESTRING M (1 2 3, 4 5 6)"),
            Err(Error::Wkt(_))
        ));
        assert!(parse_wkt("POINT ZM (1 2 3 4)").is_err());
        assert!(parse_wkt("MULTIPOLYGON Z (((0 0 1, 1 0 1, 1 1 1, 0 0 1)))").is_err());
    }

    #[test]
    fn test_errors() {
        assert!(parse_wkt("").is_err());
        assert!(parse_wkt("CIRCLE (0 0)").is_err());
        assert!(parse_wkt("LINESTRING (0 0, 1 1").is_err());
        assert!(parse_wkt("LINESTRING (0 0, 1 x)").is_err());
    }

    #[test]
    fn test_polygon_literal() {
        let geometry = parse_wkt("POLYGON ((0 0, 1 0, 1 1, 0 0))").unwrap();
        assert_eq!(
            Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]),
            geometry
        );
        assert_eq!(
            "Polygon{{{0.0, 0.0}, {1.0, 0.0}, {1.0, 1.0}, {0.0, 0.0}}}",
            to_literal(&geometry).unwrap()
        );
    }
}
