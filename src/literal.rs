//! Geometry literals.
//!
//! A literal spells out a geometry tree with braces:
//!
//! ```text
//! Collection{Point{1.0, 2.0}, LineString{{0.0, 0.0}, {1.0, 1.0}}, Polygon{}}
//! ```
//!
//! The type name is only written where the parent does not already imply it, i.e. at
//! the top level and for the members of a `Collection`. The same grammar is accepted
//! by the [`geom!`](crate::geom) macro, so a literal pasted into Rust source evaluates
//! to the geometry it was printed from.

use crate::error::Error;
use crate::scanner::Scanner;

use std::fmt::Write;

use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};

/// Renders `geometry` as a literal.
pub fn to_literal(geometry: &Geometry<f64>) -> Result<String, Error> {
    let mut out = String::new();
    write_literal(&mut out, geometry)?;
    Ok(out)
}

/// Writes the literal for `geometry`, type name included, to `w`.
///
/// `Line`, `Rect` and `Triangle` have no literal form and fail with
/// [`Error::UnsupportedGeometry`]; nothing is written for the offending subtree.
pub fn write_literal<W: Write>(w: &mut W, geometry: &Geometry<f64>) -> Result<(), Error> {
    let name = type_name(geometry)?;
    w.write_str(name)?;
    match geometry {
        Geometry::Point(point) => write_coord(w, &point.0),
        Geometry::LineString(line_string) => write_line_string(w, line_string),
        Geometry::Polygon(polygon) => write_polygon(w, polygon),
        Geometry::MultiPoint(multi_point) => {
            write_group(w, &multi_point.0, |w, point| write_coord(w, &point.0))
        }
        Geometry::MultiLineString(multi_line_string) => {
            write_group(w, &multi_line_string.0, write_line_string)
        }
        Geometry::MultiPolygon(multi_polygon) => write_group(w, &multi_polygon.0, write_polygon),
        Geometry::GeometryCollection(collection) => write_group(w, &collection.0, write_literal),
        // type_name has already rejected everything else
        _ => Err(Error::UnsupportedGeometry(name)),
    }
}

fn type_name(geometry: &Geometry<f64>) -> Result<&'static str, Error> {
    match geometry {
        Geometry::Point(_) => Ok("Point"),
        Geometry::LineString(_) => Ok("LineString"),
        Geometry::Polygon(_) => Ok("Polygon"),
        Geometry::MultiPoint(_) => Ok("MultiPoint"),
        Geometry::MultiLineString(_) => Ok("MultiLineString"),
        Geometry::MultiPolygon(_) => Ok("MultiPolygon"),
        Geometry::GeometryCollection(_) => Ok("Collection"),
        Geometry::Line(_) => Err(Error::UnsupportedGeometry("Line")),
        Geometry::Rect(_) => Err(Error::UnsupportedGeometry("Rect")),
        Geometry::Triangle(_) => Err(Error::UnsupportedGeometry("Triangle")),
    }
}

fn write_group<W: Write, T>(
    w: &mut W,
    items: &[T],
    mut write_item: impl FnMut(&mut W, &T) -> Result<(), Error>,
) -> Result<(), Error> {
    w.write_char('{')?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.write_str(", ")?;
        }
        write_item(w, item)?;
    }
    w.write_char('}')?;
    Ok(())
}

fn write_coord<W: Write>(w: &mut W, coord: &Coord<f64>) -> Result<(), Error> {
    if !(coord.x.is_finite() && coord.y.is_finite()) {
        return Err(Error::NonFiniteCoordinate {
            x: coord.x,
            y: coord.y,
        });
    }
    // Debug prints the shortest form that parses back to the same f64 and always
    // reads as a float literal in Rust source.
    write!(w, "{{{:?}, {:?}}}", coord.x, coord.y)?;
    Ok(())
}

fn write_line_string<W: Write>(w: &mut W, line_string: &LineString<f64>) -> Result<(), Error> {
    write_group(w, &line_string.0, write_coord)
}

fn write_polygon<W: Write>(w: &mut W, polygon: &Polygon<f64>) -> Result<(), Error> {
    if polygon.exterior().0.is_empty() && polygon.interiors().is_empty() {
        w.write_str("{}")?;
        return Ok(());
    }
    let rings: Vec<&LineString<f64>> = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .collect();
    write_group(w, &rings, |w, ring| write_line_string(w, ring))
}

/// Parses a literal produced by [`to_literal`] back into a geometry.
///
/// Whitespace is free and every brace group may end with a trailing comma.
pub fn parse_literal(literal: &str) -> Result<Geometry<f64>, Error> {
    let mut scanner = Scanner::new(literal);
    let geometry = parse_named(&mut scanner)?;
    scanner.expect_end()?;
    Ok(geometry)
}

fn parse_named(scanner: &mut Scanner) -> Result<Geometry<f64>, Error> {
    let start = scanner.position();
    let geometry = match scanner.word() {
        "Point" => Geometry::Point(Point(parse_coord(scanner)?)),
        "LineString" => Geometry::LineString(parse_line_string(scanner)?),
        "Polygon" => Geometry::Polygon(parse_polygon(scanner)?),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint(parse_group(scanner, |s| {
            parse_coord(s).map(Point)
        })?)),
        "MultiLineString" => {
            Geometry::MultiLineString(MultiLineString(parse_group(scanner, parse_line_string)?))
        }
        "MultiPolygon" => {
            Geometry::MultiPolygon(MultiPolygon(parse_group(scanner, parse_polygon)?))
        }
        "Collection" => {
            Geometry::GeometryCollection(GeometryCollection(parse_group(scanner, parse_named)?))
        }
        "" => return Err(scanner.error("expected a geometry type name")),
        other => {
            return Err(Error::Parse {
                offset: start,
                message: format!("unknown geometry type '{other}'"),
            })
        }
    };
    Ok(geometry)
}

fn parse_group<T>(
    scanner: &mut Scanner,
    mut parse_item: impl FnMut(&mut Scanner) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    let mut items = Vec::new();
    scanner.expect(b'{')?;
    loop {
        if scanner.eat(b'}') {
            return Ok(items);
        }
        items.push(parse_item(scanner)?);
        if !scanner.eat(b',') {
            scanner.expect(b'}')?;
            return Ok(items);
        }
    }
}

fn parse_coord(scanner: &mut Scanner) -> Result<Coord<f64>, Error> {
    scanner.expect(b'{')?;
    let x = scanner.number()?;
    scanner.expect(b',')?;
    let y = scanner.number()?;
    scanner.eat(b',');
    scanner.expect(b'}')?;
    Ok(Coord { x, y })
}

fn parse_line_string(scanner: &mut Scanner) -> Result<LineString<f64>, Error> {
    parse_group(scanner, parse_coord).map(LineString)
}

fn parse_polygon(scanner: &mut Scanner) -> Result<Polygon<f64>, Error> {
    let mut rings = parse_group(scanner, parse_line_string)?.into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect()))
}

/// Builds a `geo_types::Geometry<f64>` from the literal grammar.
///
/// ```
/// use tile_dump::geom;
///
/// let geometry = geom!(Collection{Point{1.0, 2.0}, LineString{{0.0, 0.0}, {1.0, 1.0}}});
/// assert_eq!("Collection{Point{1.0, 2.0}, LineString{{0.0, 0.0}, {1.0, 1.0}}}",
///            tile_dump::to_literal(&geometry).unwrap());
/// ```
#[macro_export]
macro_rules! geom {
    (@coord { $x:expr, $y:expr $(,)? }) => {
        $crate::geo_types::Coord { x: $x as f64, y: $y as f64 }
    };
    (@point $coord:tt) => {
        $crate::geo_types::Point($crate::geom!(@coord $coord))
    };
    (@line_string { $($coord:tt),* $(,)? }) => {
        $crate::geo_types::LineString(vec![$($crate::geom!(@coord $coord)),*])
    };
    (@polygon {}) => {
        $crate::geo_types::Polygon::new($crate::geo_types::LineString(vec![]), vec![])
    };
    (@polygon { $exterior:tt $(, $interior:tt)* $(,)? }) => {
        $crate::geo_types::Polygon::new(
            $crate::geom!(@line_string $exterior),
            vec![$($crate::geom!(@line_string $interior)),*],
        )
    };
    (Point $coord:tt) => {
        $crate::geo_types::Geometry::Point($crate::geom!(@point $coord))
    };
    (LineString $body:tt) => {
        $crate::geo_types::Geometry::LineString($crate::geom!(@line_string $body))
    };
    (Polygon $body:tt) => {
        $crate::geo_types::Geometry::Polygon($crate::geom!(@polygon $body))
    };
    (MultiPoint { $($point:tt),* $(,)? }) => {
        $crate::geo_types::Geometry::MultiPoint($crate::geo_types::MultiPoint(vec![
            $($crate::geom!(@point $point)),*
        ]))
    };
    (MultiLineString { $($line_string:tt),* $(,)? }) => {
        $crate::geo_types::Geometry::MultiLineString($crate::geo_types::MultiLineString(vec![
            $($crate::geom!(@line_string $line_string)),*
        ]))
    };
    (MultiPolygon { $($polygon:tt),* $(,)? }) => {
        $crate::geo_types::Geometry::MultiPolygon($crate::geo_types::MultiPolygon(vec![
            $($crate::geom!(@polygon $polygon)),*
        ]))
    };
    (Collection { $($name:ident $body:tt),* $(,)? }) => {
        $crate::geo_types::Geometry::GeometryCollection($crate::geo_types::GeometryCollection(vec![
            $($crate::geom!($name $body)),*
        ]))
    };
}
