//! Rust source for generated test fixtures.
//!
//! A fixture is a function returning the geometry, built with [`geom!`](crate::geom):
//!
//! ```text
//! pub fn coast_line() -> Geometry<f64> {
//!     geom!(LineString{{0.0, 0.0}, {1.0, 1.0}})
//! }
//! ```

use crate::error::Error;
use crate::literal::write_literal;

use std::collections::HashSet;
use std::fmt::Write;

use geo_types::Geometry;
use once_cell::sync::Lazy;

/// `use` lines a fixture file needs to compile on its own. `Geometry` comes through the
/// re-export so the fixture crate needs no direct `geo-types` dependency.
pub const FIXTURE_HEADER: &str = "use tile_dump::geo_types::Geometry;\nuse tile_dump::geom;\n";

/// Strict and reserved keywords of the 2021 edition.
static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
        "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait",
        "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
        "final", "gen", "macro", "override", "priv", "try", "typeof", "unsized", "virtual",
        "yield",
    ]
    .into_iter()
    .collect()
});

/// Turns an arbitrary name into a snake_case Rust identifier. Keywords get a trailing
/// underscore, since `self`, `super` and `crate` cannot be raw identifiers.
pub fn fixture_ident(name: &str) -> String {
    let mut ident = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            let boundary = c.is_ascii_uppercase()
                && previous.map_or(false, |p| p.is_ascii_lowercase() || p.is_ascii_digit());
            if boundary && !ident.ends_with('_') {
                ident.push('_');
            }
            ident.push(c.to_ascii_lowercase());
        } else if !ident.is_empty() && !ident.ends_with('_') {
            ident.push('_');
        }
        previous = Some(c);
    }

    let trimmed = ident.trim_end_matches('_').len();
    ident.truncate(trimmed);

    if ident.is_empty() {
        ident.push_str("fixture");
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    } else if KEYWORDS.contains(ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Writes `pub fn <ident>() -> Geometry<f64>` returning `geometry`.
pub fn write_fixture_fn<W: Write>(
    w: &mut W,
    ident: &str,
    geometry: &Geometry<f64>,
) -> Result<(), Error> {
    // render first so a failing geometry leaves no half-written function behind
    let mut literal = String::new();
    write_literal(&mut literal, geometry)?;

    writeln!(w, "pub fn {}() -> Geometry<f64> {{", ident)?;
    writeln!(w, "    geom!({})", literal)?;
    writeln!(w, "}}")?;
    Ok(())
}

/// Renders a complete fixture file holding one function.
pub fn render_fixture_module(ident: &str, geometry: &Geometry<f64>) -> Result<String, Error> {
    let mut out = String::from(FIXTURE_HEADER);
    out.push('\n');
    write_fixture_fn(&mut out, ident, geometry)?;
    Ok(out)
}
