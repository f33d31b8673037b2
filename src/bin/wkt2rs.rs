//! Converts WKT rows into Rust fixture functions.
//!
//!     psql -d natural_earth -t -c "select 'CoastLine', ST_AsText(wkb_geometry) \
//!         from ne_10m_coastline limit 1 offset 1;" | wkt2rs >> natural_earth.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{ErrorLevel, Verbosity};
use failure::{format_err, ResultExt};
use log::debug;

use tile_dump::fixture::{fixture_ident, write_fixture_fn, FIXTURE_HEADER};
use tile_dump::parse_ewkt;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Turn WKT rows into inline geometry literals",
    long_about = None,
)]
struct Cli {
    /// File with one "name | WKT" row per line; stdin when omitted
    input: Option<PathBuf>,

    /// Name for rows that carry only WKT
    #[arg(long)]
    name: Option<String>,

    /// Start the output with the use lines a fixture file needs
    #[arg(long)]
    header: bool,

    #[command(flatten)]
    verbose: Verbosity<ErrorLevel>,
}

fn main() -> Result<(), failure::Error> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .format_timestamp(None)
        .init();

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|_| format!("could not open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let output = convert(input, &cli)?;
    io::stdout().write_all(output.as_bytes())?;
    Ok(())
}

/// Converts every non-blank row of `input` into a fixture function.
fn convert(input: impl BufRead, cli: &Cli) -> Result<String, failure::Error> {
    let mut out = String::new();
    if cli.header {
        out.push_str(FIXTURE_HEADER);
        out.push('\n');
    }

    let mut first = true;
    for (number, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let (name, wkt) = split_row(&line, cli.name.as_deref())
            .ok_or_else(|| format_err!("line {}: expected 'name | WKT'", number + 1))?;
        let (_, geometry) =
            parse_ewkt(wkt).with_context(|_| format!("line {}: invalid WKT", number + 1))?;

        let ident = fixture_ident(&name);
        debug!("line {}: {}", number + 1, ident);

        if !first {
            out.push('\n');
        }
        first = false;
        write_fixture_fn(&mut out, &ident, &geometry)
            .with_context(|_| format!("line {}: cannot write {}", number + 1, ident))?;
    }

    Ok(out)
}

/// Splits a `psql -t` row into its name and WKT columns. Spaces inside the name are
/// dropped; `fallback` names rows without a name column.
fn split_row<'a>(line: &'a str, fallback: Option<&'a str>) -> Option<(String, &'a str)> {
    match line.split_once('|') {
        Some((name, wkt)) => {
            let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
            if name.is_empty() {
                None
            } else {
                Some((name, wkt.trim()))
            }
        }
        None => fallback.map(|name| (name.to_owned(), line.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut all = vec!["wkt2rs"];
        all.extend_from_slice(args);
        Cli::try_parse_from(all).unwrap()
    }

    #[test]
    fn test_psql_row() {
        let input = " CoastLine | LINESTRING(-163.7 -78.6,-161.2 -78.4)\n";
        let output = convert(input.as_bytes(), &cli(&[])).unwrap();
        assert_eq!(
            "pub fn coast_line() -> Geometry<f64> {\n    geom!(LineString{{-163.7, -78.6}, {-161.2, -78.4}})\n}\n",
            output
        );
    }

    #[test]
    fn test_several_rows_with_header() {
        let input = "Lake | POLYGON((0 0,1 0,1 1,0 0))\n\n River Mouth | SRID=4326;POINT(5 6)\n";
        let output = convert(input.as_bytes(), &cli(&["--header"])).unwrap();
        assert!(output.starts_with(FIXTURE_HEADER));
        assert!(output.contains(
            "pub fn lake() -> Geometry<f64> {\n    geom!(Polygon{{{0.0, 0.0}, {1.0, 0.0}, {1.0, 1.0}, {0.0, 0.0}}})\n}\n\n"
        ));
        assert!(output.ends_with(
            "pub fn river_mouth() -> Geometry<f64> {\n    geom!(Point{5.0, 6.0})\n}\n"
        ));
    }

    #[test]
    fn test_bare_wkt() {
        let input = "MULTIPOINT((1 2),(3 4))";
        assert!(convert(input.as_bytes(), &cli(&[])).is_err());

        let output = convert(input.as_bytes(), &cli(&["--name", "Stops"])).unwrap();
        assert!(output.contains("pub fn stops()"));
        assert!(output.contains("geom!(MultiPoint{{1.0, 2.0}, {3.0, 4.0}})"));
    }

    #[test]
    fn test_invalid_rows() {
        assert!(convert(" | POINT(1 2)".as_bytes(), &cli(&[])).is_err());
        assert!(convert("Broken | POINT(1".as_bytes(), &cli(&[])).is_err());

        let err = convert("Ok | POINT(1 2)\nBad | CIRCLE(0 0)".as_bytes(), &cli(&[]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("line 2"));
    }

    #[test]
    fn test_split_row() {
        assert_eq!(
            Some((String::from("CoastLine"), "POINT(1 2)")),
            split_row("  Coast Line |POINT(1 2) ", None)
        );
        assert_eq!(
            Some((String::from("Fallback"), "POINT(1 2)")),
            split_row(" POINT(1 2)", Some("Fallback"))
        );
        assert_eq!(None, split_row("POINT(1 2)", None));
    }
}
