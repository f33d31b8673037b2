use crate::error::Error;

use std::fmt;
use std::str::FromStr;

/// Deepest zoom level a tile coordinate may use.
pub const MAX_ZOOM: u8 = 30;

/// A slippy map tile in XYZ format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Result<TileCoord, Error> {
        let tile = TileCoord { z, x, y };
        if z > MAX_ZOOM {
            return Err(Error::invalid_tile(
                &tile.to_string(),
                format!("zoom must not exceed {MAX_ZOOM}"),
            ));
        }
        let size = 1u64 << z;
        if u64::from(x) >= size || u64::from(y) >= size {
            return Err(Error::invalid_tile(
                &tile.to_string(),
                format!("x and y must be below {size} at zoom {z}"),
            ));
        }
        Ok(tile)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Positional layout of a tile argument, e.g. `z/x/y` or `x_y_z`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileFormat {
    pub z: usize,
    pub x: usize,
    pub y: usize,
    pub separator: String,
}

impl Default for TileFormat {
    fn default() -> TileFormat {
        TileFormat {
            z: 0,
            x: 1,
            y: 2,
            separator: String::from("/"),
        }
    }
}

impl TileFormat {
    pub fn parse_tile(&self, input: &str) -> Result<TileCoord, Error> {
        let parts: Vec<&str> = input.trim().split(self.separator.as_str()).collect();
        if parts.len() != 3 {
            return Err(Error::invalid_tile(
                input,
                format!("expected three parts separated by '{}'", self.separator),
            ));
        }

        let part = |index: usize, name: &str| {
            parts.get(index).copied().map(str::trim).ok_or_else(|| {
                Error::invalid_tile(input, format!("no part {index} for {name} in the format"))
            })
        };

        let z = part(self.z, "zoom")?
            .parse::<u8>()
            .map_err(|e| Error::invalid_tile(input, format!("bad zoom: {e}")))?;
        let x = part(self.x, "x")?
            .parse::<u32>()
            .map_err(|e| Error::invalid_tile(input, format!("bad x: {e}")))?;
        let y = part(self.y, "y")?
            .parse::<u32>()
            .map_err(|e| Error::invalid_tile(input, format!("bad y: {e}")))?;

        TileCoord::new(z, x, y).map_err(|e| match e {
            Error::InvalidTile { reason, .. } => Error::invalid_tile(input, reason),
            other => other,
        })
    }
}

impl FromStr for TileFormat {
    type Err = Error;

    /// Reads a pattern made of the letters `z`, `x` and `y`, each used once, joined by
    /// one separator.
    fn from_str(pattern: &str) -> Result<TileFormat, Error> {
        let invalid = |reason: &str| Error::invalid_tile(pattern, format!("bad format: {reason}"));

        let letters: Vec<(usize, char)> = pattern
            .char_indices()
            .filter(|(_, c)| matches!(c.to_ascii_lowercase(), 'x' | 'y' | 'z'))
            .collect();
        if letters.len() != 3 {
            return Err(invalid("expected the letters z, x and y"));
        }
        let (first, second, third) = (letters[0], letters[1], letters[2]);
        let separator = &pattern[first.0 + first.1.len_utf8()..second.0];
        if separator.is_empty() {
            return Err(invalid("missing separator"));
        }
        if &pattern[second.0 + second.1.len_utf8()..third.0] != separator
            || first.0 != 0
            || third.0 + third.1.len_utf8() != pattern.len()
        {
            return Err(invalid("letters must be joined by one separator"));
        }

        let position = |letter: char| {
            letters
                .iter()
                .position(|(_, c)| c.to_ascii_lowercase() == letter)
        };
        match (position('z'), position('x'), position('y')) {
            (Some(z), Some(x), Some(y)) => Ok(TileFormat {
                z,
                x,
                y,
                separator: separator.to_owned(),
            }),
            _ => Err(invalid("each of z, x and y must appear once")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let tile = TileFormat::default().parse_tile("3/4/2").unwrap();
        assert_eq!(TileCoord { z: 3, x: 4, y: 2 }, tile);
        assert_eq!("3/4/2", tile.to_string());
    }

    #[test]
    fn test_custom_format() {
        let format: TileFormat = "x_y_z".parse().unwrap();
        assert_eq!(
            TileFormat {
                z: 2,
                x: 0,
                y: 1,
                separator: String::from("_"),
            },
            format
        );
        assert_eq!(
            TileCoord { z: 14, x: 8190, y: 5447 },
            format.parse_tile("8190_5447_14").unwrap()
        );

        let format: TileFormat = "Z-X-Y".parse().unwrap();
        assert_eq!("-", format.separator);
    }

    #[test]
    fn test_bad_formats() {
        assert!("z/x".parse::<TileFormat>().is_err());
        assert!("zxy".parse::<TileFormat>().is_err());
        assert!("z/x_y".parse::<TileFormat>().is_err());
        assert!("z/z/y".parse::<TileFormat>().is_err());
        assert!("/z/x/y".parse::<TileFormat>().is_err());
    }

    #[test]
    fn test_out_of_range() {
        let format = TileFormat::default();
        assert!(format.parse_tile("0/0/0").is_ok());
        assert!(format.parse_tile("0/1/0").is_err());
        assert!(format.parse_tile("2/3/4").is_err());
        assert!(format.parse_tile("31/0/0").is_err());
        assert!(format.parse_tile("1/0").is_err());
        assert!(format.parse_tile("a/0/0").is_err());

        match format.parse_tile("2/3/4") {
            Err(Error::InvalidTile { input, .. }) => assert_eq!("2/3/4", input),
            other => panic!("expected an invalid tile error, got {:?}", other),
        }
    }

    #[test]
    fn test_hand_built_format_out_of_bounds() {
        let format = TileFormat {
            z: 3,
            x: 0,
            y: 1,
            separator: String::from("/"),
        };
        match format.parse_tile("4/2/3") {
            Err(Error::InvalidTile { input, reason }) => {
                assert_eq!("4/2/3", input);
                assert!(reason.contains("zoom"));
            }
            other => panic!("expected an invalid tile error, got {:?}", other),
        }
    }
}
