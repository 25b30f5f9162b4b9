//! Color ramp engine.
//!
//! A ramp spec is a dash-separated list of stops in one of two modes:
//!
//! - **Uniform**: every token is a bare color (`rgb`, `rgba`, `rrggbb`,
//!   `rrggbbaa`). Stops are spread evenly over `0..=255`.
//!   `000000-ffffff` is a black-to-white gradient.
//! - **Indexed**: every token is ten hex digits, a two-digit position followed
//!   by an `rrggbbaa` color. `00ff0000ff-ffffff00ff` runs from red at 0 to
//!   yellow at 255. Missing ends are extended with the nearest stop's color.
//!
//! Mixing modes in one spec is rejected. Only lowercase hex is accepted.
//!
//! The result is a dense 256-entry lookup table.

use std::str::FromStr;

use image::Rgba;

use crate::error::ColorError;

/// Number of entries in a ramp lookup table.
pub const RAMP_SIZE: usize = 256;

const INDEXED_TOKEN_LEN: usize = 10;

/// A single gradient stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorStop {
    pub position: u8,
    pub color: Rgba<u8>,
}

/// Parse a bare hex color token.
///
/// | digits | layout                           |
/// |--------|----------------------------------|
/// | 3      | `rgb`, each nibble doubled, opaque |
/// | 4      | `rgba`, each nibble doubled        |
/// | 6      | `rrggbb`, opaque                   |
/// | 8      | `rrggbbaa`                         |
pub fn parse_color(token: &str) -> Result<Rgba<u8>, ColorError> {
    let invalid = || ColorError::InvalidColor(token.to_string());

    if token.is_empty() || !token.bytes().all(is_lower_hex) {
        return Err(invalid());
    }

    let digits: Vec<u8> = token.bytes().map(hex_value).collect();
    let pair = |i: usize| digits[i] << 4 | digits[i + 1];

    let rgba = match digits.len() {
        3 => [digits[0] * 0x11, digits[1] * 0x11, digits[2] * 0x11, 0xFF],
        4 => [
            digits[0] * 0x11,
            digits[1] * 0x11,
            digits[2] * 0x11,
            digits[3] * 0x11,
        ],
        6 => [pair(0), pair(2), pair(4), 0xFF],
        8 => [pair(0), pair(2), pair(4), pair(6)],
        _ => return Err(invalid()),
    };

    Ok(Rgba(rgba))
}

#[inline]
fn is_lower_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'a'..=b'f').contains(&b)
}

#[inline]
fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        _ => b - b'a' + 10,
    }
}

/// A 256-entry RGBA lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRamp {
    table: [Rgba<u8>; RAMP_SIZE],
}

impl ColorRamp {
    /// Parse a uniform or indexed ramp spec.
    pub fn parse(spec: &str) -> Result<Self, ColorError> {
        let stops = parse_stops(spec)?;
        Ok(Self::from_stops(&stops))
    }

    /// Build the table from stops sorted by position, covering 0 and 255.
    ///
    /// Indices between two stops are interpolated per channel and floored.
    /// When stops share a position, the first one listed is emitted at that
    /// index and the last one listed starts the next segment.
    fn from_stops(stops: &[ColorStop]) -> Self {
        let mut table = [Rgba([0, 0, 0, 0]); RAMP_SIZE];
        table[0] = stops[0].color;

        for pair in stops.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            let (start, end) = (left.position as usize, right.position as usize);
            let span = (end - start) as f64;

            for (i, entry) in table.iter_mut().enumerate().take(end + 1).skip(start + 1) {
                *entry = if i == end {
                    right.color
                } else {
                    lerp(left.color, right.color, (i - start) as f64 / span)
                };
            }
        }

        Self { table }
    }

    /// Color at a table index.
    #[inline]
    pub fn color(&self, index: u8) -> Rgba<u8> {
        self.table[index as usize]
    }

    pub fn entries(&self) -> &[Rgba<u8>; RAMP_SIZE] {
        &self.table
    }
}

/// Opaque black to opaque white.
impl Default for ColorRamp {
    fn default() -> Self {
        Self::from_stops(&[
            ColorStop {
                position: 0,
                color: Rgba([0, 0, 0, 0xFF]),
            },
            ColorStop {
                position: 255,
                color: Rgba([0xFF, 0xFF, 0xFF, 0xFF]),
            },
        ])
    }
}

impl FromStr for ColorRamp {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn lerp(a: Rgba<u8>, b: Rgba<u8>, t: f64) -> Rgba<u8> {
    let channel = |ca: u8, cb: u8| {
        let (ca, cb) = (ca as f64, cb as f64);
        (ca * (1.0 - t) + cb * t).floor() as u8
    };
    Rgba([
        channel(a[0], b[0]),
        channel(a[1], b[1]),
        channel(a[2], b[2]),
        channel(a[3], b[3]),
    ])
}

/// Split and classify a ramp spec into sorted stops spanning `0..=255`.
fn parse_stops(spec: &str) -> Result<Vec<ColorStop>, ColorError> {
    let invalid = |reason| ColorError::InvalidRamp {
        spec: spec.to_string(),
        reason,
    };

    let tokens: Vec<&str> = spec.split('-').collect();
    if tokens.len() < 2 {
        return Err(invalid("at least two stops are required"));
    }

    let indexed = tokens.iter().filter(|t| t.len() == INDEXED_TOKEN_LEN).count();

    if indexed == tokens.len() {
        parse_indexed(&tokens).ok_or_else(|| invalid("malformed indexed stop"))
    } else if indexed == 0 {
        parse_uniform(&tokens).ok_or_else(|| invalid("malformed color stop"))
    } else {
        Err(invalid("uniform and indexed stops cannot be mixed"))
    }
}

fn parse_uniform(tokens: &[&str]) -> Option<Vec<ColorStop>> {
    let last = (tokens.len() - 1) as f64;
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            let color = parse_color(token).ok()?;
            let position = (255.0 * i as f64 / last).round() as u8;
            Some(ColorStop { position, color })
        })
        .collect()
}

fn parse_indexed(tokens: &[&str]) -> Option<Vec<ColorStop>> {
    let mut stops = tokens
        .iter()
        .map(|token| {
            if !token.bytes().all(is_lower_hex) {
                return None;
            }
            let (position, color) = token.split_at(2);
            let position = u8::from_str_radix(position, 16).ok()?;
            let color = parse_color(color).ok()?;
            Some(ColorStop { position, color })
        })
        .collect::<Option<Vec<_>>>()?;

    // stable: equal positions keep their listed order
    stops.sort_by_key(|stop| stop.position);

    let first = stops[0];
    if first.position > 0 {
        stops.insert(
            0,
            ColorStop {
                position: 0,
                color: first.color,
            },
        );
    }

    let last = stops[stops.len() - 1];
    if last.position < u8::MAX {
        stops.push(ColorStop {
            position: u8::MAX,
            color: last.color,
        });
    }

    Some(stops)
}
