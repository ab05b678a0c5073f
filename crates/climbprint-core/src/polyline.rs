//! Encoded polyline codec.
//!
//! Routes arrive from activity providers as compact ASCII strings: each
//! coordinate is scaled by 1e5, delta-encoded against the previous point,
//! zig-zag encoded, split into 5-bit groups (least significant first),
//! flagged with a 0x20 continuation bit and offset by 63 into printable
//! ASCII. Latitude and longitude alternate.
//!
//! Decoding is strict: a string that ends inside a coordinate, or that
//! contains bytes outside the alphabet, is rejected as a whole rather than
//! returning the points decoded so far.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{EngineError, GeoPoint};

/// Fixed-point scale applied to coordinates before encoding.
pub const PRECISION: f64 = 1e5;

/// ASCII offset added to every 5-bit group.
const ASCII_OFFSET: u8 = 63;

/// Continuation flag: set on every group except the last of a value.
const CONTINUATION: u64 = 0x20;

/// Mask for the payload bits of a group.
const GROUP_MASK: u64 = 0x1f;

/// Why an encoded polyline was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolylineFault {
    /// The input ended inside a coordinate value, or after a latitude
    /// with no matching longitude.
    Truncated,
    /// A byte outside the `?`..`~` encoding alphabet.
    InvalidByte(u8),
    /// A value does not fit the 64-bit accumulator.
    Overflow,
}

impl fmt::Display for PolylineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => f.write_str("input ends inside a coordinate"),
            Self::InvalidByte(b) => write!(f, "byte {b:#04x} is outside the encoding alphabet"),
            Self::Overflow => f.write_str("coordinate value overflows"),
        }
    }
}

/// Decode an encoded polyline into geographic points.
///
/// # Errors
///
/// Returns [`EngineError::MalformedPolyline`] if the input is truncated,
/// contains a byte outside the encoding alphabet, or encodes a value too
/// large to accumulate.
///
/// # Examples
///
/// ```
/// use climbprint_core::polyline::decode;
///
/// let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
/// assert_eq!(points.len(), 3);
/// assert!((points[0].lat - 38.5).abs() < 1e-9);
/// assert!((points[2].lng - -126.453).abs() < 1e-9);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn decode(encoded: &str) -> Result<Vec<GeoPoint>, EngineError> {
    let bytes = encoded.as_bytes();
    // Shortest possible pair is two bytes.
    let mut points = Vec::with_capacity(bytes.len() / 2);
    let mut offset = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while offset < bytes.len() {
        let value_start = offset;
        let dlat = next_value(bytes, &mut offset)?;
        let dlng = next_value(bytes, &mut offset)?;
        lat = lat
            .checked_add(dlat)
            .ok_or_else(|| malformed(value_start, PolylineFault::Overflow))?;
        lng = lng
            .checked_add(dlng)
            .ok_or_else(|| malformed(value_start, PolylineFault::Overflow))?;
        points.push(GeoPoint::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

/// Encode geographic points as a polyline string.
///
/// Coordinates are rounded to the nearest 1e-5 degree, so decoding the
/// result reproduces the input to within half of that. Non-finite
/// components encode as 0.
#[must_use]
pub fn encode(points: &[GeoPoint]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for p in points {
        let lat = to_fixed(p.lat);
        let lng = to_fixed(p.lng);
        push_value(&mut out, lat.wrapping_sub(prev_lat));
        push_value(&mut out, lng.wrapping_sub(prev_lng));
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

/// Read one zig-zag encoded value starting at `*offset`, advancing it
/// past the value's last group.
fn next_value(bytes: &[u8], offset: &mut usize) -> Result<i64, EngineError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*offset) else {
            return Err(malformed(*offset, PolylineFault::Truncated));
        };
        if !(ASCII_OFFSET..=b'~').contains(&byte) {
            return Err(malformed(*offset, PolylineFault::InvalidByte(byte)));
        }
        let group = u64::from(byte - ASCII_OFFSET);
        let payload = group & GROUP_MASK;
        // The 13th group only has 4 bits of room left.
        if shift > 60 || (shift == 60 && payload > 0xf) {
            return Err(malformed(*offset, PolylineFault::Overflow));
        }
        result |= payload << shift;
        *offset += 1;

        if group & CONTINUATION == 0 {
            break;
        }
        shift += 5;
    }

    #[allow(clippy::cast_possible_wrap)]
    let magnitude = (result >> 1) as i64;
    Ok(if result & 1 == 0 { magnitude } else { !magnitude })
}

fn push_value(out: &mut String, value: i64) {
    #[allow(clippy::cast_sign_loss)]
    let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;
    while zigzag >= CONTINUATION {
        out.push(group_char((zigzag & GROUP_MASK) | CONTINUATION));
        zigzag >>= 5;
    }
    out.push(group_char(zigzag));
}

#[allow(clippy::cast_possible_truncation)]
fn group_char(group: u64) -> char {
    char::from(group as u8 + ASCII_OFFSET)
}

#[allow(clippy::cast_possible_truncation)]
fn to_fixed(degrees: f64) -> i64 {
    if degrees.is_finite() {
        (degrees * PRECISION).round() as i64
    } else {
        0
    }
}

const fn malformed(offset: usize, reason: PolylineFault) -> EngineError {
    EngineError::MalformedPolyline { offset, reason }
}
