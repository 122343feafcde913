//! Encoded-curve codec
//!
//! The wire format stores each point as two zigzag-encoded signed deltas
//! (latitude first, then longitude) scaled by 1e5. Each delta is split into
//! 5-bit chunks, least significant first; every chunk is offset by 63 to land in
//! printable ASCII and all but the last chunk of a value carry the 0x20
//! continuation bit.
//!
//! Decoding never fails: a string that ends in the middle of a value, or holds a
//! character outside the alphabet, yields every point decoded up to that spot.

use crate::Coordinate;

const CHAR_OFFSET: i64 = 63;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION_BIT: i64 = 0x20;
const PRECISION: f64 = 1e5;
/// A 64-bit accumulator cannot take more than 13 chunks of 5 bits
const MAX_SHIFT: u32 = 60;

/// Decode an encoded curve into coordinates in path order
pub fn decode(curve: &str) -> Vec<Coordinate> {
    #[cfg(feature = "profiling")]
    profiling::scope!("polyline::decode");

    let bytes = curve.as_bytes();
    let mut coordinates = Vec::with_capacity(bytes.len() / 4);
    let mut index = 0;
    let mut lat_e5: i64 = 0;
    let mut lon_e5: i64 = 0;

    while index < bytes.len() {
        let (Some(delta_lat), Some(delta_lon)) = (
            next_value(bytes, &mut index),
            next_value(bytes, &mut index),
        ) else {
            tracing::debug!(
                "Encoded curve ended mid-point, keeping {} decoded points",
                coordinates.len()
            );
            break;
        };
        let (Some(lat), Some(lon)) = (
            lat_e5.checked_add(delta_lat),
            lon_e5.checked_add(delta_lon),
        ) else {
            tracing::warn!(
                "Encoded curve overflowed, keeping {} decoded points",
                coordinates.len()
            );
            break;
        };
        lat_e5 = lat;
        lon_e5 = lon;

        let latitude = lat_e5 as f64 / PRECISION;
        let longitude = lon_e5 as f64 / PRECISION;
        if Coordinate::in_range(latitude, longitude) {
            coordinates.push(Coordinate {
                latitude,
                longitude,
            });
        } else {
            tracing::warn!(
                "Skipping decoded point outside valid range: ({}, {})",
                latitude,
                longitude
            );
        }
    }

    coordinates
}

/// Decode an optional curve; a missing curve decodes to an empty path
pub fn decode_opt(curve: Option<&str>) -> Vec<Coordinate> {
    curve.map(decode).unwrap_or_default()
}

/// Read one zigzag value starting at `index`, advancing it past the value.
///
/// Returns `None` when the input ends mid-value or holds a byte outside the alphabet.
fn next_value(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut accumulator: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(*index)?;
        let chunk = byte as i64 - CHAR_OFFSET;
        if !(0..0x40).contains(&chunk) || shift > MAX_SHIFT {
            tracing::warn!("Malformed encoded curve at byte {}", *index);
            // Park the cursor at the end so the caller stops.
            *index = bytes.len();
            return None;
        }
        *index += 1;

        accumulator |= (chunk & CHUNK_MASK) << shift;
        shift += 5;

        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
    }

    Some(if accumulator & 1 != 0 {
        !(accumulator >> 1)
    } else {
        accumulator >> 1
    })
}

/// Encode coordinates into the compact curve format
///
/// Coordinates are rounded to five decimals, so `decode(encode(path))` matches
/// `path` within 1e-5 degrees per axis.
pub fn encode(path: &[Coordinate]) -> String {
    let mut out = String::with_capacity(path.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lon: i64 = 0;

    for coordinate in path {
        let lat = (coordinate.latitude * PRECISION).round() as i64;
        let lon = (coordinate.longitude * PRECISION).round() as i64;
        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lon - prev_lon);
        prev_lat = lat;
        prev_lon = lon;
    }

    out
}

fn push_value(out: &mut String, value: i64) {
    let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;
    while zigzag >= CONTINUATION_BIT as u64 {
        let chunk = (CONTINUATION_BIT as u64 | (zigzag & CHUNK_MASK as u64)) + CHAR_OFFSET as u64;
        out.push(char::from(chunk as u8));
        zigzag >>= 5;
    }
    out.push(char::from((zigzag + CHAR_OFFSET as u64) as u8));
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(actual: &Coordinate, latitude: f64, longitude: f64) {
        assert!(
            (actual.latitude - latitude).abs() < 1e-5 && (actual.longitude - longitude).abs() < 1e-5,
            "expected ({latitude}, {longitude}), got {actual:?}"
        );
    }

    #[test]
    fn test_decode_reference_curve() {
        let points = decode(REFERENCE);
        assert_eq!(points.len(), 3);
        assert_close(&points[0], 38.5, -120.2);
        assert_close(&points[1], 40.7, -120.95);
        assert_close(&points[2], 43.252, -126.453);
    }

    #[test]
    fn test_encode_reference_curve() {
        let path = [
            Coordinate {
                latitude: 38.5,
                longitude: -120.2,
            },
            Coordinate {
                latitude: 40.7,
                longitude: -120.95,
            },
            Coordinate {
                latitude: 43.252,
                longitude: -126.453,
            },
        ];
        assert_eq!(encode(&path), REFERENCE);
    }

    #[test]
    fn test_decode_empty_and_missing() {
        assert!(decode("").is_empty());
        assert!(decode_opt(None).is_empty());
        assert!(decode_opt(Some("")).is_empty());
    }

    #[test]
    fn test_truncated_curve_returns_partial_result() {
        // Cut inside the longitude of the second point
        let truncated = &REFERENCE[..16];
        let points = decode(truncated);
        assert_eq!(points.len(), 1);
        assert_close(&points[0], 38.5, -120.2);

        // Cut right after a latitude: the dangling latitude is dropped
        let points = decode(&REFERENCE[..5]);
        assert!(points.is_empty());
    }

    #[test]
    fn test_invalid_character_stops_decoding() {
        let mut curve = REFERENCE[..10].to_string();
        curve.push(' ');
        curve.push_str(&REFERENCE[10..]);
        let points = decode(&curve);
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_out_of_range_points_are_skipped() {
        // Second point ends up at latitude 100, third comes back into range
        let mut out = String::new();
        push_value(&mut out, 5_000_000);
        push_value(&mut out, 0);
        push_value(&mut out, 5_000_000);
        push_value(&mut out, 0);
        push_value(&mut out, -5_000_000);
        push_value(&mut out, 100);

        let points = decode(&out);
        assert_eq!(points.len(), 2);
        assert_close(&points[0], 50.0, 0.0);
        assert_close(&points[1], 50.0, 0.001);
    }

    #[test]
    fn test_runaway_continuation_does_not_panic() {
        let curve = "~".repeat(64);
        assert!(decode(&curve).is_empty());
    }
}
