//! Decimal-degree geohash used in standardized vehicle-position topics.
//!
//! Level 0 holds the integer degrees as `"{lat};{lon}"`. Each following
//! level holds the next decimal digit of latitude then of longitude, so
//! `(61.498, 23.761)` becomes `["61;23", "47", "96", "81"]`.
//!
//! A negative coordinate keeps its sign on the integer part even when that
//! part is zero, so `-0.5` and `0.5` land in different cells (`"-0"` vs
//! `"0"`). Only values that truncate to all-zero digits lose the sign.

use crate::error::{Result, TopicError};
use crate::topic::GEOHASH_LEVELS;

const DECIMALS: u32 = (GEOHASH_LEVELS - 1) as u32;

/// Splits a coordinate into its sign-carrying integer part and the first
/// [`DECIMALS`] decimal digits, truncated.
fn split_degrees(value: f64) -> (String, Vec<u8>) {
    let scale = 10u64.pow(DECIMALS);
    // Nudge past representation error so 61.498 does not truncate to 61.497.
    let scaled = (value.abs() * scale as f64 + 1e-9).floor() as u64;
    let whole = scaled / scale;
    let mut frac = scaled % scale;

    let mut digits = vec![0u8; DECIMALS as usize];
    for slot in digits.iter_mut().rev() {
        *slot = (frac % 10) as u8;
        frac /= 10;
    }

    let sign = if value < 0.0 && scaled > 0 { "-" } else { "" };
    (format!("{sign}{whole}"), digits)
}

/// Computes the four topic geohash levels for a WGS84 position.
///
/// # Errors
///
/// [`TopicError::InvalidCoordinate`] for non-finite values or values
/// outside ±90 latitude / ±180 longitude.
pub fn geohash(lat: f64, lon: f64) -> Result<[String; GEOHASH_LEVELS]> {
    if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
        return Err(TopicError::InvalidCoordinate { lat, lon });
    }

    let (lat_whole, lat_digits) = split_degrees(lat);
    let (lon_whole, lon_digits) = split_degrees(lon);

    let mut levels: [String; GEOHASH_LEVELS] = Default::default();
    levels[0] = format!("{lat_whole};{lon_whole}");
    for (i, level) in levels.iter_mut().skip(1).enumerate() {
        *level = format!("{}{}", lat_digits[i], lon_digits[i]);
    }
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tampere_centre() {
        assert_eq!(geohash(61.498, 23.761).unwrap(), ["61;23", "47", "96", "81"]);
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        assert_eq!(geohash(60.9999, 24.9999).unwrap(), ["60;24", "99", "99", "99"]);
    }

    #[test]
    fn test_whole_degrees_pad_with_zeros() {
        assert_eq!(geohash(62.0, 29.0).unwrap(), ["62;29", "00", "00", "00"]);
    }

    #[test]
    fn test_negative_coordinates_keep_sign() {
        assert_eq!(geohash(-33.868, 151.209).unwrap(), ["-33;151", "82", "60", "89"]);
    }

    #[test]
    fn test_small_negative_has_no_negative_zero() {
        assert_eq!(geohash(-0.0001, 0.0).unwrap()[0], "0;0");
    }

    #[test]
    fn test_negative_fraction_keeps_sign_on_zero_degrees() {
        assert_eq!(geohash(-0.5, 0.5).unwrap(), ["-0;0", "55", "00", "00"]);
        assert_ne!(geohash(-0.5, 0.5).unwrap(), geohash(0.5, 0.5).unwrap());
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert!(geohash(91.0, 0.0).is_err());
        assert!(geohash(0.0, -180.5).is_err());
        assert!(geohash(f64::NAN, 0.0).is_err());
    }
}
