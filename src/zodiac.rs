//! Zodiac mapping
//!
//! Maps an ecliptic longitude onto one of the twelve 30 degree signs. Each sign
//! covers `[start, start + 30)`, so a longitude exactly on a boundary belongs to
//! the sign that begins there.

use crate::error::HoursError;
use crate::types::{ZodiacSign, ZODIAC_SIGNS};

/// Mapper from ecliptic longitude to zodiac sign
pub struct ZodiacMapper;

impl ZodiacMapper {
    /// Sign containing `longitude` (any finite value, wrapped into [0, 360))
    pub fn sign_of(longitude: f64) -> Result<ZodiacSign, HoursError> {
        let normalized = normalize_degrees(longitude)?;

        // Greatest start degree not exceeding the input
        Ok(ZODIAC_SIGNS
            .iter()
            .rev()
            .copied()
            .find(|sign| normalized >= sign.start_degree())
            .unwrap_or(ZodiacSign::Aries))
    }

    /// Degrees already travelled inside the sign, [0, 30)
    pub fn degree_in_sign(longitude: f64) -> Result<f64, HoursError> {
        let normalized = normalize_degrees(longitude)?;
        let sign = Self::sign_of(normalized)?;
        Ok(normalized - sign.start_degree())
    }
}

/// Wrap a finite angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> Result<f64, HoursError> {
    if !degrees.is_finite() {
        return Err(HoursError::InvalidLongitude(degrees));
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        Ok(0.0)
    } else {
        Ok(wrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_belongs_to_next_sign() {
        assert_eq!(ZodiacMapper::sign_of(30.0).unwrap(), ZodiacSign::Taurus);
        assert_eq!(ZodiacMapper::sign_of(29.999).unwrap(), ZodiacSign::Aries);
        assert_eq!(ZodiacMapper::sign_of(0.0).unwrap(), ZodiacSign::Aries);
        assert_eq!(ZodiacMapper::sign_of(359.999).unwrap(), ZodiacSign::Pisces);
    }

    #[test]
    fn test_every_sign_start_maps_to_itself() {
        for sign in ZODIAC_SIGNS {
            assert_eq!(ZodiacMapper::sign_of(sign.start_degree()).unwrap(), sign);
            assert_eq!(
                ZodiacMapper::sign_of(sign.start_degree() + 15.0).unwrap(),
                sign
            );
        }
    }

    #[test]
    fn test_partition_has_no_gaps() {
        // Sweep the circle in tenth-degree steps; every sample maps to the bin
        // given by integer division and bins advance one at a time.
        let mut previous = ZodiacSign::Aries;
        for step in 0..3600 {
            let degrees = step as f64 / 10.0;
            let sign = ZodiacMapper::sign_of(degrees).unwrap();
            assert_eq!(sign.index(), step / 300);
            assert!(sign.index() == previous.index() || sign.index() == previous.index() + 1);
            previous = sign;
        }
    }

    #[test]
    fn test_wraps_by_modulo() {
        assert_eq!(ZodiacMapper::sign_of(360.0).unwrap(), ZodiacSign::Aries);
        assert_eq!(ZodiacMapper::sign_of(390.0).unwrap(), ZodiacSign::Taurus);
        assert_eq!(ZodiacMapper::sign_of(-1.0).unwrap(), ZodiacSign::Pisces);
        assert_eq!(ZodiacMapper::sign_of(-330.0).unwrap(), ZodiacSign::Taurus);
        assert_eq!(ZodiacMapper::sign_of(-1e-18).unwrap(), ZodiacSign::Aries);
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(matches!(
            ZodiacMapper::sign_of(f64::NAN),
            Err(HoursError::InvalidLongitude(_))
        ));
        assert!(ZodiacMapper::sign_of(f64::INFINITY).is_err());
    }

    #[test]
    fn test_degree_in_sign() {
        let degree = ZodiacMapper::degree_in_sign(135.5).unwrap();
        assert!((degree - 15.5).abs() < 1e-9);
    }
}
