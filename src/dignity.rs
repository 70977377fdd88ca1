//! Essential dignity and strength scoring
//!
//! Dignity comes from a fixed planet x sign table using the traditional
//! rulerships. Where a planet holds two dignities in the same sign the higher
//! one is recorded (Domicile > Exaltation > Detriment > Fall).
//!
//! Strength adds one point for natal resonance to the dignity's base points and
//! maps the score onto a tier.

use crate::types::{Dignity, Planet, Strength, StrengthTier, ZodiacSign};

const DOM: Dignity = Dignity::Domicile;
const EXA: Dignity = Dignity::Exaltation;
const NEU: Dignity = Dignity::Neutral;
const DET: Dignity = Dignity::Detriment;
const FAL: Dignity = Dignity::Fall;

/// Rows in Chaldean order, columns Aries..Pisces
#[rustfmt::skip]
const DIGNITY_TABLE: [[Dignity; 12]; 7] = [
    //          Ari  Tau  Gem  Can  Leo  Vir  Lib  Sco  Sag  Cap  Aqu  Pis
    /* Saturn  */ [FAL, NEU, NEU, DET, DET, NEU, EXA, NEU, NEU, DOM, DOM, NEU],
    /* Jupiter */ [NEU, NEU, DET, EXA, NEU, DET, NEU, NEU, DOM, FAL, NEU, DOM],
    /* Mars    */ [DOM, DET, NEU, FAL, NEU, NEU, DET, DOM, NEU, EXA, NEU, NEU],
    /* Sun     */ [EXA, NEU, NEU, NEU, DOM, NEU, FAL, NEU, NEU, NEU, DET, NEU],
    /* Venus   */ [DET, DOM, NEU, NEU, NEU, FAL, DOM, DET, NEU, NEU, NEU, EXA],
    /* Mercury */ [NEU, NEU, DOM, NEU, NEU, DOM, NEU, NEU, DET, NEU, NEU, DET],
    /* Moon    */ [NEU, EXA, NEU, DOM, NEU, NEU, NEU, FAL, NEU, DET, NEU, NEU],
];

/// Natal resonance bonus added to the base points
pub const RESONANCE_BONUS: u8 = 1;

/// Lookup of a planet's essential dignity in a sign
pub struct DignityScorer;

impl DignityScorer {
    pub fn dignity_of(planet: Planet, sign: ZodiacSign) -> Dignity {
        DIGNITY_TABLE[planet.chaldean_index()][sign.index()]
    }
}

/// Strength scoring from dignity and resonance
pub struct StrengthScorer;

impl StrengthScorer {
    /// Strength of `planet` placed in `sign`
    pub fn strength_of(planet: Planet, sign: ZodiacSign, natal_resonant: bool) -> Strength {
        Self::from_dignity(DignityScorer::dignity_of(planet, sign), natal_resonant)
    }

    /// Strength for an already known dignity
    pub fn from_dignity(dignity: Dignity, natal_resonant: bool) -> Strength {
        let bonus = if natal_resonant { RESONANCE_BONUS } else { 0 };
        let score = base_points(dignity) + bonus;
        Strength {
            score,
            tier: tier_for(score),
        }
    }
}

/// Base points of a dignity
pub fn base_points(dignity: Dignity) -> u8 {
    match dignity {
        Dignity::Domicile => 5,
        Dignity::Exaltation => 4,
        Dignity::Neutral => 3,
        Dignity::Detriment => 2,
        Dignity::Fall => 1,
    }
}

/// Tier for a score (1-2 weak, 3 moderate, 4-5 strong, 6 exceptional)
pub fn tier_for(score: u8) -> StrengthTier {
    match score {
        0..=2 => StrengthTier::Weak,
        3 => StrengthTier::Moderate,
        4..=5 => StrengthTier::Strong,
        _ => StrengthTier::Exceptional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZodiacSign::*;
    use crate::types::{CHALDEAN_ORDER, ZODIAC_SIGNS};
    use pretty_assertions::assert_eq;

    /// Traditional rulership lists: (planet, domiciles, exaltation, detriments, fall)
    fn rulerships() -> Vec<(Planet, Vec<ZodiacSign>, ZodiacSign, Vec<ZodiacSign>, ZodiacSign)> {
        vec![
            (Planet::Sun, vec![Leo], Aries, vec![Aquarius], Libra),
            (Planet::Moon, vec![Cancer], Taurus, vec![Capricorn], Scorpio),
            (Planet::Mercury, vec![Gemini, Virgo], Virgo, vec![Sagittarius, Pisces], Pisces),
            (Planet::Venus, vec![Taurus, Libra], Pisces, vec![Scorpio, Aries], Virgo),
            (Planet::Mars, vec![Aries, Scorpio], Capricorn, vec![Libra, Taurus], Cancer),
            (Planet::Jupiter, vec![Sagittarius, Pisces], Cancer, vec![Gemini, Virgo], Capricorn),
            (Planet::Saturn, vec![Capricorn, Aquarius], Libra, vec![Cancer, Leo], Aries),
        ]
    }

    #[test]
    fn test_table_matches_rulerships_with_precedence() {
        for (planet, domiciles, exaltation, detriments, fall) in rulerships() {
            for sign in ZODIAC_SIGNS {
                let expected = if domiciles.contains(&sign) {
                    Dignity::Domicile
                } else if sign == exaltation {
                    Dignity::Exaltation
                } else if detriments.contains(&sign) {
                    Dignity::Detriment
                } else if sign == fall {
                    Dignity::Fall
                } else {
                    Dignity::Neutral
                };
                assert_eq!(
                    DignityScorer::dignity_of(planet, sign),
                    expected,
                    "{planet} in {sign}"
                );
            }
        }
    }

    #[test]
    fn test_overlapping_dignities() {
        assert_eq!(DignityScorer::dignity_of(Planet::Mercury, Virgo), Dignity::Domicile);
        assert_eq!(DignityScorer::dignity_of(Planet::Mercury, Pisces), Dignity::Detriment);
    }

    #[test]
    fn test_every_planet_has_a_home() {
        for planet in CHALDEAN_ORDER {
            let domiciles = ZODIAC_SIGNS
                .iter()
                .filter(|s| DignityScorer::dignity_of(planet, **s) == Dignity::Domicile)
                .count();
            let expected = if matches!(planet, Planet::Sun | Planet::Moon) { 1 } else { 2 };
            assert_eq!(domiciles, expected, "{planet}");
        }
    }

    #[test]
    fn test_strength_range_and_resonance_bonus() {
        for planet in CHALDEAN_ORDER {
            for sign in ZODIAC_SIGNS {
                let plain = StrengthScorer::strength_of(planet, sign, false);
                let resonant = StrengthScorer::strength_of(planet, sign, true);
                assert!((1..=5).contains(&plain.score));
                assert_eq!(resonant.score, plain.score + 1);
                assert!(resonant.tier >= plain.tier);
            }
        }
    }

    #[test]
    fn test_tiers() {
        assert_eq!(tier_for(1), StrengthTier::Weak);
        assert_eq!(tier_for(2), StrengthTier::Weak);
        assert_eq!(tier_for(3), StrengthTier::Moderate);
        assert_eq!(tier_for(4), StrengthTier::Strong);
        assert_eq!(tier_for(5), StrengthTier::Strong);
        assert_eq!(tier_for(6), StrengthTier::Exceptional);

        for score in 1..6u8 {
            assert!(tier_for(score) <= tier_for(score + 1));
        }
    }

    #[test]
    fn test_examples() {
        let sun_in_leo = StrengthScorer::strength_of(Planet::Sun, Leo, true);
        assert_eq!(sun_in_leo.score, 6);
        assert_eq!(sun_in_leo.tier, StrengthTier::Exceptional);

        let saturn_in_aries = StrengthScorer::strength_of(Planet::Saturn, Aries, false);
        assert_eq!(saturn_in_aries.score, 1);
        assert_eq!(saturn_in_aries.tier, StrengthTier::Weak);

        let mars_in_gemini = StrengthScorer::strength_of(Planet::Mars, Gemini, false);
        assert_eq!(mars_in_gemini.score, 3);
        assert_eq!(mars_in_gemini.tier, StrengthTier::Moderate);
    }
}
