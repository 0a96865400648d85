//! Six-sided dice.

use crate::GameError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The face shown by one roll of a six-sided die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiceRoll(u8);

impl DiceRoll {
    /// Number of faces on the die.
    pub const FACES: u8 = 6;

    /// Wraps a face value, returning `None` outside `1..=6`.
    pub fn new(value: u8) -> Option<Self> {
        (1..=Self::FACES).contains(&value).then_some(Self(value))
    }

    /// Rolls the die.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random_range(1..=Self::FACES))
    }

    /// Face value, `1..=6`.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DiceRoll {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            GameError::InvalidConfiguration(format!("dice roll must be 1-6, got {value}"))
        })
    }
}

impl From<DiceRoll> for u8 {
    fn from(roll: DiceRoll) -> Self {
        roll.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_faces_in_range() {
        assert!(DiceRoll::new(0).is_none());
        assert!(DiceRoll::new(7).is_none());
        assert_eq!(DiceRoll::new(6).map(DiceRoll::value), Some(6));
    }

    #[test]
    fn test_rolls_cover_every_face() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [false; 6];
        for _ in 0..600 {
            let roll = DiceRoll::roll(&mut rng);
            seen[usize::from(roll.value()) - 1] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
