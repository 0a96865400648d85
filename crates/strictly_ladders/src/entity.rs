//! Snakes, ladders, and the redirects they trigger.

use crate::{GameError, Point};
use serde::{Deserialize, Serialize};

/// A snake: landing on its head sends a piece down to its tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSnake")]
pub struct Snake {
    head: Point,
    tail: Point,
}

impl Snake {
    /// Creates a snake.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfiguration`] unless the head sits on a
    /// strictly higher row than the tail.
    pub fn new(head: Point, tail: Point) -> Result<Self, GameError> {
        if head.row() <= tail.row() {
            return Err(GameError::InvalidConfiguration(format!(
                "snake head ({head}) must be on a higher row than its tail ({tail})"
            )));
        }
        Ok(Self { head, tail })
    }

    /// Builds a snake from endpoints whose ordering the caller has checked.
    pub(crate) fn spanning(head: Point, tail: Point) -> Self {
        debug_assert!(head.row() > tail.row());
        Self { head, tail }
    }

    /// Cell that triggers the snake.
    pub fn head(&self) -> Point {
        self.head
    }

    /// Cell the snake drops a piece onto.
    pub fn tail(&self) -> Point {
        self.tail
    }
}

/// A ladder: landing on its bottom lifts a piece to its top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLadder")]
pub struct Ladder {
    top: Point,
    bottom: Point,
}

impl Ladder {
    /// Creates a ladder.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfiguration`] unless the top sits on a
    /// strictly higher row than the bottom.
    pub fn new(bottom: Point, top: Point) -> Result<Self, GameError> {
        if top.row() <= bottom.row() {
            return Err(GameError::InvalidConfiguration(format!(
                "ladder top ({top}) must be on a higher row than its bottom ({bottom})"
            )));
        }
        Ok(Self { top, bottom })
    }

    /// Builds a ladder from endpoints whose ordering the caller has checked.
    pub(crate) fn spanning(bottom: Point, top: Point) -> Self {
        debug_assert!(top.row() > bottom.row());
        Self { top, bottom }
    }

    /// Cell the ladder lifts a piece onto.
    pub fn top(&self) -> Point {
        self.top
    }

    /// Cell that triggers the ladder.
    pub fn bottom(&self) -> Point {
        self.bottom
    }
}

#[derive(Deserialize)]
struct RawSnake {
    head: Point,
    tail: Point,
}

impl TryFrom<RawSnake> for Snake {
    type Error = GameError;

    fn try_from(raw: RawSnake) -> Result<Self, Self::Error> {
        Self::new(raw.head, raw.tail)
    }
}

#[derive(Deserialize)]
struct RawLadder {
    top: Point,
    bottom: Point,
}

impl TryFrom<RawLadder> for Ladder {
    type Error = GameError;

    fn try_from(raw: RawLadder) -> Result<Self, Self::Error> {
        Self::new(raw.bottom, raw.top)
    }
}

/// The effect of landing on a triggering cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Redirect {
    /// Bitten by a snake.
    #[display("snake {} -> {}", from.index(), to.index())]
    Snake {
        /// Snake head.
        from: Point,
        /// Snake tail.
        to: Point,
    },
    /// Climbed a ladder.
    #[display("ladder {} -> {}", from.index(), to.index())]
    Ladder {
        /// Ladder bottom.
        from: Point,
        /// Ladder top.
        to: Point,
    },
}

impl Redirect {
    /// Cell the piece ends up on after this redirect.
    pub fn destination(&self) -> Point {
        match self {
            Redirect::Snake { to, .. } | Redirect::Ladder { to, .. } => *to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoardDimension;

    fn pt(index: usize) -> Point {
        Point::from_index(BoardDimension::new(10).unwrap(), index).unwrap()
    }

    #[test]
    fn test_snake_requires_descending_rows() {
        assert!(Snake::new(pt(30), pt(12)).is_ok());
        assert!(Snake::new(pt(12), pt(30)).is_err());
        // Same row is not a snake
        assert!(Snake::new(pt(35), pt(31)).is_err());
    }

    #[test]
    fn test_ladder_requires_ascending_rows() {
        assert!(Ladder::new(pt(5), pt(23)).is_ok());
        assert!(Ladder::new(pt(23), pt(5)).is_err());
        assert!(Ladder::new(pt(20), pt(29)).is_err());
    }

    #[test]
    fn test_redirect_destination() {
        let r = Redirect::Ladder { from: pt(5), to: pt(23) };
        assert_eq!(r.destination(), pt(23));
        assert_eq!(r.to_string(), "ladder 5 -> 23");
    }

    #[test]
    fn test_decoding_rejects_inverted_entities() {
        let snake = Snake::new(pt(30), pt(12)).unwrap();
        let json = serde_json::to_value(snake).unwrap();
        assert_eq!(serde_json::from_value::<Snake>(json.clone()).unwrap(), snake);

        let upward = serde_json::json!({ "head": json["tail"], "tail": json["head"] });
        assert!(serde_json::from_value::<Snake>(upward).is_err());

        let ladder = Ladder::new(pt(5), pt(23)).unwrap();
        let json = serde_json::to_value(ladder).unwrap();
        assert_eq!(serde_json::from_value::<Ladder>(json.clone()).unwrap(), ladder);

        let downward = serde_json::json!({ "top": json["bottom"], "bottom": json["top"] });
        assert!(serde_json::from_value::<Ladder>(downward).is_err());
    }
}
