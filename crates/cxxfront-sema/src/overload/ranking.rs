//! Rank vectors and the "better candidate" relation.

use std::cmp::Ordering;

use crate::conversion::{ConversionCategory, ConversionTier};

/// How one argument position was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// A conversion of the given category, tier and distance.
    Ranked(ConversionCategory, ConversionTier, u32),
    /// Passed through `...`; worse than any user-defined conversion.
    Ellipsis,
    /// Not compared (the object position of a static member or of a
    /// non-member candidate).
    Ignored,
}

impl Position {
    fn key(self) -> Option<(ConversionCategory, ConversionTier, u32)> {
        match self {
            Position::Ranked(category, tier, distance) => Some((category, tier, distance)),
            Position::Ellipsis => Some((
                ConversionCategory::NoConversion,
                ConversionTier::Direct,
                0,
            )),
            Position::Ignored => None,
        }
    }

    /// `Less` when `self` is the better match.
    pub fn compare(self, other: Position) -> Ordering {
        match (self.key(), other.key()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => Ordering::Equal,
        }
    }
}

/// Positions of one candidate, aligned with every other candidate's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankVector(pub Vec<Position>);

impl RankVector {
    /// No position is worse and at least one is better.
    pub fn is_better_than(&self, other: &RankVector) -> bool {
        let mut strictly = false;
        for (mine, theirs) in self.0.iter().zip(&other.0) {
            match mine.compare(*theirs) {
                Ordering::Greater => return false,
                Ordering::Less => strictly = true,
                Ordering::Equal => {}
            }
        }
        strictly
    }
}

/// Index of the candidate better than every other one.
pub fn best_of(ranks: &[RankVector]) -> Option<usize> {
    (0..ranks.len()).find(|&i| {
        ranks
            .iter()
            .enumerate()
            .all(|(j, other)| i == j || ranks[i].is_better_than(other))
    })
}

/// Candidates no other candidate beats.
pub fn undominated(ranks: &[RankVector]) -> Vec<usize> {
    (0..ranks.len())
        .filter(|&i| {
            !ranks
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && other.is_better_than(&ranks[i]))
        })
        .collect()
}
