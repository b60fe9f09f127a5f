//! A rough, reproducible password strength score.
//!
//! This is a checklist heuristic, not an entropy estimate: eight independent criteria each add one
//! point, and the total is bucketed into a [`Strength`].

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

pub const MAX_SCORE: u8 = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl Strength {
    pub fn from_score(score: u8) -> Strength {
        match score {
            0..=3 => Strength::Weak,
            4..=6 => Strength::Medium,
            _ => Strength::Strong,
        }
    }

    /// How full a strength meter for this category should be drawn, from 0 to 1.
    pub fn meter_fraction(self) -> f32 {
        match self {
            Strength::Weak => 1.0 / 3.0,
            Strength::Medium => 2.0 / 3.0,
            Strength::Strong => 1.0,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strength::Weak => "Weak",
            Strength::Medium => "Medium",
            Strength::Strong => "Strong",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct StrengthAssessment {
    pub score: u8,
    pub category: Strength,
}

/// Score a password.
pub fn assess(password: &str) -> StrengthAssessment {
    let len = password.chars().count();
    let distinct = password.chars().collect::<HashSet<_>>().len();

    let checks = [
        len >= 8,
        len >= 12,
        len >= 16,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
        // distinct / len >= 0.7, kept in integers. An empty password fails it.
        len > 0 && distinct * 10 >= len * 7,
    ];
    let score = checks.iter().filter(|&&passed| passed).count() as u8;
    let category = Strength::from_score(score);
    log::trace!("strength score {}/{} ({})", score, MAX_SCORE, category);
    StrengthAssessment { score, category }
}
