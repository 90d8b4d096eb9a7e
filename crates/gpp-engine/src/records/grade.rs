use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grades that carry grade points. Anything else is excluded from scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    S,
    A,
    B,
    C,
    F,
}

impl LetterGrade {
    /// Accepts one letter, either case, half-width or full-width (`Ｓ`, `ｓ`).
    pub fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.trim().chars();
        let letter = fold_width(chars.next()?);
        if chars.next().is_some() {
            return None;
        }

        match letter.to_ascii_uppercase() {
            'S' => Some(Self::S),
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'F' => Some(Self::F),
            _ => None,
        }
    }

    pub fn grade_point(self) -> Decimal {
        match self {
            Self::S => Decimal::from(4),
            Self::A => Decimal::from(3),
            Self::B => Decimal::from(2),
            Self::C => Decimal::from(1),
            Self::F => Decimal::ZERO,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn fold_width(c: char) -> char {
    match c {
        '\u{FF21}'..='\u{FF3A}' | '\u{FF41}'..='\u{FF5A}' => {
            char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
        }
        _ => c,
    }
}
