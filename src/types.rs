use crate::consts::{
    CENTURY_CYCLE, DAYS_IN_MONTH, FEBRUARY, FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE, LEAP_YEAR_CYCLE,
};
use crate::ParseError;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The date/time component a column edits.
///
/// Declaration order is also the order in which fields are applied when a date is
/// rebuilt, so a day is always checked against the year and month it lands in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    #[display(fmt = "year")]
    Year,
    #[display(fmt = "month")]
    Month,
    #[display(fmt = "day")]
    Day,
    #[display(fmt = "hour")]
    Hour,
    #[display(fmt = "minute")]
    Minute,
    #[display(fmt = "second")]
    Second,
    #[display(fmt = "millisecond")]
    Millisecond,
}

impl Kind {
    /// Every kind, in application order
    pub const ALL: [Self; 7] = [
        Self::Year,
        Self::Month,
        Self::Day,
        Self::Hour,
        Self::Minute,
        Self::Second,
        Self::Millisecond,
    ];

    /// Maps a format letter to the kind it stands for.
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'Y' => Some(Self::Year),
            'M' => Some(Self::Month),
            'D' => Some(Self::Day),
            'H' => Some(Self::Hour),
            'm' => Some(Self::Minute),
            's' => Some(Self::Second),
            'S' => Some(Self::Millisecond),
            _ => None,
        }
    }

    /// The format letter for this kind
    pub const fn letter(self) -> char {
        match self {
            Self::Year => 'Y',
            Self::Month => 'M',
            Self::Day => 'D',
            Self::Hour => 'H',
            Self::Minute => 'm',
            Self::Second => 's',
            Self::Millisecond => 'S',
        }
    }

    /// Capitalised name, used as a header when no label is configured
    pub fn title(self) -> String {
        let name = self.to_string();
        let mut chars = name.chars();
        chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
            .unwrap_or_default()
    }
}

impl FromStr for Kind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::InvalidValue(s.to_owned()))
    }
}

/// One placeholder of a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    kind: Kind,
    width: usize,
    symbolic: bool,
}

impl Token {
    /// Creates a token from its kind and the number of repeated letters.
    ///
    /// Month tokens three or more letters wide render month names instead of numbers.
    pub const fn new(kind: Kind, width: usize) -> Self {
        let width = if width == 0 { 1 } else { width };
        let symbolic = matches!(kind, Kind::Month) && width >= 3;
        Self {
            kind,
            width,
            symbolic,
        }
    }

    #[inline]
    pub const fn kind(self) -> Kind {
        self.kind
    }

    /// Number of letters in the token, which doubles as its zero-padding width
    #[inline]
    pub const fn width(self) -> usize {
        self.width
    }

    #[inline]
    pub const fn is_symbolic(self) -> bool {
        self.symbolic
    }

    /// `true` for `YY`: the column holds the year modulo 100
    #[inline]
    pub const fn is_two_digit_year(self) -> bool {
        matches!(self.kind, Kind::Year) && self.width == 2
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for _ in 0..self.width {
            write!(f, "{}", self.kind.letter())?;
        }
        Ok(())
    }
}

/// Explicit stepping requested by a control click or a keyboard shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[display(fmt = "next")]
    Next,
    #[display(fmt = "prev")]
    Prev,
}

impl Action {
    /// Row delta the action stands for
    pub const fn delta(self) -> i32 {
        match self {
            Self::Next => 1,
            Self::Prev => -1,
        }
    }
}

// Helper functions

pub const fn is_leap_year(year: i32) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

/// Number of days in a 0-based `month` of `year`
pub const fn days_in_month(year: i32, month: u32) -> u32 {
    debug_assert!(month < 12);

    if month == FEBRUARY && is_leap_year(year) {
        FEBRUARY_DAYS_LEAP
    } else {
        DAYS_IN_MONTH[month as usize]
    }
}
