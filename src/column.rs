//! Per-token column state and the window of rows a column shows.

use std::fmt;

use serde::Serialize;

use crate::codec::{Fields, year_range};
use crate::consts::{MIN_DAY, OVERSCAN_ROWS, TWO_DIGIT_YEAR_SPAN};
use crate::format::token_text;
use crate::options::Options;
use crate::types::{Kind, Token, days_in_month};

/// One end of a column's range.
#[derive(Clone, Copy)]
pub enum Limit {
    Fixed(i32),
    /// Recomputed from the composite date every time it is read
    Derived(fn(&Fields) -> i32),
}

impl Limit {
    pub fn resolve(self, fields: &Fields) -> i32 {
        match self {
            Self::Fixed(value) => value,
            Self::Derived(f) => f(fields),
        }
    }
}

impl fmt::Debug for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

fn days_in_current_month(fields: &Fields) -> i32 {
    let days = days_in_month(fields.year, fields.month.min(11));
    i32::try_from(days).unwrap_or(i32::MAX)
}

/// Static policy of a token kind: its range and the offset between stored and shown values.
///
/// Full years span every year a composite date can hold.
fn limits(token: Token) -> (Limit, Limit, i32) {
    match token.kind() {
        Kind::Year if token.is_two_digit_year() => {
            (Limit::Fixed(0), Limit::Fixed(TWO_DIGIT_YEAR_SPAN - 1), 0)
        }
        Kind::Year => {
            let years = year_range();
            (Limit::Fixed(*years.start()), Limit::Fixed(*years.end()), 0)
        }
        Kind::Month => (Limit::Fixed(0), Limit::Fixed(11), 1),
        Kind::Day => (
            Limit::Fixed(MIN_DAY as i32),
            Limit::Derived(days_in_current_month),
            0,
        ),
        Kind::Hour => (Limit::Fixed(0), Limit::Fixed(23), 0),
        Kind::Minute | Kind::Second => (Limit::Fixed(0), Limit::Fixed(59), 0),
        Kind::Millisecond => (Limit::Fixed(0), Limit::Fixed(999), 0),
    }
}

/// A rendered cell of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Column value the row stands for; `None` for blank rows past either end
    pub value: Option<i32>,
    pub text: String,
    /// `true` for the center row
    pub picked: bool,
}

/// Mutable state of one column.
#[derive(Debug, Clone)]
pub struct Column {
    token: Token,
    min: Limit,
    max: Limit,
    increment: i32,
    offset: i32,
    aliases: Option<Vec<String>>,
    index: usize,
    current: i32,
    cyclic: bool,
    header: Option<String>,
    controls: bool,
}

impl Column {
    /// Builds the column for `token`. Its value stays 0 until the codec seeds it.
    pub fn build(token: Token, options: &Options) -> Self {
        let (min, max, offset) = limits(token);
        let kind = token.kind();
        let header = options.headers().then(|| {
            let label = options.text().label(kind);
            if label.is_empty() {
                kind.title()
            } else {
                label.to_owned()
            }
        });

        Self {
            token,
            min,
            max,
            increment: options.increment().step(kind),
            offset,
            aliases: options.aliases(token).map(<[String]>::to_vec),
            index: center_index(options.rows()),
            current: 0,
            cyclic: !(kind == Kind::Year && !token.is_two_digit_year()),
            header,
            controls: options.controls(),
        }
    }

    #[inline]
    pub const fn token(&self) -> Token {
        self.token
    }

    #[inline]
    pub const fn kind(&self) -> Kind {
        self.token.kind()
    }

    /// Committed column value (0-based for months)
    #[inline]
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Row index of the picked row within the rendered window
    #[inline]
    pub const fn selected_index(&self) -> usize {
        self.index
    }

    #[inline]
    pub const fn increment(&self) -> i32 {
        self.increment
    }

    /// Added to the stored value when it is shown as a number
    #[inline]
    pub const fn offset(&self) -> i32 {
        self.offset
    }

    pub fn aliases(&self) -> Option<&[String]> {
        self.aliases.as_deref()
    }

    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub const fn has_controls(&self) -> bool {
        self.controls
    }

    /// `true` when the range depends on other columns
    pub const fn is_dynamic(&self) -> bool {
        matches!(self.min, Limit::Derived(_)) || matches!(self.max, Limit::Derived(_))
    }

    /// `false` for full years, which never wrap
    pub const fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    /// Current bounds, evaluated against `fields`
    pub fn bounds(&self, fields: &Fields) -> (i32, i32) {
        (self.min.resolve(fields), self.max.resolve(fields))
    }

    /// Sets the committed value. The picked row is always the center one.
    pub(crate) fn seed(&mut self, value: i32) {
        self.current = value;
    }

    /// Value `steps` increments away from the committed one, pulled back into range.
    pub fn stepped(&self, steps: i32, fields: &Fields, wrap: bool) -> i32 {
        let target = i64::from(self.current) + i64::from(steps) * i64::from(self.increment);
        self.correct(target, fields, wrap)
    }

    /// Brings `value` into the column's range.
    ///
    /// Saturates at the nearest end unless `wrap` is set and the column is
    /// cyclic, in which case the value cycles through the range.
    pub fn correct(&self, value: i64, fields: &Fields, wrap: bool) -> i32 {
        let (min, max) = self.bounds(fields);
        let (low, high) = (i64::from(min), i64::from(max).max(i64::from(min)));
        let corrected = if wrap && self.cyclic {
            low + (value - low).rem_euclid(high - low + 1)
        } else {
            value.clamp(low, high)
        };
        i32::try_from(corrected).unwrap_or(self.current)
    }

    /// Renders `rows + 2` rows centered `steps` increments away from the committed value.
    ///
    /// `steps` is non-zero only while a drag is in progress.
    pub fn rows(&self, fields: &Fields, options: &Options, steps: i32) -> Vec<Row> {
        let wrap = options.wrap();
        let centered = self.stepped(steps, fields, wrap);
        let (min, max) = self.bounds(fields);
        let count = options.rows() + OVERSCAN_ROWS;

        (0..count)
            .map(|i| {
                let position = i64::try_from(i).unwrap_or(i64::MAX)
                    - i64::try_from(self.index).unwrap_or(i64::MAX);
                let raw = i64::from(centered) + position * i64::from(self.increment);
                let in_range = (i64::from(min)..=i64::from(max)).contains(&raw);

                let value = if in_range {
                    i32::try_from(raw).ok()
                } else if wrap && self.cyclic {
                    Some(self.correct(raw, fields, true))
                } else {
                    None
                };

                let text = value.map_or_else(String::new, |value| {
                    let text = token_text(self.token, value, self.aliases(), options.bce());
                    options.translate(self.kind(), text)
                });

                Row {
                    value,
                    text,
                    picked: position == 0,
                }
            })
            .collect()
    }
}

/// Index of the center row in a window of `rows + 2` rows
pub const fn center_index(rows: usize) -> usize {
    (rows + OVERSCAN_ROWS) / 2
}
