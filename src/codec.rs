//! Conversion between a composite date and per-column values.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::consts::{MIN_DAY, NANOS_PER_MILLI, TWO_DIGIT_YEAR_PIVOT, TWO_DIGIT_YEAR_SPAN};
use crate::types::{Kind, Token, days_in_month};

const MAX_HOUR: u32 = 23;
const MAX_MINUTE: u32 = 59;
const MAX_SECOND: u32 = 59;
const MAX_MILLISECOND: u32 = 999;
const MAX_MONTH_INDEX: u32 = 11;

/// A date/time broken into the values columns work with.
///
/// `month` is 0-based. Values are not validated; `to_date` clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl Fields {
    pub fn from_date(date: &NaiveDateTime) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
            day: date.day(),
            hour: date.hour(),
            minute: date.minute(),
            second: date.second(),
            millisecond: (date.nanosecond() / NANOS_PER_MILLI).min(MAX_MILLISECOND),
        }
    }

    /// Value of one component; month is 0-based
    pub fn get(&self, kind: Kind) -> i32 {
        let value = match kind {
            Kind::Year => return self.year,
            Kind::Month => self.month,
            Kind::Day => self.day,
            Kind::Hour => self.hour,
            Kind::Minute => self.minute,
            Kind::Second => self.second,
            Kind::Millisecond => self.millisecond,
        };
        i32::try_from(value).unwrap_or(i32::MAX)
    }

    /// Overwrites one component. Negative values for unsigned components become 0.
    pub fn set(&mut self, kind: Kind, value: i32) {
        let unsigned = u32::try_from(value).unwrap_or(0);
        match kind {
            Kind::Year => self.year = value,
            Kind::Month => self.month = unsigned,
            Kind::Day => self.day = unsigned,
            Kind::Hour => self.hour = unsigned,
            Kind::Minute => self.minute = unsigned,
            Kind::Second => self.second = unsigned,
            Kind::Millisecond => self.millisecond = unsigned,
        }
    }

    /// Pulls every component into its calendar range.
    ///
    /// The day is checked against the (already corrected) year and month, so a
    /// day past the end of the month lands on the month's last day.
    pub fn clamped(self) -> Self {
        let years = year_range();
        let year = self.year.clamp(*years.start(), *years.end());
        let month = self.month.min(MAX_MONTH_INDEX);
        Self {
            year,
            month,
            day: self.day.clamp(MIN_DAY, days_in_month(year, month)),
            hour: self.hour.min(MAX_HOUR),
            minute: self.minute.min(MAX_MINUTE),
            second: self.second.min(MAX_SECOND),
            millisecond: self.millisecond.min(MAX_MILLISECOND),
        }
    }

    /// Builds the native date, clamping out-of-range components first.
    pub fn to_date(&self) -> Option<NaiveDateTime> {
        let fields = self.clamped();
        NaiveDate::from_ymd_opt(fields.year, fields.month + 1, fields.day)?.and_hms_milli_opt(
            fields.hour,
            fields.minute,
            fields.second,
            fields.millisecond,
        )
    }
}

/// Years a composite date can hold
pub fn year_range() -> RangeInclusive<i32> {
    NaiveDate::MIN.year()..=NaiveDate::MAX.year()
}

/// Expands a two-digit year: below the pivot lands in the 2000s, the rest in the 1900s.
pub const fn expand_two_digit_year(value: i32) -> i32 {
    if value < TWO_DIGIT_YEAR_PIVOT {
        2000 + value
    } else {
        1900 + value
    }
}

/// Column value a token shows for `fields`
pub fn column_value(fields: &Fields, token: Token) -> i32 {
    let value = fields.get(token.kind());
    if token.is_two_digit_year() {
        value.rem_euclid(TWO_DIGIT_YEAR_SPAN)
    } else {
        value
    }
}

/// Inverse of [`column_value`].
///
/// A two-digit year that still matches `base_year` keeps its century; any
/// other two-digit year is expanded around the pivot.
pub fn field_value(token: Token, value: i32, base_year: i32) -> i32 {
    if !token.is_two_digit_year() {
        return value;
    }
    let short = value.rem_euclid(TWO_DIGIT_YEAR_SPAN);
    if short == base_year.rem_euclid(TWO_DIGIT_YEAR_SPAN) {
        base_year
    } else {
        expand_two_digit_year(short)
    }
}

/// Seeds every column from `date` and re-centers its window.
pub fn to_columns(date: &NaiveDateTime, columns: &mut [Column]) {
    let fields = Fields::from_date(date);
    for column in columns {
        column.seed(column_value(&fields, column.token()));
    }
}

/// Rebuilds a date from column values. Components no column covers come from `base`.
pub fn from_columns(columns: &[Column], base: &NaiveDateTime) -> NaiveDateTime {
    let mut fields = Fields::from_date(base);
    for column in columns {
        let value = field_value(column.token(), column.current(), base.year());
        fields.set(column.kind(), value);
    }
    fields.to_date().unwrap_or(*base)
}
