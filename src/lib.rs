//! Column state model and date-consistency engine for scroll-column date/time pickers.
//!
//! A picker shows one column per token of its format string (`YYYY-MM-DD HH:mm`
//! gives year, month, day, hour and minute columns). The composite date is the
//! single source of truth; every column is a projection of it. Host events are
//! fed to [`Picker::handle`], which commits them and keeps dependent columns
//! (the day of month) valid.

mod codec;
mod column;
mod consts;
mod format;
mod options;
mod picker;
mod prelude;
mod registry;
mod types;

pub use codec::{Fields, from_columns, to_columns};
pub use column::{Column, Limit, Row};
pub use consts::*;
pub use format::{Format, Piece};
pub use options::{
    Increment, Language, Options, OptionsOverride, THAI, Text, TextOverride, Translator,
    defaults, language, register_language, set_defaults,
};
pub use picker::{Change, Event, Outcome, Picker, State};
pub use registry::{ElementId, PickerError, Registry};
pub use types::{Action, Kind, Token, days_in_month, is_leap_year};

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid date value: {_0}")]
    InvalidValue(String),
    #[display(fmt = "Unknown month name at: {_0}")]
    UnknownAlias(String),
    #[display(fmt = "Value {value} is out of range for {kind}")]
    OutOfRange { kind: Kind, value: i64 },
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for ParseError {}
