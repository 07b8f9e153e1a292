//! Picker configuration.
//!
//! An [`Options`] value is built once per picker by merging the process
//! defaults, an optional language pack and the caller's [`OptionsOverride`],
//! and is never mutated afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FORMAT, MIN_ROWS};
use crate::types::{Kind, Token};

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ENGLISH_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Code of the built-in Thai language pack
pub const THAI: &str = "th-TH";

static DEFAULTS: LazyLock<RwLock<Arc<Options>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Options::builtin())));

static LANGUAGES: LazyLock<RwLock<HashMap<String, Arc<Language>>>> = LazyLock::new(|| {
    let mut languages = HashMap::new();
    languages.insert(THAI.to_owned(), Arc::new(Language::thai()));
    RwLock::new(languages)
});

/// Hook turning a cell's text into what is displayed.
///
/// Receives the column kind and the text the picker would otherwise show. With
/// the Buddhist era enabled, year text already carries the era offset.
#[derive(Clone)]
pub struct Translator(Arc<dyn Fn(Kind, &str) -> String + Send + Sync>);

impl Translator {
    pub fn new(f: impl Fn(Kind, &str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn translate(&self, kind: Kind, text: &str) -> String {
        (self.0)(kind, text)
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Translator(..)")
    }
}

/// Step size for scrolling and control clicks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Increment {
    /// Same step for every column
    Uniform(i32),
    /// Step per column kind; kinds left out step by 1
    PerKind(BTreeMap<Kind, i32>),
}

impl Default for Increment {
    fn default() -> Self {
        Self::Uniform(1)
    }
}

impl Increment {
    /// Effective step for `kind`: the absolute value of the configured step, at least 1.
    pub fn step(&self, kind: Kind) -> i32 {
        let raw = match self {
            Self::Uniform(step) => *step,
            Self::PerKind(steps) => steps.get(&kind).copied().unwrap_or(1),
        };
        i32::try_from(raw.unsigned_abs()).unwrap_or(i32::MAX).max(1)
    }
}

/// Labels shown by the host around the columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Text {
    pub title: String,
    pub cancel: String,
    pub confirm: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
    pub millisecond: String,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            title: "Pick a date and time".to_owned(),
            cancel: "Cancel".to_owned(),
            confirm: "OK".to_owned(),
            year: "Year".to_owned(),
            month: "Month".to_owned(),
            day: "Day".to_owned(),
            hour: "Hour".to_owned(),
            minute: "Minute".to_owned(),
            second: "Second".to_owned(),
            millisecond: "Millisecond".to_owned(),
        }
    }
}

impl Text {
    /// Label for a column kind
    pub fn label(&self, kind: Kind) -> &str {
        match kind {
            Kind::Year => &self.year,
            Kind::Month => &self.month,
            Kind::Day => &self.day,
            Kind::Hour => &self.hour,
            Kind::Minute => &self.minute,
            Kind::Second => &self.second,
            Kind::Millisecond => &self.millisecond,
        }
    }

    fn merge(&mut self, other: TextOverride) {
        let TextOverride {
            title,
            cancel,
            confirm,
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
        } = other;

        for (slot, value) in [
            (&mut self.title, title),
            (&mut self.cancel, cancel),
            (&mut self.confirm, confirm),
            (&mut self.year, year),
            (&mut self.month, month),
            (&mut self.day, day),
            (&mut self.hour, hour),
            (&mut self.minute, minute),
            (&mut self.second, second),
            (&mut self.millisecond, millisecond),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// Partial [`Text`], used by language packs and overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOverride {
    pub title: Option<String>,
    pub cancel: Option<String>,
    pub confirm: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
    pub hour: Option<String>,
    pub minute: Option<String>,
    pub second: Option<String>,
    pub millisecond: Option<String>,
}

/// Month names and labels for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Language {
    pub months: Vec<String>,
    pub months_short: Vec<String>,
    pub text: TextOverride,
}

impl Language {
    pub fn thai() -> Self {
        let owned = |names: &[&str]| -> Vec<String> {
            names.iter().map(|name| (*name).to_owned()).collect()
        };
        let label = |text: &str| Some(text.to_owned());

        Self {
            months: owned(&[
                "มกราคม",
                "กุมภาพันธ์",
                "มีนาคม",
                "เมษายน",
                "พฤษภาคม",
                "มิถุนายน",
                "กรกฎาคม",
                "สิงหาคม",
                "กันยายน",
                "ตุลาคม",
                "พฤศจิกายน",
                "ธันวาคม",
            ]),
            months_short: owned(&[
                "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.",
                "พ.ย.", "ธ.ค.",
            ]),
            text: TextOverride {
                title: label("เลือกวันที่และเวลา"),
                cancel: label("ยกเลิก"),
                confirm: label("ยืนยัน"),
                year: label("ปี"),
                month: label("เดือน"),
                day: label("วัน"),
                hour: label("ชั่วโมง"),
                minute: label("นาที"),
                second: label("วินาที"),
                millisecond: label(""),
            },
        }
    }
}

/// Registers (or replaces) a language pack under `code`.
pub fn register_language(code: impl Into<String>, language: Language) {
    let code = code.into();
    tracing::debug!(code = %code, "registering language pack");
    LANGUAGES.write().insert(code, Arc::new(language));
}

/// Looks up a registered language pack
pub fn language(code: &str) -> Option<Arc<Language>> {
    LANGUAGES.read().get(code).cloned()
}

/// The current process-wide defaults
pub fn defaults() -> Arc<Options> {
    Arc::clone(&DEFAULTS.read())
}

/// Rebuilds the process-wide defaults from the current ones plus `overrides`.
///
/// Pickers built earlier keep the options they were built with.
pub fn set_defaults(overrides: OptionsOverride) {
    let mut defaults = DEFAULTS.write();
    let rebuilt = Options::merge(&defaults, overrides);
    *defaults = Arc::new(rebuilt);
}

/// Caller-supplied settings; anything left `None` falls back to the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionsOverride {
    pub format: Option<String>,
    pub rows: Option<usize>,
    pub increment: Option<Increment>,
    #[serde(alias = "isBCE")]
    pub bce: Option<bool>,
    pub wrap: Option<bool>,
    pub controls: Option<bool>,
    pub headers: Option<bool>,
    pub date: Option<String>,
    pub language: Option<String>,
    pub months: Option<Vec<String>>,
    pub months_short: Option<Vec<String>>,
    pub text: Option<TextOverride>,
    #[serde(skip)]
    pub translate: Option<Translator>,
}

/// Resolved, read-only picker configuration.
#[derive(Debug, Clone)]
pub struct Options {
    format: String,
    rows: usize,
    increment: Increment,
    bce: bool,
    wrap: bool,
    controls: bool,
    headers: bool,
    date: Option<String>,
    language: Option<String>,
    months: Vec<String>,
    months_short: Vec<String>,
    text: Text,
    translate: Option<Translator>,
}

impl Options {
    /// Merges the process defaults, the requested language pack and `overrides`.
    pub fn new(overrides: OptionsOverride) -> Self {
        Self::merge(&defaults(), overrides)
    }

    fn builtin() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_owned(),
            rows: MIN_ROWS,
            increment: Increment::default(),
            bce: false,
            wrap: false,
            controls: false,
            headers: false,
            date: None,
            language: None,
            months: ENGLISH_MONTHS.iter().map(|m| (*m).to_owned()).collect(),
            months_short: ENGLISH_MONTHS_SHORT.iter().map(|m| (*m).to_owned()).collect(),
            text: Text::default(),
            translate: None,
        }
    }

    fn merge(base: &Self, overrides: OptionsOverride) -> Self {
        let mut options = base.clone();

        if let Some(code) = &overrides.language {
            match language(code) {
                Some(pack) => options.apply_language(&pack),
                None => tracing::debug!(code = %code, "unknown language pack, keeping defaults"),
            }
            options.language = Some(code.clone());
        }

        let OptionsOverride {
            format,
            rows,
            increment,
            bce,
            wrap,
            controls,
            headers,
            date,
            language: _,
            months,
            months_short,
            text,
            translate,
        } = overrides;

        if let Some(format) = format {
            options.format = format;
        }
        if let Some(rows) = rows {
            options.rows = rows;
        }
        if let Some(increment) = increment {
            options.increment = increment;
        }
        options.bce = bce.unwrap_or(options.bce);
        options.wrap = wrap.unwrap_or(options.wrap);
        options.controls = controls.unwrap_or(options.controls);
        options.headers = headers.unwrap_or(options.headers);
        if date.is_some() {
            options.date = date;
        }
        if let Some(months) = months {
            options.months = months;
        }
        if let Some(months_short) = months_short {
            options.months_short = months_short;
        }
        if let Some(text) = text {
            options.text.merge(text);
        }
        if translate.is_some() {
            options.translate = translate;
        }

        options.rows = coerce_rows(options.rows);
        options
    }

    fn apply_language(&mut self, pack: &Language) {
        if !pack.months.is_empty() {
            self.months.clone_from(&pack.months);
        }
        if !pack.months_short.is_empty() {
            self.months_short.clone_from(&pack.months_short);
        }
        self.text.merge(pack.text.clone());
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Visible rows per column: always odd and at least `MIN_ROWS`
    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn increment(&self) -> &Increment {
        &self.increment
    }

    /// Whether years are shown in the Buddhist era
    pub const fn bce(&self) -> bool {
        self.bce
    }

    /// Whether stepping past a column's end wraps to the other end
    pub const fn wrap(&self) -> bool {
        self.wrap
    }

    pub const fn controls(&self) -> bool {
        self.controls
    }

    pub const fn headers(&self) -> bool {
        self.headers
    }

    /// Explicit initial value, preferred over the element's own value
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn months(&self) -> &[String] {
        &self.months
    }

    pub fn months_short(&self) -> &[String] {
        &self.months_short
    }

    pub const fn text(&self) -> &Text {
        &self.text
    }

    /// Month names a token renders with, if it is a symbolic month token
    pub fn aliases(&self, token: Token) -> Option<&[String]> {
        match token.width() {
            _ if !token.is_symbolic() => None,
            3 => Some(&self.months_short),
            _ => Some(&self.months),
        }
    }

    /// Runs the translate hook over cell text, if one is configured.
    pub fn translate(&self, kind: Kind, text: String) -> String {
        match &self.translate {
            Some(translator) => translator.translate(kind, &text),
            None => text,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new(OptionsOverride::default())
    }
}

/// Forces the row count odd so a center row exists, and no smaller than `MIN_ROWS`.
fn coerce_rows(rows: usize) -> usize {
    let odd = if rows % 2 == 0 { rows + 1 } else { rows };
    odd.max(MIN_ROWS)
}
