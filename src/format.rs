//! Format strings: tokenising, rendering a date back into text, and reading text
//! typed against the same format.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::codec::{self, Fields};
use crate::options::Options;
use crate::types::{Kind, Token, days_in_month};
use crate::{BUDDHIST_ERA_OFFSET, ParseError, TWO_DIGIT_YEAR_SPAN};

/// Layouts tried when a value does not follow the active format
const ISO_DATETIME_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const ISO_DATE_LAYOUT: &str = "%Y-%m-%d";

/// A run of a format string: either opaque text or a date/time placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Literal(String),
    Token(Token),
}

/// A parsed format string, fixed for the lifetime of a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    source: String,
    pieces: Vec<Piece>,
}

impl Format {
    /// Splits `source` into literals and tokens.
    ///
    /// Any run of one of `Y M D H m s S` becomes a token whose width is the run
    /// length. Everything else is literal text. A format without any token is
    /// valid and simply renders as its literal text.
    pub fn parse(source: &str) -> Self {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            let Some(kind) = Kind::from_letter(c) else {
                literal.push(c);
                continue;
            };

            let mut width = 1;
            while chars.next_if_eq(&c).is_some() {
                width += 1;
            }

            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Token(Token::new(kind, width)));
        }

        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Self {
            source: source.to_owned(),
            pieces,
        }
    }

    /// The format string as supplied
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Tokens in display order
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Token(token) => Some(*token),
            Piece::Literal(_) => None,
        })
    }

    /// First token of the given kind, which is the one that owns its column
    pub fn token(&self, kind: Kind) -> Option<Token> {
        self.tokens().find(|token| token.kind() == kind)
    }

    /// `true` when the format holds no tokens and renders as fixed text
    pub fn is_static(&self) -> bool {
        self.tokens().next().is_none()
    }

    /// Renders `fields` using this format. Literals pass through verbatim.
    pub fn render(&self, fields: &Fields, options: &Options) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Literal(text) => text.clone(),
                Piece::Token(token) => {
                    let value = codec::column_value(fields, *token);
                    token_text(*token, value, options.aliases(*token), options.bce())
                }
            })
            .collect()
    }

    /// Reads `input` against this format.
    ///
    /// Fields the format does not mention are taken from `base`. When the input
    /// does not follow the format an ISO-8601 date or date-time is accepted
    /// instead.
    ///
    /// # Errors
    /// Returns `ParseError::EmptyInput` for blank input. When neither the format
    /// nor ISO-8601 matches, returns the error met while reading the format.
    pub fn parse_value(
        &self,
        input: &str,
        options: &Options,
        base: NaiveDateTime,
    ) -> Result<NaiveDateTime, ParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        match self.parse_fields(trimmed, options, base) {
            Ok(fields) => fields
                .to_date()
                .ok_or_else(|| ParseError::InvalidValue(trimmed.to_owned())),
            Err(err) => parse_iso(trimmed).ok_or(err),
        }
    }

    fn parse_fields(
        &self,
        input: &str,
        options: &Options,
        base: NaiveDateTime,
    ) -> Result<Fields, ParseError> {
        let mut fields = Fields::from_date(&base);
        let mut rest = input;

        for (i, piece) in self.pieces.iter().enumerate() {
            match piece {
                Piece::Literal(text) => {
                    rest = rest
                        .strip_prefix(text.as_str())
                        .ok_or_else(|| ParseError::InvalidValue(input.to_owned()))?;
                }
                Piece::Token(token) if token.is_symbolic() => {
                    let aliases = options.aliases(*token).unwrap_or_default();
                    let (month, len) = match_alias(rest, aliases)
                        .ok_or_else(|| ParseError::UnknownAlias(rest.to_owned()))?;
                    fields.set(Kind::Month, month);
                    rest = &rest[len..];
                }
                Piece::Token(token) => {
                    let adjacent = matches!(self.pieces.get(i + 1), Some(Piece::Token(_)));
                    let (value, len) = take_number(rest, *token, adjacent)
                        .ok_or_else(|| ParseError::InvalidValue(input.to_owned()))?;
                    let value = read_token_value(*token, value, options.bce())?;
                    fields.set(token.kind(), value);
                    rest = &rest[len..];
                }
            }
        }

        if !rest.trim().is_empty() {
            return Err(ParseError::InvalidValue(input.to_owned()));
        }

        let max_day = days_in_month(fields.year, fields.month);
        if self.token(Kind::Day).is_some() && fields.day > max_day {
            return Err(ParseError::OutOfRange {
                kind: Kind::Day,
                value: i64::from(fields.day),
            });
        }

        Ok(fields)
    }
}

/// Text for one token value.
///
/// `value` is in column terms: 0-based month, true year (or true year modulo 100
/// for `YY`). The Buddhist era offset is applied here, before padding.
pub(crate) fn token_text(token: Token, value: i32, aliases: Option<&[String]>, bce: bool) -> String {
    if let Some(alias) = aliases
        .filter(|_| token.is_symbolic())
        .and_then(|aliases| usize::try_from(value).ok().and_then(|i| aliases.get(i)))
    {
        return alias.clone();
    }

    let shown = match token.kind() {
        Kind::Year => {
            let era = if bce {
                value.saturating_add(BUDDHIST_ERA_OFFSET)
            } else {
                value
            };
            if token.is_two_digit_year() {
                era.rem_euclid(TWO_DIGIT_YEAR_SPAN)
            } else {
                era
            }
        }
        Kind::Month => value + 1,
        _ => value,
    };

    pad(shown, token.width())
}

/// Zero-pads `value` to `width` digits, keeping a leading minus sign outside the padding.
pub(crate) fn pad(value: i32, width: usize) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{:0width$}", value.unsigned_abs())
}

/// Converts a number read from text into its column value.
fn read_token_value(token: Token, value: i64, bce: bool) -> Result<i32, ParseError> {
    let out_of_range = || ParseError::OutOfRange {
        kind: token.kind(),
        value,
    };
    let narrow = |v: i64| i32::try_from(v).map_err(|_| out_of_range());

    match token.kind() {
        Kind::Year => {
            let era = narrow(value)?;
            if token.is_two_digit_year() {
                if !(0..TWO_DIGIT_YEAR_SPAN).contains(&era) {
                    return Err(out_of_range());
                }
                let offset = if bce { BUDDHIST_ERA_OFFSET } else { 0 };
                Ok(codec::expand_two_digit_year(
                    (era - offset).rem_euclid(TWO_DIGIT_YEAR_SPAN),
                ))
            } else if bce {
                era.checked_sub(BUDDHIST_ERA_OFFSET).ok_or_else(out_of_range)
            } else {
                Ok(era)
            }
        }
        Kind::Month if (1..=12).contains(&value) => narrow(value - 1),
        Kind::Day if (1..=31).contains(&value) => narrow(value),
        Kind::Hour if (0..24).contains(&value) => narrow(value),
        Kind::Minute | Kind::Second if (0..60).contains(&value) => narrow(value),
        Kind::Millisecond if (0..1000).contains(&value) => narrow(value),
        _ => Err(out_of_range()),
    }
}

/// Reads a number from the front of `input`, returning it with its byte length.
///
/// A token directly followed by another token consumes exactly its width so
/// formats like `YYYYMMDD` can be read back. Otherwise all leading digits are taken.
fn take_number(input: &str, token: Token, adjacent: bool) -> Option<(i64, usize)> {
    let signed = token.kind() == Kind::Year && !token.is_two_digit_year();
    let sign_len = usize::from(signed && input.starts_with('-'));
    let digits = input[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    let len = if adjacent { digits.min(token.width()) } else { digits };
    if len == 0 {
        return None;
    }

    let end = sign_len + len;
    input[..end].parse().ok().map(|value| (value, end))
}

/// Finds the longest alias that prefixes `input`, returning its month index and byte length.
fn match_alias(input: &str, aliases: &[String]) -> Option<(i32, usize)> {
    aliases
        .iter()
        .enumerate()
        .filter(|(_, alias)| !alias.is_empty())
        .filter(|(_, alias)| {
            input
                .get(..alias.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(alias))
        })
        .max_by_key(|(_, alias)| alias.len())
        .and_then(|(i, alias)| Some((i32::try_from(i).ok()?, alias.len())))
}

fn parse_iso(input: &str) -> Option<NaiveDateTime> {
    ISO_DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, ISO_DATE_LAYOUT)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionsOverride;

    fn options() -> Options {
        Options::new(OptionsOverride::default())
    }

    fn bce_options() -> Options {
        Options::new(OptionsOverride {
            bce: Some(true),
            ..OptionsOverride::default()
        })
    }

    fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, ms)
            .unwrap()
    }

    fn midnight(y: i32, mo: u32, d: u32) -> NaiveDateTime {
        datetime(y, mo, d, 0, 0, 0, 0)
    }

    #[test]
    fn test_parse_tokens_and_literals() {
        let format = Format::parse("YYYY-MM-DD HH:mm");
        assert_eq!(
            format.pieces(),
            &[
                Piece::Token(Token::new(Kind::Year, 4)),
                Piece::Literal("-".to_owned()),
                Piece::Token(Token::new(Kind::Month, 2)),
                Piece::Literal("-".to_owned()),
                Piece::Token(Token::new(Kind::Day, 2)),
                Piece::Literal(" ".to_owned()),
                Piece::Token(Token::new(Kind::Hour, 2)),
                Piece::Literal(":".to_owned()),
                Piece::Token(Token::new(Kind::Minute, 2)),
            ]
        );
        assert_eq!(format.source(), "YYYY-MM-DD HH:mm");
    }

    #[test]
    fn test_parse_unknown_letters_are_literals() {
        let format = Format::parse("Week ww of YYYY");
        let tokens: Vec<_> = format.tokens().collect();
        assert_eq!(tokens, vec![Token::new(Kind::Year, 4)]);
        assert_eq!(format.pieces()[0], Piece::Literal("Week ww of ".to_owned()));
    }

    #[test]
    fn test_parse_token_less_format_is_static() {
        let format = Format::parse("today");
        assert!(format.is_static());
        assert_eq!(format.render(&Fields::default(), &options()), "today");

        assert!(Format::parse("").is_static());
    }

    #[test]
    fn test_parse_adjacent_runs_split_by_letter() {
        let format = Format::parse("YYYYMMDD");
        let widths: Vec<_> = format.tokens().map(|t| (t.kind(), t.width())).collect();
        assert_eq!(
            widths,
            vec![(Kind::Year, 4), (Kind::Month, 2), (Kind::Day, 2)]
        );
    }

    #[test]
    fn test_render_zero_pads() {
        let format = Format::parse("YYYY-MM-DD HH:mm:ss.SSS");
        let fields = Fields::from_date(&datetime(2024, 3, 5, 7, 8, 9, 42));
        assert_eq!(format.render(&fields, &options()), "2024-03-05 07:08:09.042");
    }

    #[test]
    fn test_render_short_tokens_do_not_truncate() {
        let format = Format::parse("D/M/YYYY H:m");
        let fields = Fields::from_date(&datetime(2024, 11, 25, 14, 30, 0, 0));
        assert_eq!(format.render(&fields, &options()), "25/11/2024 14:30");
    }

    #[test]
    fn test_render_month_aliases() {
        let fields = Fields::from_date(&midnight(2024, 2, 1));
        assert_eq!(
            Format::parse("DD MMM YYYY").render(&fields, &options()),
            "01 Feb 2024"
        );
        assert_eq!(
            Format::parse("MMMM YYYY").render(&fields, &options()),
            "February 2024"
        );
    }

    #[test]
    fn test_render_two_digit_year() {
        let fields = Fields::from_date(&midnight(2007, 6, 1));
        assert_eq!(Format::parse("YY/MM").render(&fields, &options()), "07/06");
    }

    #[test]
    fn test_render_buddhist_era() {
        let fields = Fields::from_date(&midnight(2020, 1, 1));
        assert_eq!(Format::parse("YYYY").render(&fields, &bce_options()), "2563");
        assert_eq!(Format::parse("YY").render(&fields, &bce_options()), "63");
    }

    #[test]
    fn test_render_buddhist_era_saturates() {
        let year = Token::new(Kind::Year, 4);
        assert_eq!(token_text(year, i32::MAX, None, true), i32::MAX.to_string());
        assert_eq!(token_text(year, i32::MAX - 1, None, false), (i32::MAX - 1).to_string());
    }

    #[test]
    fn test_render_negative_year() {
        let fields = Fields::from_date(&midnight(-44, 3, 15));
        assert_eq!(Format::parse("YYYY").render(&fields, &options()), "-0044");
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad(7, 2), "07");
        assert_eq!(pad(123, 2), "123");
        assert_eq!(pad(-7, 3), "-007");
        assert_eq!(pad(0, 1), "0");
    }

    #[test]
    fn test_parse_value_full() {
        let format = Format::parse("YYYY-MM-DD HH:mm");
        let parsed = format
            .parse_value("2024-01-31 23:59", &options(), midnight(2000, 1, 1))
            .unwrap();
        assert_eq!(parsed, datetime(2024, 1, 31, 23, 59, 0, 0));
    }

    #[test]
    fn test_parse_value_missing_fields_come_from_base() {
        let format = Format::parse("HH:mm");
        let parsed = format
            .parse_value("08:15", &options(), midnight(2021, 7, 4))
            .unwrap();
        assert_eq!(parsed, datetime(2021, 7, 4, 8, 15, 0, 0));
    }

    #[test]
    fn test_parse_value_compact_format() {
        let format = Format::parse("YYYYMMDD");
        let parsed = format
            .parse_value("20240229", &options(), midnight(2000, 1, 1))
            .unwrap();
        assert_eq!(parsed, midnight(2024, 2, 29));
    }

    #[test]
    fn test_parse_value_aliases() {
        let format = Format::parse("DD MMMM YYYY");
        let parsed = format
            .parse_value("09 september 1999", &options(), midnight(2000, 1, 1))
            .unwrap();
        assert_eq!(parsed, midnight(1999, 9, 9));

        let result = format.parse_value("09 Smarch 1999", &options(), midnight(2000, 1, 1));
        assert!(matches!(result, Err(ParseError::UnknownAlias(_))));
    }

    #[test]
    fn test_parse_value_buddhist_era() {
        let format = Format::parse("YYYY-MM-DD");
        let parsed = format
            .parse_value("2563-05-01", &bce_options(), midnight(2000, 1, 1))
            .unwrap();
        assert_eq!(parsed, midnight(2020, 5, 1));
    }

    #[test]
    fn test_parse_value_buddhist_era_underflow() {
        let format = Format::parse("YYYY-MM-DD");
        let result = format.parse_value("-2147483648-01-01", &bce_options(), midnight(2000, 1, 1));
        assert!(matches!(
            result,
            Err(ParseError::OutOfRange {
                kind: Kind::Year,
                value: -2_147_483_648
            })
        ));
    }

    #[test]
    fn test_parse_value_two_digit_year_pivot() {
        let format = Format::parse("YY-MM-DD");
        let base = midnight(2000, 1, 1);

        struct TestCase {
            input: &'static str,
            year: i32,
        }

        let cases = [
            TestCase {
                input: "00-01-01",
                year: 2000,
            },
            TestCase {
                input: "68-01-01",
                year: 2068,
            },
            TestCase {
                input: "69-01-01",
                year: 1969,
            },
            TestCase {
                input: "99-01-01",
                year: 1999,
            },
        ];

        for case in &cases {
            let parsed = format.parse_value(case.input, &options(), base).unwrap();
            assert_eq!(parsed, midnight(case.year, 1, 1), "input {}", case.input);
        }
    }

    #[test]
    fn test_parse_value_rejects_out_of_range() {
        let format = Format::parse("YYYY-MM-DD");
        let base = midnight(2000, 1, 1);

        let result = format.parse_value("2023-02-29", &options(), base);
        assert!(matches!(
            result,
            Err(ParseError::OutOfRange {
                kind: Kind::Day,
                value: 29
            })
        ));

        let result = format.parse_value("2023-13-01", &options(), base);
        assert!(matches!(
            result,
            Err(ParseError::OutOfRange {
                kind: Kind::Month,
                value: 13
            })
        ));
    }

    #[test]
    fn test_parse_value_empty() {
        let format = Format::parse("YYYY");
        let result = format.parse_value("   ", &options(), midnight(2000, 1, 1));
        assert!(matches!(result, Err(ParseError::EmptyInput)));
    }

    #[test]
    fn test_parse_value_iso_fallback() {
        let format = Format::parse("DD/MM/YYYY");
        let base = midnight(2000, 1, 1);

        let parsed = format
            .parse_value("2024-06-30T12:34:56.789", &options(), base)
            .unwrap();
        assert_eq!(parsed, datetime(2024, 6, 30, 12, 34, 56, 789));

        let parsed = format.parse_value("2024-06-30", &options(), base).unwrap();
        assert_eq!(parsed, midnight(2024, 6, 30));

        let result = format.parse_value("yesterday", &options(), base);
        assert!(matches!(result, Err(ParseError::InvalidValue(_))));
    }

    #[test]
    fn test_parse_value_trailing_garbage() {
        let format = Format::parse("HH:mm");
        let result = format.parse_value("10:30pm", &options(), midnight(2000, 1, 1));
        assert!(result.is_err());
    }
}
