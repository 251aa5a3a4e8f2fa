use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::{self, FormatItem};
use time::{Date, Month};

use crate::ValidationError;

static ISO_DATE_FORMAT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();

fn iso_date_format() -> &'static [FormatItem<'static>] {
    ISO_DATE_FORMAT.get_or_init(|| {
        format_description::parse("[year]-[month]-[day]")
            .expect("static date format description must parse")
    })
}

/// Calendar date carried as `YYYY-MM-DD` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDate(Date);

impl IsoDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input, iso_date_format())
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    pub fn format_iso(self) -> String {
        self.0
            .format(iso_date_format())
            .expect("IsoDate must be formattable")
    }
}

impl Display for IsoDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for IsoDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for IsoDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Inclusive date window for the portfolio query.
///
/// Invariant: `start <= end`. A violating `end` is clamped up to `start`
/// rather than rejected, so the selection stays renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: IsoDate,
    end: IsoDate,
}

impl DateRange {
    pub fn new(start: IsoDate, end: IsoDate) -> Self {
        let end = if end < start { start } else { end };
        Self { start, end }
    }

    pub const fn start(&self) -> IsoDate {
        self.start
    }

    pub const fn end(&self) -> IsoDate {
        self.end
    }
}

impl Default for DateRange {
    fn default() -> Self {
        let start = Date::from_calendar_date(2023, Month::January, 1).expect("valid calendar date");
        let end = Date::from_calendar_date(2023, Month::December, 31).expect("valid calendar date");
        Self::new(IsoDate::from_date(start), IsoDate::from_date(end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        let parsed = IsoDate::parse("2024-06-01").expect("must parse");
        assert_eq!(parsed.format_iso(), "2024-06-01");
    }

    #[test]
    fn rejects_non_iso_date() {
        let err = IsoDate::parse("06/01/2024").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn inverted_range_clamps_end_to_start() {
        let start = IsoDate::parse("2024-06-01").expect("must parse");
        let end = IsoDate::parse("2024-01-01").expect("must parse");
        let range = DateRange::new(start, end);
        assert_eq!(range.start(), start);
        assert_eq!(range.end(), start);
    }

    #[test]
    fn ordered_range_is_untouched() {
        let start = IsoDate::parse("2024-01-01").expect("must parse");
        let end = IsoDate::parse("2024-06-01").expect("must parse");
        let range = DateRange::new(start, end);
        assert_eq!(range.end(), end);
    }
}
