use std::str::FromStr;

use super::{Field, LineError, Result};

/// Walks the comma separated fields inside a parenthesized payload.
pub(super) struct FieldCursor<'a> {
    fields: std::str::Split<'a, char>,
    /// Number of fields consumed, starts with 0.
    consumed: usize,
}

impl<'a> FieldCursor<'a> {
    pub(super) fn new(payload: &'a str) -> Self {
        Self {
            fields: payload.split(','),
            consumed: 0,
        }
    }

    /// Moves to and returns the next field, trimmed.
    pub(super) fn next_str(&mut self, field: Field) -> Result<&'a str> {
        let value = self
            .fields
            .next()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(LineError::MissingField { field })?;
        self.consumed += 1;
        Ok(value)
    }

    /// Moves to and parses the next field as a finite number.
    pub(super) fn next_f64(&mut self, field: Field) -> Result<f64> {
        let value = self.next_str(field)?;
        parse_finite(value).ok_or_else(|| LineError::InvalidField {
            field,
            value: value.to_owned(),
        })
    }

    /// Moves to and parses the next field as an integer.
    pub(super) fn next_i64(&mut self, field: Field) -> Result<i64> {
        self.next_parsed(field)
    }

    /// Moves to and parses the next field with [`FromStr`].
    pub(super) fn next_parsed<T: FromStr>(&mut self, field: Field) -> Result<T> {
        let value = self.next_str(field)?;
        value.parse().map_err(|_| LineError::InvalidField {
            field,
            value: value.to_owned(),
        })
    }

    /// Parses the next field as a number if there is one more field.
    pub(super) fn next_optional_f64(&mut self, field: Field) -> Result<Option<f64>> {
        match self.fields.clone().next() {
            Some(_) => self.next_f64(field).map(Some),
            None => Ok(None),
        }
    }

    /// Ensures all the fields are consumed.
    pub(super) fn finish(mut self) -> Result<()> {
        match self.fields.next() {
            Some(extra) => Err(LineError::UnexpectedField {
                position: self.consumed + 1,
                value: extra.trim().to_owned(),
            }),
            None => Ok(()),
        }
    }
}

/// Parses a number, rejecting infinities and NaN.
pub(super) fn parse_finite(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}
