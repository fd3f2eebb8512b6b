// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! fhir_date filter - reformats dates between pattern styles
//!
//! Patterns use the familiar `yyyy-MM-dd` letter notation and are translated
//! to chrono format strings before use. Output precision follows the output
//! pattern, so `yyyy`, `yyyy-MM` and `yyyy-MM-dd` give the three FHIR date
//! precisions. Everything is formatted in UTC, so zone letters print `Z` or
//! `+0000`.

use crate::model::Value;
use crate::registry::filter::{Filter, param_text};
use chrono::format::{self, ParseErrorKind, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveTime, Utc};
use std::fmt::Write;

const DEFAULT_INPUT_FORMAT: &str = "MM/dd/yyyy";
const DEFAULT_OUTPUT_FORMAT: &str = "yyyy-MM-dd";

/// fhir_date filter - `value | fhir_date: 'MM/dd/yyyy', 'yyyy-MM-dd'`
pub struct DateFilter;

impl Filter for DateFilter {
    fn name(&self) -> &str {
        "fhir_date"
    }

    fn documentation(&self) -> &str {
        "Parses the value with the input pattern (default MM/dd/yyyy) and formats it \
         with the output pattern (default yyyy-MM-dd). Falls back to RFC 3339 instants; \
         unparseable values are returned unchanged."
    }

    fn apply(&self, value: &Value, params: &[Value]) -> Value {
        if value.is_nil() {
            return Value::Nil;
        }

        let text = value.to_text();
        let input_format =
            param_text(params, 0).unwrap_or_else(|| DEFAULT_INPUT_FORMAT.to_string());
        let output_format =
            param_text(params, 1).unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string());

        match reformat(&text, &input_format, &output_format) {
            Some(formatted) => Value::String(formatted),
            None => value.clone(),
        }
    }
}

/// Reformat `text`, trying the explicit pattern first and an RFC 3339 instant second
pub fn reformat(text: &str, input_pattern: &str, output_pattern: &str) -> Option<String> {
    let output = translate_pattern(output_pattern)?;

    let parsed = translate_pattern(input_pattern)
        .and_then(|input| parse_with_format(text, &input))
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|instant| instant.with_timezone(&Utc))
        })?;

    let mut formatted = String::new();
    write!(formatted, "{}", parsed.format(&output)).ok()?;
    Some(formatted)
}

/// Parse with a chrono format, accepting trailing text after a full match
///
/// Fields the pattern leaves out default to 1970-01-01 00:00 UTC.
fn parse_with_format(text: &str, chrono_format: &str) -> Option<DateTime<Utc>> {
    let mut parsed = Parsed::new();
    match format::parse(&mut parsed, text, StrftimeItems::new(chrono_format)) {
        Ok(()) => {}
        Err(e) if e.kind() == ParseErrorKind::TooLong => {}
        Err(_) => return None,
    }

    if parsed.year().is_none() && parsed.year_mod_100().is_none() {
        parsed.set_year(1970).ok();
    }
    // Both setters are no-ops when the pattern already supplied the field
    parsed.set_month(1).ok();
    parsed.set_day(1).ok();

    let date = parsed.to_naive_date().ok()?;
    let time = parsed.to_naive_time().unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time).and_utc())
}

/// Translate a `yyyy-MM-dd` style pattern into a chrono format string
///
/// Returns `None` for pattern letters without a chrono equivalent.
pub fn translate_pattern(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\'' {
            // Quoted literal; '' is an escaped quote
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !ch.is_ascii_alphabetic() {
            push_literal(&mut out, ch);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&c| c == ch).count();
        let spec = match (ch, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', _) => "%I",
            ('m', _) => "%M",
            ('s', _) => "%S",
            ('S', 3) => "%3f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('Z', _) => "%z",
            ('X', 1..=3) => "Z",
            _ => return None,
        };
        out.push_str(spec);
        i += run;
    }

    Some(out)
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}
