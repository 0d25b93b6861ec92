//! Date normalization patterns.
//!
//! Two pattern dialects are accepted:
//!
//! - **Reference layouts**: the pattern is an example rendering of the reference instant
//!   `Mon Jan 2 15:04:05 MST 2006` (`01-02-06`, `2006-01-02 15:04:05`, `Jan _2 2006`, ...).
//! - **strftime**: a pattern with at least one `%` conversion (`%Y`, `%-d`, `%%`, ...) is handed
//!   to chrono unchanged. A `%` not followed by a conversion is literal text in a reference layout.
//!
//! Both are compiled into a chrono strftime string plus a record of which calendar/clock fields
//! the pattern carries, so partial patterns (date-only, year-month, time-only) can be parsed with
//! the same defaults a reference-layout parser uses: year 0, January, day 1, midnight.
//!
//! Parsing is lenient about width: `01` and `02` also accept a single digit (`1-5-24` reads as
//! January 5th), since chrono's numeric fields take one or two digits. Rendering always pads.
//!
//! `Z07:00`-style offsets accept a literal `Z` for UTC and render UTC as `Z`.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};

/// A parsed date/time, either in local time or carrying an explicit offset from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instant {
    Local(DateTime<Local>),
    Fixed(DateTime<FixedOffset>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LayoutFields {
    year: bool,
    month: bool,
    day: bool,
    ordinal: bool,
    hour24: bool,
    hour12: bool,
    meridiem: bool,
    minute: bool,
    offset: bool,
    timestamp: bool,
    /// strftime spec of a `Z`-prefixed offset chunk.
    zulu: Option<&'static str>,
}

/// A compiled date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLayout {
    source: String,
    strftime: String,
    fields: LayoutFields,
}

impl DateLayout {
    /// Compile a reference layout or strftime pattern. Returns `None` for invalid strftime.
    pub fn compile(pattern: &str) -> Option<Self> {
        let (strftime, fields) = if is_strftime(pattern) {
            (pattern.to_string(), scan_strftime(pattern))
        } else {
            translate_reference(pattern)
        };
        let valid = StrftimeItems::new(&strftime).all(|item| !matches!(item, Item::Error));
        valid.then(|| Self {
            source: pattern.to_string(),
            strftime,
            fields,
        })
    }

    /// The pattern as written in the annotation.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The equivalent chrono strftime pattern.
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// Parse `text` in local time (or at the offset it states, if the pattern has one).
    pub fn parse(&self, text: &str) -> Option<Instant> {
        let mut input = text.to_string();
        if let Some(spec) = self.fields.zulu {
            if let Some(at) = input.rfind('Z') {
                input.replace_range(at..=at, utc_offset(spec));
            }
        }
        let mut pattern = self.strftime.clone();
        self.complete(&mut input, &mut pattern);

        if self.fields.offset {
            return DateTime::parse_from_str(&input, &pattern)
                .ok()
                .map(Instant::Fixed);
        }
        let naive = NaiveDateTime::parse_from_str(&input, &pattern).ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(Instant::Local)
    }

    /// Render `instant` with this pattern.
    pub fn render(&self, instant: &Instant) -> Option<String> {
        let utc = match instant {
            Instant::Local(dt) => dt.offset().local_minus_utc() == 0,
            Instant::Fixed(dt) => dt.offset().local_minus_utc() == 0,
        };
        let pattern = match self.fields.zulu {
            Some(spec) if utc => self.strftime.replacen(spec, "Z", 1),
            _ => self.strftime.clone(),
        };
        let items = StrftimeItems::new(&pattern);
        let mut out = String::new();
        let written = match instant {
            Instant::Local(dt) => write!(out, "{}", dt.format_with_items(items)),
            Instant::Fixed(dt) => write!(out, "{}", dt.format_with_items(items)),
        };
        written.ok().map(|_| out)
    }

    /// Append defaults for the fields the pattern does not carry.
    fn complete(&self, input: &mut String, pattern: &mut String) {
        let f = self.fields;
        if f.timestamp {
            return;
        }
        let mut push = |value: &str, spec: &str| {
            input.push(' ');
            input.push_str(value);
            pattern.push(' ');
            pattern.push_str(spec);
        };
        if !f.year {
            push("0000", "%Y");
        }
        if !f.ordinal {
            if !f.month {
                push("1", "%m");
            }
            if !f.day {
                push("1", "%d");
            }
        }
        if f.hour12 && !f.meridiem {
            push("AM", "%p");
        }
        if !f.hour24 && !f.hour12 {
            push("0", "%H");
        }
        if !f.minute {
            push("0", "%M");
        }
    }
}

// Reference-layout chunks, checked in order at each position. Longer chunks sharing a prefix
// with shorter ones come first.
const CHUNKS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Jan", "%b"),
    ("Monday", "%A"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("2006", "%Y"),
    ("002", "%j"),
    ("__2", "%j"),
    ("_2", "%e"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("15", "%H"),
    ("1", "%-m"),
    ("2", "%-d"),
    ("3", "%-I"),
    ("4", "%-M"),
    ("5", "%-S"),
    ("PM", "%p"),
    ("pm", "%P"),
    ("-07:00:00", "%::z"),
    ("-0700", "%z"),
    ("-07:00", "%:z"),
    ("-07", "%z"),
    ("Z07:00:00", "%::z"),
    ("Z0700", "%z"),
    ("Z07:00", "%:z"),
    ("Z07", "%z"),
];

fn translate_reference(layout: &str) -> (String, LayoutFields) {
    let mut out = String::with_capacity(layout.len() * 2);
    let mut fields = LayoutFields::default();
    let mut rest = layout;
    let mut after_seconds = false;

    while !rest.is_empty() {
        if after_seconds {
            if let Some((spec, len)) = fractional_seconds(rest) {
                out.push_str(spec);
                rest = &rest[len..];
                after_seconds = false;
                continue;
            }
        }
        if let Some(&(chunk, spec)) = CHUNKS.iter().find(|(chunk, _)| rest.starts_with(chunk)) {
            mark(&mut fields, spec);
            if chunk.starts_with('Z') {
                fields.zulu = Some(spec);
            }
            after_seconds = spec.ends_with('S');
            out.push_str(spec);
            rest = &rest[chunk.len()..];
            continue;
        }
        let ch = rest.chars().next().unwrap_or_default();
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        after_seconds = false;
        rest = &rest[ch.len_utf8()..];
    }
    (out, fields)
}

fn utc_offset(spec: &str) -> &'static str {
    match spec {
        "%::z" => "+00:00:00",
        "%:z" => "+00:00",
        _ => "+0000",
    }
}

/// True when some `%` introduces a conversion, optionally after flags.
fn is_strftime(pattern: &str) -> bool {
    pattern.match_indices('%').any(|(at, _)| {
        pattern[at + 1..]
            .chars()
            .find(|c| !matches!(c, '-' | '_' | '0' | ':' | '#' | '.' | '3' | '6' | '9'))
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '%' || c == '+')
    })
}

/// `.000`, `.000000`, `.000000000` or a run of `9`s directly after seconds.
fn fractional_seconds(rest: &str) -> Option<(&'static str, usize)> {
    let digits = rest.strip_prefix(['.', ','])?;
    let zeros = digits.chars().take_while(|c| *c == '0').count();
    let nines = digits.chars().take_while(|c| *c == '9').count();
    let run = zeros.max(nines);
    if run == 0 || digits[run..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let spec = match (zeros, run) {
        (3, _) => "%.3f",
        (6, _) => "%.6f",
        (9, _) => "%.9f",
        _ => "%.f",
    };
    Some((spec, run + 1))
}

fn scan_strftime(pattern: &str) -> LayoutFields {
    let mut fields = LayoutFields::default();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        let mut spec = String::from("%");
        while let Some(&next) = chars.peek() {
            chars.next();
            spec.push(next);
            if !matches!(next, '-' | '_' | '0' | ':' | '#' | '.' | '3' | '6' | '9') {
                break;
            }
        }
        mark(&mut fields, &spec);
    }
    fields
}

fn mark(fields: &mut LayoutFields, spec: &str) {
    match spec.chars().last().unwrap_or_default() {
        'Y' | 'y' | 'C' | 'G' | 'g' => fields.year = true,
        'm' | 'b' | 'B' | 'h' => fields.month = true,
        'd' | 'e' => fields.day = true,
        'j' => fields.ordinal = true,
        'H' | 'k' => fields.hour24 = true,
        'I' | 'l' => fields.hour12 = true,
        'p' | 'P' => fields.meridiem = true,
        'M' => fields.minute = true,
        'z' => fields.offset = true,
        's' => fields.timestamp = true,
        'F' | 'D' | 'x' | 'v' => {
            fields.year = true;
            fields.month = true;
            fields.day = true;
        }
        'R' | 'T' | 'X' => {
            fields.hour24 = true;
            fields.minute = true;
        }
        'r' => {
            fields.hour12 = true;
            fields.meridiem = true;
            fields.minute = true;
        }
        'c' | '+' => {
            fields.year = true;
            fields.month = true;
            fields.day = true;
            fields.hour24 = true;
            fields.minute = true;
            fields.offset = spec.ends_with('+');
        }
        _ => {}
    }
}
