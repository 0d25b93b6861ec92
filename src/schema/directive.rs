//! Field annotation parsing.
//!
//! An annotation is the tag string attached to a field when it is registered, e.g.
//!
//! ```text
//! name(Status);mapping(done:1,pending:2)
//! name(Start date);date(01-02-06,2006-01-02)
//! name(Code);unique(true)
//! ```
//!
//! Fragments are order-independent and separated by `;`. Missing or malformed fragments leave
//! the corresponding directive unset; an unset directive means "skip that transform".

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::transform::date::DateLayout;

static NAME: LazyLock<Regex> = LazyLock::new(|| fragment("name"));
static UNIQUE: LazyLock<Regex> = LazyLock::new(|| fragment("unique"));
static MAPPING: LazyLock<Regex> = LazyLock::new(|| fragment("mapping"));
static DATE: LazyLock<Regex> = LazyLock::new(|| fragment("date"));

fn fragment(name: &str) -> Regex {
    Regex::new(&format!(r"{name}\((.*?)\)")).expect("fragment pattern is valid")
}

fn capture<'t>(re: &Regex, tag: &'t str) -> Option<&'t str> {
    re.captures(tag).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Raw-text to canonical-value translation table attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    entries: HashMap<String, String>,
}

impl Vocabulary {
    /// Parse `k1:v1,k2:v2`. Entries without `:` are skipped; later keys overwrite earlier ones.
    pub fn parse(body: &str) -> Self {
        let entries = body
            .split(',')
            .filter_map(|entry| entry.split_once(':'))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { entries }
    }

    /// Canonical value for `raw`, if the vocabulary contains it.
    pub fn translate(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Input/output pattern pair of a `date(...)` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSpec {
    /// Pattern the cell text is parsed with.
    pub input: DateLayout,
    /// Pattern the parsed instant is re-rendered with.
    pub output: DateLayout,
}

impl DateSpec {
    /// Parse the body of `date(<in>,<out>)`.
    ///
    /// Returns `None` unless the body has exactly two comma-separated parts and both compile.
    pub fn parse(body: &str) -> Option<Self> {
        let (input, output) = body.split_once(',')?;
        Some(Self {
            input: DateLayout::compile(input)?,
            output: DateLayout::compile(output)?,
        })
    }

    /// Parse `text` with the input pattern (local time) and render it with the output pattern.
    pub fn reformat(&self, text: &str) -> Option<String> {
        let instant = self.input.parse(text)?;
        self.output.render(&instant)
    }
}

/// Directives parsed from one annotation, before a field path is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub header: String,
    pub unique: bool,
    pub vocabulary: Option<Vocabulary>,
    pub date: Option<DateSpec>,
}

impl Annotation {
    pub fn parse(tag: &str) -> Self {
        Self {
            header: capture(&NAME, tag).unwrap_or_default().trim().to_string(),
            unique: capture(&UNIQUE, tag) == Some("true"),
            vocabulary: capture(&MAPPING, tag)
                .filter(|body| !body.is_empty())
                .map(Vocabulary::parse),
            date: capture(&DATE, tag)
                .filter(|body| !body.is_empty())
                .and_then(DateSpec::parse),
        }
    }

    pub(crate) fn at(self, path: String) -> FieldDirective {
        FieldDirective {
            path,
            header: self.header,
            unique: self.unique,
            vocabulary: self.vocabulary,
            date: self.date,
        }
    }
}

/// One target field's parsed annotation. Built once at schema construction; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDirective {
    /// Dot-separated field names from the record root to the leaf.
    pub path: String,
    /// Display column name matched against the (trimmed) header row.
    pub header: String,
    /// Values in this column must not repeat across rows.
    pub unique: bool,
    pub vocabulary: Option<Vocabulary>,
    pub date: Option<DateSpec>,
}
