//! Assigning cell text into typed record fields.

use std::fmt;

/// Primitive kinds a cell can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// UTF-8 string (assigned verbatim).
    Text,
    /// Boolean.
    Bool,
    /// Signed integer of any width.
    Int,
    /// Unsigned integer of any width.
    Uint,
    /// Floating point number.
    Float,
}

impl ScalarKind {
    /// Human-readable description used in row messages.
    ///
    /// `Text` never shows up in one: a `String` field takes any cell text, so it has no mismatch.
    pub fn expected(self) -> &'static str {
        match self {
            ScalarKind::Text => "a text value",
            ScalarKind::Bool => "a boolean value",
            ScalarKind::Int => "an integer value",
            ScalarKind::Uint => "an unsigned integer value",
            ScalarKind::Float => "a floating point value",
        }
    }
}

/// Target kind of a registered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// One level of `Option` around a scalar; allocated on first write.
    Optional(ScalarKind),
    /// A kind the coercion stage cannot write; assigning to it aborts the parse.
    Other(&'static str),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(k) => write!(f, "{k:?}"),
            FieldKind::Optional(k) => write!(f, "Option<{k:?}>"),
            FieldKind::Other(name) => f.write_str(name),
        }
    }
}

/// Why a cell could not be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellError {
    /// The text does not parse as the target kind. Row-scoped; the field is left at zero.
    Mismatch(ScalarKind),
    /// The target cannot be written from text at all. Fatal for the whole parse.
    Unsupported(&'static str),
}

/// A record field that can be assigned from (trimmed, transformed) cell text.
///
/// Implemented for `String`, `bool`, all integer and float primitives, and `Option<T>` of those.
/// Other implementors may return [`CellError::Unsupported`] to mark themselves as non-writable.
pub trait CellField {
    fn kind() -> FieldKind
    where
        Self: Sized;

    fn assign(&mut self, text: &str) -> Result<(), CellError>;
}

/// Scalars that may sit behind one level of `Option`.
pub trait Scalar: CellField + Default {
    const KIND: ScalarKind;
}

impl CellField for String {
    fn kind() -> FieldKind {
        FieldKind::Scalar(ScalarKind::Text)
    }

    fn assign(&mut self, text: &str) -> Result<(), CellError> {
        text.clone_into(self);
        Ok(())
    }
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::Text;
}

impl CellField for bool {
    fn kind() -> FieldKind {
        FieldKind::Scalar(ScalarKind::Bool)
    }

    // No empty default: an empty cell is a mismatch.
    fn assign(&mut self, text: &str) -> Result<(), CellError> {
        match parse_bool(text) {
            Some(b) => {
                *self = b;
                Ok(())
            }
            None => {
                *self = false;
                Err(CellError::Mismatch(ScalarKind::Bool))
            }
        }
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

macro_rules! numeric_cell {
    ($kind:expr => $($t:ty),+) => {$(
        impl CellField for $t {
            fn kind() -> FieldKind {
                FieldKind::Scalar($kind)
            }

            fn assign(&mut self, text: &str) -> Result<(), CellError> {
                *self = <$t>::default();
                if text.is_empty() {
                    return Ok(());
                }
                *self = text.parse::<$t>().map_err(|_| CellError::Mismatch($kind))?;
                Ok(())
            }
        }

        impl Scalar for $t {
            const KIND: ScalarKind = $kind;
        }
    )+};
}

numeric_cell!(ScalarKind::Int => i8, i16, i32, i64, isize);
numeric_cell!(ScalarKind::Uint => u8, u16, u32, u64, usize);
numeric_cell!(ScalarKind::Float => f32, f64);

impl<T: Scalar> CellField for Option<T> {
    fn kind() -> FieldKind {
        FieldKind::Optional(T::KIND)
    }

    fn assign(&mut self, text: &str) -> Result<(), CellError> {
        self.get_or_insert_with(T::default).assign(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_take_any_cell() {
        let mut s = String::from("old");
        for text in ["", "12a", "TRUE", "已完成", " padded "] {
            assert_eq!(s.assign(text), Ok(()));
            assert_eq!(s, text);
        }
        let mut opt: Option<String> = None;
        assert_eq!(opt.assign("x"), Ok(()));
        assert_eq!(opt.as_deref(), Some("x"));
    }

    #[test]
    fn empty_numeric_cells_are_zero() {
        let mut i = 7_i32;
        let mut u = 7_u16;
        let mut f = 7.5_f64;
        assert_eq!(i.assign(""), Ok(()));
        assert_eq!(u.assign(""), Ok(()));
        assert_eq!(f.assign(""), Ok(()));
        assert_eq!((i, u, f), (0, 0, 0.0));
    }

    #[test]
    fn empty_string_and_bool_boundaries() {
        let mut s = String::from("template");
        assert_eq!(s.assign(""), Ok(()));
        assert_eq!(s, "");

        let mut b = true;
        assert_eq!(b.assign(""), Err(CellError::Mismatch(ScalarKind::Bool)));
        assert!(!b);
    }

    #[test]
    fn strict_bool_literals() {
        let mut b = false;
        for yes in ["1", "t", "T", "true", "TRUE", "True"] {
            b.assign(yes).unwrap();
            assert!(b, "{yes}");
        }
        assert!(b.assign("yes").is_err());
        assert!(b.assign("tRuE").is_err());
    }

    #[test]
    fn integer_parse_failures_leave_zero() {
        let mut n = 5_i64;
        assert_eq!(n.assign("12a"), Err(CellError::Mismatch(ScalarKind::Int)));
        assert_eq!(n, 0);

        let mut u = 5_u32;
        assert_eq!(u.assign("-3"), Err(CellError::Mismatch(ScalarKind::Uint)));
        assert_eq!(u, 0);
    }

    #[test]
    fn integer_width_is_range_checked() {
        let mut small = 0_i8;
        assert!(small.assign("127").is_ok());
        assert!(small.assign("128").is_err());
    }

    #[test]
    fn optional_is_allocated_on_first_write() {
        let mut count: Option<i32> = None;
        count.assign("42").unwrap();
        assert_eq!(count, Some(42));

        let mut flag: Option<bool> = None;
        assert!(flag.assign("maybe").is_err());
        assert_eq!(flag, Some(false));

        assert_eq!(<Option<u8>>::kind(), FieldKind::Optional(ScalarKind::Uint));
    }
}
