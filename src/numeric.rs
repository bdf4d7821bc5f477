//! Number coercion and the small array utilities built on top of it.
//!
//! Inputs are loosely typed: anything implementing [`ToNumber`] (plain
//! numbers, strings, `serde_json::Value`) can be fed in, and values that
//! cannot be converted become `NaN` instead of failing.

use rand::Rng;
use serde::Serializer;
use serde_json::Value;

/// Squares at or below this value are dropped by [`square_and_filter`].
pub const SQUARE_FILTER_THRESHOLD: f64 = 2.0;

/// Added to every result of [`calculate_with_offset`].
pub const FIXED_OFFSET: f64 = -2.0;

/// Coercion of an arbitrary value to a number.
pub trait ToNumber {
    fn to_number(&self) -> f64;
}

macro_rules! impl_to_number_for_primitive {
    ($($t:ty),*) => {
        $(
            impl ToNumber for $t {
                fn to_number(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_to_number_for_primitive!(i32, i64, u32, u64, f32, f64);

impl ToNumber for bool {
    fn to_number(&self) -> f64 {
        if *self { 1.0 } else { 0.0 }
    }
}

impl ToNumber for str {
    fn to_number(&self) -> f64 {
        parse_numeric_str(self)
    }
}

impl ToNumber for String {
    fn to_number(&self) -> f64 {
        parse_numeric_str(self)
    }
}

impl<T: ToNumber + ?Sized> ToNumber for &T {
    fn to_number(&self) -> f64 {
        (**self).to_number()
    }
}

impl ToNumber for Value {
    fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => b.to_number(),
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => parse_numeric_str(s),
            Value::Array(items) => match items.as_slice() {
                [] => 0.0,
                [single] => single.to_number(),
                _ => f64::NAN,
            },
            Value::Object(_) => f64::NAN,
        }
    }
}

/// Parses a string the way numeric coercion does: surrounding whitespace is
/// ignored, an empty string is 0, and anything that is not a complete numeric
/// literal is `NaN`.
fn parse_numeric_str(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }

    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match t.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix_digits(&t[2..], radix);
    }

    // f64::from_str also accepts "inf" and "nan", which are not numeric literals here.
    let literal = t
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !literal {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

// Accumulates in f64 so literals wider than 64 bits lose precision instead
// of failing.
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// The `value || 0` idiom: `NaN` and zero both collapse to 0.
pub fn or_zero(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 { 0.0 } else { n }
}

/// Whether a loose value counts as "set". `null`, `false`, `0`, `NaN` and the
/// empty string are falsy; everything else (including empty arrays and
/// objects) is truthy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Renders a number for console output: integral values have no fractional
/// part, non-finite values are spelled out, and magnitudes of at least 1e21
/// or below 1e-6 use exponent form (`1e+21`, `1e-7`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let exp = format!("{n:e}");
        if exp.contains("e-") {
            exp
        } else {
            exp.replacen('e', "e+", 1)
        }
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// Renders a loose value the way string interpolation would.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// JSON form of a number as the console would print it. Non-finite values
/// become `null`.
pub fn json_number(n: f64) -> Value {
    if !n.is_finite() {
        Value::Null
    } else if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// `serialize_with` helper for a single number.
pub fn serialize_number<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serde::Serialize::serialize(&json_number(*n), serializer)
}

/// `serialize_with` helper for a sequence of numbers.
pub fn serialize_numbers<S: Serializer>(ns: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(ns.iter().map(|n| json_number(*n)))
}

/// Appends `x` and `y` to `initial`, squares every element and keeps the
/// squares strictly above [`SQUARE_FILTER_THRESHOLD`]. Non-numeric elements
/// square to `NaN` and are dropped. Input order is preserved.
pub fn square_and_filter<T: ToNumber>(x: T, y: T, initial: &[T]) -> Vec<f64> {
    initial
        .iter()
        .map(|item| item.to_number())
        .chain([x.to_number(), y.to_number()])
        .map(|n| n * n)
        .filter(|sq| *sq > SQUARE_FILTER_THRESHOLD)
        .collect()
}

/// Sums a loose value. Anything that is not an array sums to 0.
pub fn sum_array(arr: &Value) -> f64 {
    match arr {
        Value::Array(items) => sum_slice(items),
        _ => 0.0,
    }
}

/// Left fold over the elements, each contributing `or_zero(to_number(elem))`.
pub fn sum_slice<T: ToNumber>(items: &[T]) -> f64 {
    items
        .iter()
        .fold(0.0, |acc, item| acc + or_zero(item.to_number()))
}

/// Returns a sorted copy; the input is left untouched.
pub fn sort_array_ascending(arr: &[f64]) -> Vec<f64> {
    let mut sorted = arr.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// `value + random integer in [0, 10) + FIXED_OFFSET`, using the thread RNG.
pub fn calculate_with_offset<T: ToNumber + ?Sized>(value: &T) -> f64 {
    calculate_with_offset_with(value, &mut rand::thread_rng())
}

/// Same as [`calculate_with_offset`] with an explicit random source.
pub fn calculate_with_offset_with<T: ToNumber + ?Sized, R: Rng>(
    value: &T,
    rng: &mut R,
) -> f64 {
    let jitter: u32 = rng.gen_range(0..10);
    or_zero(value.to_number()) + f64::from(jitter) + FIXED_OFFSET
}
