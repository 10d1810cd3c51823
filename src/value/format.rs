#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use itertools::Itertools;

use super::{ArrayData, NdArray, Value};

/// Fractional digits NumPy keeps when printing floats (`precision=8`).
const PRECISION: usize = 8;

/// Line width NumPy wraps array output at (`linewidth=75`).
const LINE_WIDTH: usize = 75;

/// Renders like Python's `str()`.
impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Array(array) => f.write_str(&array_str(array)),
            other => f.write_str(&other.repr()),
        }
    }
}

impl Value {
    /// Renders like Python's `repr()`.
    pub fn repr(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(v) => float_repr(*v),
            Value::Str(s) => str_repr(s),
            Value::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()),
            Value::Tuple(items) => format!("({})", items.iter().map(Value::repr).join(", ")),
            Value::List(items) => format!("[{}]", items.iter().map(Value::repr).join(", ")),
            Value::Array(array) => array_repr(array),
            Value::Opaque { repr, .. } => repr.clone(),
        }
    }
}

/// Python's `repr(float)`: shortest round-trip digits, scientific outside
/// `1e-4 <= |v| < 1e16`.
pub fn float_repr(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = v.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let rendered = format!("{v:e}");
        let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }

    let digits = format!("{v}");
    if digits.contains('.') {
        digits
    } else {
        format!("{digits}.0")
    }
}

/// Python's `repr(str)`.
pub fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Shortest scientific digits of a finite value, capped at `PRECISION`
/// fractional mantissa digits: `("1.5", 3)` for `1500.0`.
fn scientific_digits(v: f64) -> (String, i32) {
    let mut rendered = format!("{v:e}");
    if let Some((mantissa, _)) = rendered.split_once('e')
        && mantissa.split_once('.').is_some_and(|(_, frac)| frac.len() > PRECISION)
    {
        rendered = format!("{v:.PRECISION$e}");
    }

    let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
    let mantissa = match mantissa.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                int.to_string()
            } else {
                format!("{int}.{frac}")
            }
        }
        None => mantissa.to_string(),
    };
    (mantissa, exponent.parse().unwrap_or(0))
}

/// Shortest positional digits of a finite value, capped at `PRECISION`
/// fractional digits, split at the decimal point.
fn positional_digits(v: f64) -> (String, String) {
    let mut rendered = format!("{v}");
    if rendered
        .split_once('.')
        .is_some_and(|(_, frac)| frac.len() > PRECISION)
    {
        rendered = format!("{v:.PRECISION$}");
    }

    match rendered.split_once('.') {
        Some((int, frac)) => (int.to_string(), frac.trim_end_matches('0').to_string()),
        None => (rendered, String::new()),
    }
}

/// Column layout NumPy computes once per float array so every element lines
/// up.
struct FloatLayout {
    /// Whether elements print in scientific notation.
    scientific: bool,
    /// Width of the integer part.
    pad_left:   usize,
    /// Width of everything after the integer part, minus the decimal point.
    pad_right:  usize,
    /// Fractional mantissa digits in scientific mode.
    precision:  usize,
    /// Exponent digits in scientific mode.
    exp_digits: usize,
}

impl FloatLayout {
    /// Mirrors NumPy's `FloatingFormat.fillFormat` for `floatmode='maxprec'`.
    fn new(items: &[f64]) -> Self {
        let finite: Vec<f64> = items.iter().copied().filter(|v| v.is_finite()).collect();
        let non_zero: Vec<f64> = finite
            .iter()
            .map(|v| v.abs())
            .filter(|v| *v != 0.0)
            .collect();

        let scientific = match (
            non_zero.iter().copied().reduce(f64::max),
            non_zero.iter().copied().reduce(f64::min),
        ) {
            (Some(max), Some(min)) => max >= 1e8 || min < 1e-4 || max / min > 1e3,
            _ => false,
        };

        let mut layout = if finite.is_empty() {
            Self {
                scientific: false,
                pad_left:   0,
                pad_right:  0,
                precision:  0,
                exp_digits: 0,
            }
        } else if scientific {
            let parts: Vec<(String, i32)> = finite.iter().map(|v| scientific_digits(*v)).collect();
            let precision = parts
                .iter()
                .map(|(m, _)| m.split_once('.').map_or(0, |(_, frac)| frac.len()))
                .max()
                .unwrap_or(0);
            let exp_digits = parts
                .iter()
                .map(|(_, e)| e.unsigned_abs().to_string().len())
                .max()
                .unwrap_or(0)
                .max(2);
            let pad_left = parts
                .iter()
                .map(|(m, _)| m.split_once('.').map_or(m.len(), |(int, _)| int.len()))
                .max()
                .unwrap_or(0);
            Self {
                scientific,
                pad_left,
                pad_right: exp_digits + 2 + precision,
                precision,
                exp_digits,
            }
        } else {
            let parts: Vec<(String, String)> = finite.iter().map(|v| positional_digits(*v)).collect();
            Self {
                scientific,
                pad_left: parts.iter().map(|(int, _)| int.len()).max().unwrap_or(0),
                pad_right: parts.iter().map(|(_, frac)| frac.len()).max().unwrap_or(0),
                precision: 0,
                exp_digits: 0,
            }
        };

        if finite.len() != items.len() {
            let offset = layout.pad_right + 1;
            let neg_inf = usize::from(items.iter().any(|v| *v == f64::NEG_INFINITY));
            layout.pad_left = layout
                .pad_left
                .max(3usize.saturating_sub(offset))
                .max((3 + neg_inf).saturating_sub(offset));
        }

        layout
    }

    /// Formats one element.
    fn format(&self, v: f64) -> String {
        let width = self.pad_left + self.pad_right + 1;
        if !v.is_finite() {
            return format!("{:>width$}", float_repr(v));
        }

        if self.scientific {
            let (mantissa, exponent) = scientific_digits(v);
            let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa.as_str(), ""));
            let sign = if exponent < 0 { '-' } else { '+' };
            format!(
                "{int:>left$}.{frac:0<prec$}e{sign}{exp:0>digits$}",
                left = self.pad_left,
                prec = self.precision,
                exp = exponent.unsigned_abs(),
                digits = self.exp_digits,
            )
        } else {
            let (int, frac) = positional_digits(v);
            format!(
                "{int:>left$}.{frac:<right$}",
                left = self.pad_left,
                right = self.pad_right
            )
        }
    }
}

/// Formats every item of an array the way NumPy's default formatters do,
/// padding them to a common width.
fn format_items(data: &ArrayData) -> Vec<String> {
    match data {
        ArrayData::Float(items) => {
            let layout = FloatLayout::new(items);
            items.iter().map(|v| layout.format(*v)).collect()
        }
        ArrayData::Int(items) => {
            let width = items.iter().map(|i| i.to_string().len()).max().unwrap_or(0);
            items.iter().map(|i| format!("{i:>width$}")).collect()
        }
        ArrayData::Bool(items) => items
            .iter()
            .map(|b| if *b { " True" } else { "False" }.to_string())
            .collect(),
        ArrayData::Str(items) => items.iter().map(|s| str_repr(s)).collect(),
        ArrayData::Object(items) => items.iter().map(Value::repr).collect(),
    }
}

/// Appends `word` to `line`, flushing the line into `out` first when it would
/// overflow `width`.
fn extend_line(out: &mut String, line: &mut String, word: &str, width: usize, indent: &str) {
    let needs_wrap = line.len() + word.len() > width && line.len() > indent.len();
    if needs_wrap {
        out.push_str(line.trim_end());
        out.push('\n');
        *line = indent.to_string();
    }
    line.push_str(word);
}

/// NumPy's `_formatArray` without summarisation.
fn format_nested(
    words: &[String],
    shape: &[usize],
    separator: &str,
    indent: &str,
    width: usize,
) -> String {
    let next_indent = format!("{indent} ");
    let next_width = width.saturating_sub(1);

    let body = match shape {
        [] => return words.first().cloned().unwrap_or_default(),
        [_] => {
            let elem_width = width.saturating_sub(separator.trim_end().len().max(1));
            let mut out = String::new();
            let mut line = indent.to_string();
            for (i, word) in words.iter().enumerate() {
                extend_line(&mut out, &mut line, word, elem_width, indent);
                if i + 1 < words.len() {
                    line.push_str(separator);
                }
            }
            out.push_str(&line);
            out
        }
        [rows, rest @ ..] => {
            let chunk = rest.iter().product::<usize>();
            let line_sep = format!("{}{}", separator.trim_end(), "\n".repeat(rest.len()));
            (0..*rows)
                .map(|row| {
                    let slice = &words[row * chunk..(row + 1) * chunk];
                    let nested = format_nested(slice, rest, separator, &next_indent, next_width);
                    format!("{indent}{nested}")
                })
                .join(&line_sep)
        }
    };

    format!("[{}]", body.get(indent.len()..).unwrap_or_default())
}

/// NumPy's `str(arr)`.
pub fn array_str(array: &NdArray) -> String {
    if array.shape().is_empty() {
        return match array.data() {
            ArrayData::Float(items) => items.first().map(|v| float_repr(*v)),
            ArrayData::Bool(items) => items
                .first()
                .map(|b| if *b { "True" } else { "False" }.to_string()),
            ArrayData::Str(items) => items.first().cloned(),
            ArrayData::Object(items) => items.first().map(Value::to_string),
            ArrayData::Int(items) => items.first().map(i64::to_string),
        }
        .unwrap_or_default();
    }
    if array.size() == 0 {
        return format!("{}{}", "[".repeat(array.shape().len()), "]".repeat(array.shape().len()));
    }
    let words = format_items(array.data());
    format_nested(&words, array.shape(), " ", " ", LINE_WIDTH)
}

/// NumPy's `repr(arr)`.
pub fn array_repr(array: &NdArray) -> String {
    let prefix = "array(";
    let default_dtype = matches!(array.dtype(), "float64" | "int64" | "bool");
    let body = if array.size() == 0 {
        let depth = array.shape().len().max(1);
        format!("{}{}", "[".repeat(depth), "]".repeat(depth))
    } else {
        let words = format_items(array.data());
        let indent = " ".repeat(prefix.len() + 1);
        format_nested(&words, array.shape(), ", ", &indent, LINE_WIDTH)
    };

    let dtype = if array.dtype().chars().all(char::is_alphanumeric) {
        array.dtype().to_string()
    } else {
        str_repr(array.dtype())
    };
    if default_dtype && array.size() > 0 {
        format!("{prefix}{body})")
    } else {
        format!("{prefix}{body}, dtype={dtype})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_arrays_drop_trailing_zeros() {
        assert_eq!(Value::float_array(&[180.0]).to_string(), "[180.]");
        assert_eq!(Value::float_array(&[100.0, 180.0, 270.0]).to_string(), "[100. 180. 270.]");
    }

    #[test]
    fn float_arrays_align_on_the_decimal_point() {
        assert_eq!(
            Value::float_array(&[120.5, 250.0, 75.3, 99.99]).to_string(),
            "[120.5  250.    75.3   99.99]"
        );
        assert_eq!(Value::float_array(&[0.1 + 0.2, 1.0]).to_string(), "[0.3 1. ]");
    }

    #[test]
    fn float_arrays_switch_to_scientific_for_wide_ranges() {
        assert_eq!(Value::float_array(&[1.0, 5000.0]).to_string(), "[1.e+00 5.e+03]");
        assert_eq!(Value::float_array(&[1.5, 5000.0]).to_string(), "[1.5e+00 5.0e+03]");
    }

    #[test]
    fn non_finite_floats_widen_the_integer_column() {
        assert_eq!(Value::float_array(&[1.0, f64::NAN]).to_string(), "[ 1. nan]");
    }

    #[test]
    fn other_dtypes_render_like_numpy() {
        assert_eq!(Value::int_array(&[100, -50, 200]).to_string(), "[100 -50 200]");
        assert_eq!(Value::bool_array(&[true, false]).to_string(), "[ True False]");
        assert_eq!(
            Value::str_array(&["Normal", "High", "Normal"]).to_string(),
            "['Normal' 'High' 'Normal']"
        );
        assert_eq!(Value::float_array(&[]).to_string(), "[]");

        let labels = ArrayData::Object(vec![Value::Str("Normal".into()), Value::Int(3)]);
        assert_eq!(Value::Array(NdArray::vector(labels)).to_string(), "['Normal' 3]");
    }

    #[test]
    fn long_arrays_wrap_at_seventy_five_columns() {
        let items: Vec<i64> = (0..30).collect();
        let expected = "[ 0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15 16 17 18 19 20 21 22 23\n 24 25 \
                        26 27 28 29]";
        assert_eq!(Value::int_array(&items).to_string(), expected);
    }

    #[test]
    fn matrices_put_rows_on_their_own_lines() {
        let array = NdArray::new("int64", vec![2, 2], ArrayData::Int(vec![1, 2, 3, 4])).expect("shape");
        assert_eq!(array_str(&array), "[[1 2]\n [3 4]]");
    }

    #[test]
    fn scalars_render_like_python() {
        assert_eq!(Value::Bool(false).to_string(), "False");
        assert_eq!(
            Value::float_tuple(&[545.79, 136.4475, 250.0]).to_string(),
            "(545.79, 136.4475, 250.0)"
        );
        assert_eq!(Value::Float(1e16).to_string(), "1e+16");
        assert_eq!(Value::Float(0.00001).to_string(), "1e-05");
        assert_eq!(Value::Str("$1.00".into()).to_string(), "$1.00");
        assert_eq!(Value::Str("it's".into()).repr(), "\"it's\"");
    }

    #[test]
    fn repr_adds_dtype_when_numpy_would() {
        assert_eq!(Value::float_array(&[1.0, 2.5]).repr(), "array([1. , 2.5])");
        assert_eq!(Value::float_array(&[]).repr(), "array([], dtype=float64)");
        assert_eq!(Value::str_array(&["a"]).repr(), "array(['a'], dtype='<U1')");
    }
}
