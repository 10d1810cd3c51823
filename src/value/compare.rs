#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use itertools::Itertools;
use thiserror::Error;

use super::{ArrayData, NdArray, Value};
use crate::constants::{ALLCLOSE_ATOL, ALLCLOSE_RTOL};

/// A comparison Python itself would have raised on, e.g. asking for the truth
/// value of a multi-element array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ComparisonError(String);

impl ComparisonError {
    /// Creates an error carrying Python's message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Whether `actual` satisfies `expected`.
///
/// Array expectations use `np.allclose` when the result's dtype is
/// floating point and `np.array_equal` otherwise; everything else uses
/// Python's `==`.
pub fn matches(actual: &Value, expected: &Value) -> Result<bool, ComparisonError> {
    match expected {
        Value::Array(expected) => {
            let Value::Array(actual) = actual else {
                return Err(ComparisonError::new(format!(
                    "'{}' object has no attribute 'dtype'",
                    actual.type_name()
                )));
            };
            if actual.is_float() {
                allclose(actual, expected)
            } else {
                Ok(array_equal(actual, expected))
            }
        }
        _ => py_eq(actual, expected)?.truth(),
    }
}

/// One array item, reduced to what equality cares about.
#[derive(Debug, Clone, Copy)]
enum Item<'a> {
    /// Any bool, int or float.
    Number(f64),
    /// A unicode string.
    Text(&'a str),
    /// Something nothing compares equal to.
    Other,
}

impl Item<'_> {
    /// Elementwise `==`.
    fn equals(self, other: Item<'_>) -> bool {
        match (self, other) {
            (Item::Number(a), Item::Number(b)) => a == b,
            (Item::Text(a), Item::Text(b)) => a == b,
            _ => false,
        }
    }
}

/// Flattens an array into comparable items.
fn items(array: &NdArray) -> Vec<Item<'_>> {
    match array.data() {
        ArrayData::Bool(v) => v.iter().map(|b| Item::Number(f64::from(u8::from(*b)))).collect(),
        ArrayData::Int(v) => v.iter().map(|i| Item::Number(*i as f64)).collect(),
        ArrayData::Float(v) => v.iter().map(|f| Item::Number(*f)).collect(),
        ArrayData::Str(v) => v.iter().map(|s| Item::Text(s)).collect(),
        ArrayData::Object(v) => v.iter().map(scalar_item).collect(),
    }
}

/// A scalar as an array item. NumPy scalars arrive as 0-d arrays.
fn scalar_item(value: &Value) -> Item<'_> {
    match value {
        Value::Str(s) => Item::Text(s),
        Value::Array(array) if array.shape().is_empty() => {
            items(array).into_iter().next().unwrap_or(Item::Other)
        }
        other => other.as_number().map_or(Item::Other, Item::Number),
    }
}

/// Python's rendering of a shape tuple.
fn shape_repr(shape: &[usize]) -> String {
    match shape {
        [single] => format!("({single},)"),
        dims => format!("({})", dims.iter().join(", ")),
    }
}

/// Pairs up the items of two arrays under NumPy broadcasting, restricted to
/// equal shapes and single-item operands.
fn broadcast<'a>(lhs: &'a NdArray, rhs: &'a NdArray) -> Result<Vec<(Item<'a>, Item<'a>)>, ComparisonError> {
    let (left, right) = (items(lhs), items(rhs));
    if lhs.shape() == rhs.shape() {
        return Ok(left.into_iter().zip(right).collect());
    }
    if let [only] = left.as_slice() {
        return Ok(right.into_iter().map(|r| (*only, r)).collect());
    }
    if let [only] = right.as_slice() {
        return Ok(left.into_iter().map(|l| (l, *only)).collect());
    }
    Err(ComparisonError::new(format!(
        "operands could not be broadcast together with shapes {} {} ",
        shape_repr(lhs.shape()),
        shape_repr(rhs.shape())
    )))
}

/// `np.isclose` for a single pair, with `b` as the reference value.
fn isclose(a: f64, b: f64) -> bool {
    if a.is_finite() && b.is_finite() {
        (a - b).abs() <= ALLCLOSE_ATOL + ALLCLOSE_RTOL * b.abs()
    } else {
        a == b
    }
}

/// `np.allclose(actual, expected)`.
pub fn allclose(actual: &NdArray, expected: &NdArray) -> Result<bool, ComparisonError> {
    broadcast(actual, expected)?
        .into_iter()
        .map(|pair| match pair {
            (Item::Number(a), Item::Number(b)) => Ok(isclose(a, b)),
            _ => Err(ComparisonError::new(
                "ufunc 'isfinite' not supported for the input types",
            )),
        })
        .fold_ok(true, |all, close| all && close)
}

/// `np.array_equal(actual, expected)`.
pub fn array_equal(actual: &NdArray, expected: &NdArray) -> bool {
    actual.shape() == expected.shape()
        && items(actual)
            .into_iter()
            .zip(items(expected))
            .all(|(a, b)| a.equals(b))
}

/// The result of a Python `==`: a plain bool, or an elementwise array when
/// NumPy is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Equality {
    /// `==` between plain Python objects.
    Scalar(bool),
    /// `==` involving an array.
    Elementwise(Vec<bool>),
}

impl Equality {
    /// Python's `bool()` of the comparison result.
    pub fn truth(&self) -> Result<bool, ComparisonError> {
        match self {
            Equality::Scalar(b) => Ok(*b),
            Equality::Elementwise(items) => match items.as_slice() {
                [single] => Ok(*single),
                [] => Err(ComparisonError::new(
                    "The truth value of an empty array is ambiguous. Use `array.size > 0` to check \
                     that an array is not empty.",
                )),
                _ => Err(ComparisonError::new(
                    "The truth value of an array with more than one element is ambiguous. Use \
                     a.any() or a.all()",
                )),
            },
        }
    }
}

/// Sequences NumPy would turn into a vector when compared with an array.
fn sequence_as_array(values: &[Value]) -> Option<NdArray> {
    let scalars: Vec<Item<'_>> = values.iter().map(scalar_item).collect();
    let numbers = scalars
        .iter()
        .map(|item| match item {
            Item::Number(n) => Some(*n),
            _ => None,
        })
        .collect::<Option<Vec<_>>>();
    if let Some(numbers) = numbers {
        return Some(NdArray::vector(ArrayData::Float(numbers)));
    }
    scalars
        .iter()
        .map(|item| match item {
            Item::Text(s) => Some(s.to_string()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(|strings| NdArray::vector(ArrayData::Str(strings)))
}

/// `np.asarray(value)` for results that are arrays, or flat lists and tuples
/// of numbers or strings.
pub fn as_array_like(value: &Value) -> Option<NdArray> {
    match value {
        Value::Array(array) => Some(array.clone()),
        Value::List(items) | Value::Tuple(items) => sequence_as_array(items),
        _ => None,
    }
}

/// Python's `value[0]`, or `None` where indexing raises.
pub fn first_item(value: &Value) -> Option<Value> {
    match value {
        Value::Array(array) => array.first().map(Value::Array),
        Value::List(items) | Value::Tuple(items) => items.first().cloned(),
        Value::Str(s) => s.chars().next().map(|c| Value::Str(c.to_string())),
        _ => None,
    }
}

/// `array == other` with `other` on the right.
fn array_eq(array: &NdArray, other: &Value) -> Result<Equality, ComparisonError> {
    let other = match other {
        Value::Array(other) => other.clone(),
        Value::Tuple(items) | Value::List(items) => match sequence_as_array(items) {
            Some(other) => other,
            None => return Ok(Equality::Scalar(false)),
        },
        scalar => {
            let item = scalar_item(scalar);
            return Ok(Equality::Elementwise(
                items(array).into_iter().map(|a| a.equals(item)).collect(),
            ));
        }
    };
    Ok(Equality::Elementwise(
        broadcast(array, &other)?
            .into_iter()
            .map(|(a, b)| a.equals(b))
            .collect(),
    ))
}

/// Python's `actual == expected`.
pub fn py_eq(actual: &Value, expected: &Value) -> Result<Equality, ComparisonError> {
    match (actual, expected) {
        (Value::Array(array), other) | (other, Value::Array(array)) => array_eq(array, other),
        (Value::Tuple(a), Value::Tuple(b)) | (Value::List(a), Value::List(b)) => {
            if a.len() != b.len() {
                return Ok(Equality::Scalar(false));
            }
            for (x, y) in a.iter().zip(b) {
                if !py_eq(x, y)?.truth()? {
                    return Ok(Equality::Scalar(false));
                }
            }
            Ok(Equality::Scalar(true))
        }
        (Value::Str(a), Value::Str(b)) => Ok(Equality::Scalar(a == b)),
        (Value::None, Value::None) => Ok(Equality::Scalar(true)),
        (a, b) => Ok(Equality::Scalar(
            a.as_number()
                .zip(b.as_number())
                .is_some_and(|(x, y)| x == y),
        )),
    }
}
