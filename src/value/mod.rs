#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Python values as they cross the boundary between the grader and the
//! analyzer under test.

/// Python `==` and NumPy `allclose`/`array_equal` semantics.
pub mod compare;
/// Python `str()`/`repr()` and NumPy array printing.
pub mod format;

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

/// A Python value.
///
/// NumPy scalars (`np.float64`, `np.bool_`, ...) travel as 0-d arrays so that
/// comparisons keep NumPy's broadcasting behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// `None`.
    None,
    /// A Python `bool`.
    Bool(bool),
    /// A Python `int` that fits in 64 bits.
    Int(i64),
    /// A Python `float`.
    Float(#[serde(deserialize_with = "wire_float")] f64),
    /// A Python `str`.
    Str(String),
    /// A Python `tuple`.
    Tuple(Vec<Value>),
    /// A Python `list`.
    List(Vec<Value>),
    /// A NumPy array.
    Array(NdArray),
    /// Anything else, kept only as its type name and `repr()`.
    Opaque {
        /// `type(value).__name__`.
        type_name: String,
        /// `repr(value)`.
        repr:      String,
    },
}

impl Value {
    /// A `list` of Python floats.
    pub fn float_list(items: &[f64]) -> Self {
        Value::List(items.iter().copied().map(Value::Float).collect())
    }

    /// A `list` of Python ints.
    pub fn int_list(items: &[i64]) -> Self {
        Value::List(items.iter().copied().map(Value::Int).collect())
    }

    /// A tuple of Python floats.
    pub fn float_tuple(items: &[f64]) -> Self {
        Value::Tuple(items.iter().copied().map(Value::Float).collect())
    }

    /// A 1-d `float64` array.
    pub fn float_array(items: &[f64]) -> Self {
        Value::Array(NdArray::vector(ArrayData::Float(items.to_vec())))
    }

    /// A 1-d `int64` array.
    pub fn int_array(items: &[i64]) -> Self {
        Value::Array(NdArray::vector(ArrayData::Int(items.to_vec())))
    }

    /// A 1-d `bool` array.
    pub fn bool_array(items: &[bool]) -> Self {
        Value::Array(NdArray::vector(ArrayData::Bool(items.to_vec())))
    }

    /// A 1-d unicode string array.
    pub fn str_array(items: &[&str]) -> Self {
        Value::Array(NdArray::vector(ArrayData::Str(
            items.iter().map(|s| s.to_string()).collect(),
        )))
    }

    /// The name Python would report for `type(value).__name__`.
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Array(_) => "ndarray",
            Value::Opaque { type_name, .. } => type_name,
        }
    }

    /// The value as a number, if Python would treat it as one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the array, if this is one.
    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }
}

/// A NumPy array: dtype, shape and row-major items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdArray {
    /// `str(arr.dtype)`, e.g. `float64` or `<U6`.
    dtype: String,
    /// `arr.shape`.
    shape: Vec<usize>,
    /// Flattened items.
    data:  ArrayData,
}

impl NdArray {
    /// Creates an array, checking that the shape accounts for every item.
    pub fn new(dtype: impl Into<String>, shape: Vec<usize>, data: ArrayData) -> Option<Self> {
        (shape.iter().product::<usize>() == data.len()).then(|| Self {
            dtype: dtype.into(),
            shape,
            data,
        })
    }

    /// A 1-d array with the dtype NumPy would infer for `data`.
    pub fn vector(data: ArrayData) -> Self {
        let dtype = match &data {
            ArrayData::Bool(_) => "bool".to_string(),
            ArrayData::Int(_) => "int64".to_string(),
            ArrayData::Float(_) => "float64".to_string(),
            ArrayData::Str(items) => {
                let width = items.iter().map(|s| s.chars().count()).max().unwrap_or(0);
                format!("<U{}", width.max(1))
            }
            ArrayData::Object(_) => "object".to_string(),
        };
        Self {
            dtype,
            shape: vec![data.len()],
            data,
        }
    }

    /// The dtype string.
    pub fn dtype(&self) -> &str {
        &self.dtype
    }

    /// The shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The flattened items.
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Number of items.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Whether `arr.dtype.kind == "f"`.
    pub fn is_float(&self) -> bool {
        matches!(self.data, ArrayData::Float(_))
    }

    /// `arr[0]`: the leading row, which for a vector is a 0-d array.
    ///
    /// `None` where NumPy raises `IndexError`, i.e. for 0-d and empty arrays.
    pub fn first(&self) -> Option<NdArray> {
        let (&rows, rest) = self.shape.split_first()?;
        if rows == 0 {
            return None;
        }
        let row = rest.iter().product::<usize>();
        NdArray::new(self.dtype.clone(), rest.to_vec(), self.data.prefix(row))
    }
}

/// The flattened items of an array, by dtype kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ArrayData {
    /// Kind `b`.
    Bool(Vec<bool>),
    /// Kinds `i` and `u`.
    Int(Vec<i64>),
    /// Kind `f`.
    Float(#[serde(deserialize_with = "wire_floats")] Vec<f64>),
    /// Kind `U`.
    Str(Vec<String>),
    /// Any other kind, each item encoded as a value of its own.
    Object(Vec<Value>),
}

impl ArrayData {
    /// Number of items.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Bool(items) => items.len(),
            ArrayData::Int(items) => items.len(),
            ArrayData::Float(items) => items.len(),
            ArrayData::Str(items) => items.len(),
            ArrayData::Object(items) => items.len(),
        }
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first `n` items.
    fn prefix(&self, n: usize) -> ArrayData {
        match self {
            ArrayData::Bool(items) => ArrayData::Bool(items.iter().take(n).copied().collect()),
            ArrayData::Int(items) => ArrayData::Int(items.iter().take(n).copied().collect()),
            ArrayData::Float(items) => ArrayData::Float(items.iter().take(n).copied().collect()),
            ArrayData::Str(items) => ArrayData::Str(items.iter().take(n).cloned().collect()),
            ArrayData::Object(items) => ArrayData::Object(items.iter().take(n).cloned().collect()),
        }
    }
}

/// A float as the host writes it: a JSON number, or `"nan"`/`"inf"`/`"-inf"`
/// for values JSON can't carry.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireFloat {
    /// A finite value.
    Finite(f64),
    /// A non-finite value spelled the way Python's `repr` spells it.
    Special(String),
}

impl WireFloat {
    /// Resolves the wire form to an `f64`.
    fn resolve(self) -> Result<f64, String> {
        match self {
            WireFloat::Finite(v) => Ok(v),
            WireFloat::Special(s) => match s.as_str() {
                "nan" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(format!("not a float: {other:?}")),
            },
        }
    }
}

/// Deserializes one float in wire form.
fn wire_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    WireFloat::deserialize(deserializer)?
        .resolve()
        .map_err(D::Error::custom)
}

/// Deserializes a sequence of floats in wire form.
fn wire_floats<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    Vec::<WireFloat>::deserialize(deserializer)?
        .into_iter()
        .map(|w| w.resolve().map_err(D::Error::custom))
        .collect()
}
