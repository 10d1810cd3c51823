#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::BTreeSet, fmt};

use anyhow::{Context, Result};

use super::Analyzer;
use crate::{
    types::Method,
    value::{
        ArrayData,
        NdArray,
        Value,
        compare::{ComparisonError, array_equal, as_array_like, first_item, py_eq},
        format::array_str,
    },
};

/// Methods that failed at least one probe.
pub type ProbeFailureSet = BTreeSet<Method>;

/// How a probe judges the value a method returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// `np.array_equal(result, expected)`. Lists and tuples are accepted.
    ArrayEqual(NdArray),
    /// `result[0] == expected`. A result that cannot be indexed fails.
    FirstItem(Value),
    /// `result is False`. Only a plain Python `False` passes.
    IsFalse,
    /// `result == expected`.
    Equals(Value),
}

impl Check {
    /// Whether `actual` passes the check.
    pub fn passes(&self, actual: &Value) -> Result<bool, ComparisonError> {
        match self {
            Check::ArrayEqual(expected) => {
                Ok(as_array_like(actual).is_some_and(|array| array_equal(&array, expected)))
            }
            Check::FirstItem(expected) => {
                let Some(first) = first_item(actual) else {
                    return Err(ComparisonError::new(format!(
                        "'{}' result has no item 0",
                        actual.type_name()
                    )));
                };
                py_eq(&first, expected)?.truth()
            }
            Check::IsFalse => Ok(matches!(actual, Value::Bool(false))),
            Check::Equals(expected) => py_eq(actual, expected)?.truth(),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::ArrayEqual(expected) => write!(f, "an array equal to {}", array_str(expected)),
            Check::FirstItem(expected) => write!(f, "{} at index 0", expected.repr()),
            Check::IsFalse => write!(f, "False"),
            Check::Equals(expected) => write!(f, "{}", expected.repr()),
        }
    }
}

/// One exploratory call with a known-correct answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    /// Method under probe.
    pub method: Method,
    /// The single argument passed.
    pub input:  Value,
    /// How the result is judged.
    pub check:  Check,
}

impl Probe {
    /// Creates a probe.
    fn new(method: Method, input: Value, check: Check) -> Self {
        Self {
            method,
            input,
            check,
        }
    }
}

/// The fixed probe sequence, in execution order.
pub fn probes() -> Vec<Probe> {
    vec![
        Probe::new(
            Method::CreateOrderArray,
            Value::int_list(&[10, 20]),
            Check::ArrayEqual(NdArray::vector(ArrayData::Float(vec![10.0, 20.0]))),
        ),
        Probe::new(
            Method::ValidateOrderArray,
            Value::float_array(&[]),
            Check::IsFalse,
        ),
        Probe::new(
            Method::ValidateOrderArray,
            Value::int_array(&[1, -5]),
            Check::IsFalse,
        ),
        Probe::new(
            Method::ApplyDiscount,
            Value::int_array(&[200]),
            Check::FirstItem(Value::Float(180.0)),
        ),
        Probe::new(
            Method::FormatOrderAmounts,
            Value::int_array(&[100]),
            Check::FirstItem(Value::Str("$100.00".to_string())),
        ),
        Probe::new(
            Method::ComputeOrderSummary,
            Value::float_array(&[100.0, 100.0, 100.0]),
            Check::Equals(Value::float_tuple(&[300.0, 100.0, 100.0])),
        ),
        Probe::new(
            Method::FlagHighValueOrders,
            Value::int_array(&[1, 2, 100]),
            Check::ArrayEqual(NdArray::vector(ArrayData::Str(vec![
                "Normal".to_string(),
                "Normal".to_string(),
                "High".to_string(),
            ]))),
        ),
    ]
}

/// Runs every probe on one fresh instance and collects the methods that
/// returned a wrong value or raised.
///
/// Only failing to construct the instance is an error; individual probe
/// failures are recorded and the run moves on.
pub async fn run_probes<A: Analyzer>(analyzer: &mut A) -> Result<ProbeFailureSet> {
    let instance = analyzer
        .construct()
        .await
        .context("Could not construct an analyzer instance for probing")?;

    let mut failures = ProbeFailureSet::new();
    for probe in probes() {
        let passed = match analyzer
            .invoke(&instance, probe.method, &probe.input)
            .await
        {
            Ok(result) => match probe.check.passes(&result.value) {
                Ok(true) => true,
                Ok(false) => {
                    tracing::debug!(
                        "Probe of {} returned {}, wanted {}",
                        probe.method,
                        result.rendered,
                        probe.check
                    );
                    false
                }
                Err(e) => {
                    tracing::debug!("Probe of {} could not be compared: {}", probe.method, e);
                    false
                }
            },
            Err(e) => {
                tracing::debug!("Probe of {} raised: {}", probe.method, e);
                false
            }
        };

        if !passed {
            failures.insert(probe.method);
        }
    }
    analyzer.release(instance).await;

    if !failures.is_empty() {
        tracing::warn!(
            "Probes failed for: {}",
            itertools::join(failures.iter(), ", ")
        );
    }
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probes_cover_every_method() {
        let covered: BTreeSet<Method> = probes().iter().map(|p| p.method).collect();
        assert_eq!(covered.len(), Method::ALL.len());
    }

    /// A NumPy scalar, which the host sends as a 0-d array.
    fn numpy_scalar(dtype: &str, data: ArrayData) -> Value {
        Value::Array(NdArray::new(dtype, vec![], data).expect("0-d"))
    }

    /// The check used for `method`'s first probe.
    fn check_for(method: Method) -> Check {
        probes()
            .into_iter()
            .find(|p| p.method == method)
            .map(|p| p.check)
            .expect("method is probed")
    }

    #[test]
    fn created_lists_count_as_arrays() {
        let check = check_for(Method::CreateOrderArray);
        assert_eq!(check.passes(&Value::float_list(&[10.0, 20.0])), Ok(true));
        assert_eq!(check.passes(&Value::int_array(&[10, 20])), Ok(true));
        assert_eq!(check.passes(&Value::float_tuple(&[10.0, 20.0])), Ok(true));
        assert_eq!(check.passes(&Value::float_array(&[10.0, 21.0])), Ok(false));
        assert_eq!(check.passes(&Value::float_array(&[10.0])), Ok(false));
        assert_eq!(check.passes(&Value::None), Ok(false));
    }

    #[test]
    fn only_a_plain_false_is_invalid() {
        let check = check_for(Method::ValidateOrderArray);
        assert_eq!(check.passes(&Value::Bool(false)), Ok(true));
        assert_eq!(
            check.passes(&numpy_scalar("bool", ArrayData::Bool(vec![false]))),
            Ok(false)
        );
        assert_eq!(check.passes(&Value::Int(0)), Ok(false));
        assert_eq!(check.passes(&Value::Bool(true)), Ok(false));
    }

    #[test]
    fn first_item_is_read_from_any_sequence() {
        let discount = check_for(Method::ApplyDiscount);
        assert_eq!(discount.passes(&Value::float_array(&[180.0])), Ok(true));
        assert_eq!(discount.passes(&Value::float_list(&[180.0, 1.0])), Ok(true));
        assert_eq!(discount.passes(&Value::int_array(&[200])), Ok(false));
        assert!(discount.passes(&Value::float_array(&[])).is_err());
        assert!(discount.passes(&Value::Float(180.0)).is_err());

        let format = check_for(Method::FormatOrderAmounts);
        let listed = Value::List(vec![Value::Str("$100.00".to_string())]);
        assert_eq!(format.passes(&listed), Ok(true));
        assert_eq!(format.passes(&Value::str_array(&["$100.00"])), Ok(true));
        assert_eq!(format.passes(&Value::Str("$100.00".to_string())), Ok(false));
    }

    #[test]
    fn summary_keeps_python_equality() {
        let check = check_for(Method::ComputeOrderSummary);
        let scalars = Value::Tuple(
            [300.0, 100.0, 100.0]
                .into_iter()
                .map(|v| numpy_scalar("float64", ArrayData::Float(vec![v])))
                .collect(),
        );
        assert_eq!(check.passes(&scalars), Ok(true));
        assert_eq!(check.passes(&Value::float_list(&[300.0, 100.0, 100.0])), Ok(false));
        assert!(check.passes(&Value::float_array(&[300.0, 100.0, 100.0])).is_err());
    }

    #[test]
    fn flags_accept_object_arrays() {
        let check = check_for(Method::FlagHighValueOrders);
        let labels = ArrayData::Object(
            ["Normal", "Normal", "High"]
                .into_iter()
                .map(|s| Value::Str(s.to_string()))
                .collect(),
        );
        assert_eq!(check.passes(&Value::Array(NdArray::vector(labels))), Ok(true));
        assert_eq!(check.passes(&Value::str_array(&["Normal", "High", "High"])), Ok(false));
    }

    #[test]
    fn validation_is_probed_twice() {
        let count = probes()
            .iter()
            .filter(|p| p.method == Method::ValidateOrderArray)
            .count();
        assert_eq!(count, 2);
    }
}
