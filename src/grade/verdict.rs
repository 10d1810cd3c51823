#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use super::{Invocation, InvocationError};
use crate::{
    types::Visibility,
    value::{Value, compare::matches},
};

/// Why a case failed without a value comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The method failed a probe.
    RandomLogicFailure,
    /// The method's body is a placeholder.
    HardcodedStub,
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::RandomLogicFailure => write!(f, "Random logic failure"),
            FailureReason::HardcodedStub => write!(f, "Hardcoded/stub function"),
        }
    }
}

/// The outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Result matched.
    Pass,
    /// Failed on probe or stub evidence.
    Failed(FailureReason),
    /// Result did not match.
    Mismatch {
        /// `str()` of the expected value.
        expected: String,
        /// `str()` of what the analyzer returned.
        got:      String,
    },
    /// Construction, invocation or comparison raised.
    Crashed {
        /// The error text.
        message: String,
    },
}

impl Verdict {
    /// Whether the case passed.
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Renders the report line for a case.
    pub fn line(&self, visibility: Visibility, description: &str) -> String {
        match self {
            Verdict::Pass => format!("✅ {visibility} {description}"),
            Verdict::Failed(reason) => {
                format!("❌ {visibility} {description} failed | Reason: {reason}")
            }
            Verdict::Mismatch { expected, got } => {
                format!("❌ {visibility} {description} failed | Expected={expected}, Got={got}")
            }
            Verdict::Crashed { message } => {
                format!("❌ {visibility} {description} crashed | Error: {message}")
            }
        }
    }
}

/// Everything known about one test case once its method has been called.
#[derive(Debug)]
pub struct Evidence<'a> {
    /// What the call produced.
    pub outcome:      &'a Result<Invocation, InvocationError>,
    /// The method failed a probe.
    pub probe_failed: bool,
    /// The method is a stub.
    pub stub:         bool,
    /// The case's expected value.
    pub expected:     &'a Value,
}

/// A row of the decision table: yields a verdict if it applies.
type Rule = fn(&Evidence<'_>) -> Option<Verdict>;

/// Rows checked in order before falling through to value comparison. The
/// first row that applies decides the case.
const PRECEDENCE: [(&str, Rule); 3] = [
    ("invocation raised", invocation_raised),
    ("probe failed", probe_failed),
    ("stub detected", stub_detected),
];

/// The call itself raised.
fn invocation_raised(e: &Evidence<'_>) -> Option<Verdict> {
    e.outcome.as_ref().err().map(|err| Verdict::Crashed {
        message: err.to_string(),
    })
}

/// The method failed a probe.
fn probe_failed(e: &Evidence<'_>) -> Option<Verdict> {
    e.probe_failed
        .then_some(Verdict::Failed(FailureReason::RandomLogicFailure))
}

/// The method is a stub.
fn stub_detected(e: &Evidence<'_>) -> Option<Verdict> {
    e.stub
        .then_some(Verdict::Failed(FailureReason::HardcodedStub))
}

/// Reconciles the evidence for one case into a verdict.
pub fn decide(evidence: &Evidence<'_>) -> Verdict {
    if let Some((row, verdict)) = PRECEDENCE
        .iter()
        .find_map(|(row, rule)| rule(evidence).map(|v| (row, v)))
    {
        tracing::debug!("Decided by rule `{}`", row);
        return verdict;
    }

    match evidence.outcome {
        Ok(result) => compare(result, evidence.expected),
        Err(err) => Verdict::Crashed {
            message: err.to_string(),
        },
    }
}

/// Compares a result against the expected value.
fn compare(result: &Invocation, expected: &Value) -> Verdict {
    match matches(&result.value, expected) {
        Ok(true) => Verdict::Pass,
        Ok(false) => Verdict::Mismatch {
            expected: expected.to_string(),
            got:      result.rendered.clone(),
        },
        Err(e) => Verdict::Crashed {
            message: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bundles the signals for one case.
    fn evidence<'a>(
        outcome: &'a Result<Invocation, InvocationError>,
        expected: &'a Value,
        probe_failed: bool,
        stub: bool,
    ) -> Evidence<'a> {
        Evidence {
            outcome,
            probe_failed,
            stub,
            expected,
        }
    }

    #[test]
    fn crash_beats_everything() {
        let outcome = Err(InvocationError::Raised {
            exception: "ValueError".into(),
            message:   "bad input".into(),
        });
        let expected = Value::float_array(&[180.0]);
        let verdict = decide(&evidence(&outcome, &expected, true, true));
        assert_eq!(
            verdict.line(Visibility::Visible, "TC4: Apply Discount"),
            "❌ Visible TC4: Apply Discount crashed | Error: bad input"
        );
    }

    #[test]
    fn probe_failure_beats_stub_and_a_correct_value() {
        let outcome = Ok(Invocation::new(Value::float_array(&[180.0])));
        let expected = Value::float_array(&[180.0]);
        let verdict = decide(&evidence(&outcome, &expected, true, true));
        assert_eq!(verdict, Verdict::Failed(FailureReason::RandomLogicFailure));
        assert_eq!(
            verdict.line(Visibility::Hidden, "TC8: Discount on $200"),
            "❌ Hidden TC8: Discount on $200 failed | Reason: Random logic failure"
        );
    }

    #[test]
    fn stub_beats_a_coincidentally_correct_value() {
        let outcome = Ok(Invocation::new(Value::Bool(false)));
        let expected = Value::Bool(false);
        let verdict = decide(&evidence(&outcome, &expected, false, true));
        assert_eq!(
            verdict.line(Visibility::Visible, "TC2: Validate Negative"),
            "❌ Visible TC2: Validate Negative failed | Reason: Hardcoded/stub function"
        );
    }

    #[test]
    fn mismatch_shows_both_values() {
        let outcome = Ok(Invocation::new(Value::float_array(&[200.0])));
        let expected = Value::float_array(&[180.0]);
        let verdict = decide(&evidence(&outcome, &expected, false, false));
        assert_eq!(
            verdict.line(Visibility::Visible, "TC8: Discount on $200"),
            "❌ Visible TC8: Discount on $200 failed | Expected=[180.], Got=[200.]"
        );
    }

    #[test]
    fn uncomparable_result_is_a_crash() {
        let outcome = Ok(Invocation::new(Value::float_list(&[180.0])));
        let expected = Value::float_array(&[180.0]);
        let verdict = decide(&evidence(&outcome, &expected, false, false));
        assert_eq!(
            verdict,
            Verdict::Crashed {
                message: "'list' object has no attribute 'dtype'".into(),
            }
        );
    }

    #[test]
    fn matching_value_passes() {
        let outcome = Ok(Invocation::new(Value::str_array(&["Normal", "High", "Normal"])));
        let expected = Value::str_array(&["Normal", "High", "Normal"]);
        let verdict = decide(&evidence(&outcome, &expected, false, false));
        assert!(verdict.passed());
        assert_eq!(
            verdict.line(Visibility::Visible, "TC5: Flag High Orders"),
            "✅ Visible TC5: Flag High Orders"
        );
    }
}
