#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use super::{
    Analyzer,
    probes::ProbeFailureSet,
    report::Report,
    verdict::{Evidence, Verdict, decide},
};
use crate::{
    python::inspect::StubFunctionSet,
    types::{Method, Visibility},
    value::Value,
};

/// One graded test case.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// Shown to learners or not.
    pub visibility:  Visibility,
    /// `TCn: ...` label.
    pub description: &'static str,
    /// Method under test.
    pub method:      Method,
    /// The single argument passed.
    pub input:       Value,
    /// What a correct implementation returns.
    pub expected:    Value,
}

/// The fixed test matrix, TC1 through TC8, in report order.
pub fn test_matrix() -> Vec<TestCase> {
    use Visibility::{Hidden, Visible};

    let amounts = [120.5, 250.0, 75.3, 99.99];
    vec![
        TestCase {
            visibility:  Visible,
            description: "TC1: Create Order Array",
            method:      Method::CreateOrderArray,
            input:       Value::float_list(&amounts),
            expected:    Value::float_array(&amounts),
        },
        TestCase {
            visibility:  Visible,
            description: "TC2: Validate Negative",
            method:      Method::ValidateOrderArray,
            input:       Value::int_array(&[100, -50, 200]),
            expected:    Value::Bool(false),
        },
        TestCase {
            visibility:  Visible,
            description: "TC3: Compute Summary",
            method:      Method::ComputeOrderSummary,
            input:       Value::float_array(&amounts),
            expected:    Value::float_tuple(&[545.79, 136.4475, 250.0]),
        },
        TestCase {
            visibility:  Visible,
            description: "TC4: Apply Discount",
            method:      Method::ApplyDiscount,
            input:       Value::int_array(&[100, 200, 300]),
            expected:    Value::float_array(&[100.0, 180.0, 270.0]),
        },
        TestCase {
            visibility:  Visible,
            description: "TC5: Flag High Orders",
            method:      Method::FlagHighValueOrders,
            input:       Value::int_array(&[100, 200, 50]),
            expected:    Value::str_array(&["Normal", "High", "Normal"]),
        },
        TestCase {
            visibility:  Hidden,
            description: "TC6: Format Currency",
            method:      Method::FormatOrderAmounts,
            input:       Value::float_array(&[100.0, 250.5]),
            expected:    Value::str_array(&["$100.00", "$250.50"]),
        },
        TestCase {
            visibility:  Hidden,
            description: "TC7: Validate Empty",
            method:      Method::ValidateOrderArray,
            input:       Value::float_array(&[]),
            expected:    Value::Bool(false),
        },
        TestCase {
            visibility:  Hidden,
            description: "TC8: Discount on $200",
            method:      Method::ApplyDiscount,
            input:       Value::float_array(&[200.0]),
            expected:    Value::float_array(&[180.0]),
        },
    ]
}

/// Runs one case on a fresh instance and decides its verdict.
pub async fn run_case<A: Analyzer>(
    analyzer: &mut A,
    case: &TestCase,
    probe_failures: &ProbeFailureSet,
    stubs: &StubFunctionSet,
) -> Verdict {
    let outcome = match analyzer.construct().await {
        Ok(instance) => {
            let outcome = analyzer.invoke(&instance, case.method, &case.input).await;
            analyzer.release(instance).await;
            outcome
        }
        Err(e) => Err(e),
    };

    decide(&Evidence {
        outcome:      &outcome,
        probe_failed: probe_failures.contains(&case.method),
        stub:         stubs.contains(case.method.name()),
        expected:     &case.expected,
    })
}

/// Runs every case in order, pushing each line onto `report` as soon as its
/// verdict is known.
pub async fn run_matrix<A: Analyzer>(
    analyzer: &mut A,
    probe_failures: &ProbeFailureSet,
    stubs: &StubFunctionSet,
    report: &mut Report,
) -> Vec<Verdict> {
    let mut verdicts = Vec::new();
    for case in test_matrix() {
        let verdict = run_case(analyzer, &case, probe_failures, stubs).await;
        report.push(verdict.line(case.visibility, case.description));
        verdicts.push(verdict);
    }

    tracing::info!(
        "{} of {} cases passed",
        verdicts.iter().filter(|v| v.passed()).count(),
        verdicts.len()
    );
    verdicts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_is_numbered_in_order() {
        let matrix = test_matrix();
        assert_eq!(matrix.len(), 8);
        for (i, case) in matrix.iter().enumerate() {
            assert!(
                case.description.starts_with(&format!("TC{}: ", i + 1)),
                "{} out of order",
                case.description
            );
        }
    }

    #[test]
    fn visible_cases_come_first() {
        let tags: Vec<_> = test_matrix().iter().map(|c| c.visibility).collect();
        assert_eq!(&tags[..5], &[Visibility::Visible; 5]);
        assert_eq!(&tags[5..], &[Visibility::Hidden; 3]);
    }

    #[test]
    fn expected_values_render_like_numpy() {
        let rendered: Vec<String> = test_matrix().iter().map(|c| c.expected.to_string()).collect();
        assert_eq!(
            rendered,
            [
                "[120.5  250.    75.3   99.99]",
                "False",
                "(545.79, 136.4475, 250.0)",
                "[100. 180. 270.]",
                "['Normal' 'High' 'Normal']",
                "['$100.00' '$250.50']",
                "False",
                "[180.]",
            ]
        );
    }
}
