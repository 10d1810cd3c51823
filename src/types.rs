#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The methods a submission's analyzer class must expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Builds a floating-point array from a sequence of numbers.
    CreateOrderArray,
    /// Rejects empty arrays and arrays with negative amounts.
    ValidateOrderArray,
    /// Takes a fixed percentage off amounts at or above a threshold.
    ApplyDiscount,
    /// Renders each amount as a `$X.XX` string.
    FormatOrderAmounts,
    /// Returns `(sum, mean, max)`.
    ComputeOrderSummary,
    /// Labels every amount `Normal` or `High`.
    FlagHighValueOrders,
}

impl Method {
    /// Every method of the contract, in declaration order.
    pub const ALL: [Method; 6] = [
        Method::CreateOrderArray,
        Method::ValidateOrderArray,
        Method::ApplyDiscount,
        Method::FormatOrderAmounts,
        Method::ComputeOrderSummary,
        Method::FlagHighValueOrders,
    ];

    /// The exact, case-sensitive attribute name looked up on the instance.
    pub fn name(self) -> &'static str {
        match self {
            Method::CreateOrderArray => "create_order_array",
            Method::ValidateOrderArray => "validate_order_array",
            Method::ApplyDiscount => "apply_discount",
            Method::FormatOrderAmounts => "format_order_amounts",
            Method::ComputeOrderSummary => "compute_order_summary",
            Method::FlagHighValueOrders => "flag_high_value_orders",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a test case is shown to learners ahead of grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Published with the exercise.
    Visible,
    /// Only revealed in the report.
    Hidden,
}

impl Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Visible => write!(f, "Visible"),
            Visibility::Hidden => write!(f, "Hidden"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_match_the_contract() {
        let names: Vec<_> = Method::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            [
                "create_order_array",
                "validate_order_array",
                "apply_discount",
                "format_order_amounts",
                "compute_order_summary",
                "flag_high_value_orders",
            ]
        );
    }

    #[test]
    fn visibility_renders_as_tag() {
        assert_eq!(Visibility::Visible.to_string(), "Visible");
        assert_eq!(Visibility::Hidden.to_string(), "Hidden");
    }
}
