//! Turn remote failures into the single line shown in the status bar.

use crate::chain::RemoteFailure;

pub(crate) const TX_FAILED: &str = "Transaction failed";
pub(crate) const BURN_FAILED: &str =
    "An error occurred while trying to burn the token. Please try again.";
pub(crate) const OWNER_NOT_FOUND: &str = "Token ID not found or invalid";

/// Substitute a friendlier message when the failure reason mentions `marker`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReasonRule {
    pub marker: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum FailurePolicy {
    /// reason, then message, then `fallback`; `rules` are checked first.
    Chain {
        rules: &'static [ReasonRule],
        fallback: &'static str,
    },
    /// A matching rule's text, otherwise `otherwise`; remote text is never shown.
    Rules {
        rules: &'static [ReasonRule],
        otherwise: &'static str,
    },
    /// Always the same text regardless of what the remote reported.
    Fixed(&'static str),
}

impl FailurePolicy {
    pub(crate) const fn transaction() -> Self {
        FailurePolicy::Chain {
            rules: &[],
            fallback: TX_FAILED,
        }
    }

    pub(crate) const fn burn() -> Self {
        FailurePolicy::Rules {
            rules: BURN_RULES,
            otherwise: BURN_FAILED,
        }
    }
}

pub(crate) const BURN_RULES: &[ReasonRule] = &[ReasonRule {
    marker: "InvalidTokenId",
    message: "Invalid token ID. Please check and try again.",
}];

pub(crate) fn classify(failure: &RemoteFailure, policy: &FailurePolicy) -> String {
    let reason = non_empty(failure.reason.as_deref());
    match policy {
        FailurePolicy::Fixed(msg) => msg.to_string(),
        FailurePolicy::Rules { rules, otherwise } => {
            let text = matching_rule(reason, rules).unwrap_or(*otherwise);
            text.to_string()
        }
        FailurePolicy::Chain { rules, fallback } => {
            let reported = reason.or_else(|| non_empty(failure.message.as_deref()));
            let text = matching_rule(reason, rules).or(reported);
            text.unwrap_or(*fallback).to_string()
        }
    }
}

fn matching_rule(reason: Option<&str>, rules: &[ReasonRule]) -> Option<&'static str> {
    let reason = reason?;
    rules
        .iter()
        .find(|rule| reason.contains(rule.marker))
        .map(|rule| rule.message)
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}
