//! Flow policy types
//!
//! The decision of whether a labeled value may flow to a labeled output
//! belongs to the policy collaborator, reached through the [`FlowPolicy`]
//! trait. [`RulePolicy`] is the shipped implementation: a bounded table
//! of permitted source-to-destination transitions loaded from a policy
//! document at peripheral construction.

use heapless::Vec;

use crate::label::Label;

/// Maximum number of rules in a policy document
pub const MAX_RULES: usize = 16;

/// Current policy document version
pub const POLICY_VERSION: u8 = 1;

/// Label matching any source or destination in a rule
pub const ANY_LABEL: &str = "*";

/// Decides whether a label transition is permitted
///
/// Evaluation runs before the labeled payload is extracted; a negative
/// answer is a hard denial, never a warning.
pub trait FlowPolicy {
    /// Check whether a value labeled `source` may flow to `dest`
    fn can_flow(&self, source: &Label, dest: &Label) -> bool;
}

/// One permitted source-to-destination transition
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowRule {
    /// Source label, or `"*"` for any
    pub source: Label,
    /// Destination label, or `"*"` for any
    pub dest: Label,
}

impl FlowRule {
    fn matches(&self, source: &Label, dest: &Label) -> bool {
        let source_ok = self.source.as_str() == ANY_LABEL || &self.source == source;
        let dest_ok = self.dest.as_str() == ANY_LABEL || &self.dest == dest;
        source_ok && dest_ok
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FlowRule {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} -> {}", self.source, self.dest);
    }
}

/// Table-backed flow policy
///
/// A transition is permitted iff some rule matches it; the empty table
/// denies every labeled flow.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RulePolicy {
    /// Document version, checked by the loader
    pub version: u8,
    rules: Vec<FlowRule, MAX_RULES>,
}

impl Default for RulePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RulePolicy {
    /// Create an empty (deny-all) policy at the current version
    pub fn new() -> Self {
        Self {
            version: POLICY_VERSION,
            rules: Vec::new(),
        }
    }

    /// Add a rule, returning it back if the table is full
    pub fn add(&mut self, rule: FlowRule) -> Result<(), FlowRule> {
        self.rules.push(rule)
    }

    /// Number of rules in the table
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FlowPolicy for RulePolicy {
    fn can_flow(&self, source: &Label, dest: &Label) -> bool {
        self.rules.iter().any(|rule| rule.matches(source, dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(source: &str, dest: &str) -> FlowRule {
        FlowRule {
            source: Label::new(source).unwrap(),
            dest: Label::new(dest).unwrap(),
        }
    }

    #[test]
    fn test_empty_policy_denies() {
        let policy = RulePolicy::new();
        let source = Label::new("sensor").unwrap();
        let dest = Label::for_gpio(18);

        assert!(!policy.can_flow(&source, &dest));
    }

    #[test]
    fn test_exact_rule_permits() {
        let mut policy = RulePolicy::new();
        policy.add(rule("sensor", "pin-18")).unwrap();

        let source = Label::new("sensor").unwrap();
        assert!(policy.can_flow(&source, &Label::for_gpio(18)));
        assert!(!policy.can_flow(&source, &Label::for_gpio(12)));

        let other = Label::new("untrusted").unwrap();
        assert!(!policy.can_flow(&other, &Label::for_gpio(18)));
    }

    #[test]
    fn test_wildcard_source() {
        let mut policy = RulePolicy::new();
        policy.add(rule("*", "pin-12")).unwrap();

        let source = Label::new("anything").unwrap();
        assert!(policy.can_flow(&source, &Label::for_gpio(12)));
        assert!(!policy.can_flow(&source, &Label::for_gpio(18)));
    }

    #[test]
    fn test_wildcard_dest() {
        let mut policy = RulePolicy::new();
        policy.add(rule("trusted", "*")).unwrap();

        let trusted = Label::new("trusted").unwrap();
        let untrusted = Label::new("untrusted").unwrap();
        assert!(policy.can_flow(&trusted, &Label::for_gpio(13)));
        assert!(!policy.can_flow(&untrusted, &Label::for_gpio(13)));
    }

    #[test]
    fn test_table_capacity() {
        use core::fmt::Write;

        let mut policy = RulePolicy::new();
        for i in 0..MAX_RULES {
            let mut source = heapless::String::<32>::new();
            write!(source, "src-{}", i).unwrap();
            policy.add(rule(source.as_str(), "pin-18")).unwrap();
        }

        let overflow = policy.add(rule("one-too-many", "pin-18"));
        assert!(overflow.is_err());
        assert_eq!(policy.len(), MAX_RULES);
    }
}
