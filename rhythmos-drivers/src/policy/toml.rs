//! Minimal TOML parser for policy documents
//!
//! Handles only the subset a policy document needs. It does NOT support
//! the full TOML spec.
//!
//! Supported features:
//! - `version = <integer>` at the document root
//! - `[[rule]]` array-of-tables sections
//! - `source`/`dest` quoted-string keys inside a rule
//! - Comments (# ...)
//!
//! Unknown keys are ignored. Any other section header is an error.

use rhythmos_core::label::Label;
use rhythmos_core::policy::{FlowRule, RulePolicy};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Section header other than `[[rule]]`
    InvalidSection,
    /// Value is not a quoted string / integer, or does not fit
    InvalidValue,
    /// A rule is missing `source` or `dest`
    MissingField,
    /// More rules than the policy table holds
    TooManyRules,
}

/// A `[[rule]]` section while its keys are being collected
#[derive(Default)]
struct PartialRule {
    source: Option<Label>,
    dest: Option<Label>,
}

impl PartialRule {
    fn finish(self) -> Result<FlowRule, ParseError> {
        match (self.source, self.dest) {
            (Some(source), Some(dest)) => Ok(FlowRule { source, dest }),
            _ => Err(ParseError::MissingField),
        }
    }
}

/// Parse a TOML policy document into a [`RulePolicy`]
pub fn parse_policy(input: &str) -> Result<RulePolicy, ParseError> {
    let mut policy = RulePolicy::new();
    let mut current: Option<PartialRule> = None;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            if line != "[[rule]]" {
                return Err(ParseError::InvalidSection);
            }
            flush(&mut current, &mut policy)?;
            current = Some(PartialRule::default());
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ParseError::InvalidValue)?;
        let key = key.trim();
        let value = value.trim();

        match (&mut current, key) {
            (None, "version") => {
                policy.version = value.parse().map_err(|_| ParseError::InvalidValue)?;
            }
            (Some(rule), "source") => {
                rule.source = Some(parse_label(value)?);
            }
            (Some(rule), "dest") => {
                rule.dest = Some(parse_label(value)?);
            }
            // Unknown keys are ignored
            _ => {}
        }
    }

    flush(&mut current, &mut policy)?;
    Ok(policy)
}

/// Close out the rule under construction, if any
fn flush(current: &mut Option<PartialRule>, policy: &mut RulePolicy) -> Result<(), ParseError> {
    if let Some(rule) = current.take() {
        let rule = rule.finish()?;
        policy.add(rule).map_err(|_| ParseError::TooManyRules)?;
    }
    Ok(())
}

/// Strip quotes from a string value and bound-check it as a label
fn parse_label(value: &str) -> Result<Label, ParseError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)?;
    Label::new(inner).ok_or(ParseError::InvalidValue)
}
