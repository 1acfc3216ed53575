//! Transaction context tracking and the line rules that feed it
//!
//! Each rule recognizes one line shape and reports what it saw as an
//! [`Observation`]. The rules are independent of each other; ordering and
//! state live in [`TransactionContext`] and the rewriter that drives it.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

/// Something a rule recognized on a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// A transaction named by a format-string pattern
    DynamicTransaction(String),
    /// A literal string assigned to a bare identifier
    Binding { name: String, value: String },
    /// A transaction start whose raw argument still needs resolving
    TransactionStart(String),
    /// A web request labelled with the given step name
    Request { step: String },
}

/// A matcher for one recognized line shape
pub trait LineRule: fmt::Debug + Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Inspect a line and report what it holds, if anything
    fn observe(&self, line: &str) -> Option<Observation>;
}

/// `lr_eval_string(lr_param_sprintf("pattern", ...))`
///
/// The pattern is used verbatim as the transaction name; parameters are
/// runtime values and are never substituted.
#[derive(Debug, Clone)]
pub struct DynamicTransactionRule {
    pattern: Regex,
}

impl DynamicTransactionRule {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(
                r#"lr_eval_string\s*\(\s*lr_param_sprintf\s*\(\s*"([^"]+)""#,
            )?,
        })
    }
}

impl LineRule for DynamicTransactionRule {
    fn name(&self) -> &'static str {
        "dynamic-transaction"
    }

    fn observe(&self, line: &str) -> Option<Observation> {
        self.pattern
            .captures(line)
            .map(|caps| Observation::DynamicTransaction(caps[1].to_string()))
    }
}

/// `name = "literal";`
#[derive(Debug, Clone)]
pub struct VariableBindingRule {
    pattern: Regex,
}

impl VariableBindingRule {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r#"\b([A-Za-z_]\w*)\s*=\s*"([^"]+)"\s*;"#)?,
        })
    }
}

impl LineRule for VariableBindingRule {
    fn name(&self) -> &'static str {
        "variable-binding"
    }

    fn observe(&self, line: &str) -> Option<Observation> {
        self.pattern.captures(line).map(|caps| Observation::Binding {
            name: caps[1].to_string(),
            value: caps[2].to_string(),
        })
    }
}

/// `lr_start_transaction(arg);` where `arg` is a literal or an identifier.
/// A quoted literal may contain parentheses.
#[derive(Debug, Clone)]
pub struct TransactionStartRule {
    pattern: Regex,
}

impl TransactionStartRule {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(
                r#"\blr_start_transaction\s*\(\s*("(?:[^"\\]|\\.)*"|[^)]+?)\s*\)\s*;"#,
            )?,
        })
    }
}

impl LineRule for TransactionStartRule {
    fn name(&self) -> &'static str {
        "transaction-start"
    }

    fn observe(&self, line: &str) -> Option<Observation> {
        self.pattern
            .captures(line)
            .map(|caps| Observation::TransactionStart(caps[1].to_string()))
    }
}

/// A call to one of the configured request functions, labelled by the first
/// non-empty double-quoted literal on the line. Escapes inside a literal are
/// kept as written.
#[derive(Debug, Clone)]
pub struct WebRequestRule {
    calls: Option<Regex>,
    literal: Regex,
}

impl WebRequestRule {
    pub fn new<S: AsRef<str>>(call_names: &[S]) -> Result<Self, regex::Error> {
        let alternatives = call_names
            .iter()
            .map(|name| regex::escape(name.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        // An empty list must match nothing rather than every line.
        let calls = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"\b(?:{})\b", alternatives))?)
        };

        Ok(Self {
            calls,
            literal: Regex::new(r#""((?:[^"\\]|\\.)*)""#)?,
        })
    }

    /// Whether the line names a request call, labelled or not
    pub fn is_request(&self, line: &str) -> bool {
        self.calls.as_ref().is_some_and(|re| re.is_match(line))
    }
}

impl LineRule for WebRequestRule {
    fn name(&self) -> &'static str {
        "web-request"
    }

    fn observe(&self, line: &str) -> Option<Observation> {
        if !self.is_request(line) {
            return None;
        }
        self.literal
            .captures_iter(line)
            .map(|caps| caps[1].to_string())
            .find(|step| !step.is_empty())
            .map(|step| Observation::Request { step })
    }
}

/// Build the default rule list in evaluation order
pub fn default_rules<S: AsRef<str>>(
    request_calls: &[S],
) -> Result<Vec<Box<dyn LineRule>>, regex::Error> {
    Ok(vec![
        Box::new(DynamicTransactionRule::new()?),
        Box::new(VariableBindingRule::new()?),
        Box::new(TransactionStartRule::new()?),
        Box::new(WebRequestRule::new(request_calls)?),
    ])
}

/// Transaction state threaded through one file's forward scan
#[derive(Debug, Clone, Default)]
pub struct TransactionContext {
    current: Option<String>,
    variables: HashMap<String, String>,
}

impl TransactionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the transaction in effect, if one has started
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Literal bound to an identifier earlier in the file
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Resolve a transaction-start argument.
    ///
    /// Bound identifiers resolve to their literal. Anything else is used as
    /// written with surrounding quotes removed, which covers both quoted
    /// literals and unbound identifiers.
    pub fn resolve(&self, token: &str) -> String {
        let token = token.trim();
        match self.variables.get(token) {
            Some(value) => value.clone(),
            None => token.trim_matches('"').to_string(),
        }
    }

    /// Fold an observation into the context.
    ///
    /// Returns the step name when the observation is a labelled request.
    pub fn apply(&mut self, observation: Observation) -> Option<String> {
        match observation {
            Observation::DynamicTransaction(name) => {
                self.current = Some(name);
                None
            }
            Observation::Binding { name, value } => {
                self.variables.insert(name, value);
                None
            }
            Observation::TransactionStart(token) => {
                self.current = Some(self.resolve(&token));
                None
            }
            Observation::Request { step } => Some(step),
        }
    }
}
