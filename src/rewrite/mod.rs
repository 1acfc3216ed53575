//! Text rewriting of load-test scripts and their declarations file
//!
//! Scripts are handled as two pure passes composed in sequence: [`strip`]
//! removes any header calls already present, then [`Rewriter::instrument`]
//! walks the remaining lines once, tracking transaction context and placing
//! a rendered call before every labelled web request.

pub mod context;
pub mod declarations;
pub mod render;
pub mod strip;

pub use context::{default_rules, LineRule, Observation, TransactionContext};
pub use declarations::{insert_helper, remove_helper, DeclarationsOutcome, DeclarationsUpdate};
pub use render::{HeaderCallSpec, HEADER_FUNCTION, PLACEHOLDER_TRANSACTION};
pub use strip::strip;

use std::fmt;

use clap::ValueEnum;

/// Direction of a rewrite pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Strip existing calls, then inject fresh ones and the helper
    #[value(name = "INSERT")]
    Insert,
    /// Strip injected calls and the helper
    #[value(name = "DELETE")]
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Insert => write!(f, "INSERT"),
            Action::Delete => write!(f, "DELETE"),
        }
    }
}

/// Split text into lines that keep their terminators
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Result of rewriting one script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRewrite {
    pub text: String,
    /// Header calls found and stripped
    pub removed: usize,
    /// Header calls injected
    pub inserted: usize,
}

/// Script and declarations rewriter
#[derive(Debug)]
pub struct Rewriter {
    rules: Vec<Box<dyn LineRule>>,
    placeholder: String,
}

impl Rewriter {
    /// Build a rewriter recognizing the given request calls
    pub fn new<S: AsRef<str>>(request_calls: &[S], placeholder: &str) -> Result<Self, regex::Error> {
        Ok(Self::with_rules(default_rules(request_calls)?, placeholder))
    }

    /// Build a rewriter from an explicit, ordered rule list
    pub fn with_rules(rules: Vec<Box<dyn LineRule>>, placeholder: &str) -> Self {
        Self {
            rules,
            placeholder: placeholder.to_string(),
        }
    }

    /// Inject a header call before every labelled request.
    ///
    /// Expects lines that have already been stripped. Every rule is
    /// evaluated against every line in order; a later rule sees the context
    /// left by earlier ones on the same line.
    pub fn instrument(&self, lines: &[&str], session_tag: &str) -> Vec<String> {
        let mut ctx = TransactionContext::new();
        let mut out = Vec::with_capacity(lines.len());

        for &line in lines {
            for rule in &self.rules {
                let Some(observation) = rule.observe(line) else {
                    continue;
                };
                tracing::trace!(rule = rule.name(), ?observation, "Line matched");

                if let Some(step) = ctx.apply(observation) {
                    let transaction = ctx.current().unwrap_or(self.placeholder.as_str());
                    let call = HeaderCallSpec::new(transaction, step, session_tag).render();
                    let nl = line_ending(line);
                    out.push(format!("{call}{nl}"));
                    out.push(nl.to_string());
                }
            }
            out.push(line.to_string());
        }

        out
    }

    /// Rewrite a script's full text for the given action
    pub fn rewrite_script(&self, text: &str, session_tag: &str, action: Action) -> ScriptRewrite {
        let lines = split_lines(text);
        let stripped = strip(&lines);
        let removed = lines.iter().filter(|l| render::is_header_call(l)).count();

        match action {
            Action::Delete => ScriptRewrite {
                text: stripped.concat(),
                removed,
                inserted: 0,
            },
            Action::Insert => {
                let instrumented = self.instrument(&stripped, session_tag);
                let inserted = instrumented
                    .iter()
                    .filter(|l| render::is_header_call(l))
                    .count();
                ScriptRewrite {
                    text: instrumented.concat(),
                    removed,
                    inserted,
                }
            }
        }
    }

    /// Rewrite a declarations file's full text for the given action
    pub fn rewrite_declarations(&self, text: &str, action: Action) -> DeclarationsUpdate {
        match action {
            Action::Insert => insert_helper(text),
            Action::Delete => remove_helper(text),
        }
    }
}
