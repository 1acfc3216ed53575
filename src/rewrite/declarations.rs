//! Insertion and removal of the helper definition in a declarations file

use super::render::{helper_definition, HELPER_SIGNATURE};

/// Closing include-guard marker the helper is placed in front of
pub const GUARD_END: &str = "#endif";

/// What happened to a declarations file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationsOutcome {
    /// The helper was spliced in before the guard marker
    Inserted,
    /// One or more helper definitions were removed
    Removed,
    /// Nothing to do: already present on insert, or absent on delete
    Unchanged,
    /// No `#endif` where one was needed; the text is left as is
    MissingGuard,
}

/// Updated declarations text and how it was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationsUpdate {
    pub text: String,
    pub outcome: DeclarationsOutcome,
}

impl DeclarationsUpdate {
    fn unchanged(text: &str, outcome: DeclarationsOutcome) -> Self {
        Self {
            text: text.to_string(),
            outcome,
        }
    }
}

/// The terminator most lines use; ties go to `\n`
fn newline_of(text: &str) -> &'static str {
    let crlf = text.matches("\r\n").count();
    let lf = text.matches('\n').count() - crlf;
    if crlf > lf {
        "\r\n"
    } else {
        "\n"
    }
}

/// Whether the helper definition is present
pub fn has_helper(text: &str) -> bool {
    text.contains(HELPER_SIGNATURE)
}

/// Splice the helper definition in front of the first `#endif`.
///
/// The block written is `<nl><definition><nl>`, so [`remove_helper`] can take
/// it out again without leaving extra blank lines behind.
pub fn insert_helper(text: &str) -> DeclarationsUpdate {
    if has_helper(text) {
        return DeclarationsUpdate::unchanged(text, DeclarationsOutcome::Unchanged);
    }

    let Some(guard) = text.find(GUARD_END) else {
        return DeclarationsUpdate::unchanged(text, DeclarationsOutcome::MissingGuard);
    };

    let nl = newline_of(text);
    let definition = helper_definition(nl);
    let mut out = String::with_capacity(text.len() + definition.len() + 2 * nl.len());
    out.push_str(&text[..guard]);
    out.push_str(nl);
    out.push_str(&definition);
    out.push_str(nl);
    out.push_str(&text[guard..]);

    DeclarationsUpdate {
        text: out,
        outcome: DeclarationsOutcome::Inserted,
    }
}

/// Remove every helper definition, from the newline before it through to the
/// next `#endif`, keeping the marker itself.
pub fn remove_helper(text: &str) -> DeclarationsUpdate {
    let mut current = text.to_string();
    let mut removed = false;

    while let Some(start) = current.find(HELPER_SIGNATURE) {
        let Some(offset) = current[start..].find(GUARD_END) else {
            break;
        };
        let end = start + offset;

        let head = &current[..start];
        let cut = head
            .strip_suffix("\r\n")
            .or_else(|| head.strip_suffix('\n'))
            .map_or(start, str::len);

        current = format!("{}{}", &current[..cut], &current[end..]);
        removed = true;
    }

    let outcome = if removed {
        DeclarationsOutcome::Removed
    } else if has_helper(&current) {
        DeclarationsOutcome::MissingGuard
    } else {
        DeclarationsOutcome::Unchanged
    };

    DeclarationsUpdate {
        text: current,
        outcome,
    }
}
