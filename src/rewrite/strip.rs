//! Removal of previously injected header calls

use super::render::is_header_call;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StripState {
    Passing,
    Skipping,
}

/// Drop every injected header call together with the blank separator line
/// that follows it.
///
/// Lines keep their terminators, so a blank line is one that is empty after
/// trimming whitespace. Only the blank line immediately after a call is
/// consumed; any other line resets the state and is kept.
pub fn strip<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut out = Vec::with_capacity(lines.len());
    let mut state = StripState::Passing;

    for &line in lines {
        if is_header_call(line) {
            state = StripState::Skipping;
            continue;
        }

        if state == StripState::Skipping {
            state = StripState::Passing;
            if line.trim().is_empty() {
                continue;
            }
        }

        out.push(line);
    }

    out
}
