//! Fenced code block tracking.
//!
//! Headings and Q/A markers are only recognised outside fences, so both the
//! parser and the extractor feed lines through a [`FenceState`].

/// Tracks whether the current line sits inside a ``` or ~~~ fence.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FenceState {
    open: Option<(char, usize)>,
}

impl FenceState {
    /// Whether a fence is currently open.
    pub(crate) fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line (without its line ending).
    ///
    /// Returns `true` when the line is fenced content or a fence delimiter.
    pub(crate) fn observe(&mut self, line: &str) -> bool {
        let run = strip_indent(line).and_then(fence_run);

        match (self.open, run) {
            (Some((ch, len)), Some((c, n, rest))) => {
                if c == ch && n >= len && rest.trim().is_empty() {
                    self.open = None;
                }
                true
            }
            (Some(_), None) => true,
            (None, Some((c, n, rest))) => {
                // Backtick fences cannot carry backticks in their info string.
                if c == '`' && rest.contains('`') {
                    return false;
                }
                self.open = Some((c, n));
                true
            }
            (None, None) => false,
        }
    }
}

/// Strip up to three leading spaces. Four or more means indented code.
pub(crate) fn strip_indent(line: &str) -> Option<&str> {
    let spaces = line.len() - line.trim_start_matches(' ').len();
    (spaces <= 3).then(|| &line[spaces..])
}

/// Remove a trailing `\n` or `\r\n`.
pub(crate) fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Parse a fence opener: returns the fence char, run length and the rest.
fn fence_run(s: &str) -> Option<(char, usize, &str)> {
    let c = s.chars().next()?;
    if c != '`' && c != '~' {
        return None;
    }
    let n = s.len() - s.trim_start_matches(c).len();
    (n >= 3).then(|| (c, n, &s[n..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtick_fence_opens_and_closes() {
        let mut f = FenceState::default();
        assert!(!f.observe("text"));
        assert!(f.observe("```jsx"));
        assert!(f.observe("# inside"));
        assert!(f.observe("```"));
        assert!(!f.is_open());
        assert!(!f.observe("# outside"));
    }

    #[test]
    fn closing_fence_must_match_char_and_length() {
        let mut f = FenceState::default();
        f.observe("````");
        f.observe("```");
        assert!(f.is_open(), "shorter run must not close");
        f.observe("~~~~");
        assert!(f.is_open(), "different char must not close");
        f.observe("`````");
        assert!(!f.is_open());
    }

    #[test]
    fn inline_backticks_are_not_a_fence() {
        let mut f = FenceState::default();
        assert!(!f.observe("```inline``` code"));
        assert!(!f.is_open());
    }

    #[test]
    fn indented_four_spaces_is_not_a_fence() {
        let mut f = FenceState::default();
        assert!(!f.observe("    ```"));
        assert!(f.observe("   ~~~"));
    }

    #[test]
    fn trim_line_ending_handles_crlf() {
        assert_eq!(trim_line_ending("abc\r\n"), "abc");
        assert_eq!(trim_line_ending("abc\n"), "abc");
        assert_eq!(trim_line_ending("abc"), "abc");
    }
}
