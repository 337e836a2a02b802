//! Heading-delimited section parser.
//!
//! Splits a Markdown document on ATX headings (`#` … `######`). Lines inside
//! fenced code blocks are never headings. Section bodies are exact slices of
//! the input, so concatenating them gives back the document minus its
//! heading lines.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::fence::{FenceState, trim_line_ending};

/// Matches an ATX heading: up to three spaces, 1–6 `#`, then whitespace or EOL.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*))?$").expect("heading regex")
});

/// A heading-delimited block of a lesson document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Heading depth (1–6). `0` for text before the first heading.
    pub level: u8,
    /// Heading text without the `#` markers. Empty for the preamble.
    pub heading: String,
    /// Raw body text up to the next heading, code fences included verbatim.
    pub body: String,
    /// 1-based source line of the heading (1 for the preamble).
    pub line: usize,
}

impl Section {
    /// Whether this is the headless block before the first heading.
    pub fn is_preamble(&self) -> bool {
        self.level == 0
    }
}

/// Split document text into its ordered sections.
///
/// Text before the first heading becomes a level-0 section with an empty
/// heading when it is non-empty. A document without headings therefore
/// yields exactly one such section; empty input yields none.
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut fence = FenceState::default();
    let mut open: Option<(u8, String, usize)> = None;
    let mut body_start = 0;
    let mut offset = 0;

    for (idx, raw) in text.split_inclusive('\n').enumerate() {
        let line = trim_line_ending(raw);

        if !fence.observe(line) {
            if let Some((level, heading)) = parse_heading(line) {
                push_section(&mut sections, open.take(), &text[body_start..offset]);
                open = Some((level, heading, idx + 1));
                body_start = offset + raw.len();
            }
        }

        offset += raw.len();
    }

    push_section(&mut sections, open, &text[body_start..]);
    sections
}

/// Close the currently open section (or the preamble) with `body`.
fn push_section(sections: &mut Vec<Section>, open: Option<(u8, String, usize)>, body: &str) {
    match open {
        Some((level, heading, line)) => sections.push(Section {
            level,
            heading,
            body: body.to_string(),
            line,
        }),
        None if !body.is_empty() => sections.push(Section {
            level: 0,
            heading: String::new(),
            body: body.to_string(),
            line: 1,
        }),
        None => {}
    }
}

/// Parse one line as an ATX heading, returning its level and text.
pub(crate) fn parse_heading(line: &str) -> Option<(u8, String)> {
    let caps = HEADING_RE.captures(line)?;
    let level = caps[1].len() as u8;
    let text = caps.get(2).map_or("", |m| m.as_str());
    Some((level, strip_closing_hashes(text).to_string()))
}

/// Drop an optional closing `#` run (`## Title ##` → `Title`).
fn strip_closing_hashes(text: &str) -> &str {
    let trimmed = text.trim();
    let without = trimmed.trim_end_matches('#');

    if without.len() == trimmed.len() {
        trimmed
    } else if without.is_empty() {
        ""
    } else if without.ends_with([' ', '\t']) {
        without.trim_end()
    } else {
        // `C#` keeps its hash.
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_heading_lines(text: &str) -> String {
        let mut fence = FenceState::default();
        text.split_inclusive('\n')
            .filter(|raw| {
                let line = trim_line_ending(raw);
                fence.observe(line) || parse_heading(line).is_none()
            })
            .collect()
    }

    #[test]
    fn splits_on_headings_preserving_depth() {
        let text = "# Title\n\nIntro.\n\n## Setup\n\nSteps.\n\n### Detail\n\nMore.\n";
        let sections = parse_sections(text);

        let outline: Vec<(u8, &str)> = sections
            .iter()
            .map(|s| (s.level, s.heading.as_str()))
            .collect();
        assert_eq!(outline, vec![(1, "Title"), (2, "Setup"), (3, "Detail")]);
        assert_eq!(sections[0].body, "\nIntro.\n\n");
        assert_eq!(sections[2].body, "\nMore.\n");
        assert_eq!(sections[1].line, 5);
    }

    #[test]
    fn headings_inside_fences_are_body_text() {
        let text = "# Shell\n\n```bash\n# install deps\nnpm i\n```\n";
        let sections = parse_sections(text);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].body.contains("# install deps"));
    }

    #[test]
    fn no_headings_degrades_to_single_preamble() {
        let text = "just some prose\nwith **bold** text\n";
        let sections = parse_sections(text);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].is_preamble());
        assert_eq!(sections[0].heading, "");
        assert_eq!(sections[0].body, text);
    }

    #[test]
    fn preamble_before_first_heading() {
        let sections = parse_sections("<!-- draft -->\n# Title\nBody\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].level, 0);
        assert_eq!(sections[0].body, "<!-- draft -->\n");
        assert_eq!(sections[1].heading, "Title");
    }

    #[test]
    fn empty_input_has_no_sections() {
        assert!(parse_sections("").is_empty());
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        let sections = parse_sections("#hashtag\n####### seven\n");
        assert_eq!(sections.len(), 1);
        assert!(sections[0].is_preamble());
    }

    #[test]
    fn empty_heading_and_closing_hashes() {
        assert_eq!(parse_heading("##"), Some((2, String::new())));
        assert_eq!(parse_heading("## Title ##"), Some((2, "Title".into())));
        assert_eq!(parse_heading("# Learn C#"), Some((1, "Learn C#".into())));
        assert_eq!(parse_heading("    # indented code"), None);
    }

    #[test]
    fn crlf_line_endings() {
        let text = "# Title\r\nBody\r\n## Next\r\nMore\r\n";
        let sections = parse_sections(text);
        assert_eq!(sections[0].heading, "Title");
        assert_eq!(sections[0].body, "Body\r\n");
        assert_eq!(sections[1].heading, "Next");
    }

    #[test]
    fn bodies_reconstruct_text_minus_headings() {
        let text = "preface\n# A\none\n```\n# not heading\n```\n## B\n\ntwo\n### C";
        let joined: String = parse_sections(text).iter().map(|s| s.body.as_str()).collect();
        assert_eq!(joined, strip_heading_lines(text));
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = "# T\n\nbody\n\n## Knowledge Check\n\n**Q1.** a?\n\n**A1.** b.\n";
        assert_eq!(parse_sections(text), parse_sections(text));
    }
}
