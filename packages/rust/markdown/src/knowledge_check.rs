//! Knowledge Check extraction.
//!
//! Questions are lines opening with a bold `**Q<N>.**` marker, answers with a
//! bold `**A<N>.**` marker. An answer runs until the next question marker or
//! the end of the document. Markers inside fenced code are plain text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::fence::{FenceState, trim_line_ending};

static QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}\*\*Q(\d+)\.\*\*(.*)$").expect("question marker regex")
});

static ANSWER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}\*\*A(\d+)\.\*\*(.*)$").expect("answer marker regex")
});

/// A thematic break (`---`, `***`, `___`), the usual separator between pairs.
static RULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$")
        .expect("thematic break regex")
});

/// One question/answer unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaPair {
    /// `N` from the `**Q<N>.**` marker.
    pub number: u32,
    pub question: String,
    /// Answer body, fenced code preserved verbatim. Empty when unanswered.
    pub answer: String,
    /// `N` from the `**A<N>.**` marker that opened the answer, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_number: Option<u32>,
}

impl QaPair {
    /// Whether the answer marker carries the question's number.
    pub fn is_well_numbered(&self) -> bool {
        self.answer_number == Some(self.number)
    }
}

/// The Q&A content of a document, extracted lazily.
///
/// Each call to [`KnowledgeCheck::iter`] starts a fresh scan from the top, so
/// the sequence can be walked any number of times.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeCheck<'a> {
    text: &'a str,
}

impl<'a> KnowledgeCheck<'a> {
    /// Wrap document text for extraction.
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Start a new scan over the pairs in document order.
    pub fn iter(&self) -> QaPairs<'a> {
        QaPairs {
            rest: self.text,
            fence: FenceState::default(),
        }
    }

    /// Collect every pair.
    pub fn pairs(&self) -> Vec<QaPair> {
        self.iter().collect()
    }

    /// Whether the document has no question markers at all.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> IntoIterator for &KnowledgeCheck<'a> {
    type Item = QaPair;
    type IntoIter = QaPairs<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over [`QaPair`]s, scanning the source one line at a time.
#[derive(Debug, Clone)]
pub struct QaPairs<'a> {
    rest: &'a str,
    fence: FenceState,
}

#[derive(Debug, Clone, Copy)]
enum Marker<'a> {
    Question(u32, &'a str),
    Answer(u32, &'a str),
}

impl<'a> QaPairs<'a> {
    /// Look at the next raw line (with its line ending) without consuming it.
    fn peek(&self) -> Option<(&'a str, Option<Marker<'a>>)> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self.rest.find('\n').map_or(self.rest.len(), |i| i + 1);
        let raw = &self.rest[..end];

        let marker = if self.fence.is_open() {
            None
        } else {
            parse_marker(trim_line_ending(raw))
        };
        Some((raw, marker))
    }

    /// Advance past `raw`; returns whether it was fenced content or a delimiter.
    fn consume(&mut self, raw: &'a str) -> bool {
        let fenced = self.fence.observe(trim_line_ending(raw));
        self.rest = &self.rest[raw.len()..];
        fenced
    }
}

impl Iterator for QaPairs<'_> {
    type Item = QaPair;

    fn next(&mut self) -> Option<QaPair> {
        // Skip prose and stray answers until a question opens.
        let (number, head) = loop {
            let (raw, marker) = self.peek()?;
            self.consume(raw);
            if let Some(Marker::Question(n, head)) = marker {
                break (n, head);
            }
        };

        let mut question = format!("{head}\n");
        let mut answer = String::new();
        let mut answer_number = None;

        while let Some((raw, marker)) = self.peek() {
            match marker {
                Some(Marker::Question(..)) => break,
                Some(Marker::Answer(n, head)) => {
                    self.consume(raw);
                    answer_number = Some(n);
                    answer.push_str(head);
                    answer.push('\n');
                    break;
                }
                None => {
                    self.consume(raw);
                    question.push_str(raw);
                }
            }
        }

        // End of the last line that is neither blank nor an unfenced rule.
        let mut content_end = answer.trim_end().len();
        if answer_number.is_some() {
            while let Some((raw, marker)) = self.peek() {
                if matches!(marker, Some(Marker::Question(..))) {
                    break;
                }
                let fenced = self.consume(raw);
                answer.push_str(raw);

                let line = trim_line_ending(raw);
                if fenced || !(line.trim().is_empty() || RULE_RE.is_match(line)) {
                    content_end = answer.len();
                }
            }
        }

        Some(QaPair {
            number,
            question: question.trim().to_string(),
            answer: answer[..content_end].trim().to_string(),
            answer_number,
        })
    }
}

fn parse_marker(line: &str) -> Option<Marker<'_>> {
    if let Some(caps) = QUESTION_RE.captures(line) {
        let n = caps[1].parse().ok()?;
        return Some(Marker::Question(n, caps.get(2).map_or("", |m| m.as_str())));
    }
    if let Some(caps) = ANSWER_RE.captures(line) {
        let n = caps[1].parse().ok()?;
        return Some(Marker::Answer(n, caps.get(2).map_or("", |m| m.as_str())));
    }
    None
}
