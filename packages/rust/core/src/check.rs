//! Lesson lint checks.
//!
//! Findings describe deviations from the lesson conventions. They are never
//! errors: an odd document still parses and indexes.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, instrument};

use lessondex_markdown::{KnowledgeCheck, LessonDocument};
use lessondex_shared::LessonsConfig;

use crate::indexer::CorpusIndex;

/// One convention violation in a lesson document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// No level-1 heading.
    MissingTitle,
    /// No section carries the Knowledge Check heading.
    MissingKnowledgeCheck,
    /// The Knowledge Check heading exists but holds no questions.
    EmptyKnowledgeCheck,
    /// Sections follow the Knowledge Check block.
    KnowledgeCheckNotLast,
    /// A question with no answer marker.
    UnansweredQuestion { number: u32 },
    /// `**Q<n>.**` answered by `**A<m>.**`.
    MismatchedAnswer { question: u32, answer: u32 },
    /// Question numbers skip or repeat.
    NumberingGap { expected: u32, found: u32 },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "no top-level `#` title"),
            Self::MissingKnowledgeCheck => write!(f, "no Knowledge Check section"),
            Self::EmptyKnowledgeCheck => write!(f, "Knowledge Check section has no questions"),
            Self::KnowledgeCheckNotLast => write!(f, "Knowledge Check is not the final section"),
            Self::UnansweredQuestion { number } => write!(f, "Q{number} has no answer"),
            Self::MismatchedAnswer { question, answer } => {
                write!(f, "Q{question} is answered by A{answer}")
            }
            Self::NumberingGap { expected, found } => {
                write!(f, "expected Q{expected}, found Q{found}")
            }
        }
    }
}

/// Findings for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
}

/// Check a single document against the lesson conventions.
///
/// Emptiness is judged on the Knowledge Check section alone; numbering is
/// checked across every pair in the document.
pub fn check_document(doc: &LessonDocument, lessons: &LessonsConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    if doc.title().is_none() {
        findings.push(Finding::MissingTitle);
    }

    let pairs = doc.knowledge_check().pairs();

    match doc.knowledge_check_section(&lessons.knowledge_check_heading) {
        None => findings.push(Finding::MissingKnowledgeCheck),
        Some(section) => {
            if KnowledgeCheck::new(&section.body).is_empty() {
                findings.push(Finding::EmptyKnowledgeCheck);
            }
            let is_last = doc
                .sections()
                .last()
                .is_some_and(|last| std::ptr::eq(last, section));
            if !is_last {
                findings.push(Finding::KnowledgeCheckNotLast);
            }
        }
    }

    let mut expected = 1u32;
    for pair in &pairs {
        if pair.number != expected {
            findings.push(Finding::NumberingGap {
                expected,
                found: pair.number,
            });
        }
        expected = pair.number.saturating_add(1);

        match pair.answer_number {
            None => findings.push(Finding::UnansweredQuestion {
                number: pair.number,
            }),
            Some(answer) if answer != pair.number => findings.push(Finding::MismatchedAnswer {
                question: pair.number,
                answer,
            }),
            Some(_) => {}
        }
    }

    findings
}

/// Check every document in the index; only documents with findings are reported.
#[instrument(skip_all, fields(documents = index.len()))]
pub fn check_index(index: &CorpusIndex, lessons: &LessonsConfig) -> Vec<DocumentReport> {
    let reports: Vec<DocumentReport> = index
        .documents()
        .iter()
        .filter_map(|doc| {
            let findings = check_document(doc, lessons);
            (!findings.is_empty()).then(|| DocumentReport {
                path: doc.path().to_path_buf(),
                findings,
            })
        })
        .collect();

    debug!(flagged = reports.len(), "lint complete");
    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Vec<Finding> {
        check_document(&LessonDocument::parse("t.md", text), &LessonsConfig::default())
    }

    #[test]
    fn well_formed_lesson_is_clean() {
        let text = "# Hooks\n\nBody.\n\n---\n\n## Knowledge Check\n\n**Q1.** a?\n\n**A1.** b.\n\n**Q2.** c?\n\n**A2.** d.\n";
        assert!(check(text).is_empty());
    }

    #[test]
    fn introduction_without_quiz() {
        let findings = check("# Welcome\n\nThis course covers React.\n");
        assert_eq!(findings, vec![Finding::MissingKnowledgeCheck]);
    }

    #[test]
    fn untitled_and_empty_check() {
        let findings = check("## Knowledge Check\n\nComing soon.\n");
        assert_eq!(
            findings,
            vec![Finding::MissingTitle, Finding::EmptyKnowledgeCheck]
        );
    }

    #[test]
    fn heading_match_is_case_insensitive() {
        let findings = check("# T\n\n## knowledge check\n\n**Q1.** a?\n**A1.** b.\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn knowledge_check_not_last() {
        let text = "# T\n\n## Knowledge Check\n\n**Q1.** a?\n**A1.** b.\n\n## Further Reading\n\nLinks.\n";
        assert_eq!(check(text), vec![Finding::KnowledgeCheckNotLast]);
    }

    #[test]
    fn numbering_problems() {
        let text = "# T\n\n## Knowledge Check\n\n**Q1.** a?\n\n**Q3.** b?\n**A4.** c.\n";
        assert_eq!(
            check(text),
            vec![
                Finding::UnansweredQuestion { number: 1 },
                Finding::NumberingGap {
                    expected: 2,
                    found: 3
                },
                Finding::MismatchedAnswer {
                    question: 3,
                    answer: 4
                },
            ]
        );
    }

    #[test]
    fn questions_outside_the_check_do_not_fill_it() {
        let text = "# T\n\n## Practice\n\n**Q1.** a?\n**A1.** b.\n\n## Knowledge Check\n\nTBD.\n";
        assert_eq!(check(text), vec![Finding::EmptyKnowledgeCheck]);
    }

    #[test]
    fn configurable_heading() {
        let lessons = LessonsConfig {
            knowledge_check_heading: "Quiz".into(),
        };
        let doc = LessonDocument::parse("q.md", "# T\n\n## Quiz\n\n**Q1.** a?\n**A1.** b.\n");
        assert!(check_document(&doc, &lessons).is_empty());
    }

    #[test]
    fn check_index_reports_only_flagged_documents() {
        let index = CorpusIndex::from_documents([
            LessonDocument::parse(
                "good.md",
                "# Good\n\n## Knowledge Check\n\n**Q1.** a?\n\n**A1.** b.\n",
            ),
            LessonDocument::parse("intro.md", "# Intro\n"),
        ]);
        let reports = check_index(&index, &LessonsConfig::default());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, PathBuf::from("intro.md"));
    }

    #[test]
    fn finding_display_and_json() {
        let finding = Finding::MismatchedAnswer {
            question: 2,
            answer: 3,
        };
        assert_eq!(finding.to_string(), "Q2 is answered by A3");

        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["kind"], "mismatched_answer");
        assert_eq!(json["question"], 2);
    }
}
