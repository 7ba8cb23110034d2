//! TOML lesson catalogs.
//!
//! A catalog holds topics and their lessons (content plus assessment) and
//! backs the offline mode and test fixtures. Files look like:
//!
//! ```toml
//! [[topics]]
//! id = "finance"
//! name = "Personal Finance"
//!
//! [[lessons]]
//! id = "fin-1"
//! topic = "finance"
//! title = "Budgeting"
//! xp = 20
//! difficulty = "easy"
//! order = 1
//!
//! [[lessons.content]]
//! type = "paragraph"
//! text = "Track every expense."
//!
//! [lessons.assessment]
//! passing_score = 0.7
//!
//! [[lessons.assessment.questions]]
//! id = "q1"
//! question = "What comes first?"
//! options = [{ id = "a", text = "Spending" }, { id = "b", text = "Tracking" }]
//! correct = "b"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    AnswerOption, Assessment, AssessmentQuestion, ContentBlock, Difficulty, Lesson, QuizBlock,
    Topic,
};

#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    #[serde(default)]
    topics: Vec<TomlTopic>,
    #[serde(default)]
    lessons: Vec<TomlLesson>,
}

#[derive(Debug, Deserialize)]
struct TomlTopic {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlLesson {
    id: String,
    topic: String,
    title: String,
    #[serde(default = "default_xp")]
    xp: u32,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    order: u32,
    #[serde(default)]
    content: Vec<TomlContent>,
    #[serde(default)]
    assessment: Option<TomlAssessment>,
}

fn default_xp() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TomlContent {
    Paragraph {
        text: String,
    },
    Image {
        url: String,
    },
    Quiz {
        question: String,
        #[serde(default)]
        options: Vec<TomlOption>,
        #[serde(default)]
        correct: Option<String>,
        #[serde(default)]
        explanation: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct TomlAssessment {
    #[serde(default = "default_passing_score")]
    passing_score: f64,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

fn default_passing_score() -> f64 {
    0.7
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    question: String,
    #[serde(default = "default_quiz_type")]
    quiz_type: String,
    options: Vec<TomlOption>,
    correct: String,
}

fn default_quiz_type() -> String {
    "mcq".to_string()
}

/// Topics and their lessons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub topics: Vec<Topic>,
    /// Every lesson carries its `topic_id`.
    pub lessons: Vec<Lesson>,
}

impl Catalog {
    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    /// Lessons of a topic sorted by their order key.
    pub fn lessons_for(&self, topic_id: &str) -> Vec<Lesson> {
        let mut lessons: Vec<Lesson> = self
            .lessons
            .iter()
            .filter(|l| l.topic_id.as_deref() == Some(topic_id))
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.order);
        lessons
    }

    /// Combine several catalogs. Later topics with an already-seen id are
    /// dropped; lessons are kept as-is so validation can flag duplicates.
    pub fn merge(catalogs: impl IntoIterator<Item = Catalog>) -> Catalog {
        let mut merged = Catalog::default();
        for catalog in catalogs {
            for topic in catalog.topics {
                if merged.topic(&topic.id).is_none() {
                    merged.topics.push(topic);
                }
            }
            merged.lessons.extend(catalog.lessons);
        }
        merged
    }
}

/// Parse a single catalog file.
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse catalog TOML (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let topics = parsed
        .topics
        .into_iter()
        .map(|t| Topic {
            id: t.id,
            name: t.name,
            description: t.description,
        })
        .collect();

    let lessons = parsed
        .lessons
        .into_iter()
        .map(|l| {
            let difficulty = l
                .difficulty
                .map(|d| d.parse().map_err(|e: String| anyhow::anyhow!("lesson {}: {}", l.id, e)))
                .transpose()?
                .unwrap_or(Difficulty::Easy);

            let assessment = l.assessment.map(|a| Assessment {
                passing_score: a.passing_score,
                questions: a
                    .questions
                    .into_iter()
                    .map(|q| AssessmentQuestion {
                        id: q.id,
                        question_text: q.question,
                        quiz_type: q.quiz_type,
                        options: options(q.options),
                        correct_answer_id: q.correct,
                    })
                    .collect(),
            });

            Ok(Lesson {
                id: l.id,
                title: l.title,
                xp: l.xp,
                difficulty,
                order: l.order,
                topic_id: Some(l.topic),
                content: l.content.into_iter().map(content_block).collect(),
                assessment,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Catalog { topics, lessons })
}

fn options(raw: Vec<TomlOption>) -> Vec<AnswerOption> {
    raw.into_iter()
        .map(|o| AnswerOption {
            id: o.id,
            text: o.text,
        })
        .collect()
}

fn content_block(raw: TomlContent) -> ContentBlock {
    match raw {
        TomlContent::Paragraph { text } => ContentBlock::Paragraph { text },
        TomlContent::Image { url } => ContentBlock::Image { url },
        TomlContent::Quiz {
            question,
            options: opts,
            correct,
            explanation,
        } => ContentBlock::Quiz(QuizBlock {
            question_text: question,
            quiz_type: Some("mcq".into()),
            options: options(opts),
            correct_answer_id: correct,
            explanation,
        }),
    }
}

/// Recursively load all `.toml` catalog files from a directory.
pub fn load_catalog_directory(dir: &Path) -> Result<Vec<Catalog>> {
    let mut catalogs = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            catalogs.extend(load_catalog_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_catalog(&path) {
                Ok(catalog) => catalogs.push(catalog),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(catalogs)
}

/// Load a catalog from a file or a directory of files.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if path.is_dir() {
        Ok(Catalog::merge(load_catalog_directory(path)?))
    } else {
        parse_catalog(path)
    }
}

/// A problem found in a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// The lesson or topic the warning is about.
    pub subject: Option<String>,
    pub message: String,
}

impl ValidationWarning {
    fn new(subject: &str, message: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.to_string()),
            message: message.into(),
        }
    }
}

/// Check a catalog for content that would break progression or grading.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for lesson in &catalog.lessons {
        if !seen_ids.insert(&lesson.id) {
            warnings.push(ValidationWarning::new(
                &lesson.id,
                format!("duplicate lesson ID: {}", lesson.id),
            ));
        }
    }

    let mut orders: BTreeMap<(&str, u32), usize> = BTreeMap::new();
    for lesson in &catalog.lessons {
        let topic_id = lesson.topic_id.as_deref().unwrap_or_default();
        if catalog.topic(topic_id).is_none() {
            warnings.push(ValidationWarning::new(
                &lesson.id,
                format!("lesson references unknown topic: {topic_id}"),
            ));
        }
        *orders.entry((topic_id, lesson.order)).or_default() += 1;
    }
    for ((topic_id, order), count) in orders {
        if count > 1 {
            warnings.push(ValidationWarning::new(
                topic_id,
                format!("{count} lessons share order {order}"),
            ));
        }
    }

    for lesson in &catalog.lessons {
        let Some(assessment) = &lesson.assessment else {
            warnings.push(ValidationWarning::new(&lesson.id, "lesson has no assessment"));
            continue;
        };
        if assessment.questions.is_empty() {
            warnings.push(ValidationWarning::new(&lesson.id, "assessment has no questions"));
        }
        if !(0.0..=1.0).contains(&assessment.passing_score) {
            warnings.push(ValidationWarning::new(
                &lesson.id,
                format!(
                    "passing_score {} is outside [0, 1]",
                    assessment.passing_score
                ),
            ));
        }
        for question in &assessment.questions {
            if !question.has_option(&question.correct_answer_id) {
                warnings.push(ValidationWarning::new(
                    &lesson.id,
                    format!(
                        "question {}: correct answer {} is not among the options",
                        question.id, question.correct_answer_id
                    ),
                ));
            }
        }
    }

    for topic in &catalog.topics {
        let has_hard = catalog
            .lessons
            .iter()
            .any(|l| l.topic_id.as_deref() == Some(topic.id.as_str()) && l.difficulty == Difficulty::Hard);
        if !has_hard {
            warnings.push(ValidationWarning::new(
                &topic.id,
                "topic has no hard lessons, so nobody can graduate as a mentor",
            ));
        }
    }

    warnings
}
