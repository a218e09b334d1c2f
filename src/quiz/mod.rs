pub mod render;
pub mod session;

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, info};
use rand::seq::SliceRandom;
use serde_json::{Map, Value};

/// A question record that does not satisfy the quiz invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedQuestionError {
    #[error("question `{id}` has no options")]
    NoOptions { id: String },
    #[error("question `{id}` has {count} option(s), at least two are required")]
    TooFewOptions { id: String, count: usize },
    #[error("question `{id}`: option key `{key}` must be a single character")]
    BadKey { id: String, key: String },
    #[error("question `{id}`: option key `{key}` appears more than once")]
    DuplicateKey { id: String, key: String },
    #[error("question `{id}` has {count} correct options, exactly one is required")]
    CorrectCount { id: String, count: usize },
    #[error("question `{id}` has no option `{key}`")]
    UnknownOption { id: String, key: String },
    #[error("question `{id}` could not be read: {reason}")]
    Schema { id: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("failed to open question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("question bank is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{what} must be a JSON object")]
    NotAnObject { what: String },
    #[error(transparent)]
    Malformed(#[from] MalformedQuestionError),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuizOption {
    pub content: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: String,
}

#[cfg(test)]
impl QuizOption {
    pub fn new(content: &str, is_correct: bool, feedback: &str) -> Self {
        Self {
            content: content.to_string(),
            is_correct,
            feedback: feedback.to_string(),
        }
    }
}

/// The wire shape of one record; `options` stays a raw map so that its key
/// order survives into the validated question.
#[derive(serde::Deserialize)]
struct QuestionRecord {
    #[serde(default)]
    title: String,
    #[serde(default)]
    question: String,
    options: Map<String, Value>,
}

/// One validated single-choice quiz item.
///
/// Options keep their insertion order, which is also their display order.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: String,
    title: String,
    prompt: String,
    options: Vec<(String, QuizOption)>,
}

impl Question {
    pub fn new(
        id: &str,
        title: &str,
        prompt: &str,
        options: Vec<(String, QuizOption)>,
    ) -> Result<Self, MalformedQuestionError> {
        let id = id.to_string();
        if options.is_empty() {
            return Err(MalformedQuestionError::NoOptions { id });
        }
        if options.len() < 2 {
            return Err(MalformedQuestionError::TooFewOptions {
                id,
                count: options.len(),
            });
        }

        for (i, (key, _)) in options.iter().enumerate() {
            if key.chars().count() != 1 {
                return Err(MalformedQuestionError::BadKey {
                    id,
                    key: key.clone(),
                });
            }
            if options[..i].iter().any(|(seen, _)| seen == key) {
                return Err(MalformedQuestionError::DuplicateKey {
                    id,
                    key: key.clone(),
                });
            }
        }

        let correct = options.iter().filter(|(_, o)| o.is_correct).count();
        if correct != 1 {
            return Err(MalformedQuestionError::CorrectCount { id, count: correct });
        }

        Ok(Self {
            id,
            title: title.to_string(),
            prompt: prompt.to_string(),
            options,
        })
    }

    /// Builds a question from one loosely-typed bank record.
    pub fn from_record(id: &str, record: Value) -> Result<Self, MalformedQuestionError> {
        let schema_error = |e: serde_json::Error| MalformedQuestionError::Schema {
            id: id.to_string(),
            reason: e.to_string(),
        };

        let record: QuestionRecord = serde_json::from_value(record).map_err(schema_error)?;
        let options = record
            .options
            .into_iter()
            .map(|(key, value)| -> Result<(String, QuizOption), MalformedQuestionError> {
                Ok((key, serde_json::from_value(value).map_err(schema_error)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(id, &record.title, &record.question, options)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &QuizOption)> {
        self.options.iter().map(|(k, o)| (k.as_str(), o))
    }

    pub fn option(&self, key: &str) -> Option<&QuizOption> {
        self.options.iter().find(|(k, _)| k == key).map(|(_, o)| o)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// The questions available to one chapter, keyed by question id.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: HashMap<String, Question>,
    order: Vec<String>,
}

impl QuestionBank {
    #[cfg(test)]
    pub fn new(questions: Vec<Question>) -> Self {
        let mut bank = Self::default();
        for question in questions {
            bank.insert(question);
        }
        bank
    }

    fn insert(&mut self, question: Question) {
        let id = question.id().to_string();
        if self.questions.insert(id.clone(), question).is_none() {
            self.order.push(id);
        }
    }

    pub fn from_value(value: Value) -> Result<Self, LibraryError> {
        let Value::Object(records) = value else {
            return Err(LibraryError::NotAnObject {
                what: "a question bank".to_string(),
            });
        };

        let mut bank = Self::default();
        for (id, record) in records {
            bank.insert(Question::from_record(&id, record)?);
        }
        Ok(bank)
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn random_question(&self) -> Option<&Question> {
        let id = self.order.choose(&mut rand::thread_rng())?;
        self.questions.get(id)
    }
}

/// Every chapter's question bank, keyed by chapter slug.
#[derive(Debug, Clone, Default)]
pub struct QuestionLibrary {
    banks: HashMap<String, QuestionBank>,
}

impl QuestionLibrary {
    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        info!("Loading question bank from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let library = Self::from_value(serde_json::from_reader(reader)?)?;
        info!(
            "Question bank loaded: {} chapter(s), {} question(s)",
            library.banks.len(),
            library.banks.values().map(QuestionBank::len).sum::<usize>()
        );
        Ok(library)
    }

    #[cfg(test)]
    pub fn from_json_str(json: &str) -> Result<Self, LibraryError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    fn from_value(value: Value) -> Result<Self, LibraryError> {
        let Value::Object(chapters) = value else {
            return Err(LibraryError::NotAnObject {
                what: "the question library".to_string(),
            });
        };

        let mut banks = HashMap::new();
        for (chapter, bank) in chapters {
            let bank = QuestionBank::from_value(bank)?;
            debug!("Chapter `{}`: {} question(s)", chapter, bank.len());
            banks.insert(chapter, bank);
        }
        Ok(Self { banks })
    }

    pub fn bank(&self, chapter: &str) -> Option<&QuestionBank> {
        self.banks.get(chapter)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    pub(crate) fn two_option_question() -> Question {
        Question::new(
            "q1",
            "2023 全国卷",
            "研究地球公转时，地球能否视为质点？",
            vec![
                (
                    "A".to_string(),
                    QuizOption::new("能", true, "公转半径远大于地球直径。"),
                ),
                (
                    "B".to_string(),
                    QuizOption::new("不能", false, "形状大小对公转轨道的影响可忽略。"),
                ),
            ],
        )
        .unwrap()
    }

    fn record(options: Value) -> Value {
        json!({ "title": "t", "question": "q", "options": options })
    }

    #[test]
    fn keeps_option_order_from_json() {
        let question = Question::from_record(
            "order",
            record(json!({
                "C": { "content": "c", "is_correct": false, "feedback": "" },
                "A": { "content": "a", "is_correct": true, "feedback": "" },
                "B": { "content": "b", "is_correct": false, "feedback": "" },
            })),
        )
        .unwrap();

        let keys: Vec<&str> = question.options().map(|(k, _)| k).collect();
        assert_eq!(keys, ["C", "A", "B"]);
    }

    #[test]
    fn rejects_zero_or_many_correct_options() {
        let none_correct = Question::from_record(
            "none",
            record(json!({
                "A": { "content": "a", "is_correct": false },
                "B": { "content": "b", "is_correct": false },
            })),
        );
        assert_eq!(
            none_correct,
            Err(MalformedQuestionError::CorrectCount {
                id: "none".to_string(),
                count: 0
            })
        );

        let both_correct = Question::from_record(
            "both",
            record(json!({
                "A": { "content": "a", "is_correct": true },
                "B": { "content": "b", "is_correct": true },
            })),
        );
        assert!(matches!(
            both_correct,
            Err(MalformedQuestionError::CorrectCount { count: 2, .. })
        ));
    }

    #[test]
    fn rejects_empty_and_single_option_records() {
        assert!(matches!(
            Question::from_record("empty", record(json!({}))),
            Err(MalformedQuestionError::NoOptions { .. })
        ));
        assert!(matches!(
            Question::from_record(
                "single",
                record(json!({ "A": { "content": "a", "is_correct": true } }))
            ),
            Err(MalformedQuestionError::TooFewOptions { count: 1, .. })
        ));
    }

    #[test]
    fn rejects_missing_options_and_bad_shapes() {
        assert!(matches!(
            Question::from_record("missing", json!({ "title": "t", "question": "q" })),
            Err(MalformedQuestionError::Schema { .. })
        ));
        assert!(matches!(
            Question::from_record("shape", record(json!({ "A": "just text", "B": 1 }))),
            Err(MalformedQuestionError::Schema { .. })
        ));
    }

    #[test]
    fn rejects_multi_character_and_duplicate_keys() {
        let options = vec![
            ("AB".to_string(), QuizOption::new("a", true, "")),
            ("C".to_string(), QuizOption::new("c", false, "")),
        ];
        assert!(matches!(
            Question::new("keys", "", "", options),
            Err(MalformedQuestionError::BadKey { .. })
        ));

        let options = vec![
            ("A".to_string(), QuizOption::new("a", true, "")),
            ("A".to_string(), QuizOption::new("again", false, "")),
        ];
        assert!(matches!(
            Question::new("dup", "", "", options),
            Err(MalformedQuestionError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn library_rejects_the_whole_file_on_one_bad_record() {
        let json = r#"{
            "linear_motion": {
                "ok": { "title": "", "question": "?", "options": {
                    "A": { "content": "a", "is_correct": true },
                    "B": { "content": "b" }
                } },
                "broken": { "title": "", "question": "?", "options": {} }
            }
        }"#;

        match QuestionLibrary::from_json_str(json) {
            Err(LibraryError::Malformed(MalformedQuestionError::NoOptions { id })) => {
                assert_eq!(id, "broken")
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn loads_library_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "atomic_physics": {{ "bohr": {{ "title": "玻尔模型", "question": "?",
                "options": {{ "A": {{ "content": "a", "is_correct": true, "feedback": "ok" }},
                              "B": {{ "content": "b", "is_correct": false, "feedback": "no" }} }} }} }} }}"#
        )
        .unwrap();

        let library = QuestionLibrary::load(file.path()).unwrap();
        let bank = library.bank("atomic_physics").unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.get("bohr").unwrap().title(), "玻尔模型");
        assert!(library.bank("optics").is_none());
        assert_eq!(bank.random_question().map(Question::id), Some("bohr"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = QuestionLibrary::load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(LibraryError::Io(_))));
    }
}
