//! Open chapter views, one per chat. A view owns the selection state of every
//! quiz it has shown; opening another chapter drops it.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use log::{debug, info};
use teloxide::types::ChatId;

use crate::quiz::render::{render_question, RenderedQuestion};
use crate::quiz::session::{QuizSession, SelectionChange};
use crate::quiz::{MalformedQuestionError, Question, QuestionBank};

/// Live quiz instances kept per view; older ones are evicted and their
/// buttons answer as expired.
const MAX_INSTANCES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAction {
    Select { instance_key: String, option: String },
    Expand { instance_key: String },
}

impl QuizAction {
    pub fn instance_key(&self) -> &str {
        match self {
            QuizAction::Select { instance_key, .. } | QuizAction::Expand { instance_key } => {
                instance_key
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("no chapter is open in this chat")]
    NoView,
    #[error("quiz `{0}` does not belong to the open chapter")]
    UnknownInstance(String),
    #[error("chapter `{chapter}` has no question `{id}`")]
    UnknownQuestion { chapter: String, id: String },
    #[error(transparent)]
    Malformed(#[from] MalformedQuestionError),
}

#[derive(Debug)]
pub struct ChapterView {
    chapter: String,
    generation: u32,
    session: QuizSession,
    /// Instance key to question id.
    instances: HashMap<String, String>,
    /// Live instance keys, oldest first.
    order: VecDeque<String>,
    /// Instances ever started per question id; never reused after eviction.
    issued: HashMap<String, u32>,
}

impl ChapterView {
    fn new(chapter: &str, generation: u32) -> Self {
        Self {
            chapter: chapter.to_string(),
            generation,
            session: QuizSession::new(),
            instances: HashMap::new(),
            order: VecDeque::new(),
            issued: HashMap::new(),
        }
    }

    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    /// Starts a fresh instance of `question` and returns its key.
    ///
    /// Keys carry the view generation so that buttons on messages from an
    /// earlier opening of the same chapter never reach this view's state.
    pub fn instantiate(&mut self, question: &Question) -> String {
        let base = format!("{}/{}/{}", self.generation, self.chapter, question.id());
        let n = self.issued.entry(question.id().to_string()).or_insert(0);
        *n += 1;
        let instance_key = match *n {
            1 => base,
            n => format!("{}~{}", base, n),
        };

        while self.order.len() >= MAX_INSTANCES {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.instances.remove(&oldest);
            self.session.forget(&oldest);
            debug!("Evicted quiz instance {}", oldest);
        }

        self.session.track(&instance_key);
        self.instances
            .insert(instance_key.clone(), question.id().to_string());
        self.order.push_back(instance_key.clone());
        debug!("New quiz instance {}", instance_key);
        instance_key
    }

    fn question<'b>(
        &self,
        instance_key: &str,
        bank: &'b QuestionBank,
    ) -> Result<&'b Question, ViewError> {
        let id = self
            .instances
            .get(instance_key)
            .ok_or_else(|| ViewError::UnknownInstance(instance_key.to_string()))?;
        bank.get(id).ok_or_else(|| ViewError::UnknownQuestion {
            chapter: self.chapter.clone(),
            id: id.clone(),
        })
    }

    pub fn render(
        &self,
        instance_key: &str,
        bank: &QuestionBank,
    ) -> Result<RenderedQuestion, ViewError> {
        let question = self.question(instance_key, bank)?;
        Ok(render_question(question, instance_key, &self.session)?)
    }

    /// Applies one button press; `None` means nothing visible changed.
    pub fn apply(
        &mut self,
        action: &QuizAction,
        bank: &QuestionBank,
    ) -> Result<Option<RenderedQuestion>, ViewError> {
        let instance_key = action.instance_key();
        let question = self.question(instance_key, bank)?;

        let change = match action {
            QuizAction::Select { option, .. } => {
                if question.option(option).is_none() {
                    return Err(MalformedQuestionError::UnknownOption {
                        id: question.id().to_string(),
                        key: option.clone(),
                    }
                    .into());
                }
                self.session.select(instance_key, option)
            }
            QuizAction::Expand { .. } => {
                let answered_wrong = self
                    .session
                    .state(instance_key)
                    .and_then(|state| state.selected_key.as_deref())
                    .and_then(|key| question.option(key))
                    .map_or(false, |option| !option.is_correct);
                if answered_wrong {
                    self.session.expand(instance_key)
                } else {
                    SelectionChange::Unchanged
                }
            }
        };

        match change {
            SelectionChange::Unchanged => Ok(None),
            SelectionChange::Changed => self.render(instance_key, bank).map(Some),
        }
    }
}

#[derive(Debug, Default)]
pub struct QuizViews {
    views: HashMap<ChatId, ChapterView>,
    generations: HashMap<ChatId, u32>,
}

impl QuizViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tears down whatever `chat` had open and opens `chapter` with empty state.
    pub fn open(&mut self, chat: ChatId, chapter: &str) -> &mut ChapterView {
        self.views.remove(&chat);
        self.ensure_open(chat, chapter)
    }

    /// Returns the chat's view of `chapter`, opening a fresh one if the chat
    /// has nothing open or is looking at another chapter.
    pub fn ensure_open(&mut self, chat: ChatId, chapter: &str) -> &mut ChapterView {
        match self.views.entry(chat) {
            Entry::Occupied(entry) if entry.get().chapter == chapter => entry.into_mut(),
            entry => {
                let generation = self.generations.entry(chat).or_insert(0);
                *generation += 1;
                info!(
                    "Chat {} opened chapter {} (view #{})",
                    chat.0, chapter, generation
                );
                let view = ChapterView::new(chapter, *generation);
                match entry {
                    Entry::Occupied(mut entry) => {
                        entry.insert(view);
                        entry.into_mut()
                    }
                    Entry::Vacant(entry) => entry.insert(view),
                }
            }
        }
    }

    pub fn close(&mut self, chat: ChatId) {
        if self.views.remove(&chat).is_some() {
            debug!("Chat {} closed its view", chat.0);
        }
    }

    pub fn get_mut(&mut self, chat: ChatId) -> Option<&mut ChapterView> {
        self.views.get_mut(&chat)
    }
}
