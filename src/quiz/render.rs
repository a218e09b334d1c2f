use crate::content::{Node, TipKind};
use crate::quiz::session::QuizSession;
use crate::quiz::{MalformedQuestionError, Question};

pub const CHOICE_PROMPT: &str = "请选择你的答案：";
pub const RETRY_PROMPT: &str = "再想想看？";
pub const EXPLANATION_LABEL: &str = "查看当前选项解析";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub key: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct { message: String },
    Incorrect { explanation: String, expanded: bool },
}

/// One question instance as it should currently appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQuestion {
    pub instance_key: String,
    pub title: String,
    pub prompt: String,
    pub choices: Vec<Choice>,
    /// `None` until an option has been picked.
    pub feedback: Option<Feedback>,
}

impl RenderedQuestion {
    pub fn nodes(&self) -> Vec<Node> {
        let mut nodes = vec![
            Node::Line(vec![Node::strong(&self.title), Node::text(&self.prompt)]),
            Node::caption(CHOICE_PROMPT),
        ];

        match &self.feedback {
            None => {}
            Some(Feedback::Correct { message }) => {
                nodes.push(Node::tip(TipKind::Success, message));
            }
            Some(Feedback::Incorrect {
                explanation,
                expanded,
            }) => {
                nodes.push(Node::tip(TipKind::Error, RETRY_PROMPT));
                nodes.push(Node::Collapsible {
                    label: EXPLANATION_LABEL.to_string(),
                    body: vec![Node::text(explanation)],
                    expanded: *expanded,
                });
            }
        }
        nodes
    }

    #[cfg(test)]
    pub fn selected(&self) -> Option<&Choice> {
        self.choices.iter().find(|c| c.selected)
    }

    /// The explanation is still hidden behind the expand action.
    pub fn is_collapsed(&self) -> bool {
        matches!(
            self.feedback,
            Some(Feedback::Incorrect {
                expanded: false,
                ..
            })
        )
    }
}

/// Renders `question` with whatever `session` holds for `instance_key`.
///
/// An instance that has never been tracked renders with nothing selected.
pub fn render_question(
    question: &Question,
    instance_key: &str,
    session: &QuizSession,
) -> Result<RenderedQuestion, MalformedQuestionError> {
    if question.is_empty() {
        return Err(MalformedQuestionError::NoOptions {
            id: question.id().to_string(),
        });
    }

    let state = session.state(instance_key).cloned().unwrap_or_default();
    let selected_key = state.selected_key.as_deref();

    let choices = question
        .options()
        .map(|(key, option)| Choice {
            key: key.to_string(),
            label: format!("{}: {}", key, option.content),
            selected: selected_key == Some(key),
        })
        .collect();

    let feedback = match selected_key {
        None => None,
        Some(key) => {
            let option = question
                .option(key)
                .ok_or_else(|| MalformedQuestionError::UnknownOption {
                    id: question.id().to_string(),
                    key: key.to_string(),
                })?;
            if option.is_correct {
                Some(Feedback::Correct {
                    message: option.feedback.clone(),
                })
            } else {
                Some(Feedback::Incorrect {
                    explanation: option.feedback.clone(),
                    expanded: state.explanation_open,
                })
            }
        }
    };

    Ok(RenderedQuestion {
        instance_key: instance_key.to_string(),
        title: question.title().to_string(),
        prompt: question.prompt().to_string(),
        choices,
        feedback,
    })
}
