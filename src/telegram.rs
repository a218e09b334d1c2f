//! Turns chapters and quiz renderings into Telegram messages and keyboards,
//! and decodes quiz button presses.

use log::warn;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

use crate::content::{to_html, Node};
use crate::layout::Grid;
use crate::pages::{Chapter, ChapterCatalog, PageBlock};
use crate::quiz::render::{RenderedQuestion, EXPLANATION_LABEL};
use crate::quiz::QuestionBank;
use crate::views::{ChapterView, QuizAction};

pub const RANDOM_QUESTION: &str = "🎲 随机一题";
pub const HOME: &str = "/start";

/// Telegram rejects callback data above this many bytes.
const CALLBACK_DATA_LIMIT: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("callback data `{data}` is longer than {CALLBACK_DATA_LIMIT} bytes")]
pub struct CallbackDataTooLong {
    pub data: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Html(String),
    Quiz {
        text: String,
        markup: InlineKeyboardMarkup,
    },
}

pub fn encode_action(action: &QuizAction) -> Result<String, CallbackDataTooLong> {
    let data = match action {
        QuizAction::Select {
            instance_key,
            option,
        } => format!("s:{}:{}", instance_key, option),
        QuizAction::Expand { instance_key } => format!("x:{}", instance_key),
    };
    if data.len() > CALLBACK_DATA_LIMIT {
        return Err(CallbackDataTooLong { data });
    }
    Ok(data)
}

pub fn parse_action(data: &str) -> Option<QuizAction> {
    let (kind, rest) = data.split_once(':')?;
    match kind {
        "s" => {
            let (instance_key, option) = rest.rsplit_once(':')?;
            if instance_key.is_empty() || option.is_empty() {
                return None;
            }
            Some(QuizAction::Select {
                instance_key: instance_key.to_string(),
                option: option.to_string(),
            })
        }
        "x" if !rest.is_empty() => Some(QuizAction::Expand {
            instance_key: rest.to_string(),
        }),
        _ => None,
    }
}

/// Message text and inline keyboard for one quiz instance.
pub fn quiz_message(
    rendered: &RenderedQuestion,
) -> Result<(String, InlineKeyboardMarkup), CallbackDataTooLong> {
    let mut rows = Vec::new();
    for choice in &rendered.choices {
        let marker = if choice.selected { "🔘" } else { "⚪" };
        let data = encode_action(&QuizAction::Select {
            instance_key: rendered.instance_key.clone(),
            option: choice.key.clone(),
        })?;
        rows.push(vec![InlineKeyboardButton::callback(
            format!("{} {}", marker, choice.label),
            data,
        )]);
    }

    if rendered.is_collapsed() {
        let data = encode_action(&QuizAction::Expand {
            instance_key: rendered.instance_key.clone(),
        })?;
        rows.push(vec![InlineKeyboardButton::callback(
            format!("🔍 {}", EXPLANATION_LABEL),
            data,
        )]);
    }

    Ok((to_html(&rendered.nodes()), InlineKeyboardMarkup::new(rows)))
}

fn quiz_unavailable(id: &str) -> String {
    to_html(&[Node::Line(vec![
        Node::text("⚠️ 题目"),
        Node::Code(id.to_string()),
        Node::text("暂时无法显示"),
    ])])
}

fn heading(text: &str) -> Outgoing {
    Outgoing::Html(to_html(&[Node::Heading(text.to_string())]))
}

/// Starts a fresh instance of question `id` in `view` and renders it,
/// or an error line in its place.
pub fn quiz_outgoing(view: &mut ChapterView, bank: Option<&QuestionBank>, id: &str) -> Outgoing {
    let Some((bank, question)) = bank.and_then(|b| b.get(id).map(|q| (b, q))) else {
        warn!("Chapter {} has no question {}", view.chapter(), id);
        return Outgoing::Html(quiz_unavailable(id));
    };

    let instance_key = view.instantiate(question);
    let message = view
        .render(&instance_key, bank)
        .map_err(|e| e.to_string())
        .and_then(|rendered| quiz_message(&rendered).map_err(|e| e.to_string()));

    match message {
        Ok((text, markup)) => Outgoing::Quiz { text, markup },
        Err(e) => {
            warn!("Failed to render quiz {}: {}", instance_key, e);
            Outgoing::Html(quiz_unavailable(id))
        }
    }
}

fn grid_messages(grid: &Grid) -> impl Iterator<Item = String> + '_ {
    grid.rows.iter().map(|row| {
        row.cells()
            .map(|cell| to_html(&cell.nodes))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// Every message needed to show `chapter`, in page order; each quiz gets a
/// fresh instance in `view`.
pub fn chapter_messages(
    chapter: &Chapter,
    bank: Option<&QuestionBank>,
    view: &mut ChapterView,
) -> Vec<Outgoing> {
    let mut messages = vec![heading(&chapter.title)];
    for block in &chapter.blocks {
        match block {
            PageBlock::Heading(text) => messages.push(heading(text)),
            PageBlock::Body(nodes) => messages.push(Outgoing::Html(to_html(nodes))),
            PageBlock::Grid(grid) => messages.extend(grid_messages(grid).map(Outgoing::Html)),
            PageBlock::Quiz(id) => messages.push(quiz_outgoing(view, bank, id)),
        }
    }
    messages
}

pub fn chapter_keyboard(catalog: &ChapterCatalog) -> KeyboardMarkup {
    let titles: Vec<&str> = catalog.titles().collect();
    let mut rows: Vec<Vec<KeyboardButton>> = titles
        .chunks(2)
        .map(|pair| pair.iter().map(|t| KeyboardButton::new(*t)).collect())
        .collect();
    rows.push(vec![KeyboardButton::new(RANDOM_QUESTION)]);
    KeyboardMarkup::new(rows).resize_keyboard(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::tests::two_option_question;
    use crate::quiz::QuestionLibrary;
    use crate::views::QuizViews;
    use teloxide::types::{ChatId, InlineKeyboardButtonKind};

    fn callbacks(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn actions_round_trip_through_callback_data() {
        let select = QuizAction::Select {
            instance_key: "3/linear_motion/q1~2".to_string(),
            option: "B".to_string(),
        };
        let data = encode_action(&select).unwrap();
        assert_eq!(data, "s:3/linear_motion/q1~2:B");
        assert_eq!(parse_action(&data), Some(select));

        assert_eq!(
            parse_action("x:1/atomic_physics/half_life"),
            Some(QuizAction::Expand {
                instance_key: "1/atomic_physics/half_life".to_string()
            })
        );
        assert_eq!(parse_action("s:nokey"), None);
        assert_eq!(parse_action("x:"), None);
        assert_eq!(parse_action("hello"), None);
    }

    #[test]
    fn oversized_callback_data_is_rejected() {
        let action = QuizAction::Expand {
            instance_key: "k".repeat(70),
        };
        assert!(encode_action(&action).is_err());
    }

    #[test]
    fn expand_button_appears_only_while_collapsed() {
        let bank = QuestionBank::new(vec![two_option_question()]);
        let mut views = QuizViews::new();
        let view = views.open(ChatId(5), "linear_motion");
        let Outgoing::Quiz { markup, .. } = quiz_outgoing(view, Some(&bank), "q1") else {
            panic!("expected a quiz message");
        };
        assert_eq!(
            callbacks(&markup),
            ["s:1/linear_motion/q1:A", "s:1/linear_motion/q1:B"]
        );

        let select_b = parse_action("s:1/linear_motion/q1:B").unwrap();
        let rendered = view.apply(&select_b, &bank).unwrap().unwrap();
        let (text, markup) = quiz_message(&rendered).unwrap();
        assert!(callbacks(&markup).contains(&"x:1/linear_motion/q1".to_string()));
        assert!(!text.contains("形状大小"));

        let expand = parse_action("x:1/linear_motion/q1").unwrap();
        let rendered = view.apply(&expand, &bank).unwrap().unwrap();
        let (text, markup) = quiz_message(&rendered).unwrap();
        assert_eq!(callbacks(&markup).len(), 2);
        assert!(text.contains("形状大小对公转轨道的影响可忽略。"));
    }

    #[test]
    fn missing_question_becomes_an_error_line() {
        let mut views = QuizViews::new();
        let view = views.open(ChatId(5), "optics");
        let out = quiz_outgoing(view, None, "prism");
        assert_eq!(
            out,
            Outgoing::Html("⚠️ 题目 <code>prism</code> 暂时无法显示".to_string())
        );
    }

    #[test]
    fn chapter_sends_one_message_per_grid_row() {
        let catalog = ChapterCatalog::build("https://docs.example.org").unwrap();
        let library =
            QuestionLibrary::from_json_str(include_str!("../data/questions.json")).unwrap();
        let chapter = catalog.by_slug("atomic_physics").unwrap();

        let mut views = QuizViews::new();
        let view = views.open(ChatId(9), &chapter.slug);
        let messages = chapter_messages(chapter, library.bank(&chapter.slug), view);

        let quizzes = messages
            .iter()
            .filter(|m| matches!(m, Outgoing::Quiz { .. }))
            .count();
        assert_eq!(quizzes, 2);
        // title, badge, 2 headings, 2 + 1 grid rows, 2 quizzes
        assert_eq!(messages.len(), 9);
        assert!(matches!(&messages[0], Outgoing::Html(t) if t.contains("原子物理")));
    }

    #[test]
    fn keyboard_lists_chapters_two_per_row() {
        let catalog = ChapterCatalog::build("https://docs.example.org").unwrap();
        let keyboard = chapter_keyboard(&catalog);
        let sizes: Vec<usize> = keyboard.keyboard.iter().map(Vec::len).collect();
        assert_eq!(sizes, [2, 1, 1]);
        assert_eq!(keyboard.keyboard[2][0].text, RANDOM_QUESTION);
    }
}
