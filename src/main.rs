mod cards;
mod config;
mod content;
mod layout;
mod pages;
mod quiz;
mod telegram;
mod views;

use std::sync::Arc;

use log::{debug, info, warn};
use pages::ChapterCatalog;
use quiz::QuestionLibrary;
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
    types::{ChatId, ParseMode},
};
use telegram::Outgoing;
use tokio::sync::Mutex;
use views::{QuizViews, ViewError};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type DialogueStorage = std::sync::Arc<ErasedStorage<State>>;
type SharedViews = Arc<Mutex<QuizViews>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ChoosingChapter,
    Reading {
        chapter: String,
    },
}

/// Everything loaded at startup and read by every handler.
struct Library {
    catalog: ChapterCatalog,
    questions: QuestionLibrary,
}

impl Library {
    /// Quiz blocks whose question is not in the chapter's bank; these show an
    /// error line instead of a quiz.
    fn missing_questions(&self) -> Vec<(&str, &str)> {
        self.catalog
            .chapters()
            .flat_map(|chapter| {
                let bank = self.questions.bank(&chapter.slug);
                chapter
                    .quiz_ids()
                    .filter(move |id| bank.and_then(|b| b.get(id)).is_none())
                    .map(move |id| (chapter.slug.as_str(), id))
            })
            .collect()
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    log::info!("Starting QuantPhysics bot...");

    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> HandlerResult {
    let config = config::Config::from_env()?;
    debug!("{:?}", config);

    let bot = Bot::from_env();

    info!("Opening dialogue storage at {}", config.dialogue_db);
    let storage: DialogueStorage = SqliteStorage::open(&config.dialogue_db, Json)
        .await?
        .erase();

    let library = Arc::new(Library {
        catalog: ChapterCatalog::build(&config.docs_base_url)?,
        questions: QuestionLibrary::load(&config.question_bank)?,
    });
    for (chapter, id) in library.missing_questions() {
        warn!("Chapter {} refers to missing question {}", chapter, id);
    }
    let views: SharedViews = Arc::new(Mutex::new(QuizViews::new()));

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, ErasedStorage<State>, State>()
                .branch(
                    dptree::filter(|msg: Message| msg.text() == Some(telegram::HOME))
                        .endpoint(start),
                )
                .branch(dptree::case![State::Start].endpoint(start))
                .branch(dptree::case![State::ChoosingChapter].endpoint(receive_chapter_choice))
                .branch(dptree::case![State::Reading { chapter }].endpoint(reading)),
        )
        .branch(Update::filter_callback_query().endpoint(quiz_button));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![storage, library, views])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    Ok(())
}

const GREETING_TEXT: &str = "你好！我是 QuantPhysics 量化物理助手。请从下方键盘中选择一个专题开始学习。";
const CHOOSE_CHAPTER_TEXT: &str = "请从键盘中选择一个专题";
const NO_CHAPTER_OPEN_TEXT: &str = "请先打开一个带有题目的专题";
const QUIZ_EXPIRED_TEXT: &str = "这道题已过期，请重新打开专题";
const QUIZ_BROKEN_TEXT: &str = "⚠️ 这道题暂时无法显示";

async fn start(
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
    library: Arc<Library>,
    views: SharedViews,
) -> HandlerResult {
    views.lock().await.close(msg.chat.id);

    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(telegram::chapter_keyboard(&library.catalog))
        .await?;

    dialogue.update(State::ChoosingChapter).await?;
    Ok(())
}

async fn receive_chapter_choice(
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
    library: Arc<Library>,
    views: SharedViews,
) -> HandlerResult {
    match msg.text() {
        Some(telegram::RANDOM_QUESTION) => {
            bot.send_message(msg.chat.id, NO_CHAPTER_OPEN_TEXT).await?;
            Ok(())
        }
        Some(text) => {
            open_chapter_by_title(bot, dialogue, msg.chat.id, text, library, views).await
        }
        None => {
            bot.send_message(msg.chat.id, CHOOSE_CHAPTER_TEXT).await?;
            Ok(())
        }
    }
}

async fn reading(
    bot: Bot,
    dialogue: QuizDialogue,
    chapter: String,
    msg: Message,
    library: Arc<Library>,
    views: SharedViews,
) -> HandlerResult {
    match msg.text() {
        Some(telegram::RANDOM_QUESTION) => {
            random_question(bot, dialogue, msg.chat.id, chapter, library, views).await
        }
        Some(text) => {
            open_chapter_by_title(bot, dialogue, msg.chat.id, text, library, views).await
        }
        None => {
            bot.send_message(msg.chat.id, CHOOSE_CHAPTER_TEXT).await?;
            Ok(())
        }
    }
}

async fn open_chapter_by_title(
    bot: Bot,
    dialogue: QuizDialogue,
    chat_id: ChatId,
    title: &str,
    library: Arc<Library>,
    views: SharedViews,
) -> HandlerResult {
    let Some(chapter) = library.catalog.by_title(title) else {
        bot.send_message(chat_id, CHOOSE_CHAPTER_TEXT)
            .reply_markup(telegram::chapter_keyboard(&library.catalog))
            .await?;
        return Ok(());
    };

    let messages = {
        let mut views = views.lock().await;
        let view = views.open(chat_id, &chapter.slug);
        telegram::chapter_messages(chapter, library.questions.bank(&chapter.slug), view)
    };
    send_all(&bot, chat_id, messages).await?;

    dialogue
        .update(State::Reading {
            chapter: chapter.slug.clone(),
        })
        .await?;
    Ok(())
}

async fn random_question(
    bot: Bot,
    dialogue: QuizDialogue,
    chat_id: ChatId,
    chapter: String,
    library: Arc<Library>,
    views: SharedViews,
) -> HandlerResult {
    let Some(question) = library
        .questions
        .bank(&chapter)
        .and_then(|bank| bank.random_question())
    else {
        bot.send_message(chat_id, NO_CHAPTER_OPEN_TEXT).await?;
        return Ok(());
    };

    let message = {
        let mut views = views.lock().await;
        // After a restart the dialogue remembers the chapter but the view is gone.
        let view = views.ensure_open(chat_id, &chapter);
        telegram::quiz_outgoing(view, library.questions.bank(&chapter), question.id())
    };
    send_all(&bot, chat_id, vec![message]).await?;

    dialogue.update(State::Reading { chapter }).await?;
    Ok(())
}

async fn send_all(bot: &Bot, chat_id: ChatId, messages: Vec<Outgoing>) -> HandlerResult {
    for message in messages {
        match message {
            Outgoing::Html(text) => {
                bot.send_message(chat_id, text)
                    .parse_mode(ParseMode::Html)
                    .disable_web_page_preview(true)
                    .await?;
            }
            Outgoing::Quiz { text, markup } => {
                bot.send_message(chat_id, text)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(markup)
                    .await?;
            }
        }
    }
    Ok(())
}

async fn quiz_button(
    bot: Bot,
    q: CallbackQuery,
    library: Arc<Library>,
    views: SharedViews,
) -> HandlerResult {
    let Some(action) = q.data.as_deref().and_then(telegram::parse_action) else {
        debug!("Ignoring callback data {:?}", q.data);
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let Some(message) = q.message else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let chat_id = message.chat.id;

    let update = {
        let mut views = views.lock().await;
        match views.get_mut(chat_id) {
            None => Err(ViewError::NoView),
            Some(view) => match library.questions.bank(view.chapter()) {
                Some(bank) => view.apply(&action, bank),
                None => Err(ViewError::UnknownInstance(action.instance_key().to_string())),
            },
        }
    };

    match update {
        Ok(Some(rendered)) => {
            debug!("Chat {}: {:?}", chat_id.0, action);
            let (text, markup) = telegram::quiz_message(&rendered)?;
            bot.edit_message_text(chat_id, message.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(markup)
                .await?;
            bot.answer_callback_query(q.id).await?;
        }
        Ok(None) => {
            bot.answer_callback_query(q.id).await?;
        }
        Err(ViewError::NoView | ViewError::UnknownInstance(_)) => {
            bot.answer_callback_query(q.id).text(QUIZ_EXPIRED_TEXT).await?;
        }
        Err(e) => {
            warn!("Quiz action {:?} failed: {}", action, e);
            bot.edit_message_text(chat_id, message.id, QUIZ_BROKEN_TEXT).await?;
            bot.answer_callback_query(q.id).await?;
        }
    }
    Ok(())
}
