pub mod atomic_physics;
pub mod home;
pub mod linear_motion;

use log::info;

use crate::content::Node;
use crate::layout::{CardError, Grid};

#[derive(Debug, Clone, PartialEq)]
pub enum PageBlock {
    Heading(String),
    Body(Vec<Node>),
    Grid(Grid),
    /// A question from the chapter's own bank, by id.
    Quiz(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub slug: String,
    pub title: String,
    pub blocks: Vec<PageBlock>,
}

impl Chapter {
    pub fn new(slug: &str, title: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn heading(&mut self, text: &str) -> &mut Self {
        self.blocks.push(PageBlock::Heading(text.to_string()));
        self
    }

    pub fn body(&mut self, nodes: Vec<Node>) -> &mut Self {
        self.blocks.push(PageBlock::Body(nodes));
        self
    }

    pub fn grid(&mut self, grid: Grid) -> &mut Self {
        self.blocks.push(PageBlock::Grid(grid));
        self
    }

    pub fn quiz(&mut self, question_id: &str) -> &mut Self {
        self.blocks.push(PageBlock::Quiz(question_id.to_string()));
        self
    }

    pub fn quiz_ids(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            PageBlock::Quiz(id) => Some(id.as_str()),
            _ => None,
        })
    }
}

/// Every chapter the bot can show, in menu order.
#[derive(Debug, Clone, Default)]
pub struct ChapterCatalog {
    chapters: Vec<Chapter>,
}

impl ChapterCatalog {
    pub fn build(docs_base_url: &str) -> Result<Self, CardError> {
        let chapters = vec![
            home::build(docs_base_url)?,
            linear_motion::build(docs_base_url)?,
            atomic_physics::build(docs_base_url)?,
        ];
        info!("Built {} chapter(s)", chapters.len());
        Ok(Self { chapters })
    }

    #[cfg(test)]
    pub fn by_slug(&self, slug: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.slug == slug)
    }

    pub fn by_title(&self, title: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.title == title)
    }

    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.chapters().map(|c| c.title.as_str())
    }
}
