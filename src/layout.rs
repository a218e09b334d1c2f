//! Column grid that content cards are placed into, one card per slot, in call order.

use log::debug;

use crate::content::Node;

pub type CardError = Box<dyn std::error::Error + Send + Sync>;

type RenderFn = Box<dyn FnOnce(&mut Vec<Node>) -> Result<(), CardError> + Send>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("a layout needs at least one column, got {columns}")]
pub struct LayoutConfigurationError {
    pub columns: usize,
}

/// A unit of page content: a heading identifier plus a deferred body.
pub struct Card {
    identifier: String,
    render: RenderFn,
}

impl Card {
    pub fn new<F>(identifier: &str, render: F) -> Self
    where
        F: FnOnce(&mut Vec<Node>) -> Result<(), CardError> + Send + 'static,
    {
        Self {
            identifier: identifier.to_string(),
            render: Box::new(render),
        }
    }

    pub fn from_nodes(identifier: &str, nodes: Vec<Node>) -> Self {
        Self::new(identifier, move |body| {
            body.extend(nodes);
            Ok(())
        })
    }
}

impl std::fmt::Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Card")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotPosition {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub identifier: String,
    pub nodes: Vec<Node>,
}

/// One row of equal-width slots; trailing slots stay empty when the section runs out of cards.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub slots: Vec<Option<Cell>>,
}

impl Row {
    fn with_columns(columns: usize) -> Self {
        Self {
            slots: vec![None; columns],
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.slots.iter().flatten()
    }

    #[cfg(test)]
    pub fn filled(&self) -> usize {
        self.cells().count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub category: String,
    pub columns: usize,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone)]
struct GridCursor {
    columns: usize,
    row: Option<usize>,
    index: usize,
}

impl GridCursor {
    fn new(columns: usize) -> Self {
        Self {
            columns,
            row: None,
            index: 0,
        }
    }

    fn next_slot(&mut self, rows: &mut Vec<Row>) -> SlotPosition {
        let row = match self.row {
            Some(row) if self.index < self.columns => row,
            _ => {
                rows.push(Row::with_columns(self.columns));
                self.index = 0;
                let row = rows.len() - 1;
                self.row = Some(row);
                row
            }
        };

        let position = SlotPosition {
            row,
            column: self.index,
        };
        self.index += 1;
        position
    }
}

/// Places cards left to right into rows of `columns` slots, wrapping to a
/// new row when the current one is full.
#[derive(Debug)]
pub struct LayoutManager {
    category: String,
    docs_base_url: String,
    cursor: GridCursor,
    rows: Vec<Row>,
}

impl LayoutManager {
    pub fn new(
        category: &str,
        columns: usize,
        docs_base_url: &str,
    ) -> Result<Self, LayoutConfigurationError> {
        if columns < 1 {
            return Err(LayoutConfigurationError { columns });
        }
        Ok(Self {
            category: category.to_string(),
            docs_base_url: docs_base_url.trim_end_matches('/').to_string(),
            cursor: GridCursor::new(columns),
            rows: Vec::new(),
        })
    }

    /// `category` and `identifier` are percent-encoded as path segments.
    pub fn doc_link(&self, identifier: &str) -> String {
        format!(
            "{}/{}/{}",
            self.docs_base_url,
            urlencoding::encode(&self.category),
            urlencoding::encode(identifier)
        )
    }

    /// Allocates the next slot and renders `card` into it.
    ///
    /// Errors from the card's render procedure are returned as-is.
    pub fn place_card(&mut self, card: Card) -> Result<SlotPosition, CardError> {
        let position = self.cursor.next_slot(&mut self.rows);

        let mut body = vec![Node::LinkedHeading {
            label: card.identifier.clone(),
            url: self.doc_link(&card.identifier),
        }];
        (card.render)(&mut body)?;

        debug!(
            "Placed card `{}` in {} at row {}, column {}",
            card.identifier, self.category, position.row, position.column
        );
        self.rows[position.row].slots[position.column] = Some(Cell {
            identifier: card.identifier,
            nodes: vec![Node::Bordered(body)],
        });
        Ok(position)
    }

    pub fn finish(self) -> Grid {
        Grid {
            category: self.category,
            columns: self.cursor.columns,
            rows: self.rows,
        }
    }
}
