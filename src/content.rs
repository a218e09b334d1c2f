//! Rendered content tree shared by cards, pages and quizzes, and its
//! conversion to Telegram HTML.

use teloxide::utils::html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipKind {
    Info,
    Warning,
    Success,
    Error,
}

impl TipKind {
    pub fn icon(&self) -> &'static str {
        match self {
            TipKind::Info => "💡",
            TipKind::Warning => "⚠️",
            TipKind::Success => "✅",
            TipKind::Error => "❌",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "warning" => TipKind::Warning,
            "success" => TipKind::Success,
            "error" => TipKind::Error,
            _ => TipKind::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Strong(String),
    Caption(String),
    Code(String),
    Formula(String),
    Heading(String),
    LinkedHeading {
        label: String,
        url: String,
    },
    Link {
        label: String,
        url: String,
    },
    Badge(String),
    /// Inline nodes laid out on a single line.
    Line(Vec<Node>),
    List(Vec<String>),
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Metric {
        label: String,
        value: String,
        delta: Option<String>,
    },
    Tip {
        kind: TipKind,
        text: String,
    },
    /// A region whose body stays hidden until `expanded` is set.
    Collapsible {
        label: String,
        body: Vec<Node>,
        expanded: bool,
    },
    Bordered(Vec<Node>),
    Divider,
}

impl Node {
    pub fn text(s: &str) -> Self {
        Node::Text(s.to_string())
    }

    pub fn strong(s: &str) -> Self {
        Node::Strong(s.to_string())
    }

    pub fn caption(s: &str) -> Self {
        Node::Caption(s.to_string())
    }

    pub fn tip(kind: TipKind, text: &str) -> Self {
        Node::Tip {
            kind,
            text: text.to_string(),
        }
    }
}

const DIVIDER: &str = "──────────";

pub fn to_html(nodes: &[Node]) -> String {
    render_blocks(nodes, 0)
}

fn render_blocks(nodes: &[Node], depth: usize) -> String {
    nodes
        .iter()
        .map(|node| render_node(node, depth))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_node(node: &Node, depth: usize) -> String {
    match node {
        Node::Text(s) => html::escape(s),
        Node::Strong(s) => html::bold(&html::escape(s)),
        Node::Caption(s) => html::italic(&html::escape(s)),
        Node::Code(s) | Node::Formula(s) => html::code_inline(s),
        Node::Heading(s) => html::bold(&html::escape(s)),
        // `html::link` escapes the label itself.
        Node::LinkedHeading { label, url } => html::bold(&html::link(url, label)),
        Node::Link { label, url } => html::link(url, label),
        Node::Badge(s) => format!("[{}]", html::escape(s)),
        Node::Line(parts) => parts
            .iter()
            .map(|part| render_node(part, depth))
            .collect::<Vec<_>>()
            .join(" "),
        Node::List(items) => items
            .iter()
            .map(|item| format!("• {}", html::escape(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        Node::Table { header, rows } => html::code_block(&table_text(header, rows)),
        Node::Metric {
            label,
            value,
            delta,
        } => {
            let mut out = format!(
                "{}\n{}",
                html::escape(label),
                html::bold(&html::escape(value))
            );
            if let Some(delta) = delta {
                out.push_str(&format!(" ({})", html::escape(delta)));
            }
            out
        }
        Node::Tip { kind, text } => format!("{} {}", kind.icon(), html::escape(text)),
        Node::Collapsible {
            label,
            body,
            expanded,
        } => {
            if *expanded {
                format!("▾ {}\n{}", html::escape(label), render_blocks(body, depth))
            } else {
                format!("▸ {}", html::escape(label))
            }
        }
        // Telegram does not nest quotes.
        Node::Bordered(inner) if depth > 0 => render_blocks(inner, depth + 1),
        Node::Bordered(inner) => {
            format!("<blockquote>{}</blockquote>", render_blocks(inner, depth + 1))
        }
        Node::Divider => DIVIDER.to_string(),
    }
}

fn table_text(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |row: &[String]| {
        row.iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(header)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines.join("\n")
}
