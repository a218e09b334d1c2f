//! Reusable card builders for chapter pages.

use crate::content::{Node, TipKind};
use crate::layout::{Card, CardError, LayoutManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    High,
    Medium,
    Normal,
}

impl RiskLevel {
    pub fn badge(&self) -> Option<&'static str> {
        match self {
            RiskLevel::High => Some("🔥 高频考点"),
            RiskLevel::Medium => Some("⚠️ 易错点"),
            RiskLevel::Normal => None,
        }
    }
}

pub fn formula_card(
    title: &str,
    formula: &str,
    description: &str,
    variables: &[(&str, &str)],
) -> Card {
    let formula = formula.to_string();
    let description = description.to_string();
    let variables = variables
        .iter()
        .map(|(symbol, meaning)| format!("{}: {}", symbol, meaning))
        .collect::<Vec<_>>();

    Card::new(title, move |body| {
        body.push(Node::Formula(formula));
        if !description.is_empty() {
            body.push(Node::Caption(description));
        }
        if !variables.is_empty() {
            body.push(Node::Text(format!("📝 {}", variables.join(" | "))));
        }
        Ok(())
    })
}

pub fn knowledge_card(title: &str, content: &str, risk_level: RiskLevel, icon: &str) -> Card {
    let mut heading = vec![Node::strong(&format!("{} {}", icon, title))];
    if let Some(badge) = risk_level.badge() {
        heading.push(Node::Badge(badge.to_string()));
    }
    Card::from_nodes(title, vec![Node::Line(heading), Node::text(content)])
}

pub fn topic_card(icon: &str, name: &str, description: &str, tags: &[&str]) -> Card {
    let mut nodes = vec![
        Node::strong(&format!("{} {}", icon, name)),
        Node::text(description),
    ];
    if !tags.is_empty() {
        nodes.push(Node::Line(
            tags.iter().map(|tag| Node::Badge(tag.to_string())).collect(),
        ));
    }
    Card::from_nodes(name, nodes)
}

pub fn metric_card(label: &str, value: &str, delta: Option<&str>) -> Card {
    Card::from_nodes(
        label,
        vec![Node::Metric {
            label: label.to_string(),
            value: value.to_string(),
            delta: delta.map(str::to_string),
        }],
    )
}

/// A table card; fails when a row is wider than the header.
pub fn table_card(title: &str, header: &[&str], rows: Vec<Vec<String>>) -> Card {
    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    Card::new(title, move |body| {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() > header.len())
        {
            return Err(format!(
                "table row {} has {} cells but the header has {}",
                i,
                row.len(),
                header.len()
            )
            .into());
        }
        body.push(Node::Table { header, rows });
        Ok(())
    })
}

pub fn tip_box(content: &str, tip_type: &str) -> Node {
    Node::tip(TipKind::from_name(tip_type), content)
}

/// A computed value, optionally with its unit.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Plain(f64),
    WithUnit(f64, String),
}

impl MetricValue {
    pub fn display(&self) -> String {
        match self {
            MetricValue::Plain(value) => format!("{:.2}", value),
            MetricValue::WithUnit(value, unit) => format!("{:.2} {}", value, unit),
        }
    }
}

/// Places one metric card per entry, in order, through `layout`.
pub fn result_metrics(
    layout: &mut LayoutManager,
    metrics: &[(&str, MetricValue)],
) -> Result<(), CardError> {
    for (name, value) in metrics {
        layout.place_card(metric_card(name, &value.display(), None))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::to_html;
    use crate::layout::Row;

    const DOCS: &str = "https://docs.example.org";

    fn render(card: Card) -> Result<String, CardError> {
        let mut layout = LayoutManager::new("physics", 1, DOCS)?;
        layout.place_card(card)?;
        let grid = layout.finish();
        Ok(to_html(&grid.rows[0].slots[0].as_ref().unwrap().nodes))
    }

    #[test]
    fn formula_card_lists_variables() {
        let html = render(formula_card(
            "匀速直线运动",
            "x = vt",
            "位移与时间成正比",
            &[("v", "速度"), ("t", "时间")],
        ))
        .unwrap();

        assert!(html.contains("<code>x = vt</code>"));
        assert!(html.contains("<i>位移与时间成正比</i>"));
        assert!(html.contains("📝 v: 速度 | t: 时间"));
        assert!(html.contains(&format!(
            "https://docs.example.org/physics/{}",
            urlencoding::encode("匀速直线运动")
        )));
    }

    #[test]
    fn knowledge_card_badges_follow_risk_level() {
        let high = render(knowledge_card("质点", "理想化模型", RiskLevel::High, "📌")).unwrap();
        assert!(high.contains("[🔥 高频考点]"));

        let normal =
            render(knowledge_card("参考系", "描述运动", RiskLevel::Normal, "📌")).unwrap();
        assert!(!normal.contains("高频考点"));
        assert!(!normal.contains("易错点"));
    }

    #[test]
    fn ragged_table_fails_the_card() {
        let card = table_card(
            "质点判断",
            &["对象", "结论"],
            vec![vec!["地球".into(), "可以".into(), "多余".into()]],
        );
        let err = render(card).unwrap_err();
        assert!(err.to_string().contains("table row 0 has 3 cells"));
    }

    #[test]
    fn result_metrics_use_two_decimals_and_wrap() {
        let mut layout = LayoutManager::new("metrics", 2, DOCS).unwrap();
        result_metrics(
            &mut layout,
            &[
                ("射程", MetricValue::WithUnit(12.3456, "m".to_string())),
                ("时间", MetricValue::WithUnit(1.5, "s".to_string())),
                ("比值", MetricValue::Plain(0.333)),
            ],
        )
        .unwrap();

        let grid = layout.finish();
        let filled: Vec<usize> = grid.rows.iter().map(Row::filled).collect();
        assert_eq!(filled, [2, 1]);
        let html = to_html(&grid.rows[0].slots[0].as_ref().unwrap().nodes);
        assert!(html.contains("12.35 m"));
        let html = to_html(&grid.rows[1].slots[0].as_ref().unwrap().nodes);
        assert!(html.contains("0.33"));
    }

    #[test]
    fn tip_box_falls_back_to_info() {
        assert_eq!(tip_box("x", "unknown"), Node::tip(TipKind::Info, "x"));
        assert_eq!(tip_box("x", "error"), Node::tip(TipKind::Error, "x"));
    }
}
