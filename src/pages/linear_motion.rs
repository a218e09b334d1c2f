use crate::cards::{
    formula_card, knowledge_card, result_metrics, table_card, tip_box, MetricValue, RiskLevel,
};
use crate::content::Node;
use crate::layout::{CardError, LayoutManager};
use crate::pages::Chapter;

pub fn build(docs_base_url: &str) -> Result<Chapter, CardError> {
    let mut chapter = Chapter::new("linear_motion", "🚀 运动的描述");
    chapter.body(vec![Node::Badge("必修一".to_string())]);

    chapter.heading("质点模型");
    let mut particle = LayoutManager::new("kinematics", 2, docs_base_url)?;
    particle.place_card(knowledge_card(
        "质点",
        "用来代替物体的有质量的点。物体的形状和大小对所研究问题的影响可以忽略时，才能把物体看作质点。",
        RiskLevel::High,
        "📌",
    ))?;
    particle.place_card(table_card(
        "能否视为质点",
        &["对象", "情境", "结论"],
        vec![
            row(&["地球", "研究公转轨道", "可视为质点"]),
            row(&["地球", "研究自转现象", "不可视为质点"]),
            row(&["列车", "计算京沪运行时间", "可视为质点"]),
            row(&["列车", "计算过桥时间", "不可视为质点"]),
        ],
    ))?;
    chapter.grid(particle.finish());
    chapter.quiz("particle_earth");

    chapter.heading("参考系");
    chapter.body(vec![
        Node::text(
            "描述物体运动时，用来作为参考的物体叫作参考系。选择不同的参考系，对同一运动的描述可能不同。",
        ),
        tip_box("如无特别说明，通常以地面为参考系。", "info"),
    ]);
    chapter.quiz("reference_frame");

    chapter.heading("位移与路程");
    let mut displacement = LayoutManager::new("kinematics", 2, docs_base_url)?;
    displacement.place_card(knowledge_card(
        "位移",
        "从初位置指向末位置的有向线段，是矢量。",
        RiskLevel::Medium,
        "➡️",
    ))?;
    displacement.place_card(knowledge_card(
        "路程",
        "物体运动轨迹的长度，是标量。只有单向直线运动中位移大小才等于路程。",
        RiskLevel::Normal,
        "〰️",
    ))?;
    chapter.grid(displacement.finish());

    chapter.heading("速度与加速度");
    let mut formulas = LayoutManager::new("formulas", 3, docs_base_url)?;
    formulas.place_card(formula_card(
        "平均速度",
        r"\bar{v} = \frac{\Delta x}{\Delta t}",
        "位移与所用时间之比",
        &[("Δx", "位移"), ("Δt", "时间")],
    ))?;
    formulas.place_card(formula_card(
        "加速度",
        r"a = \frac{\Delta v}{\Delta t}",
        "速度变化量与所用时间之比",
        &[("Δv", "速度变化量"), ("Δt", "时间")],
    ))?;
    formulas.place_card(formula_card(
        "匀变速速度公式",
        "v = v_0 + at",
        "",
        &[("v_0", "初速度"), ("a", "加速度"), ("t", "时间")],
    ))?;
    formulas.place_card(formula_card(
        "匀变速位移公式",
        r"x = v_0 t + \frac{1}{2} a t^2",
        "",
        &[],
    ))?;
    chapter.grid(formulas.finish());

    chapter.heading("例题：匀加速起步");
    chapter.body(vec![Node::text(
        "汽车以 2 m/s 的初速度、1.5 m/s² 的加速度匀加速行驶 4 s。",
    )]);
    let (v0, a, t) = (2.0_f64, 1.5_f64, 4.0_f64);
    let mut results = LayoutManager::new("results", 3, docs_base_url)?;
    result_metrics(
        &mut results,
        &[
            ("末速度", MetricValue::WithUnit(v0 + a * t, "m/s".to_string())),
            ("位移", MetricValue::WithUnit(v0 * t + 0.5 * a * t * t, "m".to_string())),
            ("平均速度", MetricValue::WithUnit(v0 + 0.5 * a * t, "m/s".to_string())),
            ("末速度 / 初速度", MetricValue::Plain((v0 + a * t) / v0)),
        ],
    )?;
    chapter.grid(results.finish());
    chapter.quiz("acceleration_direction");

    Ok(chapter)
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::to_html;
    use crate::layout::Row;
    use crate::pages::PageBlock;

    #[test]
    fn worked_example_wraps_its_metrics() {
        let chapter = build("https://docs.example.org").unwrap();
        let results = chapter
            .blocks
            .iter()
            .find_map(|b| match b {
                PageBlock::Grid(grid) if grid.category == "results" => Some(grid),
                _ => None,
            })
            .unwrap();

        let filled: Vec<usize> = results.rows.iter().map(Row::filled).collect();
        assert_eq!(filled, [3, 1]);
        let ratio = to_html(&results.rows[1].slots[0].as_ref().unwrap().nodes);
        assert!(ratio.contains("<b>4.00</b>"), "{}", ratio);
    }
}
