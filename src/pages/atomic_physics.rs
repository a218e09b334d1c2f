use crate::cards::{formula_card, knowledge_card, RiskLevel};
use crate::content::Node;
use crate::layout::{CardError, LayoutManager};
use crate::pages::Chapter;

pub fn build(docs_base_url: &str) -> Result<Chapter, CardError> {
    let mut chapter = Chapter::new("atomic_physics", "⚛️ 原子物理");
    chapter.body(vec![Node::Badge("选择性必修三".to_string())]);

    chapter.heading("原子结构");
    let mut structure = LayoutManager::new("atomic", 2, docs_base_url)?;
    structure.place_card(knowledge_card(
        "α 粒子散射实验",
        "绝大多数 α 粒子穿过金箔后仍沿原方向前进，少数发生大角度偏转，说明原子的正电荷和几乎全部质量集中在很小的核上。",
        RiskLevel::High,
        "🎯",
    ))?;
    structure.place_card(knowledge_card(
        "玻尔模型",
        "电子只能在特定轨道上运动，原子处于一系列不连续的能量状态中；跃迁时吸收或放出光子。",
        RiskLevel::Medium,
        "🪐",
    ))?;
    structure.place_card(formula_card(
        "能级跃迁",
        r"h\nu = E_m - E_n",
        "辐射光子的能量等于两能级之差",
        &[("h", "普朗克常量"), ("ν", "光子频率")],
    ))?;
    chapter.grid(structure.finish());
    chapter.quiz("rutherford");

    chapter.heading("原子核");
    let mut nucleus = LayoutManager::new("nuclear", 2, docs_base_url)?;
    nucleus.place_card(knowledge_card(
        "半衰期",
        "放射性元素的原子核有半数发生衰变所需的时间，由核内部自身因素决定，与物理、化学状态无关。",
        RiskLevel::High,
        "⏳",
    ))?;
    nucleus.place_card(formula_card(
        "质能方程",
        r"\Delta E = \Delta m c^2",
        "核反应中质量亏损对应释放的能量",
        &[("Δm", "质量亏损"), ("c", "光速")],
    ))?;
    chapter.grid(nucleus.finish());
    chapter.quiz("half_life");

    Ok(chapter)
}
