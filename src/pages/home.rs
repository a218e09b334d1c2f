use crate::cards::{metric_card, topic_card};
use crate::content::Node;
use crate::layout::{Card, CardError, LayoutManager};
use crate::pages::Chapter;

/// Name, description, icon and tags of one topic card.
type Topic = (&'static str, &'static str, &'static str, [&'static str; 2]);

const MECHANICS: &[Topic] = &[
    ("直线运动", "匀速、匀变速直线运动", "🚀", ["必修一", "运动学"]),
    ("相互作用", "力、力的合成与分解", "⚖️", ["必修一", "静力学"]),
    ("牛顿运动定律", "牛顿三定律及应用", "🍎", ["必修一", "动力学"]),
    ("曲线运动", "平抛、圆周运动", "🎯", ["必修二", "运动学"]),
    ("万有引力", "万有引力定律、天体运动", "🌍", ["必修二", "天体"]),
    ("机械能守恒", "功、能、机械能守恒", "⚡", ["必修二", "能量"]),
    ("动量", "动量、冲量、动量守恒", "💥", ["选择性必修一", "守恒"]),
    ("机械振动", "简谐振动、单摆", "〰️", ["选择性必修一", "振动"]),
];

const ELECTROMAGNETISM: &[Topic] = &[
    ("电场", "电场强度、电势", "⚡", ["必修三", "静电"]),
    ("电流", "电路、欧姆定律", "🔌", ["必修三", "电路"]),
    ("磁场", "磁场、洛伦兹力", "🧲", ["选择性必修二", "磁学"]),
    ("电磁感应", "法拉第定律、楞次定律", "🔄", ["选择性必修二", "感应"]),
    ("交变电流", "交流电、变压器", "📊", ["选择性必修二", "交流"]),
];

const THERMO_OPTICS: &[Topic] = &[
    ("光学", "几何光学、物理光学", "🌈", ["选择性必修一", "波动"]),
    ("热学", "热力学定律、理想气体", "🌡️", ["选择性必修三", "热力学"]),
];

const MODERN: &[Topic] = &[
    ("原子物理", "原子结构、核物理", "⚛️", ["选择性必修三", "量子"]),
];

pub fn build(docs_base_url: &str) -> Result<Chapter, CardError> {
    let mut chapter = Chapter::new("home", "⚛️ QuantPhysics 量化物理");
    chapter.body(vec![
        Node::text("本应用展示高中物理各个专题的交互式学习内容，帮助你直观理解物理概念。"),
        Node::Link {
            label: "📚 参考文档".to_string(),
            url: docs_base_url.to_string(),
        },
    ]);

    let mut stats = LayoutManager::new("overview", 4, docs_base_url)?;
    for (value, label) in [
        ("16", "物理专题"),
        ("50+", "交互仿真"),
        ("100+", "核心公式"),
        ("∞", "学习乐趣"),
    ] {
        stats.place_card(metric_card(label, value, None))?;
    }
    chapter.grid(stats.finish());

    for (category, heading, topics) in [
        ("mechanics", "📁 力学", MECHANICS),
        ("electromagnetism", "📁 电磁学", ELECTROMAGNETISM),
        ("thermo_optics", "📁 热学与光学", THERMO_OPTICS),
        ("modern", "📁 近代物理", MODERN),
    ] {
        chapter.heading(heading);
        let mut layout = LayoutManager::new(category, 2, docs_base_url)?;
        for (name, desc, icon, tags) in topics {
            layout.place_card(topic_card(icon, name, desc, tags))?;
        }
        chapter.grid(layout.finish());
    }

    chapter.heading("🚀 快速入门");
    let mut guide = LayoutManager::new("guide", 2, docs_base_url)?;
    guide.place_card(Card::from_nodes(
        "📖 学习建议",
        vec![
            Node::text("推荐的学习路径："),
            Node::List(vec![
                "先阅读概念讲解，理解物理原理".to_string(),
                "对照公式卡片，记住核心关系".to_string(),
                "完成思考题，巩固知识".to_string(),
            ]),
            Node::Divider,
            Node::caption("每个专题都配有思考题。"),
        ],
    ))?;
    guide.place_card(Card::from_nodes(
        "🎮 使用方法",
        vec![
            Node::text("在下方键盘中选择专题即可打开对应章节。"),
            Node::text("点选答案后会立即给出反馈，答错时可展开查看解析。"),
        ],
    ))?;
    chapter.grid(guide.finish());

    Ok(chapter)
}
