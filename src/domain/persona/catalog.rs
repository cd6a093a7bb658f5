//! Static persona catalog, built once at startup.

use once_cell::sync::Lazy;

use super::archetype::{AgeRange, CommunicationStyle, GenderDistribution, PersonaArchetype};

/// Read-only catalog of customer archetypes.
///
/// Loaded once and never mutated, so it is safe under unbounded concurrent
/// readers without synchronization. Iteration order is the authoring order
/// and is the tie-break for recommendation.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    archetypes: Vec<PersonaArchetype>,
}

static BUILTIN: Lazy<PersonaCatalog> = Lazy::new(PersonaCatalog::build_builtin);

impl PersonaCatalog {
    /// The built-in catalog shared across the process.
    pub fn shared() -> &'static PersonaCatalog {
        &BUILTIN
    }

    /// Creates a catalog from explicit archetypes (tests, future data files).
    pub fn new(archetypes: Vec<PersonaArchetype>) -> Self {
        Self { archetypes }
    }

    /// Archetypes in stable catalog order.
    pub fn archetypes(&self) -> &[PersonaArchetype] {
        &self.archetypes
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Looks up an archetype by id.
    pub fn get(&self, id: &str) -> Option<&PersonaArchetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }

    fn build_builtin() -> Self {
        let archetypes = vec![
            PersonaArchetype {
                id: "rational-expert".into(),
                name: "理性专家型".into(),
                description: "有专业背景的客户,习惯用证据和数据说话,对夸大宣传高度警惕,认可专业性后忠诚度高。".into(),
                traits: chinese(&["理性", "专业", "严谨", "求实"]),
                professions: chinese(&["医生", "药剂师", "研究员", "大学教师"]),
                communication_style: CommunicationStyle::Analytical,
                decision_style: "基于证据充分比较后才做决定".into(),
                focus_points: chinese(&["产品功效", "临床数据", "安全性", "作用机制"]),
                age_range: AgeRange::new(32, 58),
                gender: GenderDistribution::new(0.5),
                hobbies: chinese(&["阅读文献", "慢跑", "下棋"]),
                directives: chinese(&[
                    "对任何功效表述都追问数据来源和依据",
                    "使用专业术语提问,检验销售的知识深度",
                ]),
            },
            PersonaArchetype {
                id: "cautious-conservative".into(),
                name: "谨慎保守型".into(),
                description: "风险厌恶的客户,担心买错、被骗或售后无门,需要反复确认细节才会考虑购买。".into(),
                traits: chinese(&["谨慎", "保守", "多虑", "温和"]),
                professions: chinese(&["会计师", "中学教师", "公务员", "图书管理员"]),
                communication_style: CommunicationStyle::Amiable,
                decision_style: "反复权衡,倾向于推迟决定".into(),
                focus_points: chinese(&["价格", "售后服务", "风险", "口碑"]),
                age_range: AgeRange::new(38, 65),
                gender: GenderDistribution::new(0.4),
                hobbies: chinese(&["养花", "散步", "看电视剧"]),
                directives: chinese(&[
                    "多次表达对风险和售后的担忧",
                    "不轻易说同意,用\"再想想\"拖延",
                ]),
            },
            PersonaArchetype {
                id: "dominant-decider".into(),
                name: "强势果断型".into(),
                description: "掌握决策权的客户,时间宝贵,直奔主题,喜欢掌控谈话节奏,对绕弯子的销售没有耐心。".into(),
                traits: chinese(&["强势", "果断", "自信", "急躁"]),
                professions: chinese(&["企业主", "销售总监", "采购经理", "律师"]),
                communication_style: CommunicationStyle::Direct,
                decision_style: "快速判断,当场拍板".into(),
                focus_points: chinese(&["效率", "投资回报", "竞品对比", "核心优势"]),
                age_range: AgeRange::new(35, 55),
                gender: GenderDistribution::new(0.7),
                hobbies: chinese(&["高尔夫", "商业新闻", "健身"]),
                directives: chinese(&[
                    "频繁打断对方,要求直接给结论",
                    "主动质疑和反驳销售的观点,给对方施加压力",
                ]),
            },
            PersonaArchetype {
                id: "social-expressive".into(),
                name: "热情社交型".into(),
                description: "感性消费的客户,容易被故事和氛围打动,话多且容易跑题,但决定可能一时冲动也可能随时反悔。".into(),
                traits: chinese(&["热情", "健谈", "感性", "随性"]),
                professions: chinese(&["设计师", "市场专员", "自媒体博主", "培训师"]),
                communication_style: CommunicationStyle::Expressive,
                decision_style: "凭感觉和好感度决定".into(),
                focus_points: chinese(&["品牌形象", "用户口碑", "潮流", "体验感"]),
                age_range: AgeRange::new(24, 40),
                gender: GenderDistribution::new(0.3),
                hobbies: chinese(&["旅行", "摄影", "美食探店"]),
                directives: chinese(&[
                    "经常把话题扯到自己的生活见闻上",
                    "对打动你的表述给出热烈回应,对平淡的介绍表现出走神",
                ]),
            },
            PersonaArchetype {
                id: "skeptical-bargainer".into(),
                name: "挑剔比价型".into(),
                description: "精打细算的客户,对价格极其敏感,开口必谈竞品和优惠,习惯性压价,对销售话术有天然戒心。".into(),
                traits: chinese(&["挑剔", "精明", "怀疑", "务实"]),
                professions: chinese(&["采购员", "个体店主", "家庭主妇", "餐饮老板"]),
                communication_style: CommunicationStyle::Direct,
                decision_style: "货比三家,压到底价才买".into(),
                focus_points: chinese(&["价格", "竞品对比", "优惠活动", "性价比"]),
                age_range: AgeRange::new(30, 60),
                gender: GenderDistribution::new(0.45),
                hobbies: chinese(&["逛市场", "记账", "团购"]),
                directives: chinese(&[
                    "反复拿竞品的价格和赠品做比较",
                    "对每个卖点都追问\"值这个价吗\"",
                ]),
            },
            PersonaArchetype {
                id: "silent-observer".into(),
                name: "沉默观望型".into(),
                description: "内向寡言的客户,很少主动表达需求,回答简短,需要销售主动挖掘才能了解真实想法。".into(),
                traits: chinese(&["内向", "沉默", "观望", "细心"]),
                professions: chinese(&["工程师", "程序员", "质检员", "绘图员"]),
                communication_style: CommunicationStyle::Analytical,
                decision_style: "私下研究清楚后才表态".into(),
                focus_points: chinese(&["技术参数", "可靠性", "使用细节", "兼容性"]),
                age_range: AgeRange::new(26, 45),
                gender: GenderDistribution::new(0.75),
                hobbies: chinese(&["装机", "钓鱼", "模型"]),
                directives: chinese(&[
                    "回答尽量简短,不主动透露需求",
                    "只有被问到具体技术细节时才展开说",
                ]),
            },
        ];

        Self { archetypes }
    }
}

fn chinese(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_not_empty() {
        let catalog = PersonaCatalog::shared();
        assert!(catalog.len() >= 4);
    }

    #[test]
    fn builtin_ids_are_unique() {
        let catalog = PersonaCatalog::shared();
        let mut ids: Vec<_> = catalog.archetypes().iter().map(|a| &a.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn get_finds_archetype_by_id() {
        let catalog = PersonaCatalog::shared();
        let found = catalog.get("rational-expert").unwrap();
        assert_eq!(found.name, "理性专家型");
        assert!(catalog.get("no-such-persona").is_none());
    }

    #[test]
    fn every_archetype_is_fully_authored() {
        for archetype in PersonaCatalog::shared().archetypes() {
            assert!(!archetype.description.is_empty(), "{}", archetype.id);
            assert!(!archetype.traits.is_empty(), "{}", archetype.id);
            assert!(!archetype.professions.is_empty(), "{}", archetype.id);
            assert!(!archetype.focus_points.is_empty(), "{}", archetype.id);
            assert!(!archetype.directives.is_empty(), "{}", archetype.id);
            assert!(archetype.age_range.min < archetype.age_range.max);
        }
    }

    #[test]
    fn shared_returns_same_instance() {
        let a = PersonaCatalog::shared() as *const _;
        let b = PersonaCatalog::shared() as *const _;
        assert_eq!(a, b);
    }
}
