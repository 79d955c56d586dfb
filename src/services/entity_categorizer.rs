//! 实体分组
//!
//! 按实体标签中的关键字把实体文本归入固定的几类。服务已经给出
//! `entities_by_type` 时直接使用，否则在本地按同样的规则计算。

use serde::Serialize;

use crate::models::{AnalysisResult, NamedEntity};

const ORGANIZATION_KEYWORDS: [&str; 4] = ["org", "organization", "institution", "company"];
const LOCATION_KEYWORDS: [&str; 6] = ["loc", "location", "place", "state", "city", "country"];
const PERSON_KEYWORDS: [&str; 3] = ["person", "per", "name"];
const DATE_KEYWORDS: [&str; 2] = ["date", "time"];

/// 分组后的实体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityGroups {
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
    pub persons: Vec<String>,
    pub dates: Vec<String>,
    pub other: Vec<String>,
}

impl EntityGroups {
    /// (分组名, 数量)，用于日志摘要
    pub fn counts(&self) -> [(&'static str, usize); 5] {
        [
            ("organizations", self.organizations.len()),
            ("locations", self.locations.len()),
            ("persons", self.persons.len()),
            ("dates", self.dates.len()),
            ("other", self.other.len()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.counts().iter().all(|(_, n)| *n == 0)
    }
}

/// 按标签关键字分组，匹配顺序：机构 → 地点 → 人物 → 日期 → 其他
pub fn categorize_entities(entities: &[NamedEntity]) -> EntityGroups {
    let mut groups = EntityGroups::default();

    for entity in entities {
        let label = entity.label.as_deref().unwrap_or_default().to_lowercase();
        let text = entity.text.clone().unwrap_or_default();
        let matches = |keywords: &[&str]| keywords.iter().any(|k| label.contains(k));

        if matches(&ORGANIZATION_KEYWORDS[..]) {
            groups.organizations.push(text);
        } else if matches(&LOCATION_KEYWORDS[..]) {
            groups.locations.push(text);
        } else if matches(&PERSON_KEYWORDS[..]) {
            groups.persons.push(text);
        } else if matches(&DATE_KEYWORDS[..]) {
            groups.dates.push(text);
        } else {
            groups.other.push(text);
        }
    }

    groups
}

/// 优先使用服务给出的分组
pub fn entity_groups(result: &AnalysisResult) -> EntityGroups {
    match &result.entities_by_type {
        Some(by_type) => {
            let take = |key: &str| by_type.get(key).cloned().unwrap_or_default();
            EntityGroups {
                organizations: take("organizations"),
                locations: take("locations"),
                persons: take("persons"),
                dates: take("dates"),
                other: take("other"),
            }
        }
        None => categorize_entities(&result.named_entities),
    }
}
