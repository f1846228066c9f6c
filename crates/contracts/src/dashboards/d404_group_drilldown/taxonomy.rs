use serde::{Deserialize, Serialize};

/// Уровни иерархии навигатора по группам клиентов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelId {
    Groups,
    Clients,
    Dates,
    Orders,
    Products,
}

impl LevelId {
    /// 0-based position in [`TAXONOMY`]
    pub fn ordinal(&self) -> usize {
        match self {
            LevelId::Groups => 0,
            LevelId::Clients => 1,
            LevelId::Dates => 2,
            LevelId::Orders => 3,
            LevelId::Products => 4,
        }
    }

    /// Level number as sent to the aggregation endpoints (1 = root)
    pub fn wire_level(&self) -> u8 {
        self.ordinal() as u8 + 1
    }

    /// Парсинг из номера уровня запроса
    pub fn from_wire_level(level: u8) -> Option<Self> {
        TAXONOMY
            .iter()
            .find(|def| def.id.wire_level() == level)
            .map(|def| def.id)
    }

    pub fn def(&self) -> &'static LevelDef {
        &TAXONOMY[self.ordinal()]
    }

    pub fn title(&self) -> &'static str {
        self.def().title
    }

    pub fn is_leaf(&self) -> bool {
        self.def().is_leaf
    }
}

/// Описание уровня иерархии
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelDef {
    pub id: LevelId,
    /// Заголовок панели
    pub title: &'static str,
    /// Терминальный уровень: строки заказов, а не группируемые категории
    pub is_leaf: bool,
}

/// Fixed drill-down order. Exactly one leaf, and it is last.
pub const TAXONOMY: [LevelDef; 5] = [
    LevelDef {
        id: LevelId::Groups,
        title: "Группы клиентов",
        is_leaf: false,
    },
    LevelDef {
        id: LevelId::Clients,
        title: "Клиенты",
        is_leaf: false,
    },
    LevelDef {
        id: LevelId::Dates,
        title: "Даты",
        is_leaf: false,
    },
    LevelDef {
        id: LevelId::Orders,
        title: "Заказы",
        is_leaf: false,
    },
    LevelDef {
        id: LevelId::Products,
        title: "Товары",
        is_leaf: true,
    },
];

pub fn root_level() -> &'static LevelDef {
    &TAXONOMY[0]
}

/// Level fetched when an item of the level at `ordinal` is selected
pub fn child_of(ordinal: usize) -> Option<&'static LevelDef> {
    TAXONOMY.get(ordinal + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_order() {
        let ids: Vec<LevelId> = TAXONOMY.iter().map(|d| d.id).collect();
        assert_eq!(
            ids,
            vec![
                LevelId::Groups,
                LevelId::Clients,
                LevelId::Dates,
                LevelId::Orders,
                LevelId::Products
            ]
        );
        for (i, def) in TAXONOMY.iter().enumerate() {
            assert_eq!(def.id.ordinal(), i);
            assert_eq!(def.id.wire_level() as usize, i + 1);
        }
    }

    #[test]
    fn test_only_last_level_is_leaf() {
        let leaves: Vec<&LevelDef> = TAXONOMY.iter().filter(|d| d.is_leaf).collect();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].id, LevelId::Products);
    }

    #[test]
    fn test_child_of() {
        assert_eq!(child_of(0).map(|d| d.id), Some(LevelId::Clients));
        assert_eq!(child_of(3).map(|d| d.id), Some(LevelId::Products));
        assert!(child_of(4).is_none());
        assert_eq!(root_level().id, LevelId::Groups);
    }

    #[test]
    fn test_from_wire_level() {
        assert_eq!(LevelId::from_wire_level(1), Some(LevelId::Groups));
        assert_eq!(LevelId::from_wire_level(5), Some(LevelId::Products));
        assert_eq!(LevelId::from_wire_level(0), None);
        assert_eq!(LevelId::from_wire_level(6), None);
        assert_eq!(LevelId::Dates.title(), "Даты");
    }
}
