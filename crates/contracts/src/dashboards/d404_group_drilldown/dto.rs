use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::taxonomy::{LevelId, TAXONOMY};

/// Период фильтра (обе границы включительно)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Global dashboard filters. Read-only for the navigator: any change resets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbientFilters {
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub exclude_employees: bool,
    #[serde(default)]
    pub supervisors: Vec<String>,
    #[serde(default)]
    pub sellers: Vec<String>,
    #[serde(default)]
    pub customer_groups: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub clients: Vec<String>,
    #[serde(default)]
    pub search_term: Option<String>,
}

impl AmbientFilters {
    /// Search term with surrounding whitespace removed, None when blank
    pub fn normalized_search(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Количество активных фильтров (для бейджа)
    pub fn active_count(&self) -> usize {
        let lists = [
            &self.supervisors,
            &self.sellers,
            &self.customer_groups,
            &self.regions,
            &self.clients,
        ];
        lists.iter().filter(|l| !l.is_empty()).count()
            + usize::from(self.date_range.is_some())
            + usize::from(self.exclude_employees)
            + usize::from(self.normalized_search().is_some())
    }
}

/// Group row of a panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelItem {
    /// Stable identity, chained into parent paths
    pub key: String,
    pub name: String,
    /// Aggregate amount
    pub value: f64,
}

/// Строка заказа (терминальный уровень)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafRecord {
    pub key: String,
    pub name: String,
    pub value: f64,
    pub quantity: f64,
    pub unit_price: f64,
    pub avg_unit_price: f64,
    pub payment_condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrilldownRow {
    Group(PanelItem),
    LeafLine(LeafRecord),
}

/// POST /api/d404/root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootRequest {
    #[serde(flatten)]
    pub filters: AmbientFilters,
    /// Only groups from the predefined list
    #[serde(default)]
    pub predefined_groups_only: bool,
}

/// POST /api/d404/level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRequest {
    /// Requested level, 2..=5 (1 is the root request)
    pub level: u8,
    /// Selected keys from the root down to the parent of `level`
    pub parent_keys: Vec<String>,
    #[serde(flatten)]
    pub filters: AmbientFilters,
}

impl LevelRequest {
    /// Check level bounds and parent path length; returns the requested level.
    pub fn validate(&self) -> Result<LevelId, String> {
        let level = LevelId::from_wire_level(self.level)
            .filter(|id| id.ordinal() > 0)
            .ok_or_else(|| {
                format!(
                    "level must be between 2 and {}, got {}",
                    TAXONOMY.len(),
                    self.level
                )
            })?;

        if self.parent_keys.len() != level.ordinal() {
            return Err(format!(
                "level {} expects {} parent keys, got {}",
                self.level,
                level.ordinal(),
                self.parent_keys.len()
            ));
        }

        if let Some(pos) = self.parent_keys.iter().position(|k| k.trim().is_empty()) {
            return Err(format!("parent key #{} is empty", pos + 1));
        }

        Ok(level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Aggregation service unreachable or answered garbage
    Transport,
    /// Aggregation service answered with an explicit error payload
    Application,
}

/// Tri-state answer of both drill-down endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DrilldownResponse {
    Ok { rows: Vec<DrilldownRow> },
    Empty,
    Error { kind: ErrorKind, message: String },
}

impl DrilldownResponse {
    pub fn from_rows(rows: Vec<DrilldownRow>) -> Self {
        if rows.is_empty() {
            DrilldownResponse::Empty
        } else {
            DrilldownResponse::Ok { rows }
        }
    }

    pub fn application_error(message: impl Into<String>) -> Self {
        DrilldownResponse::Error {
            kind: ErrorKind::Application,
            message: message.into(),
        }
    }

    pub fn transport_error(message: impl Into<String>) -> Self {
        DrilldownResponse::Error {
            kind: ErrorKind::Transport,
            message: message.into(),
        }
    }
}
