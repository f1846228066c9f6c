use std::collections::HashMap;

use chrono::NaiveDate;
use contracts::dashboards::d404_group_drilldown::{
    DrilldownResponse, DrilldownRow, LeafRecord, LevelId, LevelRequest, PanelItem, RootRequest,
};
use once_cell::sync::OnceCell;
use serde_json::Value;

use super::client::{AggregationSource, HttpAggregationSource, UpstreamRow};
use super::query::{AggregationQuery, QueryBuilder};
use crate::shared::config::{Config, LevelMembersConfig, MemberConfig};

static RESOLVER: OnceCell<LevelResolver> = OnceCell::new();

/// Build the process-wide resolver from configuration. Called once from `main`.
pub fn initialize_resolver(config: &Config) -> anyhow::Result<()> {
    let source = HttpAggregationSource::new(&config.aggregation)?;
    RESOLVER
        .set(LevelResolver::new(Box::new(source), config))
        .map_err(|_| anyhow::anyhow!("Level resolver is already initialized"))?;
    tracing::info!(
        "D404: aggregation service at {}",
        config.aggregation.base_url
    );
    Ok(())
}

pub fn get_resolver() -> Option<&'static LevelResolver> {
    RESOLVER.get()
}

/// Translates navigator requests into aggregation queries and normalizes
/// the answer into the tri-state [`DrilldownResponse`]. Never returns `Err`.
pub struct LevelResolver {
    source: Box<dyn AggregationSource>,
    members: MemberConfig,
    levels: LevelMembersConfig,
    row_limit: u32,
}

impl LevelResolver {
    pub fn new(source: Box<dyn AggregationSource>, config: &Config) -> Self {
        Self {
            source,
            members: config.members.clone(),
            levels: config.levels.clone(),
            row_limit: config.aggregation.row_limit,
        }
    }

    fn builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.members, &self.levels, self.row_limit)
    }

    pub async fn resolve_root(&self, request: &RootRequest) -> DrilldownResponse {
        let query = self
            .builder()
            .root(&request.filters, request.predefined_groups_only);
        self.run(LevelId::Groups, query).await
    }

    pub async fn resolve_level(&self, request: &LevelRequest) -> DrilldownResponse {
        let level = match request.validate() {
            Ok(level) => level,
            Err(message) => {
                tracing::warn!("D404: rejected level request: {}", message);
                return DrilldownResponse::application_error(message);
            }
        };
        let query = self
            .builder()
            .level(level, &request.parent_keys, &request.filters);
        self.run(level, query).await
    }

    async fn run(&self, level: LevelId, query: AggregationQuery) -> DrilldownResponse {
        match self.source.load(&query).await {
            Ok(rows) => {
                let total = rows.len();
                let (normalized, skipped) = self.normalize_rows(level, &rows);
                if skipped > 0 {
                    tracing::warn!(
                        "D404: skipped {} of {} {:?} rows without a key",
                        skipped,
                        total,
                        level
                    );
                }
                DrilldownResponse::from_rows(normalized)
            }
            Err(e) => {
                tracing::error!("D404: aggregation query for {:?} failed: {}", level, e);
                DrilldownResponse::Error {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// Rows of one answer plus the number of keyless rows skipped.
    /// Groupable keys are unique: a repeated key adds its amount to the
    /// first row with that key. Leaf lines are never merged.
    fn normalize_rows(
        &self,
        level: LevelId,
        rows: &[UpstreamRow],
    ) -> (Vec<DrilldownRow>, usize) {
        let level_members = self.levels.for_level(level);
        let key_member = level_members.result_member();

        let mut normalized = Vec::with_capacity(rows.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0;

        for row in rows {
            let Some(raw_key) = text_of(row, &key_member) else {
                skipped += 1;
                continue;
            };
            let (key, name) = if level_members.granularity.is_some() {
                date_key_and_label(&raw_key)
            } else {
                let name = text_of(row, level_members.name_member())
                    .unwrap_or_else(|| raw_key.clone());
                (raw_key, name)
            };
            let value = number_of(row, &self.members.amount);

            if level.is_leaf() {
                normalized.push(DrilldownRow::LeafLine(LeafRecord {
                    key,
                    name,
                    value,
                    quantity: number_of(row, &self.members.quantity),
                    unit_price: number_of(row, &self.members.unit_price),
                    avg_unit_price: number_of(row, &self.members.avg_unit_price),
                    payment_condition: text_of(row, &self.members.payment_condition),
                }));
                continue;
            }

            match positions.get(&key) {
                Some(&index) => {
                    tracing::debug!("D404: merging repeated {:?} key '{}'", level, key);
                    if let DrilldownRow::Group(item) = &mut normalized[index] {
                        item.value += value;
                    }
                }
                None => {
                    positions.insert(key.clone(), normalized.len());
                    normalized.push(DrilldownRow::Group(PanelItem { key, name, value }));
                }
            }
        }

        (normalized, skipped)
    }
}

/// Non-blank textual value of a member
fn text_of(row: &UpstreamRow, member: &str) -> Option<String> {
    let text = match row.get(member)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Measures arrive as numbers or numeric strings; anything else counts as zero
fn number_of(row: &UpstreamRow, member: &str) -> f64 {
    match row.get(member) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// `2024-03-15T00:00:00.000` -> (`2024-03-15`, `15.03.2024`)
fn date_key_and_label(raw: &str) -> (String, String) {
    let key: String = raw.chars().take(10).collect();
    match NaiveDate::parse_from_str(&key, "%Y-%m-%d") {
        Ok(date) => (key, date.format("%d.%m.%Y").to_string()),
        Err(_) => (raw.to_string(), raw.to_string()),
    }
}
