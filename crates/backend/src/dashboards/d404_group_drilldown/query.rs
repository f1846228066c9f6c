//! Translation of navigator requests into aggregation service queries.
//!
//! One navigator request always maps to exactly one query. The query shape
//! follows the `/load` endpoint of the aggregation service:
//! `{measures, dimensions, filters, timeDimensions, order, limit}`.

use contracts::dashboards::d404_group_drilldown::{AmbientFilters, LevelId, TAXONOMY};
use serde::Serialize;

use crate::shared::config::{LevelMembersConfig, MemberConfig, TimeGranularity};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationQuery {
    pub measures: Vec<String>,
    pub dimensions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<MemberFilter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub time_dimensions: Vec<TimeDimension>,
    /// Serialized as `[["member", "asc"], ...]`
    pub order: Vec<(String, SortDirection)>,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberFilter {
    pub member: String,
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeDimension {
    pub dimension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granularity: Option<TimeGranularity>,
    /// Inclusive `YYYY-MM-DD` bounds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<[String; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

pub struct QueryBuilder<'a> {
    members: &'a MemberConfig,
    levels: &'a LevelMembersConfig,
    row_limit: u32,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(members: &'a MemberConfig, levels: &'a LevelMembersConfig, row_limit: u32) -> Self {
        Self {
            members,
            levels,
            row_limit,
        }
    }

    /// Root panel: customer groups under the ambient filters
    pub fn root(&self, filters: &AmbientFilters, predefined_groups_only: bool) -> AggregationQuery {
        let mut query = self.level(LevelId::Groups, &[], filters);
        if predefined_groups_only {
            query.filters.push(equals(&self.members.predefined_group, vec!["true".into()]));
        }
        query
    }

    /// Any level; `parent_keys[i]` narrows the key member of `TAXONOMY[i]`.
    /// Time levels are grouped through `timeDimensions`, and a selected
    /// bucket narrows that time dimension to the bucket's date.
    pub fn level(
        &self,
        level: LevelId,
        parent_keys: &[String],
        filters: &AmbientFilters,
    ) -> AggregationQuery {
        let mut time_dimensions: Vec<TimeDimension> = filters
            .date_range
            .as_ref()
            .map(|range| {
                vec![TimeDimension {
                    dimension: self.members.date.clone(),
                    granularity: None,
                    date_range: Some([
                        range.from.format("%Y-%m-%d").to_string(),
                        range.to.format("%Y-%m-%d").to_string(),
                    ]),
                }]
            })
            .unwrap_or_default();

        let level_members = self.levels.for_level(level);
        let mut dimensions = Vec::new();
        match level_members.granularity {
            Some(granularity) => {
                time_dimension_for(&mut time_dimensions, &level_members.key).granularity =
                    Some(granularity)
            }
            None => dimensions.push(level_members.key.clone()),
        }
        if level_members.name_member() != level_members.key {
            dimensions.push(level_members.name_member().to_string());
        }

        let mut measures = vec![self.members.amount.clone()];
        if level.is_leaf() {
            // One row per order line: the line key stays in the dimensions,
            // so the service never merges lines.
            measures.push(self.members.quantity.clone());
            measures.push(self.members.avg_unit_price.clone());
            dimensions.push(self.members.unit_price.clone());
            dimensions.push(self.members.payment_condition.clone());
        }

        let mut query_filters = Vec::new();
        for (def, key) in TAXONOMY.iter().zip(parent_keys) {
            let parent = self.levels.for_level(def.id);
            if parent.granularity.is_some() {
                time_dimension_for(&mut time_dimensions, &parent.key).date_range =
                    Some([key.clone(), key.clone()]);
            } else {
                query_filters.push(equals(&parent.key, vec![key.clone()]));
            }
        }
        query_filters.extend(self.ambient_filters(filters));

        AggregationQuery {
            measures,
            dimensions,
            filters: query_filters,
            time_dimensions,
            order: vec![self.order_for(level)],
            limit: self.row_limit,
        }
    }

    fn ambient_filters(&self, filters: &AmbientFilters) -> Vec<MemberFilter> {
        let mut result = Vec::new();

        if filters.exclude_employees {
            result.push(equals(&self.members.employee_flag, vec!["false".into()]));
        }

        let lists = [
            (&self.members.supervisor, &filters.supervisors),
            (&self.members.seller, &filters.sellers),
            (&self.levels.groups.key, &filters.customer_groups),
            (&self.members.region, &filters.regions),
            (&self.levels.clients.key, &filters.clients),
        ];
        for (member, values) in lists {
            if !values.is_empty() {
                result.push(equals(member, values.clone()));
            }
        }

        if let Some(term) = filters.normalized_search() {
            result.push(MemberFilter {
                member: self.levels.clients.name_member().to_string(),
                operator: FilterOperator::Contains,
                values: vec![term.to_string()],
            });
        }

        result
    }

    fn order_for(&self, level: LevelId) -> (String, SortDirection) {
        match level {
            LevelId::Groups | LevelId::Clients => (self.members.amount.clone(), SortDirection::Desc),
            LevelId::Dates | LevelId::Orders | LevelId::Products => (
                self.levels.for_level(level).key.clone(),
                SortDirection::Asc,
            ),
        }
    }
}

/// Entry for `member`, appended when missing
fn time_dimension_for<'q>(
    list: &'q mut Vec<TimeDimension>,
    member: &str,
) -> &'q mut TimeDimension {
    let index = match list.iter().position(|td| td.dimension == member) {
        Some(index) => index,
        None => {
            list.push(TimeDimension {
                dimension: member.to_string(),
                granularity: None,
                date_range: None,
            });
            list.len() - 1
        }
    };
    &mut list[index]
}

fn equals(member: &str, values: Vec<String>) -> MemberFilter {
    MemberFilter {
        member: member.to_string(),
        operator: FilterOperator::Equals,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::default_config;
    use chrono::NaiveDate;
    use contracts::dashboards::d404_group_drilldown::DateRange;
    use serde_json::json;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_root_query() {
        let config = default_config().unwrap();
        let builder = QueryBuilder::new(&config.members, &config.levels, 100);

        let query = builder.root(&AmbientFilters::default(), true);
        assert_eq!(query.dimensions, vec!["Sales.customerGroup"]);
        assert_eq!(query.measures, vec!["Sales.amount"]);
        assert_eq!(
            query.filters,
            vec![equals("Sales.isPredefinedGroup", vec!["true".into()])]
        );
        assert_eq!(
            query.order,
            vec![("Sales.amount".to_string(), SortDirection::Desc)]
        );
        assert_eq!(query.limit, 100);

        let unrestricted = builder.root(&AmbientFilters::default(), false);
        assert!(unrestricted.filters.is_empty());
    }

    #[test]
    fn test_parent_path_becomes_ordered_filters() {
        let config = default_config().unwrap();
        let builder = QueryBuilder::new(&config.members, &config.levels, 100);

        let query = builder.level(
            LevelId::Dates,
            &keys(&["g1", "c1"]),
            &AmbientFilters::default(),
        );
        assert!(query.dimensions.is_empty());
        assert_eq!(
            query.filters,
            vec![
                equals("Sales.customerGroup", vec!["g1".into()]),
                equals("Sales.clientCode", vec!["c1".into()]),
            ]
        );
        assert_eq!(
            query.order,
            vec![("Sales.date".to_string(), SortDirection::Asc)]
        );
    }

    #[test]
    fn test_dates_are_grouped_by_day() {
        let config = default_config().unwrap();
        let builder = QueryBuilder::new(&config.members, &config.levels, 100);
        let filters = AmbientFilters {
            date_range: Some(DateRange {
                from: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            }),
            ..Default::default()
        };

        let dates = builder.level(LevelId::Dates, &keys(&["g1", "c1"]), &filters);
        let value = serde_json::to_value(&dates).unwrap();
        assert_eq!(
            value["timeDimensions"],
            json!([{
                "dimension": "Sales.date",
                "granularity": "day",
                "dateRange": ["2024-03-01", "2024-03-31"]
            }])
        );
        assert_eq!(value["dimensions"], json!([]));

        // The selected day narrows the time dimension instead of an equals filter
        let orders = builder.level(
            LevelId::Orders,
            &keys(&["g1", "c1", "2024-03-15"]),
            &filters,
        );
        assert_eq!(
            orders.time_dimensions,
            vec![TimeDimension {
                dimension: "Sales.date".into(),
                granularity: None,
                date_range: Some(["2024-03-15".into(), "2024-03-15".into()]),
            }]
        );
        assert!(orders.filters.iter().all(|f| f.member != "Sales.date"));
        assert_eq!(orders.dimensions, vec!["Sales.orderNumber"]);

        let leaf = builder.level(
            LevelId::Products,
            &keys(&["g1", "c1", "2024-03-15", "P-7"]),
            &AmbientFilters::default(),
        );
        let value = serde_json::to_value(&leaf).unwrap();
        assert_eq!(
            value["timeDimensions"],
            json!([{"dimension": "Sales.date", "dateRange": ["2024-03-15", "2024-03-15"]}])
        );
    }

    #[test]
    fn test_leaf_query_keeps_lines_apart() {
        let config = default_config().unwrap();
        let builder = QueryBuilder::new(&config.members, &config.levels, 100);

        let query = builder.level(
            LevelId::Products,
            &keys(&["g1", "c1", "2024-03-15", "P-7"]),
            &AmbientFilters::default(),
        );
        assert_eq!(
            query.dimensions,
            vec![
                "Sales.lineId",
                "Sales.productName",
                "Sales.unitPrice",
                "Sales.paymentCondition"
            ]
        );
        assert_eq!(
            query.measures,
            vec!["Sales.amount", "Sales.quantity", "Sales.avgUnitPrice"]
        );
        assert_eq!(query.filters.len(), 3);
        assert_eq!(query.filters[2], equals("Sales.orderNumber", vec!["P-7".into()]));
    }

    #[test]
    fn test_ambient_filters_mapping() {
        let config = default_config().unwrap();
        let builder = QueryBuilder::new(&config.members, &config.levels, 100);
        let filters = AmbientFilters {
            date_range: Some(DateRange {
                from: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            }),
            exclude_employees: true,
            sellers: keys(&["S1", "S2"]),
            regions: keys(&["Norte"]),
            search_term: Some("  acme ".into()),
            ..Default::default()
        };

        let query = builder.level(LevelId::Clients, &keys(&["g1"]), &filters);
        let value = serde_json::to_value(&query).unwrap();

        assert_eq!(
            value["timeDimensions"],
            json!([{"dimension": "Sales.date", "dateRange": ["2024-03-01", "2024-03-31"]}])
        );
        assert_eq!(
            value["filters"],
            json!([
                {"member": "Sales.customerGroup", "operator": "equals", "values": ["g1"]},
                {"member": "Sales.isEmployee", "operator": "equals", "values": ["false"]},
                {"member": "Sales.sellerCode", "operator": "equals", "values": ["S1", "S2"]},
                {"member": "Sales.region", "operator": "equals", "values": ["Norte"]},
                {"member": "Sales.clientName", "operator": "contains", "values": ["acme"]}
            ])
        );
        assert_eq!(value["order"], json!([["Sales.amount", "desc"]]));
        assert_eq!(
            value["dimensions"],
            json!(["Sales.clientCode", "Sales.clientName"])
        );
    }
}
