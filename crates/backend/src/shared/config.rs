use contracts::dashboards::d404_group_drilldown::LevelId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub aggregation: AggregationConfig,
    pub members: MemberConfig,
    pub levels: LevelMembersConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Connection to the remote aggregation service
#[derive(Debug, Deserialize, Clone)]
pub struct AggregationConfig {
    /// Base URL, `/load` is appended
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_token: Option<String>,
    /// Upper bound of rows per query
    pub row_limit: u32,
}

/// Measures and filter dimensions of the sales cube
#[derive(Debug, Deserialize, Clone)]
pub struct MemberConfig {
    pub amount: String,
    pub quantity: String,
    pub unit_price: String,
    pub avg_unit_price: String,
    pub payment_condition: String,
    pub date: String,
    pub employee_flag: String,
    pub supervisor: String,
    pub seller: String,
    pub region: String,
    pub predefined_group: String,
}

/// Key/name dimensions of one drill-down level
#[derive(Debug, Deserialize, Clone)]
pub struct LevelMembers {
    pub key: String,
    /// Display dimension; the key is shown when absent
    #[serde(default)]
    pub name: Option<String>,
    /// Set for time members: the level lists buckets of the key member
    #[serde(default)]
    pub granularity: Option<TimeGranularity>,
}

/// Bucket size of a time level. Bucket keys are `YYYY-MM-DD`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeGranularity {
    Day,
}

impl TimeGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeGranularity::Day => "day",
        }
    }
}

impl LevelMembers {
    pub fn name_member(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    /// Member the service answers with: `Sales.date.day` for a daily time
    /// level, the key member otherwise
    pub fn result_member(&self) -> String {
        match self.granularity {
            Some(granularity) => format!("{}.{}", self.key, granularity.as_str()),
            None => self.key.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LevelMembersConfig {
    pub groups: LevelMembers,
    pub clients: LevelMembers,
    pub dates: LevelMembers,
    pub orders: LevelMembers,
    pub products: LevelMembers,
}

impl LevelMembersConfig {
    pub fn for_level(&self, level: LevelId) -> &LevelMembers {
        match level {
            LevelId::Groups => &self.groups,
            LevelId::Clients => &self.clients,
            LevelId::Dates => &self.dates,
            LevelId::Orders => &self.orders,
            LevelId::Products => &self.products,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[aggregation]
base_url = "http://127.0.0.1:4000/cubejs-api/v1"
timeout_secs = 30
row_limit = 5000

[members]
amount = "Sales.amount"
quantity = "Sales.quantity"
unit_price = "Sales.unitPrice"
avg_unit_price = "Sales.avgUnitPrice"
payment_condition = "Sales.paymentCondition"
date = "Sales.date"
employee_flag = "Sales.isEmployee"
supervisor = "Sales.supervisorCode"
seller = "Sales.sellerCode"
region = "Sales.region"
predefined_group = "Sales.isPredefinedGroup"

[levels.groups]
key = "Sales.customerGroup"

[levels.clients]
key = "Sales.clientCode"
name = "Sales.clientName"

[levels.dates]
key = "Sales.date"
granularity = "day"

[levels.orders]
key = "Sales.orderNumber"

[levels.products]
key = "Sales.lineId"
name = "Sales.productName"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn default_config() -> anyhow::Result<Config> {
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config: Config = toml::from_str(contents)?;
    // An empty token in config.toml means "no auth header"
    if config
        .aggregation
        .api_token
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        config.aggregation.api_token = None;
    }
    if config.aggregation.row_limit == 0 {
        anyhow::bail!("aggregation.row_limit must be positive");
    }
    Ok(config)
}
