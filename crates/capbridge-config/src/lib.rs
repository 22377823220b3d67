pub mod error;

pub use error::*;

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Application definition endpoint of the remote capacity service
pub const DEFAULT_API_ENDPOINT: &str = "https://app.autoscalr.com/api/autoScalrApp";

/// Cluster state snapshot endpoint of the remote capacity service
pub const DEFAULT_CLUSTER_STATE_ENDPOINT: &str = "https://api.autoscalr.com/v1/k8sClusterState";

/// Environment variable that points directly at a config file
pub const CONFIG_PATH_ENV: &str = "CAPBRIDGE_CONFIG_PATH";

const LOCAL_CONFIG_FILE: &str = "capbridge.yaml";

pub const ENV_GROUP_ID: &str = "AUTOSCALING_GROUP_NAME";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_API_KEY: &str = "AUTOSCALR_API_KEY";
pub const ENV_DISPLAY_NAME: &str = "DISPLAY_NAME";
pub const ENV_MAX_SPOT_PERCENT_TOTAL: &str = "MAX_SPOT_PERCENT_TOTAL";
pub const ENV_MAX_SPOT_PERCENT_ONE_MARKET: &str = "MAX_SPOT_PERCENT_ONE_MARKET";
pub const ENV_DETAILED_MONITORING: &str = "DETAILED_MONITORING_ENABLED";
pub const ENV_MAX_HOURS_INSTANCE_AGE: &str = "MAX_HOURS_INSTANCE_AGE";
pub const ENV_INSTANCE_TYPES: &str = "INSTANCE_TYPES";
pub const ENV_TARGET_CAPACITY_VCPUS: &str = "TARGET_CAPACITY_VCPUS";
pub const ENV_TARGET_CAPACITY_INSTANCES: &str = "TARGET_CAPACITY_INSTANCES";
pub const ENV_TARGET_SPARE_CPU_PERCENT: &str = "TARGET_SPARE_CPU_PERCENT";
pub const ENV_TARGET_SPARE_MEMORY_PERCENT: &str = "TARGET_SPARE_MEMORY_PERCENT";
pub const ENV_OS_FAMILY: &str = "OS_FAMILY";
pub const ENV_API_ENDPOINT: &str = "AUTOSCALR_API_URL";
pub const ENV_CLUSTER_STATE_ENDPOINT: &str = "AUTOSCALR_CLUSTER_STATE_URL";

/// Resolved bridge configuration
///
/// Built once at startup and shared by reference. Nothing downstream reads
/// the process environment.
#[derive(Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Remote group identifier (the autoscaling group name)
    pub group_id: String,
    pub region: String,
    pub api_key: String,
    pub display_name: String,
    pub max_spot_percent_total: u32,
    pub max_spot_percent_one_market: u32,
    pub detailed_monitoring: bool,
    /// 0 means no age limit
    pub max_hours_instance_age: u32,
    /// Allowed instance types; the first entry is the base type
    pub instance_types: Vec<String>,
    pub target_capacity_vcpus: u32,
    pub target_capacity_instances: u32,
    pub target_spare_cpu_percent: u32,
    pub target_spare_memory_percent: u32,
    pub os_family: String,
    pub api_endpoint: String,
    pub cluster_state_endpoint: String,
}

impl BridgeConfig {
    /// Base instance type used for every node/vCPU conversion.
    ///
    /// Empty only for a hand-built config with no instance types.
    pub fn base_instance_type(&self) -> &str {
        self.instance_types.first().map(String::as_str).unwrap_or("")
    }

    /// Resolve from process environment variables only
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup (used by tests and embedders)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = RawConfig::default();
        raw.overlay(&lookup)?;
        raw.resolve()
    }

    /// Resolve from an optional config file overlaid with the environment.
    ///
    /// `explicit` must exist when given; otherwise the file is searched with
    /// [`find_config_file`] and may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(explicit: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = match find_config_file(explicit, &lookup)? {
            Some(path) => {
                tracing::debug!("Loading config file: {}", path.display());
                RawConfig::from_file(&path)?
            }
            None => RawConfig::default(),
        };
        raw.overlay(&lookup)?;
        raw.resolve()
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("group_id", &self.group_id)
            .field("region", &self.region)
            .field("api_key", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("max_spot_percent_total", &self.max_spot_percent_total)
            .field("max_spot_percent_one_market", &self.max_spot_percent_one_market)
            .field("detailed_monitoring", &self.detailed_monitoring)
            .field("max_hours_instance_age", &self.max_hours_instance_age)
            .field("instance_types", &self.instance_types)
            .field("target_capacity_vcpus", &self.target_capacity_vcpus)
            .field("target_capacity_instances", &self.target_capacity_instances)
            .field("target_spare_cpu_percent", &self.target_spare_cpu_percent)
            .field("target_spare_memory_percent", &self.target_spare_memory_percent)
            .field("os_family", &self.os_family)
            .field("api_endpoint", &self.api_endpoint)
            .field("cluster_state_endpoint", &self.cluster_state_endpoint)
            .finish()
    }
}

/// Partially specified configuration, as read from a YAML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub group_id: Option<String>,
    pub region: Option<String>,
    pub api_key: Option<String>,
    pub display_name: Option<String>,
    pub max_spot_percent_total: Option<u32>,
    pub max_spot_percent_one_market: Option<u32>,
    pub detailed_monitoring: Option<bool>,
    pub max_hours_instance_age: Option<u32>,
    pub instance_types: Option<Vec<String>>,
    pub target_capacity_vcpus: Option<u32>,
    pub target_capacity_instances: Option<u32>,
    pub target_spare_cpu_percent: Option<u32>,
    pub target_spare_memory_percent: Option<u32>,
    pub os_family: Option<String>,
    pub api_endpoint: Option<String>,
    pub cluster_state_endpoint: Option<String>,
}

impl RawConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overlay values from `lookup`. Blank values count as unset.
    pub fn overlay<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        overlay_string(&mut self.group_id, get(ENV_GROUP_ID));
        overlay_string(&mut self.region, get(ENV_REGION));
        overlay_string(&mut self.api_key, get(ENV_API_KEY));
        overlay_string(&mut self.display_name, get(ENV_DISPLAY_NAME));
        overlay_string(&mut self.os_family, get(ENV_OS_FAMILY));
        overlay_string(&mut self.api_endpoint, get(ENV_API_ENDPOINT));
        overlay_string(&mut self.cluster_state_endpoint, get(ENV_CLUSTER_STATE_ENDPOINT));

        overlay_u32(
            &mut self.max_spot_percent_total,
            ENV_MAX_SPOT_PERCENT_TOTAL,
            get(ENV_MAX_SPOT_PERCENT_TOTAL),
        )?;
        overlay_u32(
            &mut self.max_spot_percent_one_market,
            ENV_MAX_SPOT_PERCENT_ONE_MARKET,
            get(ENV_MAX_SPOT_PERCENT_ONE_MARKET),
        )?;
        overlay_u32(
            &mut self.max_hours_instance_age,
            ENV_MAX_HOURS_INSTANCE_AGE,
            get(ENV_MAX_HOURS_INSTANCE_AGE),
        )?;
        overlay_u32(
            &mut self.target_capacity_vcpus,
            ENV_TARGET_CAPACITY_VCPUS,
            get(ENV_TARGET_CAPACITY_VCPUS),
        )?;
        overlay_u32(
            &mut self.target_capacity_instances,
            ENV_TARGET_CAPACITY_INSTANCES,
            get(ENV_TARGET_CAPACITY_INSTANCES),
        )?;
        overlay_u32(
            &mut self.target_spare_cpu_percent,
            ENV_TARGET_SPARE_CPU_PERCENT,
            get(ENV_TARGET_SPARE_CPU_PERCENT),
        )?;
        overlay_u32(
            &mut self.target_spare_memory_percent,
            ENV_TARGET_SPARE_MEMORY_PERCENT,
            get(ENV_TARGET_SPARE_MEMORY_PERCENT),
        )?;

        if let Some(value) = get(ENV_DETAILED_MONITORING) {
            self.detailed_monitoring = Some(parse_bool(ENV_DETAILED_MONITORING, &value)?);
        }
        if let Some(value) = get(ENV_INSTANCE_TYPES) {
            self.instance_types = Some(split_instance_types(&value));
        }

        Ok(())
    }

    /// Check required values and ranges, filling defaults
    pub fn resolve(self) -> Result<BridgeConfig> {
        let instance_types: Vec<String> = self
            .instance_types
            .unwrap_or_default()
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if instance_types.is_empty() {
            return Err(ConfigError::MissingValue(ENV_INSTANCE_TYPES));
        }

        Ok(BridgeConfig {
            group_id: required(self.group_id, ENV_GROUP_ID)?,
            region: required(self.region, ENV_REGION)?,
            api_key: required(self.api_key, ENV_API_KEY)?,
            display_name: self.display_name.unwrap_or_default(),
            max_spot_percent_total: percent(
                ENV_MAX_SPOT_PERCENT_TOTAL,
                self.max_spot_percent_total,
            )?,
            max_spot_percent_one_market: percent(
                ENV_MAX_SPOT_PERCENT_ONE_MARKET,
                self.max_spot_percent_one_market,
            )?,
            detailed_monitoring: self.detailed_monitoring.unwrap_or(false),
            max_hours_instance_age: self.max_hours_instance_age.unwrap_or(0),
            instance_types,
            target_capacity_vcpus: self.target_capacity_vcpus.unwrap_or(0),
            target_capacity_instances: self.target_capacity_instances.unwrap_or(0),
            target_spare_cpu_percent: percent(
                ENV_TARGET_SPARE_CPU_PERCENT,
                self.target_spare_cpu_percent,
            )?,
            target_spare_memory_percent: percent(
                ENV_TARGET_SPARE_MEMORY_PERCENT,
                self.target_spare_memory_percent,
            )?,
            os_family: self.os_family.unwrap_or_default(),
            api_endpoint: self
                .api_endpoint
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            cluster_state_endpoint: self
                .cluster_state_endpoint
                .unwrap_or_else(|| DEFAULT_CLUSTER_STATE_ENDPOINT.to_string()),
        })
    }
}

/// capbridge の設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 明示的に指定されたパス (存在しなければエラー)
/// 2. 環境変数 CAPBRIDGE_CONFIG_PATH
/// 3. カレントディレクトリの capbridge.yaml
/// 4. ~/.config/capbridge/config.yaml
pub fn find_config_file<F>(explicit: Option<&Path>, lookup: F) -> Result<Option<PathBuf>>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(ConfigError::ConfigFileNotFound(path.to_path_buf()));
    }

    if let Some(config_path) = lookup(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let local = std::env::current_dir()?.join(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("capbridge").join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Split a comma-separated instance type list, dropping blanks
pub fn split_instance_types(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn overlay_string(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *slot = Some(value.trim().to_string());
    }
}

fn overlay_u32(slot: &mut Option<u32>, key: &'static str, value: Option<String>) -> Result<()> {
    if let Some(value) = value {
        let parsed = value
            .trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidValue {
                key,
                value: value.clone(),
                reason: e.to_string(),
            })?;
        *slot = Some(parsed);
    }
    Ok(())
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingValue(key))
}

fn percent(key: &'static str, value: Option<u32>) -> Result<u32> {
    let value = value.unwrap_or(0);
    if value > 100 {
        return Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "percentage must be between 0 and 100".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::fs;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_GROUP_ID, "testASG"),
            (ENV_REGION, "us-east-1"),
            (ENV_API_KEY, "myApiKey"),
            (ENV_INSTANCE_TYPES, "m1.medium,m3.large"),
        ]
    }

    #[test]
    fn test_full_environment() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            (ENV_REGION, "us-east-1"),
            (ENV_GROUP_ID, "testASG"),
            (ENV_API_KEY, "myApiKey"),
            (ENV_DISPLAY_NAME, "nameToDisplayInUI"),
            (ENV_MAX_SPOT_PERCENT_TOTAL, "90"),
            (ENV_MAX_SPOT_PERCENT_ONE_MARKET, "25"),
            (ENV_DETAILED_MONITORING, "true"),
            (ENV_MAX_HOURS_INSTANCE_AGE, ""),
            (ENV_INSTANCE_TYPES, "m1.medium, m3.large"),
            (ENV_TARGET_SPARE_CPU_PERCENT, "20"),
            (ENV_TARGET_CAPACITY_VCPUS, "6"),
            (ENV_TARGET_CAPACITY_INSTANCES, "2"),
            (ENV_TARGET_SPARE_MEMORY_PERCENT, "20"),
        ]))
        .unwrap();

        assert_eq!(config.group_id, "testASG");
        assert_eq!(config.display_name, "nameToDisplayInUI");
        assert_eq!(config.max_spot_percent_total, 90);
        assert_eq!(config.max_spot_percent_one_market, 25);
        assert!(config.detailed_monitoring);
        assert_eq!(config.max_hours_instance_age, 0);
        assert_eq!(config.instance_types, vec!["m1.medium", "m3.large"]);
        assert_eq!(config.base_instance_type(), "m1.medium");
        assert_eq!(config.target_capacity_vcpus, 6);
        assert_eq!(config.target_capacity_instances, 2);
        assert_eq!(config.target_spare_cpu_percent, 20);
        assert_eq!(config.target_spare_memory_percent, 20);
        assert_eq!(config.api_endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(config.cluster_state_endpoint, DEFAULT_CLUSTER_STATE_ENDPOINT);
    }

    #[test]
    fn test_missing_api_key() {
        let pairs: Vec<_> = minimal()
            .into_iter()
            .filter(|(k, _)| *k != ENV_API_KEY)
            .collect();
        let result = BridgeConfig::from_lookup(lookup_from(&pairs));
        assert!(matches!(result, Err(ConfigError::MissingValue(ENV_API_KEY))));
    }

    #[test]
    fn test_instance_types_must_not_be_blank() {
        let mut pairs = minimal();
        pairs.retain(|(k, _)| *k != ENV_INSTANCE_TYPES);
        pairs.push((ENV_INSTANCE_TYPES, " , ,"));
        let result = BridgeConfig::from_lookup(lookup_from(&pairs));
        assert!(matches!(
            result,
            Err(ConfigError::MissingValue(ENV_INSTANCE_TYPES))
        ));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let mut pairs = minimal();
        pairs.push((ENV_TARGET_CAPACITY_VCPUS, "six"));
        let err = BridgeConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value, .. } => {
                assert_eq!(key, ENV_TARGET_CAPACITY_VCPUS);
                assert_eq!(value, "six");
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_percentage_out_of_range() {
        let mut pairs = minimal();
        pairs.push((ENV_MAX_SPOT_PERCENT_TOTAL, "150"));
        assert!(matches!(
            BridgeConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::InvalidValue {
                key: ENV_MAX_SPOT_PERCENT_TOTAL,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_bool_forms() {
        assert!(parse_bool("K", "T").unwrap());
        assert!(parse_bool("K", "1").unwrap());
        assert!(!parse_bool("K", "False").unwrap());
        assert!(parse_bool("K", "maybe").is_err());
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let config = BridgeConfig::from_lookup(lookup_from(&minimal())).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("myApiKey"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_file_overlaid_by_environment() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bridge.yaml");
        fs::write(
            &path,
            r#"
group_id: fileASG
region: eu-west-1
api_key: fileKey
instance_types: [c3.large, c3.xlarge]
target_capacity_vcpus: 4
"#,
        )
        .unwrap();

        let config = BridgeConfig::load_with(
            Some(path.as_path()),
            lookup_from(&[(ENV_REGION, "us-east-1"), (ENV_TARGET_CAPACITY_VCPUS, "")]),
        )
        .unwrap();

        assert_eq!(config.group_id, "fileASG");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.base_instance_type(), "c3.large");
        // blank environment values do not clobber the file
        assert_eq!(config.target_capacity_vcpus, 4);
    }

    #[test]
    fn test_unknown_file_key_is_rejected() {
        let result = RawConfig::from_yaml("group_id: a\nbogus: 1\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_explicit_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.yaml");
        let result = find_config_file(Some(path.as_path()), |_| None);
        assert!(matches!(result, Err(ConfigError::ConfigFileNotFound(_))));
    }

    #[test]
    fn test_config_path_env() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "region: ap-northeast-1\n").unwrap();
        let path_str = path.to_string_lossy().to_string();

        let found = find_config_file(None, |key| {
            (key == CONFIG_PATH_ENV).then(|| path_str.clone())
        })
        .unwrap();
        assert_eq!(found, Some(path));
    }

    #[test]
    #[serial]
    fn test_local_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join(LOCAL_CONFIG_FILE), "region: us-west-2\n").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let found = find_config_file(None, |_| None);

        std::env::set_current_dir(original_dir).unwrap();

        let found = found.unwrap().unwrap();
        assert!(found.ends_with(LOCAL_CONFIG_FILE));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        temp_env::with_vars(
            [
                (ENV_GROUP_ID, Some("envASG")),
                (ENV_REGION, Some("us-east-1")),
                (ENV_API_KEY, Some("envKey")),
                (ENV_INSTANCE_TYPES, Some("c3.large")),
                (ENV_DISPLAY_NAME, None),
                (ENV_MAX_SPOT_PERCENT_TOTAL, None),
                (ENV_MAX_SPOT_PERCENT_ONE_MARKET, None),
                (ENV_DETAILED_MONITORING, Some("f")),
                (ENV_MAX_HOURS_INSTANCE_AGE, Some("72")),
                (ENV_TARGET_CAPACITY_VCPUS, None),
                (ENV_TARGET_CAPACITY_INSTANCES, None),
                (ENV_TARGET_SPARE_CPU_PERCENT, None),
                (ENV_TARGET_SPARE_MEMORY_PERCENT, None),
                (ENV_OS_FAMILY, None),
                (ENV_API_ENDPOINT, None),
                (ENV_CLUSTER_STATE_ENDPOINT, None),
            ],
            || {
                let config = BridgeConfig::from_env().unwrap();
                assert_eq!(config.group_id, "envASG");
                assert!(!config.detailed_monitoring);
                assert_eq!(config.max_hours_instance_age, 72);
                assert_eq!(config.target_capacity_vcpus, 0);
            },
        );
    }
}
