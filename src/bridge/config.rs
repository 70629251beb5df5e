use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ffi::types::{Result, SystemError};

/// 默认注册表容量，与历史上的固定指针数组大小一致
pub const DEFAULT_REGISTRY_CAPACITY: usize = 10_000;

/// 指向 JSON 配置文件的环境变量
pub const CONFIG_PATH_ENV: &str = "PROCLIST_CONFIG";
/// 覆盖注册表容量的环境变量
pub const REGISTRY_CAPACITY_ENV: &str = "PROCLIST_REGISTRY_CAPACITY";

/// 桥接层配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// 同时存活的字符串分配数量上限，超出后 FillBuffer 提前停止
    pub registry_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            registry_capacity: DEFAULT_REGISTRY_CAPACITY,
        }
    }
}

impl BridgeConfig {
    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载配置
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(value) = std::env::var(REGISTRY_CAPACITY_ENV) {
            config.registry_capacity = value.trim().parse().map_err(|_| {
                SystemError::InvalidConfig(format!("{}={:?} is not a count", REGISTRY_CAPACITY_ENV, value))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件读取配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| SystemError::InvalidConfig(format!("{}: {}", path.display(), e)))
    }

    /// 解析 JSON 配置，缺省字段取默认值
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| SystemError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.registry_capacity == 0 {
            return Err(SystemError::InvalidConfig(
                "registry_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
