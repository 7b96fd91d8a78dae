use std::{fs, path::Path};

use msgdev_core::{BufferSettings, CoreError, ErrorCategory, error::codes};
use serde::Deserialize;

use crate::error::DeviceError;

/// 默认设备名。
pub const DEFAULT_DEVICE_NAME: &str = "msgdev";
/// 默认设备类别，仅用于日志。
pub const DEFAULT_DEVICE_CLASS: &str = "char";

/// 设备装配配置。
///
/// ### 设计目的（Why）
/// - 设备名与缓冲设置在激活时一次性确定；集中为一个 TOML 文档，便于部署时覆盖。
///
/// ### 契约说明（What）
/// - 所有字段均可省略，空文档等价于 [`DeviceConfig::default`]；
/// - 未知字段一律拒绝，避免拼写错误被静默忽略；
/// - `[buffer]` 表对应 [`BufferSettings`]：
///
/// ```toml
/// name = "msgdev"
/// class = "char"
///
/// [buffer]
/// capacity = 256
/// store = "compacting"          # 或 "ring"
/// read_return = "transferred"   # 或 "legacy_zero"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub name: String,
    pub class: String,
    pub buffer: BufferSettings,
}

impl DeviceConfig {
    /// 解析 TOML 文本并校验。
    pub fn from_toml_str(text: &str) -> Result<Self, DeviceError> {
        let config: DeviceConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 读取并解析 TOML 文件。
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DeviceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// 校验设备名与缓冲设置。
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.name.trim().is_empty() {
            return Err(DeviceError::Configuration(CoreError::new(
                codes::CONFIG_REJECTED,
                ErrorCategory::Misconfiguration,
                "device name must not be empty",
            )));
        }
        self.buffer.validate().map_err(DeviceError::Configuration)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DEVICE_NAME.to_owned(),
            class: DEFAULT_DEVICE_CLASS.to_owned(),
            buffer: BufferSettings::default(),
        }
    }
}
