//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 宿主层需要把核心错误翻译成调用方熟悉的形态：`Result` 风格的 [`DeviceError`]，
//!   以及 ssize 风格调用面使用的负 errno。
//! - 正常降级（截断写入、短读）不会出现在这里；调用方据此区分“拿到的字节更少”与“搬运失败”。

use msgdev_core::{CoreError, ErrorCategory};
use thiserror::Error;

/// 错误的地址（搬运失败）。
pub const EFAULT: i32 = 14;
/// 非法参数（负长度、非法配置）。
pub const EINVAL: i32 = 22;

/// 设备宿主层错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：聚合激活、读写、配置加载路径上的失败，保留核心错误码供日志检索。
/// - **契约 (What)**：每个变体都有确定的 [`errno`](DeviceError::errno)；
///   `Fault` 只会由读取路径产生，且产生时缓冲保持原状。
#[derive(Debug, Error)]
pub enum DeviceError {
    /// 向调用方搬运字节失败。
    #[error("bad address: {0}")]
    Fault(#[source] CoreError),

    /// 调用方违反参数契约，例如负长度。
    #[error("invalid argument: {0}")]
    InvalidArgument(#[source] CoreError),

    /// 设置不满足不变量，设备无法激活。
    #[error("device configuration rejected: {0}")]
    Configuration(#[source] CoreError),

    /// 配置文本无法解析。
    #[error("failed to parse device configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// 读取配置文件失败。
    #[error("failed to read device configuration `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DeviceError {
    /// 对应的正 errno 值。
    pub fn errno(&self) -> i32 {
        match self {
            DeviceError::Fault(_) => EFAULT,
            DeviceError::InvalidArgument(_)
            | DeviceError::Configuration(_)
            | DeviceError::Parse(_)
            | DeviceError::Io { .. } => EINVAL,
        }
    }

    /// ssize 风格调用面的返回值：负 errno。
    pub fn as_ssize(&self) -> isize {
        -(self.errno() as isize)
    }
}

impl From<CoreError> for DeviceError {
    fn from(err: CoreError) -> Self {
        match err.category() {
            ErrorCategory::TransferFault => DeviceError::Fault(err),
            ErrorCategory::ContractViolation => DeviceError::InvalidArgument(err),
            _ => DeviceError::Configuration(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgdev_core::{TransferFault, validate_request_len};

    #[test]
    fn core_categories_map_to_errno() {
        let fault = DeviceError::from(CoreError::from(TransferFault::new(4, 4)));
        assert!(matches!(fault, DeviceError::Fault(_)));
        assert_eq!(fault.as_ssize(), -14);

        let invalid = DeviceError::from(validate_request_len(-3).expect_err("负长度"));
        assert!(matches!(invalid, DeviceError::InvalidArgument(_)));
        assert_eq!(invalid.as_ssize(), -22);
    }
}
