use alloc::borrow::Cow;
use core::fmt;

use crate::transfer::TransferFault;

/// `CoreError` 是 `msgdev-core` 对外暴露的唯一错误形态。
///
/// # 设计背景（Why）
/// - 缓冲读写的“正常降级”（写入截断、读取不足）不属于错误，真正需要上报的只有三类：
///   搬运原语失败、调用方违反长度契约、配置非法。
/// - 核心需兼容 `no_std + alloc`，因此不直接依赖 `std::error::Error`，仅在 `std` 特性下补充实现。
///
/// # 逻辑解析（How）
/// - `code` 取自 [`codes`] 模块的稳定字符串，供日志与上层 errno 映射使用；
/// - `message` 面向排障人员；`category` 决定宿主层应如何向调用方报告。
///
/// # 契约说明（What）
/// - **前置条件**：调用方应使用 [`codes`] 中登记的码值；
/// - **后置条件**：返回值拥有独立所有权，可跨线程移动。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreError {
    code: &'static str,
    message: Cow<'static, str>,
    category: ErrorCategory,
    fault: Option<TransferFault>,
}

impl CoreError {
    /// 构造核心错误。
    ///
    /// # 示例（Examples）
    /// ```rust
    /// use msgdev_core::{CoreError, ErrorCategory, error::codes};
    ///
    /// let err = CoreError::new(
    ///     codes::INVALID_CAPACITY,
    ///     ErrorCategory::Misconfiguration,
    ///     "capacity must leave one reserved slot",
    /// );
    /// assert_eq!(err.code(), codes::INVALID_CAPACITY);
    /// assert_eq!(err.category(), ErrorCategory::Misconfiguration);
    /// ```
    pub fn new(
        code: &'static str,
        category: ErrorCategory,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            category,
            fault: None,
        }
    }

    /// 获取稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 获取描述。
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 获取错误分类。
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// 是否为搬运原语失败。
    pub fn is_transfer_fault(&self) -> bool {
        self.category == ErrorCategory::TransferFault
    }

    /// 搬运失败的字节计数；仅由 [`TransferFault`] 转换而来的错误携带。
    pub fn transfer_fault(&self) -> Option<TransferFault> {
        self.fault
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}

impl From<TransferFault> for CoreError {
    fn from(fault: TransferFault) -> Self {
        let mut err = CoreError::new(
            codes::TRANSFER_FAULT,
            ErrorCategory::TransferFault,
            alloc::format!(
                "failed to transfer {} of {} bytes to the destination",
                fault.not_copied(),
                fault.requested()
            ),
        );
        err.fault = Some(fault);
        err
    }
}

/// 错误分类，驱动宿主层的上报方式。
///
/// - `TransferFault`：搬运原语拒绝拷贝，缓冲保持原状，对应宿主的 “bad address”；
/// - `ContractViolation`：请求长度等参数非法，在触碰缓冲前即被拒绝；
/// - `Misconfiguration`：容量等设置不满足不变量，设备无法激活。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCategory {
    TransferFault,
    ContractViolation,
    Misconfiguration,
}

/// `Result` 为核心统一的返回值别名，默认错误类型为 [`CoreError`]。
pub type Result<T, E = CoreError> = core::result::Result<T, E>;

/// 稳定错误码登记表。
///
/// 码值遵循 `<域>.<语义>` 约定，一经发布不得修改。
pub mod codes {
    /// 读取时向目的端搬运字节失败。
    pub const TRANSFER_FAULT: &str = "msgdev.transfer_fault";
    /// 请求长度为负或超出可表示范围。
    pub const INVALID_LENGTH: &str = "msgdev.invalid_length";
    /// 容量不足以预留终止位。
    pub const INVALID_CAPACITY: &str = "msgdev.invalid_capacity";
    /// 配置文本无法解析或字段非法。
    pub const CONFIG_REJECTED: &str = "msgdev.config_rejected";
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn transfer_fault_converts_with_counts_in_message() {
        let err = CoreError::from(TransferFault::new(10, 4));
        assert_eq!(err.code(), codes::TRANSFER_FAULT);
        assert!(err.is_transfer_fault());
        assert_eq!(
            err.message(),
            "failed to transfer 4 of 10 bytes to the destination"
        );
        assert_eq!(err.transfer_fault(), Some(TransferFault::new(10, 4)));
    }

    #[test]
    fn display_prefixes_code() {
        let err = CoreError::new(
            codes::INVALID_LENGTH,
            ErrorCategory::ContractViolation,
            "negative length",
        );
        assert_eq!(err.to_string(), "[msgdev.invalid_length] negative length");
    }
}
