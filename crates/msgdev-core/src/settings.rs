//! 缓冲设置。
//!
//! # 教案式说明
//! - **意图（Why）**：容量、存储布局与读取返回值约定是设备激活时一次性确定的参数，
//!   集中在一个可反序列化的结构中，宿主层即可直接从配置文本加载。
//! - **契约（What）**：所有字段均有默认值，缺省配置等价于经典的 256 字节压缩式缓冲；
//!   [`BufferSettings::validate`] 是激活前唯一的校验入口。

use alloc::format;

use serde::Deserialize;

use crate::{
    buffer::{DEFAULT_CAPACITY, MIN_CAPACITY},
    error::{CoreError, ErrorCategory, Result, codes},
};

/// 存储布局。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// 读取后把剩余内容搬回头部。
    #[default]
    Compacting,
    /// 头/尾游标环形布局。
    Ring,
}

/// 读取成功时向调用方报告的返回值约定。
///
/// # 设计背景（Why）
/// - 经典驱动在读取成功时固定返回 0，而不是实际搬出的字节数；
///   这与“返回传输字节数”的文件语义相悖，多半是无意为之。
/// - 两种约定都保留为显式选择：默认采用修正后的 `Transferred`，
///   需要与旧行为逐位对齐时选择 `LegacyZero`。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadReturn {
    /// 报告实际搬出的字节数。
    #[default]
    Transferred,
    /// 成功时恒报告 0。
    LegacyZero,
}

impl ReadReturn {
    /// 将实际搬出的字节数映射为对外报告值。
    pub fn report(self, transferred: usize) -> usize {
        match self {
            ReadReturn::Transferred => transferred,
            ReadReturn::LegacyZero => 0,
        }
    }
}

/// 设备缓冲设置。
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BufferSettings {
    /// 总容量（含一个预留位）。
    pub capacity: usize,
    pub store: StoreKind,
    pub read_return: ReadReturn,
}

impl BufferSettings {
    /// 校验容量不变量。
    ///
    /// - **前置条件**：无；
    /// - **后置条件**：返回 `Ok` 时 `capacity >= 2`，存储至少能容纳一个字节。
    pub fn validate(&self) -> Result<()> {
        if self.capacity < MIN_CAPACITY {
            return Err(CoreError::new(
                codes::INVALID_CAPACITY,
                ErrorCategory::Misconfiguration,
                format!(
                    "buffer capacity {} must be at least {MIN_CAPACITY} (one slot is reserved)",
                    self.capacity
                ),
            ));
        }
        Ok(())
    }
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            store: StoreKind::default(),
            read_return: ReadReturn::default(),
        }
    }
}
