//! 定长消息缓冲。
//!
//! # 模块定位（Why）
//! - 设备对外只暴露一块缓冲：写入追加到尾部，读取从头部消费；
//!   容量固定，溢出与不足都以“部分搬运”降级，而不是报错。
//! - [`MessageStore`] 把这套策略抽象为对象安全的 trait，使设备上下文可以在
//!   压缩式（[`MessageBuffer`]）与环形（[`RingMessageBuffer`]）两种存储间切换，而外部可观察行为完全一致。
//!
//! # 不变量（What）
//! - 容量中恒预留 [`RESERVED_SLOTS`] 个字节，使内容始终可被视作带终止符的有界字符串；
//!   因此 `0 <= len <= capacity - 1`。
//! - 有效内容仅限逻辑区间 `[0, len)`；其余字节视为陈旧数据，绝不作为内容读出。

mod compacting;
mod occupancy;
mod ring;
mod store;

pub use compacting::MessageBuffer;
pub use occupancy::Occupancy;
pub use ring::RingMessageBuffer;
pub use store::ConfiguredStore;

use alloc::{format, vec::Vec};

use crate::{
    error::{CoreError, ErrorCategory, Result, codes},
    transfer::{SliceSource, TransferFault, TransferSink, TransferSource},
};

/// 默认容量，与经典字符设备示例一致。
pub const DEFAULT_CAPACITY: usize = 256;

/// 为终止符预留的字节数。
pub const RESERVED_SLOTS: usize = 1;

/// 最小合法容量：预留位之外至少还能存放一个字节。
pub const MIN_CAPACITY: usize = RESERVED_SLOTS + 1;

/// `MessageStore` 描述消息缓冲的两条变更原语及其观测接口。
///
/// # 契约说明（What）
/// - [`append_from`](Self::append_from)：接受 `min(requested, available)` 字节，永不失败；
/// - [`consume_into`](Self::consume_into)：搬出 `min(requested, len)` 字节；
///   搬运失败时缓冲保持原状并返回 [`TransferFault`]；
/// - 实现者必须维护 `len() <= usable_capacity()`。
///
/// # 并发（Trade-offs）
/// - 所有变更方法都要求 `&mut self`，本身不做同步；跨调用方共享时由
///   [`DeviceContext`](crate::DeviceContext) 的互斥锁保证独占。
pub trait MessageStore: Send + 'static {
    /// 总容量（包含预留位）。
    fn capacity(&self) -> usize;

    /// 当前有效字节数。
    fn len(&self) -> usize;

    /// 追加至多 `requested` 字节，返回实际写入数。
    ///
    /// 返回值为 `min(requested, available())`；若来源能提供的字节更少，则以来源实际拷贝数为准。
    fn append_from(&mut self, requested: usize, source: &mut dyn TransferSource) -> usize;

    /// 从头部搬出至多 `requested` 字节并压缩剩余内容，返回实际搬出数。
    fn consume_into(
        &mut self,
        requested: usize,
        sink: &mut dyn TransferSink,
    ) -> core::result::Result<usize, TransferFault>;

    /// 复制当前有效内容，不改变缓冲状态。
    fn snapshot(&self) -> Vec<u8>;

    /// 丢弃全部内容，回到 `Empty`。
    fn clear(&mut self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 可存放内容的字节数上限，即 `capacity - 1`。
    fn usable_capacity(&self) -> usize {
        self.capacity() - RESERVED_SLOTS
    }

    /// 剩余可写字节数，即 `capacity - len - 1`。
    fn available(&self) -> usize {
        self.usable_capacity().saturating_sub(self.len())
    }

    fn occupancy(&self) -> Occupancy {
        Occupancy::classify(self.len(), self.usable_capacity())
    }

    /// 以整段切片为来源写入，返回接受的字节数。
    fn write_bytes(&mut self, src: &[u8]) -> usize {
        self.append_from(src.len(), &mut SliceSource::new(src))
    }

    /// 读取至多 `requested` 字节到新分配的 `Vec`。`Vec` 目的端不会失败。
    fn read_to_vec(&mut self, requested: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(requested.min(self.len()));
        // `Vec<u8>` 的 `transfer_out` 恒为 Ok。
        let _ = self.consume_into(requested, &mut out);
        out
    }
}

/// 校验容量满足预留位不变量。
pub(crate) fn check_capacity(capacity: usize) -> Result<()> {
    if capacity < MIN_CAPACITY {
        return Err(CoreError::new(
            codes::INVALID_CAPACITY,
            ErrorCategory::Misconfiguration,
            format!("capacity {capacity} is below the minimum of {MIN_CAPACITY}"),
        ));
    }
    Ok(())
}
