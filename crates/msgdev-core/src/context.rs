use alloc::{format, vec::Vec};

// Loom 模型检查时换用其互斥锁，使每次加锁都成为可穷举的调度点；生产构建始终使用 `spin`。
#[cfg(all(loom, feature = "loom-model"))]
use self::loom_shim::Mutex;
#[cfg(not(all(loom, feature = "loom-model")))]
use spin::Mutex;

use crate::{
    buffer::{ConfiguredStore, MessageStore, Occupancy},
    error::{CoreError, ErrorCategory, Result, codes},
    settings::{BufferSettings, ReadReturn},
    stats::{TransferStats, TransferStatsSnapshot},
    transfer::{SliceSource, TransferSink, TransferSource},
};

/// `DeviceContext` 持有设备唯一的消息缓冲，并串行化所有读写。
///
/// # 设计动机（Why）
/// - 缓冲不再是进程级全局变量，而是由上下文对象拥有、以引用传入读写操作；
///   同一进程内可以并存多个互不干扰的实例，测试也不再共享隐藏状态。
/// - 多个调用方可能同时打开同一设备，若不加锁，交错的读写会破坏
///   `0 <= len <= capacity - 1` 或读到撕裂的数据。
///
/// # 架构关系（How）
/// - `store` 由 `spin::Mutex` 保护：每次读写在整个操作期间持有守卫，
///   守卫随作用域结束释放，搬运失败的提前返回路径同样覆盖；
/// - `stats` 为原子计数器，在锁外累加；
/// - `read_return` 决定读取成功时向调用方报告的数值。
///
/// # 契约说明（What）
/// - 写入永不失败，返回 [`WriteOutcome`]；
/// - 读取仅在搬运原语失败时返回 [`CoreError`]（分类 `TransferFault`），此时缓冲保持原状；
/// - 所有操作同步执行至完成，不挂起、不派生任务，耗时与 `len` 成正比。
///
/// # 风险与取舍（Trade-offs）
/// - 选择自旋锁以兼容 `no_std`；临界区只包含一次有界拷贝，自旋等待时间可控。
pub struct DeviceContext<S: MessageStore = ConfiguredStore> {
    store: Mutex<S>,
    read_return: ReadReturn,
    stats: TransferStats,
}

impl DeviceContext<ConfiguredStore> {
    /// 依据设置创建上下文；设置非法时返回 `Misconfiguration` 错误。
    pub fn from_settings(settings: &BufferSettings) -> Result<Self> {
        let store = ConfiguredStore::from_settings(settings)?;
        Ok(Self::new(store, settings.read_return))
    }
}

impl<S: MessageStore> DeviceContext<S> {
    /// 以给定存储创建上下文。
    pub fn new(store: S, read_return: ReadReturn) -> Self {
        Self {
            store: Mutex::new(store),
            read_return,
            stats: TransferStats::default(),
        }
    }

    /// 从来源端追加至多 `requested` 字节。
    ///
    /// # 执行步骤（How）
    /// 1. 获取独占守卫；
    /// 2. 将请求截断到 `min(requested, capacity - len - 1)` 并从来源拷贝；
    /// 3. 释放守卫后累加计数。
    ///
    /// 截断是既定策略而非错误：调用方通过 [`WriteOutcome::truncated`] 感知。
    pub fn write(&self, requested: usize, source: &mut dyn TransferSource) -> WriteOutcome {
        let offered = requested.min(source.remaining());
        let (accepted, len, occupancy) = {
            let mut store = self.store.lock();
            let accepted = store.append_from(requested, source);
            (accepted, store.len(), store.occupancy())
        };
        self.stats.record_write(offered, accepted);
        WriteOutcome {
            requested,
            offered,
            accepted,
            len,
            occupancy,
        }
    }

    /// 以整段切片为来源写入。
    pub fn write_bytes(&self, src: &[u8]) -> WriteOutcome {
        self.write(src.len(), &mut SliceSource::new(src))
    }

    /// 搬出至多 `requested` 字节到目的端，并把剩余内容移到头部。
    ///
    /// # 契约说明（What）
    /// - **成功**：搬出 `min(requested, len)` 字节，缓冲只保留未读后缀；空缓冲返回 0 字节且不算错误；
    /// - **失败**：目的端拒绝拷贝时返回 `TransferFault` 分类的 [`CoreError`]，
    ///   缓冲内容与长度不变，守卫照常释放。
    pub fn read(&self, requested: usize, sink: &mut dyn TransferSink) -> Result<ReadOutcome> {
        let result = {
            let mut store = self.store.lock();
            store
                .consume_into(requested, sink)
                .map(|transferred| (transferred, store.len(), store.occupancy()))
        };
        match result {
            Ok((transferred, remaining, occupancy)) => {
                self.stats.record_read(transferred);
                Ok(ReadOutcome {
                    requested,
                    transferred,
                    remaining,
                    occupancy,
                    read_return: self.read_return,
                })
            }
            Err(fault) => {
                self.stats.record_fault();
                Err(fault.into())
            }
        }
    }

    /// 读取至多 `requested` 字节到新分配的 `Vec`。
    pub fn read_to_vec(&self, requested: usize) -> Vec<u8> {
        let mut out = Vec::new();
        // `Vec<u8>` 目的端恒成功。
        let _ = self.read(requested, &mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    pub fn occupancy(&self) -> Occupancy {
        self.store.lock().occupancy()
    }

    /// 复制当前有效内容。
    pub fn snapshot(&self) -> Vec<u8> {
        self.store.lock().snapshot()
    }

    /// 丢弃全部内容。
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    pub fn read_return(&self) -> ReadReturn {
        self.read_return
    }

    pub fn stats(&self) -> TransferStatsSnapshot {
        self.stats.snapshot()
    }

    /// 在持有守卫的前提下访问底层存储，供诊断与测试使用。
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let store = self.store.lock();
        f(&*store)
    }
}

impl Default for DeviceContext<ConfiguredStore> {
    fn default() -> Self {
        Self::new(ConfiguredStore::default(), ReadReturn::default())
    }
}

#[cfg(all(loom, feature = "loom-model"))]
mod loom_shim {
    /// 与 `spin::Mutex` 同形的包装：`lock` 直接返回守卫。
    pub(super) struct Mutex<T>(loom::sync::Mutex<T>);

    impl<T> Mutex<T> {
        pub(super) fn new(value: T) -> Self {
            Self(loom::sync::Mutex::new(value))
        }

        pub(super) fn lock(&self) -> loom::sync::MutexGuard<'_, T> {
            // 只有模型内的断言失败才会让锁中毒。
            self.0
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }
}

/// 一次写入的结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteOutcome {
    /// 调用方声明的长度。
    pub requested: usize,
    /// 来源端实际能提供的字节数，即 `min(requested, source.remaining())`。
    pub offered: usize,
    /// 缓冲接受的字节数。
    pub accepted: usize,
    /// 写入后的缓冲长度。
    pub len: usize,
    pub occupancy: Occupancy,
}

impl WriteOutcome {
    /// 是否因容量不足丢弃了部分字节。
    pub fn truncated(&self) -> bool {
        self.accepted < self.offered
    }
}

/// 一次成功读取的结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadOutcome {
    pub requested: usize,
    /// 实际搬出的字节数，即 `min(requested, len)`。
    pub transferred: usize,
    /// 读取后缓冲中剩余的字节数。
    pub remaining: usize,
    pub occupancy: Occupancy,
    read_return: ReadReturn,
}

impl ReadOutcome {
    /// 按上下文的返回值约定报告给调用方的数值。
    pub fn reported(&self) -> usize {
        self.read_return.report(self.transferred)
    }

    /// 是否少于请求长度（正常降级，而非错误）。
    pub fn short(&self) -> bool {
        self.transferred < self.requested
    }
}

/// 校验来自宿主调用面的原始长度。
///
/// 负长度违反调用契约，在触碰缓冲之前即以 `ContractViolation` 拒绝。
pub fn validate_request_len(raw: isize) -> Result<usize> {
    usize::try_from(raw).map_err(|_| {
        CoreError::new(
            codes::INVALID_LENGTH,
            ErrorCategory::ContractViolation,
            format!("requested length {raw} is negative"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_stubs::FaultingSink;

    #[test]
    fn fault_releases_guard_and_keeps_content() {
        let ctx = DeviceContext::default();
        ctx.write_bytes(b"payload");
        let err = ctx
            .read(3, &mut FaultingSink::default())
            .expect_err("故障目的端应导致读取失败");
        assert!(err.is_transfer_fault());
        // 守卫已释放：随后的加锁操作不会自旋卡死。
        assert_eq!(ctx.snapshot(), b"payload");
        assert_eq!(ctx.stats().transfer_faults, 1);
        assert_eq!(ctx.stats().reads, 0);
    }

    #[test]
    fn short_source_is_not_counted_as_truncation() {
        let ctx = DeviceContext::default();
        let outcome = ctx.write(10, &mut SliceSource::new(b"abc"));
        assert_eq!(outcome.offered, 3);
        assert_eq!(outcome.accepted, 3);
        assert!(!outcome.truncated());
        assert_eq!(ctx.stats().bytes_truncated, 0);
    }

    #[test]
    fn negative_length_is_contract_violation() {
        let err = validate_request_len(-1).expect_err("负长度必须被拒绝");
        assert_eq!(err.code(), codes::INVALID_LENGTH);
        assert_eq!(err.category(), ErrorCategory::ContractViolation);
        assert_eq!(validate_request_len(12), Ok(12));
    }
}
