use core::sync::atomic::{AtomicU64, Ordering};

/// 设备读写计数器。
///
/// # 教案式说明
/// - **意图（Why）**：截断写入与短读都是“静默降级”，调用方只看到返回值；
///   计数器让运维能够区分“缓冲常满”与“搬运频繁失败”两类现象。
/// - **逻辑（How）**：全部字段为 `AtomicU64`，使用 `Relaxed` 序累加；
///   计数只用于观测，不参与任何同步决策。
/// - **契约（What）**：[`snapshot`](Self::snapshot) 返回的各字段分别单调，
///   但彼此之间不保证来自同一时刻。
#[derive(Debug, Default)]
pub struct TransferStats {
    writes: AtomicU64,
    bytes_accepted: AtomicU64,
    bytes_truncated: AtomicU64,
    reads: AtomicU64,
    bytes_transferred: AtomicU64,
    transfer_faults: AtomicU64,
}

impl TransferStats {
    pub(crate) fn record_write(&self, requested: usize, accepted: usize) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_accepted
            .fetch_add(accepted as u64, Ordering::Relaxed);
        self.bytes_truncated
            .fetch_add(requested.saturating_sub(accepted) as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_read(&self, transferred: usize) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_transferred
            .fetch_add(transferred as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_fault(&self) {
        self.transfer_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TransferStatsSnapshot {
        TransferStatsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            bytes_accepted: self.bytes_accepted.load(Ordering::Relaxed),
            bytes_truncated: self.bytes_truncated.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            bytes_transferred: self.bytes_transferred.load(Ordering::Relaxed),
            transfer_faults: self.transfer_faults.load(Ordering::Relaxed),
        }
    }
}

/// 计数器快照。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferStatsSnapshot {
    pub writes: u64,
    pub bytes_accepted: u64,
    /// 因容量不足被丢弃的字节数。
    pub bytes_truncated: u64,
    /// 成功完成的读取次数。
    pub reads: u64,
    pub bytes_transferred: u64,
    pub transfer_faults: u64,
}
