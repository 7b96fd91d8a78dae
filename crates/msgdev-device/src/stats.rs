use std::sync::atomic::{AtomicU64, Ordering};

use msgdev_core::TransferStatsSnapshot;

/// 设备生命周期计数器。
///
/// 读写相关计数由核心上下文维护，这里只补充打开/关闭；
/// 两者在 [`DeviceStats::snapshot`] 中合并。
#[derive(Debug, Default)]
pub struct DeviceStats {
    opens: AtomicU64,
    releases: AtomicU64,
    open_handles: AtomicU64,
}

impl DeviceStats {
    /// 记录一次打开，返回打开后的句柄数。
    pub(crate) fn record_open(&self) -> u64 {
        self.opens.fetch_add(1, Ordering::Relaxed);
        self.open_handles.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// 记录一次关闭，返回关闭后的句柄数；未配对的关闭不会让句柄数下溢。
    pub(crate) fn record_release(&self) -> u64 {
        self.releases.fetch_add(1, Ordering::Relaxed);
        let previous = self
            .open_handles
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_sub(1))
            })
            .unwrap_or_else(|current| current);
        previous.saturating_sub(1)
    }

    pub fn open_handles(&self) -> u64 {
        self.open_handles.load(Ordering::Acquire)
    }

    pub fn snapshot(&self, transfer: TransferStatsSnapshot) -> DeviceStatsSnapshot {
        DeviceStatsSnapshot {
            transfer,
            opens: self.opens.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            open_handles: self.open_handles(),
        }
    }
}

/// 设备计数器快照。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceStatsSnapshot {
    /// 读写、截断与搬运失败计数。
    pub transfer: TransferStatsSnapshot,
    pub opens: u64,
    pub releases: u64,
    /// 当前仍未关闭的句柄数。
    pub open_handles: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpaired_release_does_not_underflow() {
        let stats = DeviceStats::default();
        assert_eq!(stats.record_release(), 0);
        assert_eq!(stats.record_open(), 1);
        assert_eq!(stats.record_open(), 2);
        assert_eq!(stats.record_release(), 1);

        let snapshot = stats.snapshot(TransferStatsSnapshot::default());
        assert_eq!(snapshot.opens, 2);
        assert_eq!(snapshot.releases, 2);
        assert_eq!(snapshot.open_handles, 1);
    }
}
