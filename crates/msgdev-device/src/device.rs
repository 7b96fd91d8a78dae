//! # device 模块说明
//!
//! ## 角色定位（Why）
//! - 把核心的 [`DeviceContext`] 包装成一个“已注册的字符设备”：激活时创建缓冲，
//!   卸载时销毁缓冲，打开/关闭与每次搬运都留下结构化日志。
//! - 宿主调用面有两种：`Result` 风格（[`CharDeviceOps`]、[`DeviceHandle`]）与
//!   ssize 风格（[`MessageDevice::read_ssize`]、[`MessageDevice::write_ssize`]），后者以负 errno 报告失败。
//!
//! ## 架构关系（How）
//! - 读写全部委托给核心上下文，互斥与计数都在核心内完成；
//! - 本模块只补充调用方内存的适配（切片目的端/来源端）、errno 翻译与日志。

use msgdev_core::{
    CoreError, DeviceContext, MessageStore, Occupancy, ReadOutcome, ReadReturn, SliceSink,
    SliceSource, StoreKind, WriteOutcome, validate_request_len,
};
use tracing::{debug, info, warn};

use crate::{
    config::DeviceConfig,
    error::DeviceError,
    ops::CharDeviceOps,
    stats::{DeviceStats, DeviceStatsSnapshot},
};

/// 已激活的消息设备。
///
/// # 契约说明（What）
/// - [`install`](Self::install) 成功后设备即可读写；设置非法时激活失败，不产生任何实例；
/// - [`shutdown`](Self::shutdown) 消费设备，缓冲随之释放；
/// - 设备可在线程间共享（`&self` 即可读写），互斥由核心上下文保证。
pub struct MessageDevice {
    name: String,
    class: String,
    context: DeviceContext,
    stats: DeviceStats,
}

impl MessageDevice {
    /// 依据配置创建缓冲并注册设备。
    pub fn install(config: DeviceConfig) -> Result<Self, DeviceError> {
        config.validate().inspect_err(|err| {
            warn!(device = %config.name, error = %err, "rejected device configuration");
        })?;
        let DeviceConfig {
            name,
            class,
            buffer,
        } = config;
        info!(
            device = %name,
            class = %class,
            capacity = buffer.capacity,
            "installing message device"
        );

        let context = DeviceContext::from_settings(&buffer).map_err(DeviceError::Configuration)?;

        info!(
            device = %name,
            store = ?buffer.store,
            read_return = ?buffer.read_return,
            "message device registered"
        );
        Ok(Self {
            name,
            class,
            context,
            stats: DeviceStats::default(),
        })
    }

    /// 注销设备并释放缓冲。
    pub fn shutdown(self) {
        let open_handles = self.stats.open_handles();
        if open_handles > 0 {
            warn!(device = %self.name, open_handles, "shutting down with open handles");
        }
        info!(
            device = %self.name,
            discarded = self.context.len(),
            "message device removed, goodbye"
        );
    }

    /// 打开设备，返回关闭时自动释放的句柄。
    pub fn open(&self) -> Result<DeviceHandle<'_>, DeviceError> {
        CharDeviceOps::open(self)?;
        Ok(DeviceHandle { device: self })
    }

    /// 写入整段字节，返回写入结果。
    pub fn write_bytes(&self, src: &[u8]) -> WriteOutcome {
        self.write_from(src.len(), src)
    }

    /// 以 `buf` 为目的端读取至多 `requested` 字节。
    ///
    /// # 契约说明（What）
    /// - 成功时 `buf[..transferred]` 为读出内容；
    /// - 实际应搬出的字节数超过 `buf.len()` 时视为搬运失败，返回 [`DeviceError::Fault`]，缓冲不变。
    pub fn read_into(&self, requested: usize, buf: &mut [u8]) -> Result<ReadOutcome, DeviceError> {
        match self.context.read(requested, &mut SliceSink::new(buf)) {
            Ok(outcome) => {
                info!(
                    device = %self.name,
                    requested,
                    transferred = outcome.transferred,
                    remaining = outcome.remaining,
                    "sent {} bytes to the caller",
                    outcome.transferred
                );
                Ok(outcome)
            }
            Err(err) => Err(self.report_fault(requested, err)),
        }
    }

    /// ssize 风格读取：返回报告字节数，失败时返回负 errno。
    ///
    /// # 执行步骤（How）
    /// 1. 负长度在触碰缓冲之前以 `-EINVAL` 拒绝；
    /// 2. 以 `buf` 为目的端读取 `len` 字节；应搬出的字节放不进 `buf` 时返回 `-EFAULT`，缓冲不变；
    /// 3. 成功时按读取返回值约定报告（`LegacyZero` 恒为 0）。
    pub fn read_ssize(&self, buf: &mut [u8], len: isize) -> isize {
        let requested = match self.checked_len(len) {
            Ok(requested) => requested,
            Err(err) => return err.as_ssize(),
        };
        match self.read_into(requested, buf) {
            Ok(outcome) => to_ssize(outcome.reported()),
            Err(err) => err.as_ssize(),
        }
    }

    /// ssize 风格写入：返回存入字节数，负长度返回 `-EINVAL`。
    ///
    /// `len` 超过 `buf.len()` 时只存入来源实际能提供的字节。
    pub fn write_ssize(&self, buf: &[u8], len: isize) -> isize {
        match self.checked_len(len) {
            Ok(requested) => to_ssize(self.write_from(requested, buf).accepted),
            Err(err) => err.as_ssize(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn store_kind(&self) -> StoreKind {
        self.context.with_store(|store| store.kind())
    }

    pub fn read_return(&self) -> ReadReturn {
        self.context.read_return()
    }

    pub fn len(&self) -> usize {
        self.context.len()
    }

    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.context.capacity()
    }

    /// 最多可保存的字节数，即 `capacity - 1`。
    pub fn usable_capacity(&self) -> usize {
        self.context.with_store(|store| store.usable_capacity())
    }

    /// 还能接受的字节数。
    pub fn available(&self) -> usize {
        self.context.with_store(|store| store.available())
    }

    pub fn occupancy(&self) -> Occupancy {
        self.context.occupancy()
    }

    /// 复制当前缓冲内容，不消费。
    pub fn snapshot(&self) -> Vec<u8> {
        self.context.snapshot()
    }

    /// 丢弃缓冲内容。
    pub fn clear(&self) {
        let discarded = self.context.len();
        self.context.clear();
        debug!(device = %self.name, discarded, "message buffer cleared");
    }

    pub fn stats(&self) -> DeviceStatsSnapshot {
        self.stats.snapshot(self.context.stats())
    }

    fn write_from(&self, requested: usize, src: &[u8]) -> WriteOutcome {
        let outcome = self.context.write(requested, &mut SliceSource::new(src));
        if outcome.truncated() {
            debug!(
                device = %self.name,
                requested,
                accepted = outcome.accepted,
                dropped = outcome.offered - outcome.accepted,
                "buffer full, write truncated"
            );
        }
        info!(
            device = %self.name,
            requested,
            accepted = outcome.accepted,
            len = outcome.len,
            "received {} bytes from the caller",
            outcome.accepted
        );
        outcome
    }

    fn checked_len(&self, len: isize) -> Result<usize, DeviceError> {
        validate_request_len(len).map_err(|err| {
            warn!(device = %self.name, requested = len, "rejected negative length");
            DeviceError::InvalidArgument(err)
        })
    }

    fn report_fault(&self, requested: usize, err: CoreError) -> DeviceError {
        let not_copied = err.transfer_fault().map_or(0, |fault| fault.not_copied());
        warn!(
            device = %self.name,
            requested,
            not_copied,
            error = %err,
            "failed to send {} bytes to the caller",
            not_copied
        );
        DeviceError::from(err)
    }
}

impl CharDeviceOps for MessageDevice {
    fn open(&self) -> Result<(), DeviceError> {
        let open_handles = self.stats.record_open();
        info!(device = %self.name, open_handles, "device opened");
        Ok(())
    }

    fn release(&self) {
        let open_handles = self.stats.record_release();
        info!(device = %self.name, open_handles, "device closed");
    }

    fn read(&self, _offset: u64, buf: &mut [u8]) -> Result<usize, DeviceError> {
        self.read_into(buf.len(), buf)
            .map(|outcome| outcome.reported())
    }

    fn write(&self, _offset: u64, buf: &[u8]) -> Result<usize, DeviceError> {
        Ok(self.write_bytes(buf).accepted)
    }
}

/// 一次打开对应的句柄，离开作用域即关闭设备。
///
/// 句柄只借用设备，因此设备在全部句柄关闭前无法 [`shutdown`](MessageDevice::shutdown)。
#[must_use = "dropping the handle closes the device immediately"]
pub struct DeviceHandle<'a> {
    device: &'a MessageDevice,
}

impl DeviceHandle<'_> {
    pub fn device(&self) -> &MessageDevice {
        self.device
    }

    /// 读取至多 `buf.len()` 字节，返回报告字节数。
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, DeviceError> {
        CharDeviceOps::read(self.device, 0, buf)
    }

    /// 写入 `buf`，返回存入字节数。
    pub fn write(&self, buf: &[u8]) -> Result<usize, DeviceError> {
        CharDeviceOps::write(self.device, 0, buf)
    }
}

impl Drop for DeviceHandle<'_> {
    fn drop(&mut self) {
        CharDeviceOps::release(self.device);
    }
}

fn to_ssize(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EFAULT, EINVAL};
    use msgdev_core::BufferSettings;
    use tracing_test::traced_test;

    fn device_with(settings: BufferSettings) -> MessageDevice {
        MessageDevice::install(DeviceConfig {
            buffer: settings,
            ..DeviceConfig::default()
        })
        .expect("设置合法")
    }

    #[test]
    #[traced_test]
    fn install_and_shutdown_are_logged() {
        let device = MessageDevice::install(DeviceConfig::default()).expect("默认配置合法");
        assert!(logs_contain("installing message device"));
        assert!(logs_contain("message device registered"));
        device.shutdown();
        assert!(logs_contain("goodbye"));
    }

    #[test]
    #[traced_test]
    fn transfers_are_logged_with_byte_counts() {
        let device = MessageDevice::install(DeviceConfig::default()).expect("默认配置合法");
        device.write_bytes(b"Hello");
        assert!(logs_contain("received 5 bytes from the caller"));

        let mut buf = [0u8; 8];
        device.read_into(8, &mut buf).expect("读取成功");
        assert!(logs_contain("sent 5 bytes to the caller"));
    }

    #[test]
    #[traced_test]
    fn truncation_and_fault_are_logged() {
        let device = device_with(BufferSettings {
            capacity: 4,
            ..BufferSettings::default()
        });
        device.write_bytes(b"abcdef");
        assert!(logs_contain("buffer full, write truncated"));

        let mut tiny = [0u8; 1];
        assert_eq!(device.read_ssize(&mut tiny, 3), -(EFAULT as isize));
        assert!(logs_contain("failed to send 2 bytes to the caller"));
    }

    #[test]
    fn rejected_settings_fail_install() {
        let result = MessageDevice::install(DeviceConfig {
            buffer: BufferSettings {
                capacity: 0,
                ..BufferSettings::default()
            },
            ..DeviceConfig::default()
        });
        assert!(matches!(result, Err(DeviceError::Configuration(_))));
    }

    #[test]
    fn negative_length_leaves_buffer_untouched() {
        let device = MessageDevice::install(DeviceConfig::default()).expect("默认配置合法");
        device.write_bytes(b"keep");
        let mut buf = [0u8; 4];
        assert_eq!(device.read_ssize(&mut buf, -1), -(EINVAL as isize));
        assert_eq!(device.write_ssize(b"more", -4), -(EINVAL as isize));
        assert_eq!(device.snapshot(), b"keep");
        assert_eq!(device.stats().transfer.writes, 1);
    }

    /// 环形存储内容跨界时，告警中的未拷贝字节数按整段请求计算。
    #[test]
    #[traced_test]
    fn wrapped_ring_fault_reports_whole_request() {
        let device = device_with(BufferSettings {
            capacity: 8,
            store: StoreKind::Ring,
            ..BufferSettings::default()
        });
        device.write_bytes(b"012345");
        let mut drain = [0u8; 5];
        assert_eq!(device.read_ssize(&mut drain, 5), 5);
        device.write_bytes(b"abcde");

        let mut tiny = [0u8; 2];
        assert_eq!(device.read_ssize(&mut tiny, 6), -(EFAULT as isize));
        assert!(logs_contain("failed to send 4 bytes to the caller"));
        assert_eq!(device.snapshot(), b"5abcde");
    }
}
