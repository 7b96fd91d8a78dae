use crate::error::DeviceError;

/// 字符设备操作表。
///
/// # 教案式说明
/// - **意图 (Why)**：宿主把 `open`/`release`/`read`/`write` 四个入口分派给具体设备；
///   以 trait 固化这张表，宿主侧只依赖契约，不依赖设备的内部布局。
/// - **契约 (What)**：
///   - `offset` 对流式设备没有意义，实现可以忽略；
///   - `read` 返回报告给调用方的字节数，`write` 返回实际存入的字节数；
///   - 部分搬运是正常结果，只有搬运失败或参数非法才返回 [`DeviceError`]。
pub trait CharDeviceOps {
    /// 调用方打开设备节点。
    fn open(&self) -> Result<(), DeviceError> {
        Ok(())
    }

    /// 调用方关闭设备节点。
    fn release(&self) {}

    fn read(&self, offset: u64, buf: &mut [u8]) -> Result<usize, DeviceError>;

    fn write(&self, offset: u64, buf: &[u8]) -> Result<usize, DeviceError>;
}
