use alloc::{boxed::Box, vec, vec::Vec};

use super::{DEFAULT_CAPACITY, MessageStore, check_capacity};
use crate::{
    error::Result,
    transfer::{TransferFault, TransferSink, TransferSource},
};

/// `MessageBuffer` 是压缩式的参考存储：内容始终从偏移 0 开始连续存放。
///
/// # 设计动机（Why）
/// - 与经典字符设备驱动的行为逐字节对齐：读取消费前缀后，把未读后缀整体搬回头部。
/// - 容量很小（默认 256 字节），每次读取 O(n) 的搬移成本可以接受；
///   需要 O(1) 读写时改用 [`RingMessageBuffer`](super::RingMessageBuffer)。
///
/// # 结构（How）
/// - `storage`：长度恒为 `capacity` 的定长字节块；
/// - `len`：有效内容长度，`[0, len)` 为内容，`[len, capacity)` 为陈旧数据。
///
/// # 契约（What）
/// - 写入截断到 `capacity - len - 1`，读取截断到 `len`；
/// - 读取在搬运成功之后才压缩，失败路径不触碰 `storage` 与 `len`。
#[derive(Clone, Debug)]
pub struct MessageBuffer {
    storage: Box<[u8]>,
    len: usize,
}

impl MessageBuffer {
    /// 以默认容量创建空缓冲。
    pub fn new() -> Self {
        Self {
            storage: vec![0u8; DEFAULT_CAPACITY].into_boxed_slice(),
            len: 0,
        }
    }

    /// 以指定容量创建空缓冲；容量必须至少为 [`MIN_CAPACITY`](super::MIN_CAPACITY)。
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;
        Ok(Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        })
    }

    /// 当前有效内容的只读视图。
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.len]
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore for MessageBuffer {
    fn capacity(&self) -> usize {
        self.storage.len()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn append_from(&mut self, requested: usize, source: &mut dyn TransferSource) -> usize {
        let accepted = requested.min(self.available());
        if accepted == 0 {
            return 0;
        }
        let start = self.len;
        let copied = source.transfer_in(&mut self.storage[start..start + accepted]);
        self.len += copied;
        copied
    }

    fn consume_into(
        &mut self,
        requested: usize,
        sink: &mut dyn TransferSink,
    ) -> core::result::Result<usize, TransferFault> {
        let effective = requested.min(self.len);
        if effective == 0 {
            return Ok(0);
        }
        sink.transfer_out(&self.storage[..effective])?;
        self.storage.copy_within(effective..self.len, 0);
        self.len -= effective;
        Ok(effective)
    }

    fn snapshot(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    fn clear(&mut self) {
        self.len = 0;
    }
}
