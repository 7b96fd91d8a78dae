use alloc::{boxed::Box, vec, vec::Vec};

use super::{DEFAULT_CAPACITY, MessageStore, check_capacity};
use crate::{
    error::Result,
    transfer::{TransferFault, TransferSink, TransferSource},
};

/// `RingMessageBuffer` 以头/尾游标实现 O(1) 读写，外部行为与 [`MessageBuffer`](super::MessageBuffer) 完全一致。
///
/// # 设计动机（Why）
/// - 压缩式存储每次读取都要搬移剩余内容；容量放大后这一成本线性增长。
/// - 环形布局只推进游标，代价是内容可能跨越存储末尾，需要拆成两段搬运。
///
/// # 结构（How）
/// - `head`：逻辑偏移 0 在 `storage` 中的物理位置；
/// - `len`：有效内容长度；尾部位置为 `(head + len) % capacity`。
///
/// # 风险提示（Trade-offs）
/// - 内容跨界时读取会调用两次 `transfer_out`；若第二段失败，目的端可能已收到第一段，
///   但缓冲本身保持原状，读取整体仍报告失败；[`TransferFault`] 以整段请求计数，不暴露分段细节。
#[derive(Clone, Debug)]
pub struct RingMessageBuffer {
    storage: Box<[u8]>,
    head: usize,
    len: usize,
}

impl RingMessageBuffer {
    /// 以默认容量创建空缓冲。
    pub fn new() -> Self {
        Self {
            storage: vec![0u8; DEFAULT_CAPACITY].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// 以指定容量创建空缓冲。
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;
        Ok(Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        })
    }

    /// 有效内容的两段物理切片，第二段在未跨界时为空。
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        let first = self.len.min(self.storage.len() - self.head);
        (
            &self.storage[self.head..self.head + first],
            &self.storage[..self.len - first],
        )
    }

    fn tail(&self) -> usize {
        (self.head + self.len) % self.storage.len()
    }
}

impl Default for RingMessageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore for RingMessageBuffer {
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
        let tail = self.tail();
        let first = accepted.min(self.storage.len() - tail);
        let mut copied = source.transfer_in(&mut self.storage[tail..tail + first]);
        if copied == first && accepted > first {
            copied += source.transfer_in(&mut self.storage[..accepted - first]);
        }
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
        // 失败统一按整段 `effective` 报告，与压缩式存储的单次搬运口径一致。
        let first = effective.min(self.storage.len() - self.head);
        sink.transfer_out(&self.storage[self.head..self.head + first])
            .map_err(|fault| {
                TransferFault::new(effective, fault.not_copied() + (effective - first))
            })?;
        if effective > first {
            sink.transfer_out(&self.storage[..effective - first])
                .map_err(|fault| TransferFault::new(effective, fault.not_copied()))?;
        }
        self.len -= effective;
        self.head = if self.len == 0 {
            0
        } else {
            (self.head + effective) % self.storage.len()
        };
        Ok(effective)
    }

    fn snapshot(&self) -> Vec<u8> {
        let (front, back) = self.as_slices();
        let mut out = Vec::with_capacity(self.len);
        out.extend_from_slice(front);
        out.extend_from_slice(back);
        out
    }

    fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_stubs::FaultingSink;
    use crate::transfer::SliceSink;

    /// 构造内容跨越存储末尾的缓冲：容量 8，先写 6 读 5，再写 5。
    fn wrapped() -> RingMessageBuffer {
        let mut ring = RingMessageBuffer::with_capacity(8).expect("8 字节容量合法");
        assert_eq!(ring.write_bytes(b"012345"), 6);
        assert_eq!(ring.read_to_vec(5), b"01234");
        assert_eq!(ring.write_bytes(b"abcde"), 5);
        ring
    }

    #[test]
    fn wrapped_content_reads_back_in_order() {
        let mut ring = wrapped();
        let (front, back) = ring.as_slices();
        assert!(!back.is_empty(), "该场景必须跨界");
        assert_eq!([front, back].concat(), b"5abcde");
        assert_eq!(ring.snapshot(), b"5abcde");

        let mut dst = [0u8; 16];
        let mut sink = SliceSink::new(&mut dst);
        assert_eq!(ring.consume_into(16, &mut sink), Ok(6));
        assert_eq!(sink.filled(), 6);
        assert_eq!(&dst[..6], b"5abcde");
        assert!(ring.is_empty());
    }

    #[test]
    fn fault_on_wrapped_read_keeps_cursors() {
        let mut ring = wrapped();
        let before = ring.snapshot();
        let mut sink = FaultingSink::default();
        let fault = ring.consume_into(4, &mut sink).expect_err("故障目的端必须让读取失败");
        assert_eq!(fault, TransferFault::new(4, 4));
        // 第一段失败后不再尝试第二段。
        assert_eq!(sink.attempts(), 1);
        assert_eq!(ring.snapshot(), before);
        assert_eq!(ring.len(), 6);
    }

    #[test]
    fn second_segment_fault_counts_whole_request() {
        let mut ring = wrapped();
        // 第一段 3 字节放得下，第二段 3 字节只剩 1 字节空间。
        let mut dst = [0u8; 4];
        let mut sink = SliceSink::new(&mut dst);
        let fault = ring.consume_into(6, &mut sink).expect_err("目的端过小");
        assert_eq!(fault, TransferFault::new(6, 2));
        assert_eq!(sink.filled(), 3);
        assert_eq!(ring.snapshot(), b"5abcde");
    }

    #[test]
    fn wrapped_write_is_clamped_to_reserved_slot() {
        let mut ring = wrapped();
        assert_eq!(ring.available(), 1);
        assert_eq!(ring.write_bytes(b"XYZ"), 1);
        assert_eq!(ring.snapshot(), b"5abcdeX");
        assert_eq!(ring.write_bytes(b"Q"), 0);
    }
}
