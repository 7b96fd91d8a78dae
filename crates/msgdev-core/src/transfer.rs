//! 跨信任边界的字节搬运原语。
//!
//! # 教案式说明
//! - **意图（Why）**：设备缓冲位于“内核侧”，调用方的内存位于“用户侧”，两者之间的拷贝可能独立于缓冲状态失败。
//!   核心不关心拷贝如何实现，只依赖这里定义的两个最小 trait。
//! - **逻辑（How）**：[`TransferSink`] 描述读路径的“搬出”，失败时返回 [`TransferFault`]；
//!   [`TransferSource`] 描述写路径的“搬入”，只报告实际拷贝的字节数，从不失败。
//!   两者均为游标语义：同一次操作内的多次调用按顺序追加/消费。
//! - **契约（What）**：实现者必须保证 `transfer_out` 失败时不推进游标；
//!   `transfer_in` 返回值不得超过 `dst.len()`。

use alloc::vec::Vec;
use core::fmt;

/// 读路径的目的端。
pub trait TransferSink {
    /// 将 `src` 追加到目的端当前游标之后。
    ///
    /// - **前置条件**：`src` 为缓冲中的有效内容，长度可能为 0；
    /// - **后置条件**：成功时游标前进 `src.len()`；失败时游标不变并返回未拷贝字节数。
    fn transfer_out(&mut self, src: &[u8]) -> Result<(), TransferFault>;
}

/// 写路径的来源端。
pub trait TransferSource {
    /// 剩余可供拷贝的字节数。
    fn remaining(&self) -> usize;

    /// 将至多 `dst.len()` 字节拷贝进 `dst`，返回实际拷贝数并推进游标。
    fn transfer_in(&mut self, dst: &mut [u8]) -> usize;
}

/// 搬出失败的上下文，语义对齐“有多少字节未能拷贝”。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferFault {
    requested: usize,
    not_copied: usize,
}

impl TransferFault {
    /// 构造失败记录；`not_copied` 会被截断到 `requested` 以内。
    pub fn new(requested: usize, not_copied: usize) -> Self {
        Self {
            requested,
            not_copied: not_copied.min(requested),
        }
    }

    /// 本次尝试搬运的字节数。
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// 未能搬运的字节数。
    pub fn not_copied(&self) -> usize {
        self.not_copied
    }
}

impl fmt::Display for TransferFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transfer fault: {} of {} bytes not copied",
            self.not_copied, self.requested
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransferFault {}

/// 以定长切片作为目的端。
///
/// 目的端剩余空间不足以容纳整段 `src` 时整体拒绝，不做部分拷贝；
/// 这对应调用方声明的长度超出其真实可写区域的情形。
#[derive(Debug)]
pub struct SliceSink<'a> {
    dst: &'a mut [u8],
    filled: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, filled: 0 }
    }

    /// 已写入目的端的字节数。
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// 目的端剩余可写字节数。
    pub fn remaining(&self) -> usize {
        self.dst.len() - self.filled
    }
}

impl TransferSink for SliceSink<'_> {
    fn transfer_out(&mut self, src: &[u8]) -> Result<(), TransferFault> {
        let room = self.remaining();
        if src.len() > room {
            return Err(TransferFault::new(src.len(), src.len() - room));
        }
        self.dst[self.filled..self.filled + src.len()].copy_from_slice(src);
        self.filled += src.len();
        Ok(())
    }
}

impl TransferSink for Vec<u8> {
    fn transfer_out(&mut self, src: &[u8]) -> Result<(), TransferFault> {
        self.extend_from_slice(src);
        Ok(())
    }
}

/// 以切片作为来源端，按游标顺序消费。
#[derive(Clone, Debug)]
pub struct SliceSource<'a> {
    src: &'a [u8],
    consumed: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, consumed: 0 }
    }

    /// 已被拷贝走的字节数。
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl TransferSource for SliceSource<'_> {
    fn remaining(&self) -> usize {
        self.src.len() - self.consumed
    }

    fn transfer_in(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.remaining());
        dst[..n].copy_from_slice(&self.src[self.consumed..self.consumed + n]);
        self.consumed += n;
        n
    }
}
