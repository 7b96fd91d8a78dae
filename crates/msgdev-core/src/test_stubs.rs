//! 官方维护的搬运原语测试桩。
//!
//! # 设计背景（Why）
//! - 搬运失败路径依赖外部条件（例如调用方给出非法地址），在测试中需要可控地复现；
//! - 集中维护桩对象，核心与宿主层测试共用同一套失败语义。

use crate::transfer::{TransferFault, TransferSink, TransferSource};

/// 拒绝一切拷贝的目的端，记录被调用次数。
#[derive(Debug, Default)]
pub struct FaultingSink {
    attempts: usize,
}

impl FaultingSink {
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl TransferSink for FaultingSink {
    fn transfer_out(&mut self, src: &[u8]) -> Result<(), TransferFault> {
        self.attempts += 1;
        Err(TransferFault::new(src.len(), src.len()))
    }
}

/// 无限重复同一字节的来源端，用于构造超长写入。
#[derive(Clone, Copy, Debug)]
pub struct RepeatSource {
    byte: u8,
}

impl RepeatSource {
    pub fn new(byte: u8) -> Self {
        Self { byte }
    }
}

impl TransferSource for RepeatSource {
    fn remaining(&self) -> usize {
        usize::MAX
    }

    fn transfer_in(&mut self, dst: &mut [u8]) -> usize {
        dst.fill(self.byte);
        dst.len()
    }
}
