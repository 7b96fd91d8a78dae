use alloc::vec::Vec;

use super::{MessageBuffer, MessageStore, RingMessageBuffer};
use crate::{
    error::Result,
    settings::{BufferSettings, StoreKind},
    transfer::{TransferFault, TransferSink, TransferSource},
};

/// 按配置选定的存储实现。
///
/// 设备上下文需要在运行期依据 [`BufferSettings::store`] 选择存储；
/// 以枚举持有具体类型，避免存储泛型参数一路扩散到宿主层，也不需要装箱。
#[derive(Clone, Debug)]
pub enum ConfiguredStore {
    Compacting(MessageBuffer),
    Ring(RingMessageBuffer),
}

impl ConfiguredStore {
    /// 校验设置并创建对应的空存储。
    pub fn from_settings(settings: &BufferSettings) -> Result<Self> {
        settings.validate()?;
        Ok(match settings.store {
            StoreKind::Compacting => {
                ConfiguredStore::Compacting(MessageBuffer::with_capacity(settings.capacity)?)
            }
            StoreKind::Ring => {
                ConfiguredStore::Ring(RingMessageBuffer::with_capacity(settings.capacity)?)
            }
        })
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            ConfiguredStore::Compacting(_) => StoreKind::Compacting,
            ConfiguredStore::Ring(_) => StoreKind::Ring,
        }
    }

    fn as_store(&self) -> &dyn MessageStore {
        match self {
            ConfiguredStore::Compacting(buf) => buf,
            ConfiguredStore::Ring(buf) => buf,
        }
    }

    fn as_store_mut(&mut self) -> &mut dyn MessageStore {
        match self {
            ConfiguredStore::Compacting(buf) => buf,
            ConfiguredStore::Ring(buf) => buf,
        }
    }
}

impl Default for ConfiguredStore {
    fn default() -> Self {
        ConfiguredStore::Compacting(MessageBuffer::new())
    }
}

impl MessageStore for ConfiguredStore {
    fn capacity(&self) -> usize {
        self.as_store().capacity()
    }

    fn len(&self) -> usize {
        self.as_store().len()
    }

    fn append_from(&mut self, requested: usize, source: &mut dyn TransferSource) -> usize {
        self.as_store_mut().append_from(requested, source)
    }

    fn consume_into(
        &mut self,
        requested: usize,
        sink: &mut dyn TransferSink,
    ) -> core::result::Result<usize, TransferFault> {
        self.as_store_mut().consume_into(requested, sink)
    }

    fn snapshot(&self) -> Vec<u8> {
        self.as_store().snapshot()
    }

    fn clear(&mut self) {
        self.as_store_mut().clear()
    }
}
