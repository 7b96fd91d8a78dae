#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

//! `msgdev-core` 提供字符设备背后的定长消息缓冲及其读写契约。
//!
//! # 模块定位（Why）
//! - 设备对外只暴露 `read`/`write` 两个入口：写入追加到缓冲尾部，读取从头部消费；
//!   容量固定，溢出与不足都以“部分搬运”降级，不向调用方报错。
//! - 设备注册、节点创建等宿主细节不在本 crate 内；这里只沉淀可在 `no_std + alloc`
//!   环境复用的缓冲管理逻辑。
//!
//! # 设计概要（How）
//! - `buffer`：[`MessageStore`] 契约与压缩式、环形两种实现，以及占用状态机 [`Occupancy`]；
//! - `transfer`：跨信任边界的搬运原语 [`TransferSink`]/[`TransferSource`]；
//! - `context`：[`DeviceContext`] 以互斥锁串行化每次读写，并维护计数器；
//! - `settings`：可反序列化的 [`BufferSettings`]。
//!
//! # 示例
//! ```rust
//! use msgdev_core::{DeviceContext, Occupancy};
//!
//! let ctx = DeviceContext::default();
//! assert_eq!(ctx.write_bytes(b"Hello").accepted, 5);
//! assert_eq!(ctx.write_bytes(b"World").accepted, 5);
//! assert_eq!(ctx.read_to_vec(5), b"Hello");
//! assert_eq!(ctx.snapshot(), b"World");
//! assert_eq!(ctx.occupancy(), Occupancy::Partial);
//! ```

extern crate alloc;

pub mod buffer;
pub mod context;
pub mod error;
pub mod settings;
pub mod stats;
pub mod test_stubs;
pub mod transfer;

pub use buffer::{
    ConfiguredStore, DEFAULT_CAPACITY, MIN_CAPACITY, MessageBuffer, MessageStore, Occupancy,
    RESERVED_SLOTS, RingMessageBuffer,
};
pub use context::{DeviceContext, ReadOutcome, WriteOutcome, validate_request_len};
pub use error::{CoreError, ErrorCategory, Result};
pub use settings::{BufferSettings, ReadReturn, StoreKind};
pub use stats::{TransferStats, TransferStatsSnapshot};
pub use transfer::{SliceSink, SliceSource, TransferFault, TransferSink, TransferSource};
