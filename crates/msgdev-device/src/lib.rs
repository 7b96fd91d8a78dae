#![deny(unsafe_code)]

//! `msgdev-device` 把 [`msgdev_core`] 的消息缓冲装配成一个可激活、可打开的字符设备。
//!
//! # 模块定位（Why）
//! - 核心 crate 只负责缓冲与读写契约；设备的生命周期、配置加载、errno 翻译与日志
//!   都依赖标准库，集中在本 crate。
//!
//! # 设计概要（How）
//! - `config`：TOML 形式的 [`DeviceConfig`]；
//! - `device`：[`MessageDevice`] 生命周期、[`DeviceHandle`] 打开/关闭、ssize 风格调用面；
//! - `ops`：字符设备操作表 [`CharDeviceOps`]；
//! - `error`：[`DeviceError`] 与 errno 映射；
//! - `logging`：宿主进程的 `tracing-subscriber` 装配。
//!
//! # 示例
//! ```rust
//! use msgdev_device::{DeviceConfig, MessageDevice};
//!
//! let device = MessageDevice::install(DeviceConfig::default())?;
//! {
//!     let handle = device.open()?;
//!     assert_eq!(handle.write(b"Hello")?, 5);
//!     let mut buf = [0u8; 16];
//!     assert_eq!(handle.read(&mut buf)?, 5);
//!     assert_eq!(&buf[..5], b"Hello");
//! }
//! device.shutdown();
//! # Ok::<(), msgdev_device::DeviceError>(())
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod ops;
pub mod stats;

pub use config::DeviceConfig;
pub use device::{DeviceHandle, MessageDevice};
pub use error::{DeviceError, EFAULT, EINVAL};
pub use ops::CharDeviceOps;
pub use stats::{DeviceStats, DeviceStatsSnapshot};
