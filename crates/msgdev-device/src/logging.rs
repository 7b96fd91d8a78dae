//! 宿主进程的日志装配。
//!
//! # 教案式说明
//! - **意图（Why）**：设备本身只发出 `tracing` 事件，不决定输出去向；
//!   独立运行的宿主（例如演示程序或集成环境）调用一次 [`install_fmt_subscriber`] 即可看到文本日志。
//! - **逻辑（How）**：`tracing-subscriber` 组装 `EnvFilter + fmt` Layer 并设为全局 Subscriber；
//!   过滤指令优先取 `RUST_LOG`，缺省为 [`DEFAULT_DIRECTIVE`]。
//! - **契约（What）**：外部已设置全局 Subscriber 时返回 [`LoggingError::SubscriberAlreadySet`]，不覆盖既有配置。

use thiserror::Error;
use tracing::dispatcher;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// `RUST_LOG` 缺失或非法时使用的过滤指令。
pub const DEFAULT_DIRECTIVE: &str = "info";

/// 日志装配失败。
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("a global tracing subscriber is already installed")]
    SubscriberAlreadySet,
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// 安装 `fmt + EnvFilter` 全局 Subscriber。
pub fn install_fmt_subscriber() -> Result<(), LoggingError> {
    if dispatcher::has_been_set() {
        return Err(LoggingError::SubscriberAlreadySet);
    }
    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

