//! Proclist - operating-system process enumeration behind a C ABI
//!
//! The library fills a caller-supplied array of `struct process` entries
//! (`int pid; char *executable;`) and keeps track of every string it hands
//! out, so a foreign caller can release all of them with a single
//! `ReleaseAll()` call without knowing which allocator produced them.
//! See `include/proclist.h` for the C side of the contract.

// 导出所有公共模块
pub mod bridge;
pub mod ffi;
#[cfg(target_os = "linux")]
pub mod linux;

// 重新导出常用类型，使其可以直接从 crate 根访问
pub use crate::bridge::config::BridgeConfig;
pub use crate::bridge::marshal::{FillReport, FillStatus};
pub use crate::bridge::registry::{AllocationRegistry, RegistryState};
pub use crate::bridge::source::{ProcessRecord, ProcessSource, SystemSource, UnsupportedSource};
pub use crate::bridge::Bridge;
pub use crate::ffi::types::{NativeProcessEntry, ProcessId, Result, SystemError};

/// 库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 初始化日志系统
///
/// 命令行程序在启动时调用；未设置 `RUST_LOG` 时默认输出 info 级别。
pub fn init() -> Result<()> {
    init_logging("info");
    Ok(())
}

/// 安装 env_logger；宿主进程已有 logger 时保持不变
pub(crate) fn init_logging(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}
