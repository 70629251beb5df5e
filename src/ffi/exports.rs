//! C ABI 导出函数
//!
//! 对应 include/proclist.h。所有导出函数都不会把 panic 传播到宿主进程。

#![allow(non_snake_case)]

use std::os::raw::{c_int, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use crate::bridge::config::BridgeConfig;
use crate::bridge::marshal::{FillReport, FillStatus};
use crate::bridge::source::SystemSource;
use crate::bridge::Bridge;
use crate::ffi::safe_wrapper::SystemInterface;
use crate::ffi::types::{NativeProcessEntry, SystemError};

pub const PROCLIST_OK: c_int = 0;
pub const PROCLIST_ERR_ENUMERATION: c_int = -1;
pub const PROCLIST_ERR_REGISTRY_FULL: c_int = -2;
pub const PROCLIST_ERR_INVALID_ARGUMENT: c_int = -3;
pub const PROCLIST_ERR_PANIC: c_int = -4;

pub const PROCLIST_KILL_INVALID_PID: c_int = -1;
pub const PROCLIST_KILL_NOT_FOUND: c_int = -2;
pub const PROCLIST_KILL_PERMISSION_DENIED: c_int = -3;
pub const PROCLIST_KILL_FAILED: c_int = -4;

/// 进程级的桥接实例，首次调用时创建并存活到进程结束
pub fn global_bridge() -> &'static Bridge<SystemSource> {
    static BRIDGE: OnceLock<Bridge<SystemSource>> = OnceLock::new();
    BRIDGE.get_or_init(|| {
        crate::init_logging("warn");
        let config = BridgeConfig::load().unwrap_or_else(|e| {
            log::warn!("{}, falling back to defaults", e);
            BridgeConfig::default()
        });
        log::debug!("bridge created with registry capacity {}", config.registry_capacity);
        Bridge::new(SystemSource::default(), &config)
    })
}

fn status_code(status: FillStatus) -> c_int {
    match status {
        FillStatus::Complete => PROCLIST_OK,
        FillStatus::EnumerationFailed => PROCLIST_ERR_ENUMERATION,
        FillStatus::RegistryFull => PROCLIST_ERR_REGISTRY_FULL,
        FillStatus::InvalidArgument => PROCLIST_ERR_INVALID_ARGUMENT,
    }
}

fn fill(capacity: c_int, destination: *mut c_void) -> (c_int, c_int) {
    if capacity < 0 {
        log::warn!("negative capacity {} passed to FillBuffer", capacity);
        return (0, PROCLIST_ERR_INVALID_ARGUMENT);
    }

    let result = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
        global_bridge().fill_buffer(capacity as usize, destination.cast::<NativeProcessEntry>())
    }));

    match result {
        // written <= capacity，不会溢出 c_int
        Ok(FillReport { written, status }) => (written as c_int, status_code(status)),
        Err(_) => {
            log::error!("panic while filling process buffer");
            (0, PROCLIST_ERR_PANIC)
        }
    }
}

/// 把最多 `capacity` 个进程写入 `destination`，返回写入数量
///
/// # Safety
///
/// `destination` 必须指向至少 `capacity * sizeof(struct process)` 字节的可写内存。
/// 写入的字符串在下一次 `ReleaseAll` 之前有效，调用方不得自行释放。
#[no_mangle]
pub unsafe extern "C" fn FillBuffer(capacity: c_int, destination: *mut c_void) -> c_int {
    fill(capacity, destination).0
}

/// 与 `FillBuffer` 相同，另外把 `PROCLIST_*` 状态码写入 `status`（可为空）
///
/// # Safety
///
/// 同 `FillBuffer`；`status` 为空或指向可写的 `int`。
#[no_mangle]
pub unsafe extern "C" fn FillBufferChecked(
    capacity: c_int,
    destination: *mut c_void,
    status: *mut c_int,
) -> c_int {
    let (written, code) = fill(capacity, destination);
    if !status.is_null() {
        status.write(code);
    }
    written
}

/// 释放自上次 `ReleaseAll` 以来发出的全部字符串
#[no_mangle]
pub extern "C" fn ReleaseAll() {
    if panic::catch_unwind(|| global_bridge().release_all()).is_err() {
        log::error!("panic while releasing native strings");
    }
}

/// 当前由库持有的字符串数量
#[no_mangle]
pub extern "C" fn LiveAllocations() -> c_int {
    panic::catch_unwind(|| global_bridge().live_allocations())
        .map(|n| c_int::try_from(n).unwrap_or(c_int::MAX))
        .unwrap_or(0)
}

/// 向 `pid` 发送 SIGTERM
#[no_mangle]
pub extern "C" fn KillProcess(pid: c_int) -> c_int {
    let result = panic::catch_unwind(|| SystemInterface::new().terminate(pid));
    match result {
        Ok(Ok(())) => PROCLIST_OK,
        Ok(Err(e)) => {
            log::warn!("failed to terminate pid {}: {}", pid, e);
            kill_code(&e)
        }
        Err(_) => PROCLIST_KILL_FAILED,
    }
}

fn kill_code(err: &SystemError) -> c_int {
    match err {
        SystemError::InvalidPid(_) => PROCLIST_KILL_INVALID_PID,
        SystemError::ProcessNotFound => PROCLIST_KILL_NOT_FOUND,
        SystemError::PermissionDenied => PROCLIST_KILL_PERMISSION_DENIED,
        _ => PROCLIST_KILL_FAILED,
    }
}
