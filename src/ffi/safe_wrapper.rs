use super::types::{ProcessId, Result, SystemError};
use std::io;
use std::os::raw::c_int;

/// 对进程相关系统调用的安全封装
#[derive(Debug, Default)]
pub struct SystemInterface;

impl SystemInterface {
    /// 创建新的系统接口实例
    pub fn new() -> Self {
        Self
    }

    /// 安全地发送信号给进程
    ///
    /// # 参数
    ///
    /// * `pid` - 目标进程ID
    /// * `signal` - 要发送的信号
    ///
    /// # 错误
    ///
    /// * `SystemError::ProcessNotFound` - 如果进程不存在
    /// * `SystemError::PermissionDenied` - 如果没有权限
    pub fn kill(&self, pid: ProcessId, signal: c_int) -> Result<()> {
        let result = unsafe { libc::kill(pid.as_raw(), signal) };

        match result {
            0 => Ok(()),
            _ => Err(classify_os_error(io::Error::last_os_error())),
        }
    }

    /// 以 SIGTERM 请求进程退出
    pub fn terminate(&self, pid: i32) -> Result<()> {
        let pid = ProcessId::new(pid).ok_or(SystemError::InvalidPid(pid))?;
        log::info!("sending SIGTERM to process {}", pid.as_raw());
        self.kill(pid, libc::SIGTERM)
    }
}

fn classify_os_error(err: io::Error) -> SystemError {
    match err.raw_os_error() {
        Some(libc::ESRCH) => SystemError::ProcessNotFound,
        Some(libc::EPERM) => SystemError::PermissionDenied,
        _ => SystemError::SyscallError(err),
    }
}
