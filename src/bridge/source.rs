use serde::Serialize;

use crate::ffi::types::{Result, SystemError};

/// 枚举时刻的一个进程：pid 与可执行文件名
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub pid: i32,
    pub executable: String,
}

impl ProcessRecord {
    pub fn new(pid: i32, executable: impl Into<String>) -> Self {
        Self {
            pid,
            executable: executable.into(),
        }
    }
}

/// 进程列表的来源
///
/// 返回的顺序即平台进程表给出的顺序，桥接层不会重新排序。
pub trait ProcessSource {
    fn list(&self) -> Result<Vec<ProcessRecord>>;
}

impl<S: ProcessSource + ?Sized> ProcessSource for &S {
    fn list(&self) -> Result<Vec<ProcessRecord>> {
        (**self).list()
    }
}

impl<S: ProcessSource + ?Sized> ProcessSource for Box<S> {
    fn list(&self) -> Result<Vec<ProcessRecord>> {
        (**self).list()
    }
}

/// 不支持进程枚举的平台使用的来源
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedSource;

impl ProcessSource for UnsupportedSource {
    fn list(&self) -> Result<Vec<ProcessRecord>> {
        Err(SystemError::Unsupported)
    }
}

/// 当前平台的默认进程来源
#[cfg(target_os = "linux")]
pub type SystemSource = crate::linux::proc::ProcfsSource;

#[cfg(not(target_os = "linux"))]
pub type SystemSource = UnsupportedSource;

/// 测试用的固定来源
#[cfg(test)]
pub(crate) struct StaticSource(pub Vec<ProcessRecord>);

#[cfg(test)]
impl ProcessSource for StaticSource {
    fn list(&self) -> Result<Vec<ProcessRecord>> {
        Ok(self.0.clone())
    }
}

/// 测试用的总是失败的来源
#[cfg(test)]
pub(crate) struct FailingSource;

#[cfg(test)]
impl ProcessSource for FailingSource {
    fn list(&self) -> Result<Vec<ProcessRecord>> {
        Err(SystemError::PermissionDenied)
    }
}
