use std::io;
use std::path::{Path, PathBuf};

use crate::bridge::source::{ProcessRecord, ProcessSource};
use crate::ffi::types::{Result, SystemError};
use crate::linux::proc_stat::ProcessStat;

/// 默认的 proc 文件系统挂载点
pub const PROC_ROOT: &str = "/proc";

/// 通过遍历 /proc 获取进程列表
#[derive(Debug, Clone)]
pub struct ProcfsSource {
    root: PathBuf,
}

impl Default for ProcfsSource {
    fn default() -> Self {
        Self::new(PROC_ROOT)
    }
}

impl ProcfsSource {
    /// 使用指定的 proc 根目录（测试时可以指向临时目录）
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ProcessSource for ProcfsSource {
    fn list(&self) -> Result<Vec<ProcessRecord>> {
        get_all_processes(&self.root)
    }
}

/// 获取系统中所有进程的列表
///
/// 顺序为目录遍历顺序。遍历期间退出的进程或无法解析的条目会被跳过。
pub fn get_all_processes(proc_root: &Path) -> Result<Vec<ProcessRecord>> {
    let entries = proc_root.read_dir().map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            SystemError::PermissionDenied
        } else {
            SystemError::SyscallError(e)
        }
    })?;

    let mut processes = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();

        // 只处理数字名称的目录（即PID目录）
        let pid = match file_name.to_str().and_then(|s| s.parse::<i32>().ok()) {
            Some(pid) => pid,
            None => continue,
        };

        match ProcessStat::read(proc_root, pid) {
            Ok(stat) => processes.push(ProcessRecord::new(pid, stat.comm)),
            Err(e) => log::debug!("skipping pid {}: {}", pid, e),
        }
    }

    Ok(processes)
}
