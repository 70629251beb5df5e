use std::fs;
use std::io;
use std::path::Path;

use crate::ffi::types::{Result, SystemError};

/// /proc/[pid]/stat 中桥接层关心的字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStat {
    pub pid: i32,
    pub comm: String,
    pub state: char,
    pub ppid: i32,
}

impl ProcessStat {
    /// 读取并解析 `<proc_root>/<pid>/stat`
    pub fn read(proc_root: &Path, pid: i32) -> Result<Self> {
        let path = proc_root.join(pid.to_string()).join("stat");
        let raw = fs::read(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                SystemError::ProcessNotFound
            } else {
                SystemError::SyscallError(e)
            }
        })?;

        // comm 可能不是合法的 UTF-8
        Self::parse_stat(&String::from_utf8_lossy(&raw))
    }

    /// 解析stat文件内容
    ///
    /// 进程名可能包含空格和括号，因此取第一个 `(` 与最后一个 `)` 之间的内容。
    pub fn parse_stat(content: &str) -> Result<Self> {
        let comm_start = content
            .find('(')
            .ok_or_else(|| malformed("missing '(' before process name"))?;
        let comm_end = content
            .rfind(')')
            .filter(|end| *end > comm_start)
            .ok_or_else(|| malformed("missing ')' after process name"))?;

        let pid = content[..comm_start]
            .trim()
            .parse()
            .map_err(|_| malformed("invalid pid field"))?;
        let comm = content[comm_start + 1..comm_end].to_string();

        let mut rest = content[comm_end + 1..].split_whitespace();
        let state = rest
            .next()
            .and_then(|s| s.chars().next())
            .ok_or_else(|| malformed("missing state field"))?;
        let ppid = rest.next().and_then(|s| s.parse().ok()).unwrap_or(0);

        Ok(ProcessStat {
            pid,
            comm,
            state,
            ppid,
        })
    }
}

fn malformed(reason: &str) -> SystemError {
    SystemError::MalformedProcEntry(reason.to_string())
}
