use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr;

/// 进程ID的安全包装
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ProcessId(pub(crate) c_int);

impl ProcessId {
    /// 创建新的ProcessId，确保值有效
    pub fn new(pid: i32) -> Option<Self> {
        if pid > 0 {
            Some(ProcessId(pid))
        } else {
            None
        }
    }

    pub fn as_raw(&self) -> c_int {
        self.0
    }
}

/// 跨越 C 边界的进程条目
///
/// 字段顺序与宽度是与外部调用方的二进制约定，对应头文件中的
/// `struct process { int pid; char *executable; }`。
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NativeProcessEntry {
    pub pid: c_int,
    pub executable: *mut c_char,
}

impl NativeProcessEntry {
    /// 未填充的条目（空指针）
    pub const fn empty() -> Self {
        Self {
            pid: 0,
            executable: ptr::null_mut(),
        }
    }

    /// 读取 executable 指向的字符串
    ///
    /// # Safety
    ///
    /// `executable` 必须为空，或指向仍然存活的、以 NUL 结尾的字符串
    /// （即尚未调用 `ReleaseAll`）。
    pub unsafe fn executable(&self) -> Option<&CStr> {
        if self.executable.is_null() {
            None
        } else {
            Some(CStr::from_ptr(self.executable))
        }
    }
}

impl Default for NativeProcessEntry {
    fn default() -> Self {
        Self::empty()
    }
}

/// 错误类型
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Invalid process ID: {0}")]
    InvalidPid(i32),
    #[error("System call failed: {0}")]
    SyscallError(#[from] std::io::Error),
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Process not found")]
    ProcessNotFound,
    #[error("Malformed proc entry: {0}")]
    MalformedProcEntry(String),
    #[error("Process enumeration is not supported on this platform")]
    Unsupported,
    #[error("Allocation registry is full ({capacity} live allocations)")]
    CapacityExceeded { capacity: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SystemError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::mem;

    #[test]
    fn test_entry_layout_matches_c_struct() {
        // int 之后按指针宽度对齐
        assert_eq!(mem::align_of::<NativeProcessEntry>(), mem::align_of::<*mut c_char>());
        assert_eq!(
            mem::size_of::<NativeProcessEntry>(),
            2 * mem::size_of::<*mut c_char>().max(mem::size_of::<c_int>())
        );
        if cfg!(target_pointer_width = "64") {
            assert_eq!(mem::size_of::<NativeProcessEntry>(), 16);
        }
    }

    #[test]
    fn test_empty_entry_has_no_executable() {
        let entry = NativeProcessEntry::default();
        assert_eq!(entry.pid, 0);
        assert!(unsafe { entry.executable() }.is_none());
    }

    #[test]
    fn test_entry_reads_executable() {
        let name = CString::new("init").unwrap();
        let entry = NativeProcessEntry {
            pid: 1,
            executable: name.as_ptr() as *mut c_char,
        };
        assert_eq!(unsafe { entry.executable() }.unwrap().to_str().unwrap(), "init");
    }

    #[test]
    fn test_invalid_pid() {
        assert!(ProcessId::new(0).is_none());
        assert!(ProcessId::new(-5).is_none());
        assert_eq!(ProcessId::new(42).unwrap().as_raw(), 42);
    }

    #[test]
    fn test_capacity_error_message() {
        let err = SystemError::CapacityExceeded { capacity: 3 };
        assert_eq!(err.to_string(), "Allocation registry is full (3 live allocations)");
    }
}
