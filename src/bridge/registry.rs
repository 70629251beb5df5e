use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr::NonNull;

use crate::ffi::types::{Result, SystemError};

/// 注册表的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Empty,
    /// 存活的分配数量
    Holding(usize),
}

/// 交给外部调用方的原生字符串分配记录
///
/// 每个指针都由 `CString::into_raw` 产生，只能通过 `release_all`
/// （或析构）释放。容量是硬上限，满了之后拒绝新的分配，
/// 不会覆盖已有槽位。
#[derive(Debug)]
pub struct AllocationRegistry {
    capacity: usize,
    live: Vec<NonNull<c_char>>,
}

// SAFETY: 指针指向的缓冲区由注册表独占，不与任何线程局部状态关联。
unsafe impl Send for AllocationRegistry {}

impl AllocationRegistry {
    /// 创建指定容量的注册表
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            live: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// 剩余可用槽位
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.live.len())
    }

    pub fn state(&self) -> RegistryState {
        match self.live.len() {
            0 => RegistryState::Empty,
            n => RegistryState::Holding(n),
        }
    }

    /// 复制一份以 NUL 结尾的字符串并登记
    ///
    /// 字符串中若含有 NUL，只保留第一个 NUL 之前的部分，
    /// 这也正是 C 端读取时能看到的内容。
    ///
    /// # 错误
    ///
    /// 注册表已满时返回 `SystemError::CapacityExceeded`，此时不会分配任何内存。
    pub fn allocate(&mut self, text: &str) -> Result<NonNull<c_char>> {
        if self.live.len() >= self.capacity {
            return Err(SystemError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let owned = to_c_string(text);
        // SAFETY: CString::into_raw 永远不会返回空指针
        let raw = unsafe { NonNull::new_unchecked(owned.into_raw()) };
        self.live.push(raw);
        Ok(raw)
    }

    /// 是否持有某个指针
    pub fn contains(&self, ptr: *const c_char) -> bool {
        self.live.iter().any(|p| p.as_ptr() as *const c_char == ptr)
    }

    /// 释放所有登记的字符串并清空注册表，返回释放的数量
    pub fn release_all(&mut self) -> usize {
        let released = self.live.len();
        for ptr in self.live.drain(..) {
            // SAFETY: 每个指针都来自 CString::into_raw，且只登记一次
            drop(unsafe { CString::from_raw(ptr.as_ptr()) });
        }
        released
    }
}

impl Drop for AllocationRegistry {
    fn drop(&mut self) {
        let released = self.release_all();
        if released > 0 {
            log::debug!("registry dropped, released {} strings", released);
        }
    }
}

fn to_c_string(text: &str) -> CString {
    match CString::new(text) {
        Ok(s) => s,
        Err(err) => {
            let nul = err.nul_position();
            log::warn!("executable name {:?} contains NUL at {}, truncating", text, nul);
            let mut bytes = err.into_vec();
            bytes.truncate(nul);
            // 截断后已不含 NUL
            CString::new(bytes).unwrap_or_default()
        }
    }
}
