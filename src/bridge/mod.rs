//! 进程列表到原生缓冲区的桥接
//!
//! `Bridge` 持有一个进程来源和一个互斥保护的分配注册表。
//! 填充时先枚举（不持锁），然后在锁内完成写入与登记；
//! 释放同样在锁内完成，因此释放不会与正在进行的写入交错。

pub mod config;
pub mod marshal;
pub mod registry;
pub mod source;

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ffi::types::NativeProcessEntry;
use config::BridgeConfig;
use marshal::{FillReport, FillStatus};
use registry::{AllocationRegistry, RegistryState};
use source::ProcessSource;

pub struct Bridge<S> {
    source: S,
    registry: Mutex<AllocationRegistry>,
}

impl<S: ProcessSource> Bridge<S> {
    /// 使用给定来源和配置创建桥接
    pub fn new(source: S, config: &BridgeConfig) -> Self {
        Self {
            source,
            registry: Mutex::new(AllocationRegistry::with_capacity(config.registry_capacity)),
        }
    }

    /// 枚举进程并写入 `destination`
    ///
    /// 返回值中的 `written` 满足 `0 <= written <= capacity`。
    /// 来源失败时不写入任何条目，注册表保持不变。
    ///
    /// # Safety
    ///
    /// `destination` 必须指向至少 `capacity` 个可写的 `NativeProcessEntry`。
    pub unsafe fn fill_buffer(
        &self,
        capacity: usize,
        destination: *mut NativeProcessEntry,
    ) -> FillReport {
        if capacity == 0 {
            return FillReport::empty(FillStatus::Complete);
        }
        if destination.is_null() {
            log::warn!("fill requested with null destination and capacity {}", capacity);
            return FillReport::empty(FillStatus::InvalidArgument);
        }

        let records = match self.source.list() {
            Ok(records) => records,
            Err(e) => {
                log::warn!("process enumeration failed: {}", e);
                return FillReport::empty(FillStatus::EnumerationFailed);
            }
        };

        let mut registry = self.lock();
        let report = marshal::write_entries(&records, &mut registry, capacity, destination);
        log::debug!(
            "filled {} of {} processes (capacity {}), {} strings live",
            report.written,
            records.len(),
            capacity,
            registry.len()
        );
        report
    }

    /// 释放所有已发出的字符串，返回释放数量
    pub fn release_all(&self) -> usize {
        let released = self.lock().release_all();
        if released > 0 {
            log::info!("released {} native strings", released);
        }
        released
    }

    /// 当前存活的分配数量
    pub fn live_allocations(&self) -> usize {
        self.lock().len()
    }

    pub fn state(&self) -> RegistryState {
        self.lock().state()
    }

    pub fn registry_capacity(&self) -> usize {
        self.lock().capacity()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // 注册表在每次 push 之后都保持一致，锁中毒时可以直接恢复
    fn lock(&self) -> MutexGuard<'_, AllocationRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::source::{FailingSource, ProcessRecord, StaticSource};
    use std::ffi::CStr;
    use std::sync::Arc;
    use std::thread;

    fn two_processes() -> StaticSource {
        StaticSource(vec![ProcessRecord::new(100, "init"), ProcessRecord::new(200, "shell")])
    }

    fn bridge_with_capacity<S: ProcessSource>(source: S, capacity: usize) -> Bridge<S> {
        Bridge::new(source, &BridgeConfig { registry_capacity: capacity })
    }

    #[test]
    fn test_fill_returns_min_of_capacity_and_source_len() {
        let records: Vec<_> = (1..=7).map(|i| ProcessRecord::new(i, format!("p{}", i))).collect();
        let bridge = bridge_with_capacity(StaticSource(records), 1_000);

        for capacity in 0..10 {
            let mut buffer = vec![NativeProcessEntry::empty(); capacity];
            let report = unsafe { bridge.fill_buffer(capacity, buffer.as_mut_ptr()) };
            assert_eq!(report.written, capacity.min(7));
            assert_eq!(report.status, FillStatus::Complete);
        }
    }

    #[test]
    fn test_capacity_one_scenario() {
        let bridge = bridge_with_capacity(two_processes(), 10);
        let mut buffer = vec![NativeProcessEntry::empty(); 1];

        let report = unsafe { bridge.fill_buffer(1, buffer.as_mut_ptr()) };

        assert_eq!(report.written, 1);
        assert_eq!(buffer[0].pid, 100);
        assert_eq!(unsafe { buffer[0].executable() }.unwrap().to_str().unwrap(), "init");
        assert_eq!(bridge.state(), RegistryState::Holding(1));
    }

    #[test]
    fn test_repeated_fills_keep_earlier_pointers_valid() {
        let bridge = bridge_with_capacity(two_processes(), 10);
        let mut first = vec![NativeProcessEntry::empty(); 2];
        let mut second = vec![NativeProcessEntry::empty(); 2];

        unsafe {
            assert_eq!(bridge.fill_buffer(2, first.as_mut_ptr()).written, 2);
            assert_eq!(bridge.fill_buffer(2, second.as_mut_ptr()).written, 2);
        }

        assert_eq!(bridge.state(), RegistryState::Holding(4));
        // 两次调用的字符串互相独立
        assert_ne!(first[0].executable, second[0].executable);
        let names: Vec<&str> = first
            .iter()
            .chain(second.iter())
            .map(|e| unsafe { e.executable() }.unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["init", "shell", "init", "shell"]);
    }

    #[test]
    fn test_release_then_fill_again() {
        let bridge = bridge_with_capacity(two_processes(), 10);
        let mut buffer = vec![NativeProcessEntry::empty(); 2];

        unsafe { bridge.fill_buffer(2, buffer.as_mut_ptr()) };
        assert_eq!(bridge.release_all(), 2);
        assert_eq!(bridge.state(), RegistryState::Empty);
        assert_eq!(bridge.release_all(), 0);

        let report = unsafe { bridge.fill_buffer(2, buffer.as_mut_ptr()) };
        assert_eq!(report.written, 2);
        assert_eq!(bridge.state(), RegistryState::Holding(2));
        assert_eq!(unsafe { buffer[1].executable() }.unwrap().to_str().unwrap(), "shell");
    }

    #[test_log::test]
    fn test_failing_source_leaves_registry_untouched() {
        let bridge = bridge_with_capacity(FailingSource, 10);
        let mut buffer = vec![NativeProcessEntry::empty(); 3];

        let report = unsafe { bridge.fill_buffer(3, buffer.as_mut_ptr()) };

        assert_eq!(report, FillReport::empty(FillStatus::EnumerationFailed));
        assert_eq!(bridge.live_allocations(), 0);
        assert!(buffer.iter().all(|e| e.executable.is_null()));
    }

    #[test_log::test]
    fn test_full_registry_returns_short_count() {
        let bridge = bridge_with_capacity(two_processes(), 3);
        let mut buffer = vec![NativeProcessEntry::empty(); 2];

        unsafe {
            assert_eq!(bridge.fill_buffer(2, buffer.as_mut_ptr()).written, 2);
            let report = bridge.fill_buffer(2, buffer.as_mut_ptr());
            assert_eq!(report.written, 1);
            assert_eq!(report.status, FillStatus::RegistryFull);

            // 注册表恰好满，再来一次什么都写不进去
            let report = bridge.fill_buffer(2, buffer.as_mut_ptr());
            assert_eq!(report.written, 0);
            assert_eq!(report.status, FillStatus::RegistryFull);
        }
        assert_eq!(bridge.live_allocations(), 3);
    }

    #[test]
    fn test_null_destination_is_rejected() {
        let bridge = bridge_with_capacity(two_processes(), 10);
        let report = unsafe { bridge.fill_buffer(4, std::ptr::null_mut()) };
        assert_eq!(report, FillReport::empty(FillStatus::InvalidArgument));
        assert_eq!(bridge.live_allocations(), 0);
    }

    #[test]
    fn test_concurrent_fill_and_release() {
        let bridge = Arc::new(bridge_with_capacity(two_processes(), 10_000));
        let mut handles = Vec::new();

        for _ in 0..4 {
            let bridge = Arc::clone(&bridge);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    let mut buffer = vec![NativeProcessEntry::empty(); 2];
                    let report = unsafe { bridge.fill_buffer(2, buffer.as_mut_ptr()) };
                    assert!(report.written <= 2);
                    bridge.release_all();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        bridge.release_all();
        assert_eq!(bridge.state(), RegistryState::Empty);
    }

    #[test]
    fn test_pointers_survive_until_release() {
        let bridge = bridge_with_capacity(two_processes(), 10);
        let mut buffer = vec![NativeProcessEntry::empty(); 2];
        unsafe { bridge.fill_buffer(2, buffer.as_mut_ptr()) };

        let name = unsafe { CStr::from_ptr(buffer[0].executable) };
        assert_eq!(name.to_bytes(), b"init");
        assert_eq!(bridge.registry_capacity(), 10);
    }
}
