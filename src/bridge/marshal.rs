use crate::bridge::registry::AllocationRegistry;
use crate::bridge::source::ProcessRecord;
use crate::ffi::types::NativeProcessEntry;

/// 一次填充的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    /// 写满了 capacity 或来源已耗尽
    Complete,
    /// 注册表已满，写入在此之前停止
    RegistryFull,
    /// 进程来源枚举失败，未写入任何条目
    EnumerationFailed,
    /// 目标缓冲区为空指针或容量为负
    InvalidArgument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillReport {
    /// 实际写入的条目数，调用方只能读取这么多
    pub written: usize,
    pub status: FillStatus,
}

impl FillReport {
    pub(crate) fn empty(status: FillStatus) -> Self {
        Self { written: 0, status }
    }
}

/// 把进程记录依次写入调用方提供的原生缓冲区
///
/// 第 `i` 条写在 `destination + i * size_of::<NativeProcessEntry>()` 处。
/// 每个 executable 字符串在写入下一条之前完成登记；
/// 注册表拒绝分配时立即停止，已写入的条目仍然有效。
///
/// # Safety
///
/// `destination` 必须指向至少 `capacity` 个可写的 `NativeProcessEntry`。
/// 超出返回计数的槽位不会被触碰。
pub unsafe fn write_entries(
    records: &[ProcessRecord],
    registry: &mut AllocationRegistry,
    capacity: usize,
    destination: *mut NativeProcessEntry,
) -> FillReport {
    let mut written = 0;

    for record in records.iter().take(capacity) {
        let executable = match registry.allocate(&record.executable) {
            Ok(ptr) => ptr,
            Err(e) => {
                log::warn!(
                    "{}, stopping after {} of {} entries",
                    e,
                    written,
                    records.len().min(capacity)
                );
                return FillReport {
                    written,
                    status: FillStatus::RegistryFull,
                };
            }
        };

        // 目标内存可能未初始化，用 write 避免读取旧值
        destination.add(written).write(NativeProcessEntry {
            pid: record.pid,
            executable: executable.as_ptr(),
        });
        written += 1;
    }

    FillReport {
        written,
        status: FillStatus::Complete,
    }
}
