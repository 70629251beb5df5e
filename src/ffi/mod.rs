#[cfg(feature = "header-bindings")]
mod bindings;
pub mod exports;
mod safe_wrapper;
pub mod types;

pub use safe_wrapper::SystemInterface;
pub use types::{NativeProcessEntry, ProcessId, SystemError};
