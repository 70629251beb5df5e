//! 基于 /proc 的进程枚举

pub mod proc;
pub mod proc_stat;

pub use proc::ProcfsSource;
