//! Cuckoo哈希表库（单写者版本）
//!
//! 基于三个哈希函数的cuckoo哈希表，插入冲突时按随机游走踢出已有条目，
//! 游走超过迭代上限后把条目放入一个小的溢出stash。查找、contains_key、
//! 删除均为期望O(1)，最坏情况受stash大小约束。
//!
//! ## 主要特性
//! - 三哈希探测 + 随机游走踢出 + 溢出stash
//! - 固定负载因子，到达阈值后容量翻倍并整表重哈希
//! - 除扩容外插入不分配内存（键表值表为平行的定长槽位数组）
//! - 可插拔`BuildHasher`（默认ahash）与可播种的踢出RNG，便于复现测试
//!
//! 本表不做内部同步，多线程写入需要外部加锁。
//!
//! ## 快速开始
//!
//! ```rust
//! use cuckoo_stash_map::CuckooMap;
//!
//! let mut map = CuckooMap::new();
//! assert_eq!(map.insert("key1", 1), None);
//! assert_eq!(map.get("key1"), Some(&1));
//! assert_eq!(map.remove("key1"), Some(1));
//! assert!(map.is_empty());
//! ```

#![warn(clippy::all)]

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}

// 核心模块导出
pub mod config;
pub mod error;
pub mod map;

// 公共接口导出
pub use crate::{
    config::MapConfig,
    error::CuckooError,
    map::{CuckooMap, Cursor, Entries, IntoIter, Keys, MapStats, Values, MAX_CAPACITY},
};
