//! 哈希表核心模块 - cuckoo表本体、尺寸参数与迭代器

pub mod cuckoo_map;
pub mod iter;
mod params;

pub use cuckoo_map::{CuckooMap, MapStats};
pub use iter::{Cursor, Entries, IntoIter, Keys, Values};
pub use params::MAX_CAPACITY;
