//! 尺寸参数 - 由容量派生的探测掩码、stash容量与踢出上限

use crate::error::CuckooError;

/// 可寻址容量硬上限，超过会破坏32位移位运算
pub const MAX_CAPACITY: usize = 1 << 30;

const PRIME2: u32 = 0xb4b8_2e39;
const PRIME3: u32 = 0xced1_c241;

/// 每次扩缩容时从容量整体重算的派生参数
///
/// `capacity`恒为2的幂。三个槽位函数把键的32位哈希映射进
/// `[0, capacity)`；`hash2`/`hash3`先乘以固定奇素数再把高位
/// 折叠下来，三者相互独立。
#[derive(Clone, Copy, Debug)]
pub(crate) struct TableParams {
    pub capacity: usize,
    pub mask: u32,
    pub hash_shift: u32,
    pub stash_capacity: usize,
    pub push_iterations: usize,
    pub threshold: usize,
}

impl TableParams {
    pub fn for_capacity(capacity: usize, load_factor: f32) -> Self {
        debug_assert!(capacity.is_power_of_two() && capacity <= MAX_CAPACITY);
        Self {
            capacity,
            mask: capacity as u32 - 1,
            hash_shift: 31 - (capacity as u32).trailing_zeros(),
            stash_capacity: usize::max(3, (capacity as f64).ln().ceil() as usize * 2),
            push_iterations: usize::max(
                usize::min(capacity, 8),
                (capacity as f64).sqrt() as usize / 8,
            ),
            threshold: (capacity as f64 * load_factor as f64) as usize,
        }
    }

    #[inline]
    pub fn hash1(&self, h: u32) -> usize {
        (h & self.mask) as usize
    }

    #[inline]
    pub fn hash2(&self, h: u32) -> usize {
        let h = h.wrapping_mul(PRIME2);
        ((h ^ (h >> self.hash_shift)) & self.mask) as usize
    }

    #[inline]
    pub fn hash3(&self, h: u32) -> usize {
        let h = h.wrapping_mul(PRIME3);
        ((h ^ (h >> self.hash_shift)) & self.mask) as usize
    }
}

/// 把期望条目数按负载因子换算成2的幂容量
pub(crate) fn round_capacity(required: usize, load_factor: f32) -> Result<usize, CuckooError> {
    let scaled = (required as f64 / load_factor as f64).ceil();
    if scaled > MAX_CAPACITY as f64 {
        return Err(CuckooError::CapacityOverflow {
            requested: required,
            max: MAX_CAPACITY,
        });
    }
    let capacity = usize::max(1, scaled as usize).next_power_of_two();
    if capacity > MAX_CAPACITY {
        return Err(CuckooError::CapacityOverflow {
            requested: required,
            max: MAX_CAPACITY,
        });
    }
    Ok(capacity)
}
