//! 哈希表配置 - 初始容量、负载因子与踢出RNG种子

use crate::error::CuckooError;

/// 哈希表配置
///
/// `initial_capacity`表示在不扩容的前提下可容纳的条目数，
/// 实际分配的表容量为`ceil(initial_capacity / load_factor)`向上取整到2的幂。
/// 负载因子大于0.91会显著提高重哈希到下一个2的幂的概率。
#[derive(Clone, Debug)]
pub struct MapConfig {
    pub initial_capacity: usize,
    pub load_factor: f32,
    /// 踢出游走RNG种子，`None`表示从系统熵播种
    pub seed: Option<u64>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 51,
            load_factor: 0.8,
            seed: None,
        }
    }
}

impl MapConfig {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), CuckooError> {
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(CuckooError::InvalidLoadFactor {
                value: self.load_factor,
            });
        }
        Ok(())
    }
}
