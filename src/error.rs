//! 统一错误处理 - 构造参数和容量契约的违反

/// Cuckoo哈希表可能发生的错误
///
/// 所有错误都是同步的调用方契约错误，没有I/O和部分失败，
/// 因此也没有重试或恢复语义。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CuckooError {
    #[error("容量超出上限: 请求 {requested}, 上限 {max}")]
    CapacityOverflow { requested: usize, max: usize },

    #[error("负载因子必须大于0且有限: {value}")]
    InvalidLoadFactor { value: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CuckooError::CapacityOverflow {
            requested: usize::MAX,
            max: 1 << 30,
        };
        assert!(err.to_string().contains("容量超出上限"));

        let err = CuckooError::InvalidLoadFactor { value: -1.0 };
        assert!(err.to_string().contains("-1"));
    }
}
