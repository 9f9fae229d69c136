//! Cuckoo哈希表核心实现
//!
//! 键表与值表是两条平行的定长槽位数组，长度为`capacity + stash_capacity`。
//! `[0, capacity)`为三哈希可寻址区，`[capacity, capacity + stash_size)`为
//! 线性扫描的stash区，stash删除时用末尾条目换入空出的槽位保持紧凑。

use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::mem;

use ahash::RandomState;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::MapConfig;
use crate::error::CuckooError;
use crate::map::iter::{Cursor, Entries, IntoIter, Keys, Values};
use crate::map::params::{round_capacity, TableParams};

/// 操作计数快照，随`CuckooMap::stats`返回
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapStats {
    pub size: usize,
    pub capacity: usize,
    pub stash_size: usize,
    pub stash_capacity: usize,
    pub load_factor: f32,
    /// 踢出游走中发生的换位总数
    pub kick_count: u64,
    /// 游走放弃后落入stash的条目总数
    pub stash_spill_count: u64,
    /// 重哈希（扩容、缩容、清空缩容）总数
    pub resize_count: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    kicks: u64,
    stash_spills: u64,
    resizes: u64,
}

/// 三哈希cuckoo表，随机游走踢出，溢出stash
///
/// 泛型于键、值与`BuildHasher`（默认ahash）。单写者结构：
/// 不做内部同步，迭代器借用整个表，结构性修改与迭代互斥由
/// 借用检查保证。
#[derive(Clone)]
pub struct CuckooMap<K, V, S = RandomState> {
    key_table: Box<[Option<K>]>,
    value_table: Box<[Option<V>]>,
    size: usize,
    stash_size: usize,
    load_factor: f32,
    params: TableParams,
    hasher: S,
    rng: SmallRng,
    counters: Counters,
}

fn new_table<T>(len: usize) -> Box<[Option<T>]> {
    std::iter::repeat_with(|| None).take(len).collect()
}

impl<K, V> CuckooMap<K, V, RandomState> {
    /// 创建默认表：初始容量51、负载因子0.8（实际分配64个可寻址槽位）
    pub fn new() -> Self {
        match Self::with_config(MapConfig::default()) {
            Ok(map) => map,
            Err(_) => unreachable!("默认配置恒有效"),
        }
    }

    pub fn with_config(config: MapConfig) -> Result<Self, CuckooError> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V> Default for CuckooMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> CuckooMap<K, V, S> {
    /// 用自定义`BuildHasher`创建表，测试里用来构造确定性的冲突键集
    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self, CuckooError> {
        config.validate()?;
        let capacity = round_capacity(config.initial_capacity, config.load_factor)?;
        let params = TableParams::for_capacity(capacity, config.load_factor);
        let len = capacity + params.stash_capacity;
        Ok(Self {
            key_table: new_table(len),
            value_table: new_table(len),
            size: 0,
            stash_size: 0,
            load_factor: config.load_factor,
            params,
            hasher,
            rng: match config.seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            },
            counters: Counters::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// 当前可寻址容量（2的幂，不含stash区）
    pub fn capacity(&self) -> usize {
        self.params.capacity
    }

    /// 当前stash中的条目数
    pub fn stash_len(&self) -> usize {
        self.stash_size
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    pub fn stats(&self) -> MapStats {
        MapStats {
            size: self.size,
            capacity: self.params.capacity,
            stash_size: self.stash_size,
            stash_capacity: self.params.stash_capacity,
            load_factor: self.load_factor,
            kick_count: self.counters.kicks,
            stash_spill_count: self.counters.stash_spills,
            resize_count: self.counters.resizes,
        }
    }

    /// 清空所有条目，保留当前容量的槽位数组
    pub fn clear(&mut self) {
        if self.size == 0 {
            return;
        }
        for i in 0..self.occupied_end() {
            self.key_table[i] = None;
            self.value_table[i] = None;
        }
        self.size = 0;
        self.stash_size = 0;
    }

    /// 条目迭代器，产出`(&K, &V)`；`reset`可重新开始
    pub fn iter(&self) -> Entries<'_, K, V, S> {
        Entries::new(self)
    }

    pub fn keys(&self) -> Keys<'_, K, V, S> {
        Keys::new(self)
    }

    pub fn values(&self) -> Values<'_, K, V, S> {
        Values::new(self)
    }

    /// 支持删除的可变游标
    ///
    /// `Cursor::remove_current`删除上一次`next`产出的条目，stash条目
    /// 按换尾压缩并调整游标续点。游标独占借用整个表，迭代期间的
    /// 其他结构性修改在编译期被排除。
    pub fn cursor(&mut self) -> Cursor<'_, K, V, S> {
        Cursor::new(self)
    }

    pub(crate) fn occupied_end(&self) -> usize {
        self.params.capacity + self.stash_size
    }

    pub(crate) fn slot_entry(&self, index: usize) -> Option<(&K, &V)> {
        match (&self.key_table[index], &self.value_table[index]) {
            (Some(key), Some(value)) => Some((key, value)),
            _ => None,
        }
    }

    /// 删除指定槽位的条目；stash槽位按换尾压缩
    pub(crate) fn remove_index(&mut self, index: usize) -> Option<V> {
        self.key_table[index].take()?;
        let value = self.value_table[index].take();
        if index >= self.params.capacity {
            self.stash_size -= 1;
            let last = self.params.capacity + self.stash_size;
            if index < last {
                self.key_table[index] = self.key_table[last].take();
                self.value_table[index] = self.value_table[last].take();
            }
        }
        self.size -= 1;
        value
    }
}

impl<K, V, S> CuckooMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// 插入键值对，返回该键之前的值
    ///
    /// 先在三个候选槽位和stash里找现有键原地覆盖；否则优先放入空槽，
    /// 三个槽位都被其他键占用时进入踢出游走。新键使`size`加一，
    /// 到达阈值后容量翻倍。除扩容外不分配内存。
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let h = self.raw_hash(&key);
        let index1 = self.params.hash1(h);
        if self.slot_matches(index1, &key) {
            return self.value_table[index1].replace(value);
        }
        let index2 = self.params.hash2(h);
        if self.slot_matches(index2, &key) {
            return self.value_table[index2].replace(value);
        }
        let index3 = self.params.hash3(h);
        if self.slot_matches(index3, &key) {
            return self.value_table[index3].replace(value);
        }

        // stash中的现有键也原地覆盖
        if let Some(index) = self.find_stash_index(&key) {
            return self.value_table[index].replace(value);
        }

        if self.key_table[index1].is_none() {
            self.place(index1, key, value);
        } else if self.key_table[index2].is_none() {
            self.place(index2, key, value);
        } else if self.key_table[index3].is_none() {
            self.place(index3, key, value);
        } else {
            self.push(key, value, index1, index2, index3);
        }
        None
    }

    /// 返回键对应的值引用
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find_index(key)?;
        self.value_table[index].as_ref()
    }

    /// 返回键对应的值引用，键不存在时返回给定默认值
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// 返回键对应的值引用；键不存在时先用`make`构造并插入
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> &V
    where
        K: Clone,
        F: FnOnce() -> V,
    {
        if self.find_index(&key).is_none() {
            self.insert(key.clone(), make());
        }
        match self.find_index(&key).and_then(|i| self.value_table[i].as_ref()) {
            Some(value) => value,
            None => unreachable!("刚插入的键必然可查"),
        }
    }

    /// 删除键，返回其值
    ///
    /// 三哈希区的命中直接清槽；stash命中后把stash末尾条目换入
    /// 空出的槽位保持紧凑。
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find_index(key)?;
        self.remove_index(index)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find_index(key).is_some()
    }

    /// 为再插入`additional`个条目预留容量，避免多次扩容
    pub fn reserve(&mut self, additional: usize) -> Result<(), CuckooError> {
        let needed = self
            .size
            .checked_add(additional)
            .ok_or(CuckooError::CapacityOverflow {
                requested: additional,
                max: crate::map::MAX_CAPACITY,
            })?;
        if needed >= self.params.threshold {
            let new_capacity = round_capacity(needed, self.load_factor)?;
            if new_capacity > self.params.capacity {
                self.resize(new_capacity);
            }
        }
        Ok(())
    }

    /// 把容量收缩到不超过`max_capacity`（但不小于当前条目数）
    pub fn shrink_to(&mut self, max_capacity: usize) {
        let bound = usize::max(max_capacity, self.size);
        if self.params.capacity <= bound {
            return;
        }
        self.resize(usize::max(1, bound).next_power_of_two());
    }

    /// 清空并把容量收缩到不超过`max_capacity`
    pub fn clear_to(&mut self, max_capacity: usize) {
        if self.params.capacity <= max_capacity {
            self.clear();
            return;
        }
        self.size = 0;
        self.stash_size = 0;
        self.resize(usize::max(1, max_capacity).next_power_of_two());
    }

    #[inline]
    fn raw_hash<Q>(&self, key: &Q) -> u32
    where
        Q: Hash + ?Sized,
    {
        self.hasher.hash_one(key) as u32
    }

    #[inline]
    fn slot_matches<Q>(&self, index: usize, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.key_table[index]
            .as_ref()
            .map_or(false, |occupant| occupant.borrow() == key)
    }

    fn find_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let h = self.raw_hash(key);
        let index = self.params.hash1(h);
        if self.slot_matches(index, key) {
            return Some(index);
        }
        let index = self.params.hash2(h);
        if self.slot_matches(index, key) {
            return Some(index);
        }
        let index = self.params.hash3(h);
        if self.slot_matches(index, key) {
            return Some(index);
        }
        self.find_stash_index(key)
    }

    fn find_stash_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        (self.params.capacity..self.occupied_end()).find(|&i| self.slot_matches(i, key))
    }

    /// 放入已知为空的槽位；跨过阈值时容量翻倍
    fn place(&mut self, index: usize, key: K, value: V) {
        self.key_table[index] = Some(key);
        self.value_table[index] = Some(value);
        self.size += 1;
        if self.size > self.params.threshold {
            self.resize(self.params.capacity << 1);
        }
    }

    /// 踢出游走：随机换出三个候选槽位之一的占用者，改为安置被换出的键，
    /// 直到碰到空槽或耗尽`push_iterations`后落入stash
    fn push(&mut self, key: K, value: V, index1: usize, index2: usize, index3: usize) {
        let mut key = key;
        let mut value = value;
        let mut index1 = index1;
        let mut index2 = index2;
        let mut index3 = index3;
        let mut remaining = self.params.push_iterations;
        loop {
            let target = match self.rng.gen_range(0u8..3) {
                0 => index1,
                1 => index2,
                _ => index3,
            };
            let (evicted_key, evicted_value) = self.swap_slot(target, key, value);
            self.counters.kicks += 1;

            // 被踢出的键若有空的候选槽位则就地安置
            let h = self.raw_hash(&evicted_key);
            index1 = self.params.hash1(h);
            if self.key_table[index1].is_none() {
                self.place(index1, evicted_key, evicted_value);
                return;
            }
            index2 = self.params.hash2(h);
            if self.key_table[index2].is_none() {
                self.place(index2, evicted_key, evicted_value);
                return;
            }
            index3 = self.params.hash3(h);
            if self.key_table[index3].is_none() {
                self.place(index3, evicted_key, evicted_value);
                return;
            }

            remaining -= 1;
            if remaining == 0 {
                self.push_stash(evicted_key, evicted_value);
                return;
            }
            key = evicted_key;
            value = evicted_value;
        }
    }

    fn swap_slot(&mut self, index: usize, key: K, value: V) -> (K, V) {
        let old_key = self.key_table[index].replace(key);
        let old_value = self.value_table[index].replace(value);
        match (old_key, old_value) {
            (Some(old_key), Some(old_value)) => (old_key, old_value),
            _ => unreachable!("踢出目标必为已占用槽位"),
        }
    }

    /// 游走放弃后的条目进入stash；stash已满则扩容后重新插入
    fn push_stash(&mut self, key: K, value: V) {
        if self.stash_size == self.params.stash_capacity {
            crate::log_debug!(
                "stash已满(容量{}), 扩容到{}",
                self.params.stash_capacity,
                self.params.capacity << 1
            );
            self.resize(self.params.capacity << 1);
            self.insert_for_resize(key, value);
            return;
        }
        let index = self.params.capacity + self.stash_size;
        self.key_table[index] = Some(key);
        self.value_table[index] = Some(value);
        self.stash_size += 1;
        self.size += 1;
        self.counters.stash_spills += 1;
    }

    /// 重哈希专用插入：跳过现有键检查，直接找空槽，必要时回落到游走
    fn insert_for_resize(&mut self, key: K, value: V) {
        let h = self.raw_hash(&key);
        let index1 = self.params.hash1(h);
        if self.key_table[index1].is_none() {
            self.place(index1, key, value);
            return;
        }
        let index2 = self.params.hash2(h);
        if self.key_table[index2].is_none() {
            self.place(index2, key, value);
            return;
        }
        let index3 = self.params.hash3(h);
        if self.key_table[index3].is_none() {
            self.place(index3, key, value);
            return;
        }
        self.push(key, value, index1, index2, index3);
    }

    /// 按新容量重算全部派生参数并整表重哈希
    fn resize(&mut self, new_capacity: usize) {
        let old_end = self.occupied_end();
        let old_size = self.size;
        crate::log_debug!(
            "resize: 容量 {} -> {}, size={}",
            self.params.capacity,
            new_capacity,
            old_size
        );
        self.params = TableParams::for_capacity(new_capacity, self.load_factor);
        let len = new_capacity + self.params.stash_capacity;
        let old_keys = mem::replace(&mut self.key_table, new_table(len));
        let old_values = mem::replace(&mut self.value_table, new_table(len));
        self.size = 0;
        self.stash_size = 0;
        self.counters.resizes += 1;
        if old_size > 0 {
            for (key, value) in old_keys
                .into_vec()
                .into_iter()
                .zip(old_values.into_vec())
                .take(old_end)
            {
                if let (Some(key), Some(value)) = (key, value) {
                    self.insert_for_resize(key, value);
                }
            }
        }
    }
}

impl<K, V: PartialEq, S> CuckooMap<K, V, S> {
    /// 值是否存在于表中。全表线性扫描，代价为O(capacity)
    pub fn contains_value(&self, value: &V) -> bool {
        self.find_key(value).is_some()
    }

    /// 返回映射到指定值的某个键。全表线性扫描，代价为O(capacity)
    pub fn find_key(&self, value: &V) -> Option<&K> {
        for i in (0..self.occupied_end()).rev() {
            if let (Some(key), Some(occupant)) = (&self.key_table[i], &self.value_table[i]) {
                if occupant == value {
                    return Some(key);
                }
            }
        }
        None
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for CuckooMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for CuckooMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V, S> Eq for CuckooMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

/// 与键值表内容等价的表哈希到相同的值：逐条目求
/// `hash(key) * 31 + hash(value)`再求和，与槽位顺序和
/// 表自身的`BuildHasher`实例无关
impl<K, V, S> Hash for CuckooMap<K, V, S>
where
    K: Hash,
    V: Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        fn entry_hash<T: Hash>(item: &T) -> u64 {
            let mut hasher = DefaultHasher::new();
            item.hash(&mut hasher);
            hasher.finish()
        }
        let mut acc: u64 = 0;
        for (key, value) in self.iter() {
            acc = acc.wrapping_add(entry_hash(key).wrapping_mul(31).wrapping_add(entry_hash(value)));
        }
        state.write_u64(acc);
    }
}

impl<K, V, S> Extend<(K, V)> for CuckooMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (low, _) = iter.size_hint();
        // 预留下界提示的容量; 提示大到超出容量上限时放弃预留, 照常按翻倍增长
        if self.reserve(low).is_err() {
            crate::log_warn!("extend: 预留{low}个条目超出容量上限, 回退为按需扩容");
        }
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for CuckooMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a CuckooMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Entries<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for CuckooMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let end = self.occupied_end();
        IntoIter::new(self.key_table, self.value_table, end)
    }
}
