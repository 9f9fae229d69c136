//! 迭代器 - 跨三哈希区与stash区的占用槽位游标
//!
//! 只读迭代器借用`&CuckooMap`，可同时存在任意多个；支持删除的
//! `Cursor`独占借用`&mut CuckooMap`，迭代期间的其他结构性修改
//! 由借用检查在编译期排除。所有游标都可`reset`重新开始，产出
//! 顺序为槽位顺序（先三哈希区后stash区），不做排序。

use crate::map::cuckoo_map::CuckooMap;

/// 条目迭代器，产出`(&K, &V)`
pub struct Entries<'a, K, V, S> {
    map: &'a CuckooMap<K, V, S>,
    index: usize,
}

impl<'a, K, V, S> Entries<'a, K, V, S> {
    pub(crate) fn new(map: &'a CuckooMap<K, V, S>) -> Self {
        Self { map, index: 0 }
    }

    /// 回到起点重新迭代
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl<'a, K, V, S> Iterator for Entries<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.map.occupied_end() {
            let i = self.index;
            self.index += 1;
            if let Some(entry) = self.map.slot_entry(i) {
                return Some(entry);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.map.len()))
    }
}

/// 键迭代器
pub struct Keys<'a, K, V, S> {
    inner: Entries<'a, K, V, S>,
}

impl<'a, K, V, S> Keys<'a, K, V, S> {
    pub(crate) fn new(map: &'a CuckooMap<K, V, S>) -> Self {
        Self {
            inner: Entries::new(map),
        }
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl<'a, K, V, S> Iterator for Keys<'a, K, V, S> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// 值迭代器
pub struct Values<'a, K, V, S> {
    inner: Entries<'a, K, V, S>,
}

impl<'a, K, V, S> Values<'a, K, V, S> {
    pub(crate) fn new(map: &'a CuckooMap<K, V, S>) -> Self {
        Self {
            inner: Entries::new(map),
        }
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl<'a, K, V, S> Iterator for Values<'a, K, V, S> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// 支持删除的可变游标
///
/// `next`产出条目引用，`remove_current`删除上一次产出的条目。
/// stash条目删除后末尾条目被换入空出的槽位，游标续点相应回退，
/// 保证换入的条目仍会被访问到。
pub struct Cursor<'a, K, V, S> {
    map: &'a mut CuckooMap<K, V, S>,
    next_index: usize,
    current: Option<usize>,
}

impl<'a, K, V, S> Cursor<'a, K, V, S> {
    pub(crate) fn new(map: &'a mut CuckooMap<K, V, S>) -> Self {
        Self {
            map,
            next_index: 0,
            current: None,
        }
    }

    /// 产出下一个条目；槽位耗尽后返回`None`
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &V)> {
        while self.next_index < self.map.occupied_end() {
            let i = self.next_index;
            self.next_index += 1;
            if self.map.slot_entry(i).is_some() {
                self.current = Some(i);
                return self.map.slot_entry(i);
            }
        }
        self.current = None;
        None
    }

    /// 删除上一次`next`产出的条目并返回其值
    ///
    /// # Panics
    ///
    /// 在`next`产出条目之前调用，或对同一条目重复调用时panic。
    pub fn remove_current(&mut self) -> Option<V> {
        let Some(index) = self.current.take() else {
            panic!("remove_current必须跟在产出条目的next之后");
        };
        let in_stash = index >= self.map.capacity();
        let value = self.map.remove_index(index);
        if in_stash {
            // stash末尾条目被换入该槽位，回退续点以免漏访问
            self.next_index = index;
        }
        value
    }

    /// 回到起点重新迭代
    pub fn reset(&mut self) {
        self.next_index = 0;
        self.current = None;
    }
}

/// 消费整个表的所有权迭代器
pub struct IntoIter<K, V> {
    keys: std::vec::IntoIter<Option<K>>,
    values: std::vec::IntoIter<Option<V>>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(keys: Box<[Option<K>]>, values: Box<[Option<V>]>, end: usize) -> Self {
        let mut keys = keys.into_vec();
        keys.truncate(end);
        let mut values = values.into_vec();
        values.truncate(end);
        Self {
            keys: keys.into_iter(),
            values: values.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match (self.keys.next()?, self.values.next()?) {
                (Some(key), Some(value)) => return Some((key, value)),
                _ => continue,
            }
        }
    }
}
