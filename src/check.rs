//! This module provides a testing harness that drives a [`HybridMap`] and a
//! standard library hash map in lockstep, asserting after every operation
//! that the two agree and that the hybrid map's internal invariants hold.

use std::collections::HashMap;

use crate::key::Key;
use crate::map::HybridMap;
use crate::value::Value;

/// A [`HybridMap`] checked against a [`std::collections::HashMap`] mirror.
///
/// Every operation is applied to both containers; the results and the full
/// contents are compared, and [`HybridMap::assert_correctness`] runs at the
/// configured verbosity. Strictly a test utility.

pub struct CheckedMap<K: Key, V: Value> {
  map: HybridMap<K, V>,
  mirror: HashMap<K, V>,
  /// Verbosity passed to [`HybridMap::assert_correctness`] after every
  /// operation.
  pub assert_level: i32,
}

// Empty markers may not be comparable with `==` (a NaN, for instance), so
// agreement on "absent" is checked through is_empty first.

fn same<V: Value + PartialEq>(a: &V, b: &V) -> bool {
  if a.is_empty() && b.is_empty() {
    return true;
  }

  return a == b;
}

impl<K, V> CheckedMap<K, V>
where
  K: Key + core::hash::Hash + core::fmt::Debug,
  V: Value + Clone + PartialEq + core::fmt::Debug,
{
  /// Creates an empty checked map with the given assert verbosity.

  pub fn new(assert_level: i32) -> Self {
    Self {
      map: HybridMap::new(),
      mirror: HashMap::new(),
      assert_level,
    }
  }

  /// Read access to the wrapped hybrid map.

  pub fn map(&self) -> &HybridMap<K, V> {
    return &self.map;
  }

  pub fn len(&self) -> usize {
    let a = self.map.len();
    let b = self.mirror.len();
    assert_eq!(a, b);
    return a;
  }

  pub fn is_empty(&self) -> bool {
    return self.len() == 0;
  }

  pub fn get(&self, key: K) -> V {
    let a = self.map.get(key);
    let b = self.mirror.get(&key).cloned().unwrap_or_else(V::empty);
    assert!(same(&a, &b), "get({:?}): {:?} vs {:?}", key, a, b);
    self.map.assert_correctness(self.assert_level);
    return a;
  }

  pub fn get_ptr(&self, key: K) -> Option<&V> {
    let a = self.map.get_ptr(key);
    let b = self.mirror.get(&key);
    assert_eq!(a.is_some(), b.is_some(), "get_ptr({:?}) presence", key);

    if let (Some(x), Some(y)) = (a, b) {
      assert!(same(x, y), "get_ptr({:?}): {:?} vs {:?}", key, x, y);
    }

    self.map.assert_correctness(self.assert_level);
    return a;
  }

  pub fn set(&mut self, key: K, value: V) {
    let a = self.map.set(key, value.clone());
    assert!(same(a, &value));
    self.mirror.insert(key, value);
    self.map.assert_correctness(self.assert_level);
  }

  pub fn set_if_new(&mut self, key: K, value: V) {
    let a = self.map.set_if_new(key, value.clone());

    match self.mirror.entry(key) {
      std::collections::hash_map::Entry::Occupied(o) => {
        let a = a.expect("present in mirror, missing in map");
        assert!(same(a, o.get()), "set_if_new({:?}): {:?} vs {:?}", key, a, o.get());
      }
      std::collections::hash_map::Entry::Vacant(e) => {
        assert!(a.is_none(), "set_if_new({:?}): inserted in mirror only", key);
        e.insert(value);
      }
    }

    self.map.assert_correctness(self.assert_level);
  }

  pub fn remove(&mut self, key: K) {
    self.map.remove(key);
    self.mirror.remove(&key);
    self.map.assert_correctness(self.assert_level);
  }

  /// Removes the given present key through its interior pointer, checking
  /// `key_of` on the way.

  pub fn remove_ptr(&mut self, key: K) {
    let p: *const V = self.map.get_ptr(key).expect("remove_ptr of an absent key");

    unsafe {
      assert_eq!(self.map.key_of(p), key);
      self.map.remove_ptr(p);
    }

    assert!(self.mirror.remove(&key).is_some());
    self.map.assert_correctness(self.assert_level);
  }

  /// Picks some present key, the choice steered by `r`. Returns `None` on an
  /// empty map.

  pub fn some_key(&self, r: usize) -> Option<K> {
    if self.mirror.is_empty() {
      return None;
    }

    let idx = r % self.mirror.len();
    return self.mirror.keys().nth(idx).copied();
  }

  pub fn reserve(&mut self, array_size_lb: usize, hash_size_lb: usize, clean_hash: bool) {
    self.map.reserve(array_size_lb, hash_size_lb, clean_hash);
    self.map.assert_correctness(self.assert_level);
    self.verify_contents();
  }

  pub fn swap(&mut self, other: &mut Self) {
    self.map.swap(&mut other.map);
    std::mem::swap(&mut self.mirror, &mut other.mirror);
    self.map.assert_correctness(self.assert_level);
    other.map.assert_correctness(other.assert_level);
  }

  pub fn clear(&mut self) {
    self.map.clear();
    self.mirror.clear();
    self.map.assert_correctness(self.assert_level);
  }

  /// Asserts that the two containers hold exactly the same key/value pairs.

  pub fn verify_contents(&self) {
    let mut a = Vec::with_capacity(self.map.len());

    self.map.for_each(|k, v| {
      a.push((k, v.clone()));
      return false;
    });

    let mut b: Vec<(K, V)> = self.mirror.iter().map(|(k, v)| (*k, v.clone())).collect();

    a.sort_by_key(|e| e.0);
    b.sort_by_key(|e| e.0);

    assert_eq!(a.len(), b.len());

    for (x, y) in a.iter().zip(b.iter()) {
      assert_eq!(x.0, y.0);
      assert!(same(&x.1, &y.1), "key {:?}: {:?} vs {:?}", x.0, x.1, y.1);
    }
  }
}
