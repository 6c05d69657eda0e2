use clementine::map::HybridMap;
use clementine::map;
use expect_test::expect;
use std::fmt::Write;
use std::writeln;

#[test]
fn test_basic() -> Result<(), std::fmt::Error> {
  let mut s = String::new();
  let mut t = HybridMap::<i32, i64>::new();

  writeln!(s, "{:?} <- t.len()", t.len())?;
  writeln!(s, "{:?} <- t.is_empty()", t.is_empty())?;
  writeln!(s, "{:?} <- t.contains_key(13)", t.contains_key(13))?;
  writeln!(s, "{:?} <- t.get(13)", t.get(13))?;
  writeln!(s, "{:?} <- t.get_ptr(13)", t.get_ptr(13))?;
  writeln!(s, "{:?} <- t.set(13, 42)", t.set(13, 42))?;
  writeln!(s, "{:?} <- t.len()", t.len())?;
  writeln!(s, "{:?} <- t.is_empty()", t.is_empty())?;
  writeln!(s, "{:?} <- t.contains_key(13)", t.contains_key(13))?;
  writeln!(s, "{:?} <- t.get(13)", t.get(13))?;
  writeln!(s, "{:?} <- t.get_ptr(13)", t.get_ptr(13))?;
  writeln!(s, "{:?} <- t.get_mut(13)", t.get_mut(13))?;
  writeln!(s, "{:?} <- t.set_if_new(13, 50)", t.set_if_new(13, 50))?;
  writeln!(s, "{:?} <- t.set_if_new(14, 50)", t.set_if_new(14, 50))?;
  writeln!(s, "{:?} <- t.len()", t.len())?;

  t.remove(13);

  writeln!(s, "{:?} <- t.len()", t.len())?;
  writeln!(s, "{:?} <- t.get(13)", t.get(13))?;
  writeln!(s, "{:?} <- t.get(14)", t.get(14))?;

  writeln!(s, "array_size = {}", map::internal::array_size(&t))?;
  writeln!(s, "hash_size = {}", map::internal::hash_size(&t))?;
  writeln!(s, "hash_count = {}", map::internal::hash_count(&t))?;
  writeln!(s, "hash_fill = {}", map::internal::hash_fill(&t))?;

  t.assert_correctness(2);

  expect![[r#"
      0 <- t.len()
      true <- t.is_empty()
      false <- t.contains_key(13)
      9223372036854775807 <- t.get(13)
      None <- t.get_ptr(13)
      42 <- t.set(13, 42)
      1 <- t.len()
      false <- t.is_empty()
      true <- t.contains_key(13)
      42 <- t.get(13)
      Some(42) <- t.get_ptr(13)
      Some(42) <- t.get_mut(13)
      Some(42) <- t.set_if_new(13, 50)
      None <- t.set_if_new(14, 50)
      2 <- t.len()
      1 <- t.len()
      9223372036854775807 <- t.get(13)
      50 <- t.get(14)
      array_size = 0
      hash_size = 8
      hash_count = 1
      hash_fill = 2
  "#]].assert_eq(&s);

  Ok(())
}

#[test]
fn test_dense_prefix() -> Result<(), std::fmt::Error> {
  let mut s = String::new();
  let mut t = HybridMap::<i32, i32>::new();

  for k in 0 .. 10 {
    let _ = t.set(k, k);
  }

  writeln!(s, "{:?} <- t.len()", t.len())?;
  writeln!(s, "{:?} <- t.get(5)", t.get(5))?;
  writeln!(s, "{:?} <- t.get(11)", t.get(11))?;
  writeln!(s, "array_size = {}", map::internal::array_size(&t))?;
  writeln!(s, "array_count = {}", map::internal::array_count(&t))?;
  writeln!(s, "hash_size = {}", map::internal::hash_size(&t))?;
  writeln!(s, "reallocs = {}", map::internal::reallocs(&t))?;

  t.assert_correctness(2);

  expect![[r#"
      10 <- t.len()
      5 <- t.get(5)
      2147483647 <- t.get(11)
      array_size = 16
      array_count = 10
      hash_size = 0
      reallocs = 2
  "#]].assert_eq(&s);

  Ok(())
}

#[test]
fn test_sparse_keys() -> Result<(), std::fmt::Error> {
  let mut s = String::new();
  let mut t = HybridMap::<i32, i32>::new();

  let _ = t.set(1000000000, 1);
  let _ = t.set(-5, 2);
  let _ = t.set(13, 3);

  writeln!(s, "{:?} <- t.len()", t.len())?;

  t.remove(13);

  writeln!(s, "{:?} <- t.len()", t.len())?;
  writeln!(s, "{:?} <- t.get(13)", t.get(13))?;
  writeln!(s, "hash_count = {}", map::internal::hash_count(&t))?;
  writeln!(s, "hash_fill = {}", map::internal::hash_fill(&t))?;

  // push the fill past the threshold so the tombstone gets reclaimed

  let _ = t.set(20, 4);
  let _ = t.set(21, 5);
  let _ = t.set(22, 6);
  let _ = t.set(23, 7);

  writeln!(s, "{:?} <- t.len()", t.len())?;
  writeln!(s, "{:?} <- t.get(-5)", t.get(-5))?;
  writeln!(s, "{:?} <- t.get(1000000000)", t.get(1000000000))?;
  writeln!(s, "{:?} <- t.get(22)", t.get(22))?;
  writeln!(s, "{:?} <- t.get(13)", t.get(13))?;
  writeln!(s, "array_size = {}", map::internal::array_size(&t))?;
  writeln!(s, "hash_size = {}", map::internal::hash_size(&t))?;
  writeln!(s, "hash_count = {}", map::internal::hash_count(&t))?;
  writeln!(s, "hash_fill = {}", map::internal::hash_fill(&t))?;

  t.assert_correctness(2);

  expect![[r#"
      3 <- t.len()
      2 <- t.len()
      2147483647 <- t.get(13)
      hash_count = 2
      hash_fill = 3
      6 <- t.len()
      2 <- t.get(-5)
      1 <- t.get(1000000000)
      6 <- t.get(22)
      2147483647 <- t.get(13)
      array_size = 0
      hash_size = 16
      hash_count = 6
      hash_fill = 6
  "#]].assert_eq(&s);

  Ok(())
}

#[test]
fn test_swap() -> Result<(), std::fmt::Error> {
  let mut s = String::new();
  let mut a = HybridMap::<i32, i32>::new();
  let mut b = HybridMap::<i32, i32>::new();

  for k in [0, 1, 2, 42, 27] {
    let _ = a.set(k, 10 * k);
  }

  a.swap(&mut b);

  writeln!(s, "{:?} <- a.len()", a.len())?;
  writeln!(s, "{:?} <- b.len()", b.len())?;

  for k in [0, 1, 2, 42, 27] {
    writeln!(s, "{:?} <- b.get({})", b.get(k), k)?;
  }

  writeln!(s, "{:?} <- a.get(5)", a.get(5))?;

  // swapping twice is a no-op

  a.swap(&mut b);
  a.swap(&mut b);

  writeln!(s, "{:?} <- a.len()", a.len())?;
  writeln!(s, "{:?} <- b.len()", b.len())?;

  a.assert_correctness(2);
  b.assert_correctness(2);

  expect![[r#"
      0 <- a.len()
      5 <- b.len()
      0 <- b.get(0)
      10 <- b.get(1)
      20 <- b.get(2)
      420 <- b.get(42)
      270 <- b.get(27)
      2147483647 <- a.get(5)
      0 <- a.len()
      5 <- b.len()
  "#]].assert_eq(&s);

  Ok(())
}

#[test]
fn test_clear() -> Result<(), std::fmt::Error> {
  let mut s = String::new();
  let mut t = HybridMap::<i32, i32>::new();

  for k in 0 .. 20 {
    let _ = t.set(k, k + 1);
  }

  let _ = t.set(1000, 7);

  writeln!(s, "{:?} <- t.len()", t.len())?;
  writeln!(s, "array_size = {}", map::internal::array_size(&t))?;
  writeln!(s, "hash_size = {}", map::internal::hash_size(&t))?;

  t.clear();

  writeln!(s, "{:?} <- t.len()", t.len())?;
  writeln!(s, "{:?} <- t.get(5)", t.get(5))?;
  writeln!(s, "{:?} <- t.get(1000)", t.get(1000))?;
  writeln!(s, "array_size = {}", map::internal::array_size(&t))?;
  writeln!(s, "hash_size = {}", map::internal::hash_size(&t))?;

  t.clear();

  writeln!(s, "{:?} <- t.len()", t.len())?;

  let _ = t.set(5, 50);

  writeln!(s, "{:?} <- t.len()", t.len())?;
  writeln!(s, "{:?} <- t.get(5)", t.get(5))?;

  t.assert_correctness(2);

  expect![[r#"
      21 <- t.len()
      array_size = 32
      hash_size = 8
      0 <- t.len()
      2147483647 <- t.get(5)
      2147483647 <- t.get(1000)
      array_size = 32
      hash_size = 8
      0 <- t.len()
      1 <- t.len()
      50 <- t.get(5)
  "#]].assert_eq(&s);

  Ok(())
}

#[test]
fn test_for_each() -> Result<(), std::fmt::Error> {
  let mut s = String::new();
  let mut t = HybridMap::<i32, i32>::new();

  for k in [0, 3, 5, 70000, -9] {
    let _ = t.set(k, 2 * k);
  }

  let mut pairs = Vec::new();

  t.for_each(|k, v| {
    pairs.push((k, *v));
    return false;
  });

  pairs.sort();

  writeln!(s, "{:?}", pairs)?;

  // the walk stops once the visitor returns true

  let mut seen = 0;

  t.for_each(|_, _| {
    seen += 1;
    return seen == 3;
  });

  writeln!(s, "seen = {}", seen)?;

  expect![[r#"
      [(-9, -18), (0, 0), (3, 6), (5, 10), (70000, 140000)]
      seen = 3
  "#]].assert_eq(&s);

  Ok(())
}

#[test]
fn test_float_values() {
  let mut t = HybridMap::<i32, f64>::new();

  let _ = t.set(1, 2.5);
  let _ = t.set(900, -0.0);
  let _ = t.set(5, f64::NAN); // an ordinary NaN is a legal value

  assert_eq!(t.len(), 3);
  assert_eq!(t.get(1), 2.5);
  assert!(t.get_ptr(5).is_some());
  assert!(t.get_ptr(5).unwrap().is_nan());

  // absent keys yield the all-bits-set NaN marker
  assert_eq!(t.get(17).to_bits(), u64::MAX);
  assert!(t.get_ptr(17).is_none());

  t.remove(5);
  assert_eq!(t.get(5).to_bits(), u64::MAX);
  assert_eq!(t.len(), 2);

  t.assert_correctness(2);
}

#[test]
fn test_box_values() {
  let mut t = HybridMap::<i32, Option<Box<i32>>>::new();

  for k in 0 .. 100 {
    let _ = t.set(k, Some(Box::new(3 * k)));
  }

  let _ = t.set(-7, Some(Box::new(1)));

  assert_eq!(t.len(), 101);
  assert_eq!(t.get(40), Some(Box::new(120)));
  assert_eq!(t.get(200), None);

  let _ = t.set(40, Some(Box::new(0)));
  assert_eq!(t.get(40), Some(Box::new(0)));

  t.remove(40);
  assert_eq!(t.get(40), None);
  assert_eq!(t.len(), 100);

  t.clear();
  assert_eq!(t.len(), 0);

  // dropping with live heap values must release them
  for k in 0 .. 50 {
    let _ = t.set(k, Some(Box::new(k)));
  }

  t.assert_correctness(2);
}

#[test]
fn test_remove_ptr_and_key_of() {
  let mut t = HybridMap::<i32, i32>::new();

  for k in [2, 4, 1000000] {
    let _ = t.set(k, k + 1);
  }

  let p: *const i32 = t.get_ptr(2).unwrap();

  unsafe {
    assert_eq!(t.key_of(p), 2);
    t.remove_ptr(p);
  }

  assert_eq!(t.len(), 2);
  assert!(t.get_ptr(2).is_none());

  let p: *const i32 = t.get_ptr(1000000).unwrap();

  unsafe {
    assert_eq!(t.key_of(p), 1000000);
    t.remove_ptr(p);
  }

  assert_eq!(t.len(), 1);
  assert!(t.get_ptr(1000000).is_none());
  assert_eq!(t.get(4), 5);

  t.assert_correctness(2);
}
