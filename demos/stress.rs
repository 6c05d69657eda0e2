//! Driver for the speed suite and the endless randomized checker.
//!
//! ```text
//! stress [-q] (-s | -sc | -tN)
//!
//!   -s    run the speed suite
//!   -sc   run the speed suite against the std reference map
//!   -q    suppress progress output
//!   -tN   randomized correctness rounds, forever, at assert level N
//! ```

use clementine::check::CheckedMap;
use clementine::map::HybridMap;
use clementine::value::Value;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::time::Instant;

// ===========================================================================
// speed suite
// ===========================================================================

// Both containers behind the surface the scenarios drive. Lookup misses
// yield the empty value, so the two report identical sums.

trait Bench {
  fn new() -> Self;

  fn reserve(&mut self, array_lb: usize, hash_lb: usize);

  fn set(&mut self, k: i32, v: i64);

  fn set_if_new(&mut self, k: i32, v: i64);

  fn get(&self, k: i32) -> i64;

  fn get_ptr_bits(&self, k: i32) -> usize;

  fn remove(&mut self, k: i32);
}

impl Bench for HybridMap<i32, i64> {
  fn new() -> Self { HybridMap::new() }

  fn reserve(&mut self, array_lb: usize, hash_lb: usize) { self.reserve(array_lb, hash_lb, false); }

  fn set(&mut self, k: i32, v: i64) { let _: &mut i64 = self.set(k, v); }

  fn set_if_new(&mut self, k: i32, v: i64) { let _: Option<_> = self.set_if_new(k, v); }

  fn get(&self, k: i32) -> i64 { self.get(k) }

  fn get_ptr_bits(&self, k: i32) -> usize {
    return match self.get_ptr(k) {
      None => 0,
      Some(p) => p as *const i64 as usize,
    };
  }

  fn remove(&mut self, k: i32) { self.remove(k); }
}

struct StdMap {
  dict: HashMap<i32, i64>,
}

impl Bench for StdMap {
  fn new() -> Self { StdMap { dict: HashMap::new() } }

  fn reserve(&mut self, array_lb: usize, hash_lb: usize) { self.dict.reserve(array_lb + hash_lb); }

  fn set(&mut self, k: i32, v: i64) { self.dict.insert(k, v); }

  fn set_if_new(&mut self, k: i32, v: i64) { self.dict.entry(k).or_insert(v); }

  fn get(&self, k: i32) -> i64 { self.dict.get(&k).copied().unwrap_or_else(i64::empty) }

  fn get_ptr_bits(&self, k: i32) -> usize {
    return match self.dict.get(&k) {
      None => 0,
      Some(p) => p as *const i64 as usize,
    };
  }

  fn remove(&mut self, k: i32) { self.dict.remove(&k); }
}

fn ms_since(start: Instant) -> f64 {
  return start.elapsed().as_secs_f64() * 1000.0;
}

fn sparse_keys(g: &mut StdRng, size: usize) -> Vec<i32> {
  return (0 .. size).map(|_| g.gen_range(-2_000_000_000 ..= 2_000_000_000)).collect();
}

fn shuffled_range(g: &mut StdRng, size: usize) -> Vec<i32> {
  let mut keys: Vec<i32> = (0 .. size as i32).collect();
  keys.shuffle(g);
  return keys;
}

// binary-tree randomized BFS order: coarse strides first, so the array part
// is touched at every scale before it fills up
fn tree_order(g: &mut StdRng, size: usize) -> Vec<i32> {
  let mut perm = Vec::new();
  let mut j = 0;
  while (1 << j) < size {
    let k = perm.len();
    let mut i = 0;
    while i < size {
      perm.push(i as i32);
      i += 1 << j;
    }
    perm[k ..].shuffle(g);
    j += 1;
  }
  perm.reverse();
  return perm;
}

fn growth_array_sequential<M: Bench>(size: usize, repeats: usize) -> f64 {
  let start = Instant::now();

  for _ in 0 .. repeats {
    let mut cont = M::new();
    for x in 0 .. size as i32 {
      cont.set(x, x as i64 * x as i64);
    }
  }

  return ms_since(start);
}

fn growth_array_random<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let perm = shuffled_range(&mut g, size);
  let start = Instant::now();

  for _ in 0 .. repeats {
    let mut cont = M::new();
    for (j, &k) in perm.iter().enumerate() {
      cont.set(k, j as i64 * j as i64);
    }
  }

  return ms_since(start);
}

fn growth_hash_random<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let keys = sparse_keys(&mut g, size);
  let start = Instant::now();

  for _ in 0 .. repeats {
    let mut cont = M::new();
    for &k in &keys {
      cont.set(k, k as i64 + 1);
    }
  }

  return ms_since(start);
}

fn remove_array_random<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let perm = shuffled_range(&mut g, size);
  let start = Instant::now();

  let mut cont = M::new();
  for _ in 0 .. repeats {
    for x in 0 .. size as i32 {
      cont.set(x, x as i64 * x as i64);
    }
    for &k in &perm {
      cont.remove(k);
    }
  }

  return ms_since(start);
}

fn remove_hash_random<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let keys = sparse_keys(&mut g, size);
  let start = Instant::now();

  let mut cont = M::new();
  for _ in 0 .. repeats {
    for &k in &keys {
      cont.set(k, k as i64 + 1);
    }
    for &k in &keys {
      cont.remove(k);
    }
  }

  return ms_since(start);
}

fn get_array_random_hit<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let mut cont = M::new();
  for x in 0 .. size as i32 {
    cont.set(x, x as i64 * 2);
  }
  let keys = shuffled_range(&mut g, size);
  let start = Instant::now();

  let mut tmp = 0i64;
  for _ in 0 .. repeats {
    let mut sum = 0i64;
    for &k in &keys {
      sum = sum.wrapping_add(cont.get(k));
    }
    tmp = tmp.wrapping_add(sum);
  }
  std::hint::black_box(tmp);

  return ms_since(start);
}

fn get_array_random_miss<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let mut cont = M::new();
  let mut keys = Vec::new();
  for x in 0 .. size as i32 {
    if x & 3 != 0 {
      cont.set(x, x as i64);
    }
  }
  for x in 0 .. size as i32 {
    if x & 3 == 0 {
      for _ in 0 .. 4 {
        keys.push(x);
      }
    }
  }
  keys.shuffle(&mut g);
  let start = Instant::now();

  let mut tmp = 0i64;
  for _ in 0 .. repeats {
    let mut sum = 0i64;
    for &k in &keys {
      sum = sum.wrapping_add(cont.get(k));
    }
    tmp = tmp.wrapping_add(sum);
  }
  std::hint::black_box(tmp);

  return ms_since(start);
}

fn get_array_random_mix<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let mut cont = M::new();
  for x in 0 .. size as i32 {
    cont.set(x * 2, x as i64 * 17);
  }
  let keys = shuffled_range(&mut g, size);
  let start = Instant::now();

  let mut tmp = 0i64;
  for _ in 0 .. repeats {
    let mut sum = 0i64;
    for &k in &keys {
      sum = sum.wrapping_add(cont.get(k));
    }
    tmp = tmp.wrapping_add(sum);
  }
  std::hint::black_box(tmp);

  return ms_since(start);
}

fn get_hash_random_hit<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let mut cont = M::new();
  let keys = sparse_keys(&mut g, size);
  for (i, &k) in keys.iter().enumerate() {
    cont.set(k, i as i64 * i as i64);
  }
  let start = Instant::now();

  let mut tmp = 0i64;
  for _ in 0 .. repeats {
    let mut sum = 0i64;
    for &k in &keys {
      sum = sum.wrapping_add(cont.get(k));
    }
    tmp = tmp.wrapping_add(sum);
  }
  std::hint::black_box(tmp);

  return ms_since(start);
}

fn get_hash_random_miss<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let mut cont = M::new();
  for (i, k) in sparse_keys(&mut g, size).into_iter().enumerate() {
    cont.set(k, i as i64 * i as i64);
  }
  let keys = sparse_keys(&mut g, size);
  let start = Instant::now();

  let mut tmp = 0i64;
  for _ in 0 .. repeats {
    let mut sum = 0i64;
    for &k in &keys {
      sum = sum.wrapping_add(cont.get(k));
    }
    tmp = tmp.wrapping_add(sum);
  }
  std::hint::black_box(tmp);

  return ms_since(start);
}

fn set_array_sequential_miss<M: Bench>(size: usize, repeats: usize) -> f64 {
  let start = Instant::now();

  for _ in 0 .. repeats {
    let mut cont = M::new();
    cont.reserve(size, 0);
    for x in 0 .. size as i32 {
      cont.set(x, x as i64 * x as i64);
    }
  }

  return ms_since(start);
}

fn get_ptr_array_random_mix<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let mut cont = M::new();
  for x in 0 .. size as i32 {
    cont.set(x * 2, x as i64 * 17);
  }
  let keys = shuffled_range(&mut g, size);
  let start = Instant::now();

  let mut tmp = 0usize;
  for _ in 0 .. repeats {
    let mut sum = 0usize;
    for &k in &keys {
      sum ^= cont.get_ptr_bits(k);
    }
    tmp = tmp.wrapping_add(sum);
  }
  std::hint::black_box(tmp);

  return ms_since(start);
}

fn set_array_random_mix<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let perm = tree_order(&mut g, size);
  let start = Instant::now();

  for _ in 0 .. repeats / 2 {
    let mut cont = M::new();
    cont.reserve(size, 0);
    for (j, &k) in perm.iter().enumerate() {
      cont.set(k, j as i64 * j as i64);
    }
  }

  return ms_since(start);
}

fn set_if_new_array_random_mix<M: Bench>(size: usize, repeats: usize) -> f64 {
  let mut g = StdRng::seed_from_u64(0);
  let perm = tree_order(&mut g, size);
  let start = Instant::now();

  for _ in 0 .. repeats / 2 {
    let mut cont = M::new();
    cont.reserve(size, 0);
    for (j, &k) in perm.iter().enumerate() {
      cont.set_if_new(k, j as i64 * j as i64);
    }
  }

  return ms_since(start);
}

fn report(name: &str, mine: f64, reference: Option<f64>) {
  match reference {
    None => println!("{:<28} {:9.2} ms", name, mine),
    Some(r) => println!("{:<28} {:9.2} ms hybrid, {:9.2} ms std, {:5.2}x", name, mine, r, r / mine),
  }
}

macro_rules! time_call {
  ($func:ident, $compare:expr, ($size:expr, $repeats:expr)) => {{
    let mine = $func::<HybridMap<i32, i64>>($size, $repeats);
    let reference = if $compare { Some($func::<StdMap>($size, $repeats)) } else { None };
    report(stringify!($func), mine, reference);
  }};
}

fn speed_all(compare: bool) {
  time_call!(get_array_random_hit, compare, (100000, 20));
  time_call!(get_array_random_miss, compare, (100000, 20));
  time_call!(get_array_random_mix, compare, (100000, 20));
  time_call!(get_hash_random_hit, compare, (100000, 20));
  time_call!(get_hash_random_miss, compare, (100000, 20));

  time_call!(growth_array_sequential, compare, (100000, 20));
  time_call!(growth_array_random, compare, (100000, 20));
  time_call!(growth_hash_random, compare, (100000, 20));

  time_call!(remove_array_random, compare, (100000, 20));
  time_call!(remove_hash_random, compare, (100000, 20));

  time_call!(set_array_sequential_miss, compare, (100000, 20));

  time_call!(get_ptr_array_random_mix, compare, (100000, 20));
  time_call!(set_array_random_mix, compare, (100000, 20));
  time_call!(set_if_new_array_random_mix, compare, (100000, 20));
}

// ===========================================================================
// randomized checking
// ===========================================================================

fn test_random<V, G>(
  dict: &mut CheckedMap<i32, V>,
  probs: &[f64],
  ops: usize,
  min_key: i32,
  max_key: i32,
  g: &mut StdRng,
  gen_value: &G,
  quiet: bool,
) where
  V: Value + Clone + PartialEq + std::fmt::Debug,
  G: Fn(&mut StdRng) -> V,
{
  let total: f64 = probs.iter().sum();

  if !quiet {
    let signature: String = probs
      .iter()
      .map(|p| {
        let percent = (p / total * 100.0 + 0.5) as i32;
        if percent > 0 {
          format!("{:02}|", percent.min(99))
        } else if *p > 0.0 {
          "0x|".to_string()
        } else {
          "00|".to_string()
        }
      })
      .collect();
    println!("test_random: {} opers, keys in [{}, {}]", ops, min_key, max_key);
    println!("    probs: |{}", signature);
  }

  let mut pref_sums = vec![-1e50];
  let mut sum = 0.0;
  for p in probs {
    sum += p / total;
    pref_sums.push(sum);
  }
  *pref_sums.last_mut().unwrap() = 1e50;

  let mut done = 0;
  while done < ops {
    let param: f64 = g.gen_range(0.0 .. 1.0);
    let ty = pref_sums.partition_point(|&x| x < param) - 1;

    let key: i32 = g.gen_range(min_key ..= max_key);

    match ty {
      0 => {
        let _ = dict.len();
      }
      1 => {
        let _ = dict.get(key);
      }
      2 => {
        let _ = dict.get_ptr(key);
      }
      3 => {
        dict.set(key, gen_value(g));
      }
      4 => {
        dict.set_if_new(key, gen_value(g));
      }
      5 => {
        dict.remove(key);
      }
      6 => {
        if dict.is_empty() {
          continue;
        }
        let k = dict.some_key(g.gen()).unwrap();
        dict.remove_ptr(k);
      }
      7 => {
        let array_lb = g.gen_range(0 ..= ops);
        let hash_lb = g.gen_range(0 ..= ops);
        let clean = g.gen_bool(0.5);
        dict.reserve(array_lb, hash_lb, clean);
      }
      8 => {
        let mut tmp = CheckedMap::new(dict.assert_level);
        for k in [0, 1, 2, 42, 27] {
          tmp.set(k, gen_value(g));
        }
        dict.swap(&mut tmp);
      }
      9 => {
        dict.clear();
      }
      _ => {
        dict.verify_contents();
      }
    }

    done += 1;
  }
}

fn tests_round_int(g: &mut StdRng, lvl: i32, quiet: bool) {
  let gen_int = |g: &mut StdRng| g.gen_range(-1_000_000 .. 1_000_000);

  {
    let mut dict = CheckedMap::<i32, i32>::new(lvl);
    test_random(&mut dict, &[1.0; 11], 1000, -100, 100, g, &gen_int, quiet);
  }
  {
    let mut dict = CheckedMap::<i32, i32>::new(lvl);
    let probs = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.01, 0.01, 0.01, 0.01];
    test_random(&mut dict, &probs, 1000, -10, 10, g, &gen_int, quiet);
  }
  {
    let mut dict = CheckedMap::<i32, i32>::new(lvl);
    let probs = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.01];
    test_random(&mut dict, &probs, 2000, -100, 100, g, &gen_int, quiet);
  }
  {
    let mut dict = CheckedMap::<i32, i32>::new(lvl);
    let probs = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.01];
    test_random(&mut dict, &probs, 1000, 0, 100, g, &gen_int, quiet);
  }
  {
    let mut dict = CheckedMap::<i32, i32>::new(lvl);
    test_random(&mut dict, &[1.0; 8], 1000, -50, 50, g, &gen_int, quiet);
  }
  {
    let mut dict = CheckedMap::<i32, i32>::new(lvl);
    let probs = [1.0, 50.0, 50.0, 1.0, 1.0, 1.0, 1.0, 1.0];
    test_random(&mut dict, &probs, 1000, -10, 10, g, &gen_int, quiet);
  }
  {
    let mut dict = CheckedMap::<i32, i32>::new(lvl);
    let probs = [0.0, 1.0, 1.0, 1.0, 1.0, 0.1, 0.01, 0.0];
    test_random(&mut dict, &probs, 1000, -100, 100, g, &gen_int, quiet);
    let probs = [0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0];
    test_random(&mut dict, &probs, 1000, -120, 120, g, &gen_int, quiet);
  }
  {
    let mut dict = CheckedMap::<i32, i32>::new(lvl);
    let probs = [0.0, 1.0, 1.0, 1.0, 1.0, 0.1, 0.01, 0.0];
    test_random(&mut dict, &probs, 1000, 0, 100, g, &gen_int, quiet);
    test_random(&mut dict, &probs, 1000, 100, 300, g, &gen_int, quiet);
    let probs = [0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0];
    test_random(&mut dict, &probs, 1000, 0, 500, g, &gen_int, quiet);
  }
  {
    let mut dict = CheckedMap::<i32, i32>::new(lvl);
    let probs = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.01];
    test_random(&mut dict, &probs, 1000, -2_000_000_000, 2_000_000_000, g, &gen_int, quiet);
  }
}

fn tests_round_box(g: &mut StdRng, lvl: i32, quiet: bool) {
  let gen_box = |g: &mut StdRng| Some(Box::new(g.gen_range(-1000 .. 1000)));

  {
    let mut dict = CheckedMap::<i32, Option<Box<i32>>>::new(lvl);
    test_random(&mut dict, &[1.0; 11], 1000, -100, 100, g, &gen_box, quiet);
  }
  {
    let mut dict = CheckedMap::<i32, Option<Box<i32>>>::new(lvl);
    let probs = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.01];
    test_random(&mut dict, &probs, 1000, -2_000_000_000, 2_000_000_000, g, &gen_box, quiet);
  }
}

fn tests_round(g: &mut StdRng, lvl: i32, quiet: bool) {
  tests_round_int(g, lvl, quiet);
  tests_round_box(g, lvl, quiet);
}

// ===========================================================================

fn main() {
  let args: Vec<String> = std::env::args().collect();

  if args.len() < 2 {
    eprintln!("usage: stress [-q] (-s | -sc | -tN)");
    std::process::exit(2);
  }

  let mut quiet = false;

  for arg in &args[1 ..] {
    if arg == "-q" {
      quiet = true;
    } else if arg == "-s" {
      speed_all(false);
    } else if arg == "-sc" {
      speed_all(true);
    } else if let Some(rest) = arg.strip_prefix("-t") {
      let lvl: i32 = rest.parse().unwrap_or(2);
      let mut g = StdRng::seed_from_u64(0);
      let mut round = 0u64;

      // runs until an assertion trips
      loop {
        tests_round(&mut g, lvl, quiet);
        round += 1;
        if !quiet {
          println!("round {} ok", round);
        }
      }
    } else {
      eprintln!("unknown option: {}", arg);
      std::process::exit(2);
    }
  }
}
