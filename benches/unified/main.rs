//! unified benchmarks: the hybrid map against general-purpose hash maps,
//! over dense-prefix and scattered key workloads



#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
  divan::main();
}
