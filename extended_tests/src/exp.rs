use std::hash::{BuildHasher, RandomState};
use std::time::Instant;

use lfkv::HashTable;

use crate::SERIALIZER;

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: usize) -> f64 {
    value as f64
}

#[ignore = "experiment"]
#[test]
fn chain_length() {
    let _guard = SERIALIZER.lock().unwrap();

    let build_hasher = RandomState::new();
    for b in [32, 128, 512, 2048, 8192, 32768, 131_072, 524_288] {
        for load in [1, 2, 4, 8] {
            let mut chains: Vec<usize> = vec![0; b];
            let n = b * load;
            for key in 0..n {
                #[allow(clippy::cast_possible_truncation)]
                let hash = build_hasher.hash_one(key) as usize;
                chains[hash & (b - 1)] += 1;
            }
            let empty = chains.iter().filter(|c| **c == 0).count();
            let max = chains.iter().copied().max().unwrap_or(0);
            let mean = to_f64(n) / to_f64(b);
            let variance = chains
                .iter()
                .map(|c| (to_f64(*c) - mean).powi(2))
                .sum::<f64>()
                / to_f64(b);
            println!(
                "Num buckets: {b}, load: {load}, entries: {n}, empty: {:.4}%, max: {max}, stddev: {:.4}",
                (to_f64(empty) / to_f64(b)) * 100.0,
                variance.sqrt()
            );
        }
    }
}

#[ignore = "experiment"]
#[test]
fn get_latency() {
    let _guard = SERIALIZER.lock().unwrap();

    let n = 1 << 16;
    for b in [1 << 10, 1 << 12, 1 << 14, 1 << 16, 1 << 18] {
        let hashtable: HashTable<usize, usize> = HashTable::with_buckets(b);
        for k in 0..n {
            hashtable.put(k, k);
        }
        let start = Instant::now();
        for k in 0..n {
            assert_eq!(hashtable.get(&k), Some(k));
        }
        let elapsed = start.elapsed();
        println!(
            "Num buckets: {b}, entries: {n}, load: {:.2}, get: {:.2}ns",
            to_f64(n) / to_f64(b),
            to_f64(usize::try_from(elapsed.as_nanos()).unwrap_or(usize::MAX)) / to_f64(n)
        );
    }
}
