#![no_main]

use libfuzzer_sys::fuzz_target;
use memokit::cache::BoundedCache;
use memokit::policy::EvictionPolicy;

// Fuzz arbitrary operation sequences on BoundedCache
//
// Tests random sequences of get, insert, peek, clear operations under every
// eviction policy, checking capacity and rank invariants after each step.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks capacity (1-16) and policy
    let capacity = (data[0] as usize % 16) + 1;
    let policy = EvictionPolicy::ALL[(data[0] as usize / 16) % EvictionPolicy::ALL.len()];
    let mut cache: BoundedCache<u8, u32> = BoundedCache::new(capacity, policy);

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 4;
        let key = data[idx + 1];

        match op {
            0 => {
                let before = cache.entry(&key).map(|e| e.hit_count());
                let hit = cache.get(&key).is_some();
                assert_eq!(hit, before.is_some());
                if let Some(hits) = before {
                    assert_eq!(cache.entry(&key).map(|e| e.hit_count()), Some(hits + 1));
                }
            }
            1 => {
                let had = cache.contains(&key);
                let len = cache.len();
                let evicted = cache.insert(key, u32::from(key));
                if had {
                    assert_eq!(evicted, 0);
                    assert_eq!(cache.len(), len);
                } else {
                    assert_eq!(cache.len() + evicted, len + 1);
                }
            }
            2 => {
                let _ = cache.peek(&key);
            }
            3 => {
                cache.clear();
                assert!(cache.is_empty());
            }
            _ => unreachable!(),
        }

        assert!(cache.len() <= cache.capacity());
        cache.check_invariants().unwrap();

        idx += 2;
    }
});
