#![no_main]

use std::collections::HashSet;

use concolic_trace::utils::LongHashSet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut set = LongHashSet::new();
    let mut model = HashSet::new();

    for chunk in data.chunks(9) {
        let Some((&op, key)) = chunk.split_first() else {
            continue;
        };
        let mut bytes = [0u8; 8];
        bytes[..key.len()].copy_from_slice(key);
        let key = i64::from_le_bytes(bytes);

        match op % 8 {
            0 => {
                set.clear();
                model.clear();
            }
            1..=2 => assert_eq!(set.contains(key), model.contains(&key)),
            _ => assert_eq!(set.add(key), model.insert(key)),
        }
        assert_eq!(set.len(), model.len());
    }
});
