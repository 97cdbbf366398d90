//! Growth and lifecycle properties of the public buffer API
use growbuf::{Chunk, GrowableBuffer, GrowthPolicy};
use proptest::prelude::*;

/// Append `values` one at a time, recording (length, capacity) after
/// each append
fn append_all<T: Clone>(buf: &mut GrowableBuffer<T>, values: &[T]) -> Vec<(usize, usize)> {
    values
        .iter()
        .map(|v| {
            buf.append(v.clone());
            (buf.len(), buf.capacity())
        })
        .collect()
}

#[test]
pub fn test_scenario_three_values() {
    let mut buf = GrowableBuffer::new();
    append_all(&mut buf, &[1u8, 2, 3]);
    assert_eq!(buf.len(), 3);
    assert_eq!(buf.capacity(), 8);
    assert_eq!(
        (0..3).map(|i| *buf.element_at(i)).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
pub fn test_scenario_nine_values() {
    let mut buf = GrowableBuffer::new();
    let trace = append_all(&mut buf, &[1u8, 2, 3, 4, 5, 6, 7, 8, 9]);
    let growths: Vec<_> = trace
        .windows(2)
        .filter(|w| w[0].1 != w[1].1)
        .map(|w| (w[1].0, w[0].1, w[1].1))
        .collect();
    assert_eq!(growths, vec![(9, 8, 16)]);
    assert_eq!(buf.capacity(), 16);
}

#[test]
pub fn test_scenario_destroy_immediately() {
    let mut buf: GrowableBuffer<u8> = GrowableBuffer::new();
    buf.destroy();
    assert_eq!(buf.len(), 0);
    assert_eq!(buf.capacity(), 0);
}

#[test]
pub fn test_chunk_embeds_buffer() {
    let mut chunk = Chunk::new();
    for byte in 0u8..=8 {
        chunk.write(byte);
    }
    assert_eq!(chunk.len(), 9);
    assert_eq!(chunk.capacity(), 16);
    assert_eq!(chunk.code(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    chunk.free();
    assert!(chunk.is_empty());
    assert_eq!(chunk.capacity(), 0);
}

#[test]
pub fn test_policy_is_carried() {
    let policy = GrowthPolicy::default().with_initial_capacity(4);
    let mut buf = GrowableBuffer::with_policy(policy);
    buf.append("x");
    assert_eq!(buf.policy(), policy);
    assert_eq!(buf.capacity(), 4);
}

proptest! {
    #[test]
    fn length_counts_appends(values in prop::collection::vec(any::<u8>(), 0..600)) {
        let mut buf = GrowableBuffer::new();
        let trace = append_all(&mut buf, &values);
        for (i, (len, cap)) in trace.iter().enumerate() {
            prop_assert_eq!(*len, i + 1);
            prop_assert!(*cap >= *len);
        }
        prop_assert_eq!(buf.len(), values.len());
    }

    #[test]
    fn capacities_double_from_eight(n in 1usize..2000) {
        let mut buf = GrowableBuffer::new();
        let trace = append_all(&mut buf, &vec![0u32; n]);
        let mut capacities: Vec<usize> = trace.iter().map(|(_, c)| *c).collect();
        capacities.dedup();
        prop_assert_eq!(capacities[0], 8);
        prop_assert_eq!(trace[0].1, 8);
        for w in capacities.windows(2) {
            prop_assert_eq!(w[1], w[0] * 2);
        }
    }

    #[test]
    fn contents_survive_growth(values in prop::collection::vec(any::<i64>(), 0..600)) {
        let mut buf = GrowableBuffer::new();
        append_all(&mut buf, &values);
        prop_assert_eq!(buf.as_slice(), values.as_slice());
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(buf.element_at(i), v);
        }
    }

    #[test]
    fn destroy_resets_to_fresh(
        first in prop::collection::vec(any::<u8>(), 0..100),
        second in prop::collection::vec(any::<u8>(), 1..100),
    ) {
        let mut reused = GrowableBuffer::new();
        append_all(&mut reused, &first);
        reused.destroy();
        prop_assert_eq!(reused.len(), 0);
        prop_assert_eq!(reused.capacity(), 0);

        let mut fresh = GrowableBuffer::new();
        prop_assert_eq!(append_all(&mut reused, &second), append_all(&mut fresh, &second));
        prop_assert_eq!(reused.as_slice(), fresh.as_slice());
    }
}
