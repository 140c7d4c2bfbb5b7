use super::*;
use alloc::format;
use alloc::vec::Vec;

// needs more bytes than any allocator can hand out
const HUGE_IDX: usize = usize::MAX;

#[test]
fn test_byte_count() {
    assert_eq!(byte_count(0), 0);
    assert_eq!(byte_count(1), 1);
    assert_eq!(byte_count(8), 1);
    assert_eq!(byte_count(9), 2);
    assert_eq!(byte_count(16), 2);
    assert_eq!(byte_count(17), 3);
    assert_eq!(byte_count(100), 13);
}

#[test]
fn test_new() {
    let bitset = HeapBitSet::new();
    assert_eq!(bitset.popcount(), 0);
    assert_eq!(bitset.capacity(), 0);
    assert_eq!(bitset.len_bytes(), 0);
    assert!(bitset.is_empty());
    assert_eq!(bitset, HeapBitSet::default());
}

#[test]
fn test_with_capacity_does_not_materialize() {
    let bitset = HeapBitSet::with_capacity(1000).unwrap();
    assert!(bitset.capacity() >= 1000);
    assert_eq!(bitset.len_bytes(), 0);
    assert_eq!(bitset.popcount(), 0);
    assert!(!bitset.test(999));
}

#[test]
fn test_set_reset_scenario() {
    let mut bitset = HeapBitSet::with_capacity(8).unwrap();
    for idx in [3, 5, 100] {
        bitset.set(idx).unwrap();
    }
    assert_eq!(bitset.popcount(), 3);
    bitset.reset(5);
    assert_eq!(bitset.popcount(), 2);
    assert!(bitset.test(100));
    assert!(!bitset.test(5));
    assert!(bitset.test(3));
    assert!(bitset.capacity() >= 101);
    assert_eq!(bitset.len_bytes(), 13);
}

#[test]
fn test_set_is_idempotent() {
    let mut bitset = HeapBitSet::new();
    bitset.set(17).unwrap();
    let len = bitset.len_bytes();
    bitset.set(17).unwrap();
    assert_eq!(bitset.popcount(), 1);
    assert_eq!(bitset.len_bytes(), len);
}

#[test]
fn test_reset_is_idempotent() {
    let mut bitset = HeapBitSet::try_from_ones([1, 2]).unwrap();
    bitset.reset(1);
    bitset.reset(1);
    assert_eq!(bitset.popcount(), 1);
    assert!(bitset.test(2));
}

#[test]
fn test_reset_past_extent_does_not_allocate() {
    let mut bitset = HeapBitSet::new();
    bitset.reset(12345);
    assert_eq!(bitset.capacity(), 0);
    assert_eq!(bitset.len_bytes(), 0);
    assert_eq!(bitset.popcount(), 0);
}

#[test]
fn test_out_of_range_reads_as_unset() {
    let bitset = HeapBitSet::try_from_ones([0, 7]).unwrap();
    assert!(!bitset.test(8));
    assert!(!bitset.test(1 << 20));
    assert!(!bitset.test(HUGE_IDX));
}

#[test]
fn test_growth_zeroes_only_new_bytes() {
    let mut region = [0xffu8; 4];
    let mut bitset = StackBitSet::new_in(32, &mut region).unwrap();
    assert_eq!(bitset.popcount(), 0);
    bitset.set(20).unwrap();
    assert_eq!(bitset.len_bytes(), 3);
    assert_eq!(bitset.as_bytes(), &[0, 0, 0b0001_0000]);
    assert_eq!(bitset.popcount(), 1);
    for idx in (0..32).filter(|idx| *idx != 20) {
        assert!(!bitset.test(idx), "bit {idx} should be unset");
    }
}

#[test]
fn test_clear_then_regrow_forgets_old_bits() {
    let mut region = [0u8; 2];
    let mut bitset = StackBitSet::new_in(16, &mut region).unwrap();
    for idx in 0..16 {
        bitset.set(idx).unwrap();
    }
    assert_eq!(bitset.popcount(), 16);
    bitset.clear();
    assert_eq!(bitset.popcount(), 0);
    assert!(!bitset.test(0));
    assert_eq!(bitset.capacity(), 16);

    bitset.set(9).unwrap();
    assert_eq!(bitset.popcount(), 1);
    assert_eq!(bitset.iter_ones().collect::<Vec<_>>(), [9]);
}

#[test]
fn test_clear_keeps_capacity() {
    let mut bitset = HeapBitSet::try_from_ones(0..500).unwrap();
    let capacity = bitset.capacity();
    bitset.clear();
    assert_eq!(bitset.capacity(), capacity);
    assert!(bitset.iter_ones().next().is_none());
    for idx in 0..capacity {
        assert!(!bitset.test(idx));
    }
}

#[test]
fn test_eval_on_fresh_bitset() {
    let mut bitset = HeapBitSet::new();
    bitset.eval(50).unwrap();
    assert!(!bitset.test(50));
    assert_eq!(bitset.popcount(), 0);
    assert!(bitset.capacity() >= 51);
    assert_eq!(bitset.len_bytes(), 7);
}

#[test]
fn test_eval_keeps_set_bit() {
    let mut bitset = HeapBitSet::try_from_ones([4]).unwrap();
    bitset.eval(4).unwrap();
    assert!(bitset.test(4));
    assert_eq!(bitset.popcount(), 1);
}

#[test]
fn test_eval_past_arena_fails_unchanged() {
    let mut region = [0u8; 1];
    let mut bitset = StackBitSet::new_in(8, &mut region).unwrap();
    bitset.set(2).unwrap();
    assert_eq!(bitset.eval(8), Err(Error::OutOfMemory { requested_bytes: 2 }));
    assert_eq!(bitset.len_bytes(), 1);
    assert_eq!(bitset.popcount(), 1);
}

#[test]
fn test_reserve() {
    let mut bitset = HeapBitSet::new();
    let reserved = bitset.reserve(300).unwrap();
    assert!(reserved >= 300);
    assert_eq!(bitset.capacity(), reserved);
    assert_eq!(bitset.len_bytes(), 0);

    // smaller requests never shrink
    assert_eq!(bitset.reserve(10).unwrap(), reserved);
}

#[test]
fn test_reserve_past_arena_fails() {
    let mut region = [0u8; 8];
    let mut bitset = StackBitSet::new_in(40, &mut region).unwrap();
    assert_eq!(bitset.capacity(), 40);
    assert_eq!(bitset.reserve(40).unwrap(), 40);
    assert_eq!(bitset.reserve(41), Err(Error::OutOfMemory { requested_bytes: 6 }));
    assert_eq!(bitset.capacity(), 40);
}

#[test]
fn test_arena_too_small() {
    let mut region = [0u8; 3];
    assert_eq!(
        StackBitSet::new_in(25, &mut region).unwrap_err(),
        Error::OutOfMemory { requested_bytes: 4 }
    );
}

#[test]
fn test_failed_heap_growth_leaves_bitset_unchanged() {
    let mut bitset = HeapBitSet::try_from_ones([1, 30]).unwrap();
    let before = bitset.clone();
    let capacity = bitset.capacity();
    assert!(bitset.set(HUGE_IDX).is_err());
    assert!(bitset.eval(HUGE_IDX).is_err());
    assert_eq!(bitset, before);
    assert_eq!(bitset.len_bytes(), before.len_bytes());
    assert_eq!(bitset.capacity(), capacity);
    assert!(!bitset.test(HUGE_IDX));
}

#[test]
fn test_failed_heap_allocation() {
    assert!(matches!(
        HeapBitSet::with_capacity(HUGE_IDX),
        Err(Error::OutOfMemory { .. })
    ));
}

#[test]
fn test_shrink_empty_releases_bytes() {
    let mut bitset = HeapBitSet::with_capacity(2048).unwrap();
    bitset.set(1000).unwrap();
    bitset.reset(1000);
    assert_eq!(bitset.len_bytes(), 126);
    bitset.shrink();
    assert_eq!(bitset.len_bytes(), 0);
    assert_eq!(bitset.capacity(), 0);
    assert_eq!(bitset.popcount(), 0);
}

#[test]
fn test_shrink_keeps_content() {
    let mut bitset = HeapBitSet::with_capacity(4096).unwrap();
    bitset.set(3).unwrap();
    bitset.set(70).unwrap();
    bitset.shrink().reset(3);
    assert!(bitset.capacity() >= 71);
    assert!(bitset.capacity() < 4096);
    assert!(bitset.test(70));
    assert_eq!(bitset.popcount(), 1);
}

#[test]
fn test_shrink_arena_is_noop() {
    let mut region = [0u8; 4];
    let mut bitset = StackBitSet::new_in(32, &mut region).unwrap();
    bitset.set(0).unwrap();
    bitset.reset(0);
    bitset.shrink();
    assert_eq!(bitset.len_bytes(), 0);
    assert_eq!(bitset.capacity(), 32);
}

#[test]
fn test_duplicate_is_independent() {
    let mut original = HeapBitSet::try_from_ones([0, 9, 64]).unwrap();
    let mut copy = original.duplicate().unwrap();
    assert_eq!(copy.popcount(), 3);
    assert_eq!(copy.as_bytes(), original.as_bytes());

    copy.set(1).unwrap();
    original.reset(9);
    assert!(!original.test(1));
    assert!(copy.test(9));
    assert_eq!(original.popcount(), 2);
    assert_eq!(copy.popcount(), 4);
}

#[test]
fn test_duplicate_stack_onto_heap() {
    let mut region = [0u8; 16];
    let mut bitset = StackBitSet::new_in(128, &mut region).unwrap();
    bitset.set(127).unwrap();
    bitset.set(3).unwrap();
    let copy: HeapBitSet = bitset.duplicate().unwrap();
    for idx in 0..bitset.capacity() {
        assert_eq!(copy.test(idx), bitset.test(idx));
    }
    assert_eq!(copy.popcount(), bitset.popcount());
    // the copy is not bound by the region
    let mut copy = copy;
    copy.set(1000).unwrap();
}

#[test]
fn test_equality_ignores_storage() {
    let mut a = HeapBitSet::try_from_ones([2, 11]).unwrap();
    let b = HeapBitSet::try_from_ones([11, 2]).unwrap();
    a.eval(200).unwrap();
    assert_ne!(a.len_bytes(), b.len_bytes());
    assert_eq!(a, b);

    let mut region = [0u8; 2];
    let mut c = StackBitSet::new_in(16, &mut region).unwrap();
    c.set(2).unwrap();
    assert_ne!(a, c);
    c.set(11).unwrap();
    assert_eq!(a, c);
}

#[test]
fn test_iter_ones() {
    let bitset = HeapBitSet::try_from_ones([63, 0, 8, 7, 300]).unwrap();
    let ones = bitset.iter_ones();
    assert_eq!(ones.len(), 5);
    assert_eq!(ones.collect::<Vec<_>>(), [0, 7, 8, 63, 300]);
    assert_eq!((&bitset).into_iter().count(), bitset.popcount());
    assert_eq!(HeapBitSet::new().iter_ones().next(), None);
}

#[test]
fn test_first_set_bit() {
    let mut bitset = HeapBitSet::new();
    bitset.eval(80).unwrap();
    assert_eq!(bitset.first_set_bit(), None);
    bitset.set(77).unwrap();
    bitset.set(79).unwrap();
    assert_eq!(bitset.first_set_bit(), Some(77));
}

#[test]
fn test_null_handle_reads_as_empty() {
    let mut handle: Option<HeapBitSet> = None;
    for idx in [0, 1, 8, 1 << 30, HUGE_IDX] {
        assert!(!handle.test(idx));
    }
    assert_eq!(handle.popcount(), 0);
    assert_eq!(handle.capacity(), 0);
    handle.reset(3);
    handle.clear();
    assert!(handle.shrink().is_none());
    assert_eq!(handle.duplicate(), Ok(None));
    assert!(handle.is_none());
}

#[test]
fn test_null_handle_set_allocates() {
    let mut handle: Option<HeapBitSet> = None;
    handle.set(100).unwrap();
    assert!(handle.test(100));
    assert_eq!(handle.popcount(), 1);
    assert!(handle.capacity() >= 101);
    handle.set(3).unwrap();
    assert_eq!(handle.popcount(), 2);
}

#[test]
fn test_null_handle_eval_allocates() {
    let mut handle: Option<HeapBitSet> = None;
    handle.eval(50).unwrap();
    assert!(handle.is_some());
    assert!(!handle.test(50));
    assert_eq!(handle.popcount(), 0);
    assert!(handle.capacity() >= 51);
}

#[test]
fn test_null_handle_failed_set_stays_none() {
    let mut handle: Option<HeapBitSet> = None;
    assert!(handle.set(HUGE_IDX).is_err());
    assert!(handle.is_none());
}

#[test]
fn test_handle_duplicate_and_shrink() {
    let mut handle = Some(HeapBitSet::try_from_ones([5, 6]).unwrap());
    let copy = handle.duplicate().unwrap().unwrap();
    assert_eq!(copy.popcount(), 2);
    handle.clear();
    assert_eq!(handle.popcount(), 0);
    let shrunk = handle.shrink().unwrap();
    assert_eq!(shrunk.len_bytes(), 0);
}

#[test]
fn test_stack_handle() {
    let mut region = [0u8; 2];
    let mut handle = Some(StackBitSet::new_in(16, &mut region).unwrap());
    if let Some(bitset) = handle.as_mut() {
        bitset.set(15).unwrap();
    }
    assert!(handle.test(15));
    handle.reset(15);
    assert_eq!(handle.popcount(), 0);
    assert_eq!(handle.capacity(), 16);
}

#[test]
fn test_free_all() {
    let mut a = Some(HeapBitSet::try_from_ones([1]).unwrap());
    let mut b: Option<HeapBitSet> = None;
    let mut c = Some(HeapBitSet::new());
    free_all([&mut a, &mut b, &mut c]);
    assert!(a.is_none());
    assert!(b.is_none());
    assert!(c.is_none());
}

#[test]
fn debug_format_is_correct() {
    let bitset = HeapBitSet::try_from_ones([0, 2, 7, 8]).unwrap();
    assert_eq!(
        format!("{:?}", bitset),
        "LSB -> 0: 10100001 8: 10000000 <- MSB"
    );
    assert_eq!(format!("{:?}", HeapBitSet::new()), "LSB -> <- MSB");
}

#[test]
fn error_message() {
    let err = Error::OutOfMemory { requested_bytes: 12 };
    assert_eq!(
        format!("{err}"),
        "not enough memory: could not reserve 12 bytes"
    );
}
