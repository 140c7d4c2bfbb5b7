use lazy_bitset::{StackBitSet, byte_count};

/// Prints every subset of `0..item_count` with exactly `pick` members.
fn combinations(idx: usize, item_count: usize, pick: usize, bitset: &mut StackBitSet<'_>) {
    if bitset.popcount() == pick {
        let members: Vec<usize> = bitset.iter_ones().collect();
        println!("{members:?}");
        return;
    }
    if idx == item_count {
        return;
    }
    if !bitset.test(idx) {
        bitset.set(idx).expect("index fits the region");
        combinations(idx + 1, item_count, pick, bitset);
        bitset.reset(idx);
    }
    combinations(idx + 1, item_count, pick, bitset)
}

fn main() {
    const ITEM_COUNT: usize = 9;
    let mut region = [0u8; byte_count(ITEM_COUNT)];
    let mut bitset = StackBitSet::new_in(ITEM_COUNT, &mut region).expect("region is large enough");
    combinations(0, ITEM_COUNT, 3, &mut bitset);
}
