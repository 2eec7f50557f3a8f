#![no_main]

use libfuzzer_sys::fuzz_target;
use opdiff::{SequenceMatcher, Tag, group_opcodes};

fuzz_target!(|data: &[u8]| {
    // The first byte picks where the input is split into the two sequences
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());
    let (old, new) = rest.split_at(split);
    // Fold the alphabet so repeated elements are common
    let old: Vec<u8> = old.iter().map(|b| b % 8).collect();
    let new: Vec<u8> = new.iter().map(|b| b % 8).collect();

    let matcher = SequenceMatcher::new(&old, &new);
    let opcodes = matcher.opcodes();

    let (mut i, mut j) = (0, 0);
    let mut replayed = Vec::new();
    for op in opcodes {
        assert_eq!((op.old_start, op.new_start), (i, j));
        match op.tag {
            Tag::Equal => {
                assert_eq!(old[op.old_range()], new[op.new_range()]);
                replayed.extend_from_slice(&old[op.old_range()]);
            }
            Tag::Delete => assert!(op.new_range().is_empty() && !op.old_range().is_empty()),
            Tag::Insert | Tag::Replace => replayed.extend_from_slice(&new[op.new_range()]),
        }
        i = op.old_end;
        j = op.new_end;
    }
    assert_eq!((i, j), (old.len(), new.len()));
    assert_eq!(replayed, new);

    for group in group_opcodes(opcodes, 3) {
        assert!(!group.is_empty());
        assert!(group.iter().any(|op| op.tag != Tag::Equal));
    }
});
