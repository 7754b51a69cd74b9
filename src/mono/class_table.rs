// Mon Jan 26 2026 - Alex

use super::{OffsetsProfile, RawClassRecord, WalkError};
use crate::memory::{Address, MemoryReader, MemoryReaderExt};
use bytes::Buf;
use indexmap::IndexMap;
use log::{debug, info};

const MAX_BUCKETS: u32 = 1 << 20;

/// Every class node reachable from an image's class cache, in walk order.
#[derive(Debug, Default)]
pub struct ClassTable {
    pub records: IndexMap<Address, RawClassRecord>,
    pub raw_class_count: usize,
}

/// Walks the image's class hash table bucket by bucket.
///
/// A chain that reaches an address already in the table stops there, so a
/// looping chain is read once. `progress` gets `(buckets_done, bucket_count)`.
pub fn walk_class_table<R, F>(
    reader: &R,
    profile: &OffsetsProfile,
    image: Address,
    mut progress: F,
) -> Result<ClassTable, WalkError>
where
    R: MemoryReader + ?Sized,
    F: FnMut(usize, usize),
{
    let cache = image + profile.image_class_cache;
    let size = reader.read_u32(cache + profile.hash_table_size)?;
    let table = reader.read_ptr(cache + profile.hash_table_table)?;
    debug!("Class cache: {} buckets at {}", size, table);

    if size > MAX_BUCKETS {
        return Err(WalkError::InvalidHashTable { address: cache, size });
    }
    if size == 0 || table.is_null() {
        return Ok(ClassTable::default());
    }

    let raw = reader.read_exact(table, size as usize * 8)?;
    let buckets: Vec<Address> = raw.chunks_exact(8).map(|mut c| Address::new(c.get_u64_le())).collect();

    let mut records: IndexMap<Address, RawClassRecord> = IndexMap::new();
    for (index, head) in buckets.iter().enumerate() {
        let mut node = *head;
        while !node.is_null() && !records.contains_key(&node) {
            let record = RawClassRecord::read(reader, profile, node)?;
            let next = record.next;
            records.insert(node, record);
            node = next;
        }
        progress(index + 1, buckets.len());
    }

    info!("Walked {} classes in {} buckets", records.len(), size);
    Ok(ClassTable {
        raw_class_count: records.len(),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::MonoBuilder;

    #[test]
    fn test_walk_counts_every_node() {
        let mut mono = MonoBuilder::new();
        let a = mono.class("A").finish();
        let b = mono.class("B").finish();
        let c = mono.class("C").finish();
        let d = mono.class("D").finish();
        let image = mono.image(&[vec![a, b], vec![], vec![c], vec![d]]);
        let memory = mono.memory();

        let mut calls = Vec::new();
        let table = walk_class_table(&memory, &OffsetsProfile::default(), image, |done, total| {
            calls.push((done, total))
        })
        .unwrap();

        assert_eq!(table.raw_class_count, 4);
        let names: Vec<_> = table.records.values().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert_eq!(calls.last(), Some(&(4, 4)));
    }

    #[test]
    fn test_looping_chain_is_read_once() {
        let mut mono = MonoBuilder::new();
        let a = mono.class("A").finish();
        let b = mono.class("B").finish();
        let c = mono.class("C").finish();
        let image = mono.image(&[vec![a, b, c], vec![b]]);
        mono.set_next_class(c, a);
        let memory = mono.memory();

        let table = walk_class_table(&memory, &OffsetsProfile::default(), image, |_, _| {}).unwrap();
        assert_eq!(table.raw_class_count, 3);
        assert_eq!(table.records.len(), 3);
    }

    #[test]
    fn test_empty_table() {
        let mut mono = MonoBuilder::new();
        let image = mono.image(&[]);
        let memory = mono.memory();

        let table = walk_class_table(&memory, &OffsetsProfile::default(), image, |_, _| {}).unwrap();
        assert_eq!(table.raw_class_count, 0);
    }

    #[test]
    fn test_unreadable_node_fails() {
        let mut mono = MonoBuilder::new();
        let image = mono.image(&[vec![Address::new(0xdead_0000)]]);
        let memory = mono.memory();

        assert!(walk_class_table(&memory, &OffsetsProfile::default(), image, |_, _| {}).is_err());
    }
}
