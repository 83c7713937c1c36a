//! Binary min-heap keyed by a record field.
//!
//! Keys are resolved once on insertion and stored next to the item, so each
//! comparison during sifting is a plain [`FieldValue`] comparison.
//!
//! Equal keys come out in unspecified relative order: the heap is not a
//! stable sort.

use crate::models::{Field, FieldLookup, FieldValue};

#[derive(Debug, Clone)]
struct HeapEntry<T> {
    key: FieldValue,
    item: T,
}

/// Min-heap over items ordered by one [`Field`].
///
/// Uses 0-indexed storage with parent = (i-1)/2, children = 2i+1, 2i+2.
#[derive(Debug, Clone)]
pub struct OrderedHeap<T> {
    field: Field,
    nodes: Vec<HeapEntry<T>>,
}

impl<T: FieldLookup> OrderedHeap<T> {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            nodes: Vec::new(),
        }
    }

    /// Build a heap by inserting every item in turn.
    pub fn heapify<I>(field: Field, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let items = items.into_iter();
        let mut heap = Self {
            field,
            nodes: Vec::with_capacity(items.size_hint().0),
        };
        for item in items {
            heap.insert(item);
        }
        heap
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Key of the current minimum, if any.
    pub fn peek_key(&self) -> Option<&FieldValue> {
        self.nodes.first().map(|entry| &entry.key)
    }

    pub fn insert(&mut self, item: T) {
        let key = item.field(self.field);
        self.nodes.push(HeapEntry { key, item });
        self.sift_up(self.nodes.len() - 1);
    }

    /// Remove and return the item with the smallest key.
    pub fn extract_min(&mut self) -> Option<T> {
        if self.nodes.is_empty() {
            return None;
        }
        let last = self.nodes.len() - 1;
        self.nodes.swap(0, last);
        let min = self.nodes.pop()?;
        if !self.nodes.is_empty() {
            self.sift_down(0);
        }
        Some(min.item)
    }

    /// Extract every item, smallest key first.
    pub fn drain(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(item) = self.extract_min() {
            sorted.push(item);
        }
        sorted
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.nodes[parent].key > self.nodes[index].key {
                self.nodes.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.nodes.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;

            if left < len && self.nodes[left].key < self.nodes[smallest].key {
                smallest = left;
            }
            if right < len && self.nodes[right].key < self.nodes[smallest].key {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.nodes.swap(index, smallest);
            index = smallest;
        }
    }
}
