//! Recency list for the LRU cache
//!
//! Doubly-linked list whose nodes live in a slot arena and link to each other
//! by slot index. Slots freed by `pop_back` are reused by the next
//! `push_front`, so a list that never holds more than `capacity` values never
//! allocates past its initial arena.
//!
//! ```text
//!   head (MRU) ─► [slot 2] ◄──► [slot 0] ◄──► [slot 1] ◄── tail (LRU)
//! ```

/// Node in the recency list
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Arena-backed doubly-linked list ordered most-recent first
pub(crate) struct RecencyList<T> {
    nodes: Vec<Option<Node<T>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> RecencyList<T> {
    /// Create an empty list with room for `capacity` nodes
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Insert `value` at the head, returning its slot
    pub(crate) fn push_front(&mut self, value: T) -> usize {
        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            value,
            prev: None,
            next: self.head,
        });
        self.link_front(idx);
        self.len += 1;
        idx
    }

    /// Move the node in `slot` to the head and return its value
    ///
    /// Returns `None` if the slot is vacant.
    pub(crate) fn move_to_front(&mut self, slot: usize) -> Option<&T> {
        if !matches!(self.nodes.get(slot), Some(Some(_))) {
            return None;
        }

        if self.head != Some(slot) {
            self.unlink(slot);
            if let Some(node) = &mut self.nodes[slot] {
                node.prev = None;
                node.next = self.head;
            }
            self.link_front(slot);
        }

        self.nodes[slot].as_ref().map(|node| &node.value)
    }

    /// Remove the tail node, freeing its slot for reuse
    pub(crate) fn pop_back(&mut self) -> Option<T> {
        let tail_idx = self.tail?;
        self.unlink(tail_idx);
        let node = self.nodes[tail_idx].take()?;
        self.free_list.push(tail_idx);
        self.len -= 1;
        Some(node.value)
    }

    /// Get the value stored in `slot` without reordering
    pub(crate) fn get(&self, slot: usize) -> Option<&T> {
        self.nodes
            .get(slot)
            .and_then(|node| node.as_ref())
            .map(|node| &node.value)
    }

    /// Most recently used value
    pub(crate) fn front(&self) -> Option<&T> {
        self.head.and_then(|idx| self.get(idx))
    }

    /// Least recently used value
    pub(crate) fn back(&self) -> Option<&T> {
        self.tail.and_then(|idx| self.get(idx))
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Drop every node. Arena storage is kept for reuse.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterate values from head (MRU) to tail (LRU)
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Number of arena slots ever allocated
    #[cfg(test)]
    pub(crate) fn slots_allocated(&self) -> usize {
        self.nodes.len()
    }

    /// Check link consistency in debug builds
    pub(crate) fn debug_validate_invariants(&self) {
        #[cfg(debug_assertions)]
        {
            let mut count = 0;
            let mut prev = None;
            let mut cursor = self.head;
            while let Some(idx) = cursor {
                let node = match &self.nodes[idx] {
                    Some(node) => node,
                    None => panic!("linked slot {} is vacant", idx),
                };
                debug_assert_eq!(node.prev, prev, "broken back link at slot {}", idx);
                prev = Some(idx);
                cursor = node.next;
                count += 1;
                debug_assert!(count <= self.len, "cycle in recency list");
            }
            debug_assert_eq!(self.tail, prev);
            debug_assert_eq!(count, self.len);
            debug_assert_eq!(self.len + self.free_list.len(), self.nodes.len());
        }
    }

    fn link_front(&mut self, idx: usize) {
        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = if let Some(node) = &self.nodes[idx] {
            (node.prev, node.next)
        } else {
            return;
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }
}

/// Head-to-tail iterator over a [`RecencyList`]
pub(crate) struct Iter<'l, T> {
    list: &'l RecencyList<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'l, T> Iterator for Iter<'l, T> {
    type Item = &'l T;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let idx = self.cursor?;
        let node = list.nodes[idx].as_ref()?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
