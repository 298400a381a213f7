// this_file: crates/sdftext/src/glyph_cache.rs

//! Fixed-capacity LRU pool of cached glyphs
//!
//! Slots live in one arena and the slot index doubles as the atlas cell
//! address. Recency is an intrusive doubly linked list stored as indices:
//! `head` is the least recently used slot, `tail` the most recent.
//!
//! # Capacity contract
//!
//! A miss at full capacity recycles the least recently used slot without
//! checking whether anything still draws from it. A single draw batch must
//! never need more distinct glyphs than the pool holds; if it does, some
//! quads will silently sample the wrong glyph. Eviction never fails.

use std::collections::HashMap;

use sdftext_core::types::AlignedBox;

/// Identifies a glyph across all faces of a font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    /// Index into the font's face list
    pub face: u32,
    pub glyph: u32,
}

impl GlyphKey {
    pub const fn new(face: u32, glyph: u32) -> Self {
        Self { face, glyph }
    }
}

/// What the cache remembers about a rendered glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedGlyph {
    /// Atlas slot holding the distance field
    pub slot: usize,
    /// Bitmap bounds in glyph cell units, y up, relative to the pen
    pub bounds: AlignedBox,
    /// Bitmap footprint in pixels before padding
    pub tex_size: (u32, u32),
}

#[derive(Debug, Clone)]
struct Slot {
    key: Option<GlyphKey>,
    prev: Option<usize>,
    next: Option<usize>,
    bounds: AlignedBox,
    tex_size: (u32, u32),
}

/// Result of claiming a slot for a new key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub slot: usize,
    /// Key that previously owned the slot, if one was evicted
    pub evicted: Option<GlyphKey>,
}

pub struct GlyphCache {
    slots: Vec<Slot>,
    capacity: usize,
    lookup: HashMap<GlyphKey, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl GlyphCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            lookup: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    pub fn contains(&self, key: GlyphKey) -> bool {
        self.lookup.contains_key(&key)
    }

    /// Find a cached glyph and mark it most recently used
    pub fn lookup(&mut self, key: GlyphKey) -> Option<CachedGlyph> {
        let slot = *self.lookup.get(&key)?;
        self.touch(slot);
        Some(self.entry(slot))
    }

    /// Find a cached glyph without touching recency
    pub fn peek(&self, key: GlyphKey) -> Option<CachedGlyph> {
        self.lookup.get(&key).map(|&slot| self.entry(slot))
    }

    /// Key the least recently used slot currently holds
    pub fn least_recent(&self) -> Option<GlyphKey> {
        self.head.and_then(|slot| self.slots[slot].key)
    }

    /// Assign `key` to a slot, recycling the least recently used one when full
    ///
    /// The caller must have checked that `key` is not cached yet. A zero
    /// capacity cache hands out nothing.
    pub fn claim(&mut self, key: GlyphKey) -> Option<Claim> {
        if self.capacity == 0 {
            return None;
        }
        debug_assert!(!self.lookup.contains_key(&key));

        let (slot, evicted) = match self.head {
            // Forgotten slots sit at the head with no key; reuse them first.
            Some(head) if self.slots[head].key.is_none() => (head, None),
            _ if self.slots.len() < self.capacity => {
                self.slots.push(Slot {
                    key: None,
                    prev: None,
                    next: None,
                    bounds: AlignedBox::zero(),
                    tex_size: (0, 0),
                });
                let slot = self.slots.len() - 1;
                self.push_back(slot);
                (slot, None)
            }
            Some(head) => {
                let evicted = self.slots[head].key.take();
                if let Some(old) = evicted {
                    self.lookup.remove(&old);
                    log::trace!("Evicting glyph {:?} from slot {}", old, head);
                }
                (head, evicted)
            }
            None => return None,
        };

        let entry = &mut self.slots[slot];
        entry.key = Some(key);
        entry.bounds = AlignedBox::zero();
        entry.tex_size = (0, 0);
        self.lookup.insert(key, slot);
        self.touch(slot);

        Some(Claim { slot, evicted })
    }

    /// Record the rendered result for a claimed slot
    pub fn store(&mut self, slot: usize, bounds: AlignedBox, tex_size: (u32, u32)) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.bounds = bounds;
            entry.tex_size = tex_size;
        }
    }

    /// Drop whatever key a slot holds and queue the slot for reuse
    pub fn forget(&mut self, slot: usize) {
        if slot >= self.slots.len() {
            return;
        }
        if let Some(key) = self.slots[slot].key.take() {
            self.lookup.remove(&key);
        }
        self.unlink(slot);
        self.push_front(slot);
    }

    /// Keys from least to most recently used
    pub fn recency_order(&self) -> Vec<GlyphKey> {
        let mut keys = Vec::with_capacity(self.lookup.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            if let Some(key) = self.slots[slot].key {
                keys.push(key);
            }
            cursor = self.slots[slot].next;
        }
        keys
    }

    fn entry(&self, slot: usize) -> CachedGlyph {
        let entry = &self.slots[slot];
        CachedGlyph {
            slot,
            bounds: entry.bounds,
            tex_size: entry.tex_size,
        }
    }

    fn touch(&mut self, slot: usize) {
        if self.tail == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.push_back(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.slots[slot].prev, self.slots[slot].next);
        match prev {
            Some(prev) => self.slots[prev].next = next,
            None if self.head == Some(slot) => self.head = next,
            None => {}
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None if self.tail == Some(slot) => self.tail = prev,
            None => {}
        }
        self.slots[slot].prev = None;
        self.slots[slot].next = None;
    }

    fn push_back(&mut self, slot: usize) {
        self.slots[slot].prev = self.tail;
        self.slots[slot].next = None;
        match self.tail {
            Some(tail) => self.slots[tail].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }

    fn push_front(&mut self, slot: usize) {
        self.slots[slot].next = self.head;
        self.slots[slot].prev = None;
        match self.head {
            Some(head) => self.slots[head].prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }
}
