use std::collections::HashMap;

/// Maps each distinct message to its reference number.
///
/// Keys are compared byte for byte and copied on insert: the caller's string
/// may live in a library that gets unloaded before we do. Reference numbers
/// start at 1 and are handed out densely in order of first sighting.
#[derive(Debug, Default)]
pub struct MessageRegistry {
    refs: HashMap<Box<[u8]>, u32>,
    last: u32,
}

impl MessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the reference for `key`, assigning the next one if unseen.
    /// The flag is `true` when this call did the assigning.
    pub fn lookup_or_insert(&mut self, key: &[u8]) -> (u32, bool) {
        if let Some(&refno) = self.refs.get(key) {
            return (refno, false);
        }
        self.last += 1;
        self.refs.insert(key.into(), self.last);
        (self.last, true)
    }

    pub fn get(&self, key: &[u8]) -> Option<u32> {
        self.refs.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
