// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Media Registry (spec.md §4.11, §5): a content-hash-keyed table of
//! package parts shared by the image mapper, the EMF writer, and the
//! Font Service. Insertion deduplicates by content hash; relationship
//! ids are assigned once, at first insertion, and are stable afterward.

use std::collections::HashMap;
use std::hash::Hasher;

use siphasher::sip::SipHasher13;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentHash(u64);

pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    let mut hasher = SipHasher13::new();
    hasher.write(bytes);
    ContentHash(hasher.finish())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Emf,
    Font,
}

impl MediaKind {
    fn dir(self) -> &'static str {
        match self {
            MediaKind::Image => "media",
            MediaKind::Emf => "embeddings",
            MediaKind::Font => "fonts",
        }
    }

    fn extension(self, content_type: &str) -> &'static str {
        match self {
            MediaKind::Image => match content_type {
                "image/png" => "png",
                "image/jpeg" => "jpeg",
                "image/gif" => "gif",
                "image/svg+xml" => "svg",
                _ => "bin",
            },
            MediaKind::Emf => "emf",
            MediaKind::Font => "fntdata",
        }
    }
}

/// One registered package part: its ZIP path, relationship id and
/// content type, ready for the Package Writer and for `.rels` emission.
#[derive(Clone, Debug)]
pub struct MediaPart {
    pub part_path: String,
    pub relationship_id: String,
    pub content_type: String,
    pub bytes: std::rc::Rc<[u8]>,
}

#[derive(Default)]
pub struct MediaRegistry {
    by_hash: HashMap<ContentHash, usize>,
    parts: Vec<MediaPart>,
    next_index: HashMap<&'static str, u32>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        MediaRegistry::default()
    }

    /// Registers `bytes` under `kind`, returning the already-assigned
    /// part on a content-hash hit.
    pub fn register(&mut self, kind: MediaKind, content_type: &str, bytes: std::rc::Rc<[u8]>) -> MediaPart {
        let hash = hash_bytes(&bytes);
        if let Some(&idx) = self.by_hash.get(&hash) {
            return self.parts[idx].clone();
        }

        let dir = kind.dir();
        let counter = self.next_index.entry(dir).or_insert(1);
        let index = *counter;
        *counter += 1;
        let ext = kind.extension(content_type);
        let part_path = format!("ppt/{dir}/{}{}.{ext}", singular(dir), index);
        let relationship_id = format!("rId{}", 1000 + self.parts.len() as u32);

        let part = MediaPart { part_path, relationship_id, content_type: content_type.to_string(), bytes };
        self.by_hash.insert(hash, self.parts.len());
        self.parts.push(part.clone());
        part
    }

    pub fn parts(&self) -> &[MediaPart] {
        &self.parts
    }
}

fn singular(dir: &str) -> &'static str {
    match dir {
        "media" => "image",
        "embeddings" => "emf",
        "fonts" => "font",
        _ => "part",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_dedupe() {
        let mut registry = MediaRegistry::new();
        let bytes: std::rc::Rc<[u8]> = vec![1, 2, 3].into();
        let a = registry.register(MediaKind::Image, "image/png", bytes.clone());
        let b = registry.register(MediaKind::Image, "image/png", bytes);
        assert_eq!(a.relationship_id, b.relationship_id);
        assert_eq!(registry.parts().len(), 1);
    }

    #[test]
    fn distinct_bytes_get_distinct_parts() {
        let mut registry = MediaRegistry::new();
        let a = registry.register(MediaKind::Image, "image/png", vec![1].into());
        let b = registry.register(MediaKind::Image, "image/png", vec![2].into());
        assert_ne!(a.relationship_id, b.relationship_id);
        assert_eq!(registry.parts().len(), 2);
    }
}
