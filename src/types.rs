//! Core types: test corpus, probe and lookup tables

use rand::Rng;
use std::collections::HashMap;
use uuid::{Builder, Uuid};

use crate::error::{BenchError, Result};

/// Placeholder stored as the value in lookup tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marker;

/// Draw a random v4 identifier from `rng`
#[inline]
pub fn random_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// Canonical textual form (hyphenated, lowercase)
#[inline]
pub fn render(id: &Uuid) -> String {
    id.hyphenated().to_string()
}

/// Ordered identifiers plus their parallel renderings
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    ids: Vec<Uuid>,
    texts: Vec<String>,
}

impl Corpus {
    pub const MIN_SIZE: usize = 2;

    /// Generate `size` random identifiers
    pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self> {
        Self::from_ids((0..size).map(|_| random_id(&mut *rng)).collect())
    }

    /// Build from explicit identifiers; renderings are derived
    pub fn from_ids(ids: Vec<Uuid>) -> Result<Self> {
        if ids.len() < Self::MIN_SIZE {
            return Err(BenchError::CorpusTooSmall { size: ids.len() });
        }
        let texts = ids.iter().map(render).collect();
        Ok(Self { ids, texts })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false; construction rejects small corpora
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }
}

/// Lookup-miss query in both representations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub id: Uuid,
    pub text: String,
}

impl Probe {
    pub fn from_id(id: Uuid) -> Self {
        Self {
            text: render(&id),
            id,
        }
    }

    /// Independent random draw; absence from the corpus is probabilistic
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_id(random_id(rng))
    }
}

/// Binary-keyed and string-keyed tables over the corpus
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    by_id: HashMap<Uuid, Marker>,
    by_text: HashMap<String, Marker>,
}

impl LookupTables {
    pub fn from_corpus(corpus: &Corpus) -> Self {
        Self {
            by_id: corpus.ids().iter().map(|id| (*id, Marker)).collect(),
            by_text: corpus.texts().iter().map(|t| (t.clone(), Marker)).collect(),
        }
    }

    #[inline]
    pub fn contains_id(&self, id: &Uuid) -> bool {
        self.by_id.contains_key(id)
    }

    #[inline]
    pub fn contains_text(&self, text: &str) -> bool {
        self.by_text.contains_key(text)
    }

    /// Add an identifier in both representations
    pub fn insert(&mut self, id: Uuid) {
        self.by_text.insert(render(&id), Marker);
        self.by_id.insert(id, Marker);
    }

    pub fn id_count(&self) -> usize {
        self.by_id.len()
    }

    pub fn text_count(&self) -> usize {
        self.by_text.len()
    }
}
