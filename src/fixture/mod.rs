//! Benchmark fixture
//!
//! Owns the corpus, lookup tables, probe and codecs for one measurement
//! thread. Constructing a `Fixture` is the setup phase; every measured
//! operation afterwards is a read-only query over that data.

mod operation;

pub use operation::{Category, Operation, Representation};

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info};

use crate::codec::{Codec, CompactCodec, GenericCodec};
use crate::config::CorpusConfig;
use crate::error::Result;
use crate::sink::{Blackhole, ResultSink};
use crate::types::{Corpus, LookupTables, Probe};

pub struct Fixture<S: ResultSink = Blackhole> {
    corpus: Corpus,
    tables: LookupTables,
    probe: Probe,
    generic: GenericCodec,
    compact: Arc<CompactCodec>,
    sink: S,
}

fn rng_for(config: &CorpusConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl<S: ResultSink> Fixture<S> {
    /// Generate test data and attach the shared compact codec.
    ///
    /// Errors here are fatal for the measurement session.
    pub fn setup(config: &CorpusConfig, sink: S) -> Result<Self> {
        let compact = CompactCodec::shared()?;
        let mut rng = rng_for(config);
        let corpus = Corpus::generate(config.size, &mut rng)?;
        let probe = Probe::generate(&mut rng);

        info!(
            "Fixture ready | corpus: {} | seed: {:?}",
            corpus.len(),
            config.seed
        );

        Ok(Self::with_data(corpus, probe, compact, sink))
    }

    /// Build from explicit data, bypassing random generation
    pub fn with_data(corpus: Corpus, probe: Probe, compact: Arc<CompactCodec>, sink: S) -> Self {
        let tables = LookupTables::from_corpus(&corpus);
        Self {
            corpus,
            tables,
            probe,
            generic: GenericCodec::new(),
            compact,
            sink,
        }
    }

    /// Run setup again on this instance, replacing all test data
    pub fn regenerate(&mut self, config: &CorpusConfig) -> Result<()> {
        let mut rng = rng_for(config);
        let corpus = Corpus::generate(config.size, &mut rng)?;
        self.probe = Probe::generate(&mut rng);
        self.tables = LookupTables::from_corpus(&corpus);
        self.corpus = corpus;
        debug!("Fixture regenerated | corpus: {}", self.corpus.len());
        Ok(())
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    /// Replace the lookup tables before measurement starts
    pub fn with_tables(self, tables: LookupTables) -> Self {
        Self { tables, ..self }
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn compact_codec(&self) -> &CompactCodec {
        &self.compact
    }

    /// Invoke one operation by catalogue entry
    pub fn run(&self, op: Operation) -> Result<()> {
        match op {
            Operation::BinaryEqualitySweep => self.binary_equality_sweep(),
            Operation::TextEqualitySweep => self.text_equality_sweep(),
            Operation::BinaryLookupProbe => self.binary_lookup_probe(),
            Operation::TextLookupProbe => self.text_lookup_probe(),
            Operation::BinaryGenericRoundtrip => self.binary_generic_roundtrip()?,
            Operation::TextGenericRoundtrip => self.text_generic_roundtrip()?,
            Operation::BinaryCompactRoundtrip => self.binary_compact_roundtrip()?,
            Operation::TextCompactRoundtrip => self.text_compact_roundtrip()?,
        }
        Ok(())
    }

    /// N-1 adjacent comparisons over the binary corpus
    #[inline]
    pub fn binary_equality_sweep(&self) {
        for pair in self.corpus.ids().windows(2) {
            self.sink.consume(pair[0] == pair[1]);
        }
    }

    /// N-1 adjacent comparisons over the textual corpus
    #[inline]
    pub fn text_equality_sweep(&self) {
        for pair in self.corpus.texts().windows(2) {
            self.sink.consume(pair[0] == pair[1]);
        }
    }

    #[inline]
    pub fn binary_lookup_probe(&self) {
        self.sink.consume(self.tables.contains_id(&self.probe.id));
    }

    #[inline]
    pub fn text_lookup_probe(&self) {
        self.sink.consume(self.tables.contains_text(&self.probe.text));
    }

    pub fn binary_generic_roundtrip(&self) -> Result<()> {
        let same = self.generic.round_trip(&self.probe.id)?;
        self.sink.consume(same);
        Ok(())
    }

    pub fn text_generic_roundtrip(&self) -> Result<()> {
        let same = self.generic.round_trip(&self.probe.text)?;
        self.sink.consume(same);
        Ok(())
    }

    pub fn binary_compact_roundtrip(&self) -> Result<()> {
        let same = self.compact.round_trip(&self.probe.id)?;
        self.sink.consume(same);
        Ok(())
    }

    pub fn text_compact_roundtrip(&self) -> Result<()> {
        let same = self.compact.round_trip(&self.probe.text)?;
        self.sink.consume(same);
        Ok(())
    }
}
