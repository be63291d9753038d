//! Persistence of the best genotype.
//!
//! A genotype is stored as two blobs under well-known keys, one per layer:
//!
//! | Key | Contents | Shape |
//! |---|---|---|
//! | [`BEST_GENOTYPE_A`] | `W_in_hidden`, `b_hidden` | `NEURONS × 3`, `NEURONS` |
//! | [`BEST_GENOTYPE_B`] | `W_hidden_out`, `b_out` | `3 × NEURONS`, `3` |
//!
//! Each save overwrites both blobs unconditionally. When a generation number is given,
//! a small [`GenerationMarker`] is archived under `gen_no_{generation}` as well. All blobs
//! of one save go to the backend as a single batch, so a failed save leaves the previous
//! genome in place instead of pairing a new layer with an old one.
//!
//! Loading validates every shape against the configured hidden width and fails with
//! [`GenomeStoreError::ShapeMismatch`] rather than reshaping. A missing blob is
//! [`GenomeStoreError::NotFound`], which callers usually answer by falling back to a
//! random genotype.
//!
//! Where blobs live is decided by a [`GenomeBackend`]: [`DirectoryBackend`] writes
//! pretty-printed JSON files, [`MemoryBackend`] keeps them in a map.

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::genotype::{Genotype, INPUTS, Layer, OUTPUTS};

/// Key of the input → hidden layer blob.
pub const BEST_GENOTYPE_A: &str = "top_gen_a";

/// Key of the hidden → output layer blob.
pub const BEST_GENOTYPE_B: &str = "top_gen_b";

const GENERATION_MARKER_PREFIX: &str = "gen_no_";

/// Key of the archival marker for `generation`.
#[must_use]
pub fn generation_marker_key(generation: u64) -> String {
    format!("{GENERATION_MARKER_PREFIX}{generation}")
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum GenomeStoreError {
    #[display("no saved genome under '{key}'")]
    NotFound { key: String },
    #[display("genome '{key}' has {part} of shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        key: String,
        part: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[display("genome '{key}' could not be encoded or decoded")]
    Malformed {
        key: String,
        source: serde_json::Error,
    },
    #[display("failed to access genome '{key}'")]
    Io { key: String, source: io::Error },
}

/// Raw blob storage addressed by key.
pub trait GenomeBackend: fmt::Debug {
    /// Reads a blob, `Ok(None)` if nothing was stored under `key`.
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Writes every blob of `blobs`, replacing previous ones.
    ///
    /// On error no blob may have been replaced.
    fn write_batch(&mut self, blobs: &[(&str, &[u8])]) -> io::Result<()>;

    /// Writes a single blob, replacing any previous one.
    fn write(&mut self, key: &str, bytes: &[u8]) -> io::Result<()> {
        self.write_batch(&[(key, bytes)])
    }
}

/// In-memory backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryBackend {
    /// Keys currently stored, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.blobs.keys().map(String::as_str)
    }
}

impl GenomeBackend for MemoryBackend {
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write_batch(&mut self, blobs: &[(&str, &[u8])]) -> io::Result<()> {
        for (key, bytes) in blobs {
            self.blobs.insert((*key).to_owned(), bytes.to_vec());
        }
        Ok(())
    }
}

/// Stores each blob as `<root>/<key>.json`; generation markers go to
/// `<root>/generation_logs/<key>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    root: PathBuf,
}

impl DirectoryBackend {
    pub fn new<P>(root: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File a key is stored in.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name = format!("{key}.json");
        if key.starts_with(GENERATION_MARKER_PREFIX) {
            self.root.join("generation_logs").join(file_name)
        } else {
            self.root.join(file_name)
        }
    }
}

impl GenomeBackend for DirectoryBackend {
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Stages every blob in a `.tmp` file next to its target, then renames them into place.
    ///
    /// Staged files are removed if any of them cannot be written.
    fn write_batch(&mut self, blobs: &[(&str, &[u8])]) -> io::Result<()> {
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(blobs.len());
        for (key, bytes) in blobs {
            let path = self.path_for(key);
            let staging = path.with_extension("json.tmp");
            let result = path
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|()| fs::write(&staging, bytes));
            if let Err(e) = result {
                let _ = fs::remove_file(&staging);
                for (file, _) in &staged {
                    let _ = fs::remove_file(file);
                }
                return Err(e);
            }
            staged.push((staging, path));
        }
        for (staging, path) in staged {
            fs::rename(staging, path)?;
        }
        Ok(())
    }
}

/// Archived alongside the best genome when it was saved for a known generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMarker {
    pub generation: u64,
    pub saved_at: DateTime<Utc>,
}

/// Saves and loads the best genotype through a [`GenomeBackend`].
///
/// # Example
///
/// ```
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg32;
/// use spaceai_pilot::{
///     genome_store::{GenomeStore, MemoryBackend},
///     genotype::Genotype,
/// };
///
/// let genotype = Genotype::random(&mut Pcg32::seed_from_u64(0), 8);
/// let mut store = GenomeStore::new(MemoryBackend::default());
/// store.save(&genotype, Some(12)).unwrap();
///
/// assert_eq!(store.load(8).unwrap(), genotype);
/// assert!(store.load(16).unwrap_err().is_shape_mismatch());
/// ```
#[derive(Debug, Clone)]
pub struct GenomeStore<B> {
    backend: B,
}

impl<B> GenomeStore<B>
where
    B: GenomeBackend,
{
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Overwrites the best genotype, archiving a marker for `generation` if given.
    pub fn save(
        &mut self,
        genotype: &Genotype,
        generation: Option<u64>,
    ) -> Result<(), GenomeStoreError> {
        let mut blobs = vec![
            (
                BEST_GENOTYPE_A.to_owned(),
                encode(BEST_GENOTYPE_A, genotype.hidden())?,
            ),
            (
                BEST_GENOTYPE_B.to_owned(),
                encode(BEST_GENOTYPE_B, genotype.output())?,
            ),
        ];
        if let Some(generation) = generation {
            let key = generation_marker_key(generation);
            let marker = GenerationMarker {
                generation,
                saved_at: Utc::now(),
            };
            let bytes = encode(&key, &marker)?;
            blobs.push((key, bytes));
        }
        let batch = blobs
            .iter()
            .map(|(key, bytes)| (key.as_str(), bytes.as_slice()))
            .collect::<Vec<_>>();
        self.backend
            .write_batch(&batch)
            .map_err(|source| GenomeStoreError::Io {
                key: blobs
                    .iter()
                    .map(|(key, _)| key.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                source,
            })?;
        tracing::info!(
            ?generation,
            neurons = genotype.neurons(),
            "saved best genome"
        );
        Ok(())
    }

    /// Reads back the best genotype, checking it has `neurons` hidden units.
    pub fn load(&self, neurons: usize) -> Result<Genotype, GenomeStoreError> {
        let hidden: Layer = self.read_json(BEST_GENOTYPE_A)?;
        check_layer(BEST_GENOTYPE_A, &hidden, INPUTS, neurons)?;
        let output: Layer = self.read_json(BEST_GENOTYPE_B)?;
        check_layer(BEST_GENOTYPE_B, &output, neurons, OUTPUTS)?;
        tracing::debug!(neurons, "loaded best genome");
        Ok(Genotype::from_layers(hidden, output))
    }

    /// Reads the archival marker of `generation`.
    pub fn load_generation_marker(
        &self,
        generation: u64,
    ) -> Result<GenerationMarker, GenomeStoreError> {
        self.read_json(&generation_marker_key(generation))
    }

    fn read_json<T>(&self, key: &str) -> Result<T, GenomeStoreError>
    where
        T: DeserializeOwned,
    {
        let bytes = self
            .backend
            .read(key)
            .map_err(|source| GenomeStoreError::Io {
                key: key.to_owned(),
                source,
            })?
            .ok_or_else(|| GenomeStoreError::NotFound {
                key: key.to_owned(),
            })?;
        serde_json::from_slice(&bytes).map_err(|source| GenomeStoreError::Malformed {
            key: key.to_owned(),
            source,
        })
    }
}

fn encode<T>(key: &str, value: &T) -> Result<Vec<u8>, GenomeStoreError>
where
    T: Serialize,
{
    serde_json::to_vec_pretty(value).map_err(|source| GenomeStoreError::Malformed {
        key: key.to_owned(),
        source,
    })
}

fn check_layer(
    key: &str,
    layer: &Layer,
    inputs: usize,
    outputs: usize,
) -> Result<(), GenomeStoreError> {
    let mismatch = |part, expected, found| GenomeStoreError::ShapeMismatch {
        key: key.to_owned(),
        part,
        expected,
        found,
    };
    let weights = layer.weights().shape();
    if weights != (outputs, inputs) {
        return Err(mismatch("weights", (outputs, inputs), weights));
    }
    let bias = (layer.bias().len(), 1);
    if bias != (outputs, 1) {
        return Err(mismatch("bias", (outputs, 1), bias));
    }
    Ok(())
}
