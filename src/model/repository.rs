use super::corpus::{
    self, NameList, EMBEDDED_FEMALE_FIRST, EMBEDDED_MALE_FIRST, EMBEDDED_SURNAMES,
    FEMALE_FIRST_FILE, MALE_FIRST_FILE, SURNAMES_FILE,
};
use super::SequenceModel;
use crate::error::{NameForgeError, NfResult};
use crate::template::{NameTemplate, SegmentRole};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, info, warn};

/// Which first-name corpora feed the models. Surnames are always shared.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    #[default]
    Both,
    Male,
    Female,
}

impl Dataset {
    pub fn first_name_files(&self) -> &'static [&'static str] {
        match self {
            Self::Both => &[MALE_FIRST_FILE, FEMALE_FIRST_FILE],
            Self::Male => &[MALE_FIRST_FILE],
            Self::Female => &[FEMALE_FIRST_FILE],
        }
    }

    /// Every corpus file the dataset reads, first names before surnames.
    pub fn corpus_files(&self) -> Vec<&'static str> {
        let mut files = self.first_name_files().to_vec();
        files.push(SURNAMES_FILE);
        files
    }
}

/// The three role models trained for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSet {
    pub first: SequenceModel,
    pub surname: SequenceModel,
    pub combined: SequenceModel,
}

impl ModelSet {
    pub fn from_lists(first_names: &NameList, surnames: &NameList) -> Self {
        let first = SequenceModel::train_weighted(first_names.iter());
        let surname = SequenceModel::train_weighted(surnames.iter());
        let combined = SequenceModel::train_weighted(first_names.iter().chain(surnames.iter()));
        Self {
            first,
            surname,
            combined,
        }
    }

    /// Model used for a segment. Single-segment templates always use the
    /// combined model regardless of role.
    pub fn model_for(&self, role: SegmentRole, is_mononym: bool) -> &SequenceModel {
        if is_mononym {
            return &self.combined;
        }
        match role {
            SegmentRole::First => &self.first,
            SegmentRole::Last | SegmentRole::HyphenatedLast => &self.surname,
            SegmentRole::Middle | SegmentRole::Initial => &self.combined,
        }
    }

    /// One model reference per template segment, in segment order.
    pub fn models_for(&self, template: &NameTemplate) -> Vec<&SequenceModel> {
        let mononym = template.is_mononym();
        template
            .segments
            .iter()
            .map(|spec| self.model_for(spec.role, mononym))
            .collect()
    }
}

/// Resolves a dataset to its trained models. Generation never touches
/// storage itself; it only receives the resolved [`ModelSet`].
pub trait ModelRepository: Send + Sync {
    fn resolve(&self, dataset: Dataset) -> NfResult<Arc<ModelSet>>;
}

fn memo_get(memo: &Mutex<HashMap<Dataset, Arc<ModelSet>>>, dataset: Dataset) -> Option<Arc<ModelSet>> {
    memo.lock()
        .unwrap_or_else(|e| e.into_inner())
        .get(&dataset)
        .cloned()
}

fn memo_put(memo: &Mutex<HashMap<Dataset, Arc<ModelSet>>>, dataset: Dataset, set: Arc<ModelSet>) {
    memo.lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(dataset, set);
}

/// Trains from the name lists compiled into the binary.
#[derive(Default)]
pub struct EmbeddedRepository {
    memo: Mutex<HashMap<Dataset, Arc<ModelSet>>>,
}

impl EmbeddedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn embedded(file: &str) -> &'static str {
        match file {
            MALE_FIRST_FILE => EMBEDDED_MALE_FIRST,
            FEMALE_FIRST_FILE => EMBEDDED_FEMALE_FIRST,
            _ => EMBEDDED_SURNAMES,
        }
    }
}

impl ModelRepository for EmbeddedRepository {
    fn resolve(&self, dataset: Dataset) -> NfResult<Arc<ModelSet>> {
        if let Some(set) = memo_get(&self.memo, dataset) {
            return Ok(set);
        }

        let mut first_names = NameList::default();
        for file in dataset.first_name_files() {
            first_names.extend(&corpus::load_names_from_str(Self::embedded(file))?);
        }
        let surnames = corpus::load_names_from_str(EMBEDDED_SURNAMES)?;

        info!(
            "Trained embedded '{}' models: {} first names, {} surnames",
            dataset,
            first_names.len(),
            surnames.len()
        );

        let set = Arc::new(ModelSet::from_lists(&first_names, &surnames));
        memo_put(&self.memo, dataset, set.clone());
        Ok(set)
    }
}

#[derive(Serialize, Deserialize)]
struct CachedModels {
    fingerprint: String,
    models: ModelSet,
}

/// Trains from corpus files in a directory, optionally caching the trained
/// models as JSON keyed by dataset and corpus fingerprint.
pub struct DirectoryRepository {
    corpus_dir: PathBuf,
    cache_dir: Option<PathBuf>,
    no_cache: bool,
    memo: Mutex<HashMap<Dataset, Arc<ModelSet>>>,
}

impl DirectoryRepository {
    pub fn new<P: AsRef<Path>>(corpus_dir: P) -> Self {
        Self {
            corpus_dir: corpus_dir.as_ref().to_path_buf(),
            cache_dir: None,
            no_cache: false,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_cache_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cache_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Ignore any existing cache and retrain. A fresh cache is still written.
    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn cache_path(&self, dataset: Dataset) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|d| d.join(format!("{}_models.json", dataset)))
    }

    fn corpus_paths(&self, dataset: Dataset) -> NfResult<Vec<PathBuf>> {
        let paths: Vec<PathBuf> = dataset
            .corpus_files()
            .iter()
            .map(|f| self.corpus_dir.join(f))
            .collect();

        let missing: Vec<String> = paths
            .iter()
            .filter(|p| !p.exists())
            .map(|p| p.display().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(NameForgeError::Validation(format!(
                "Training data files not found: {}",
                missing.join(", ")
            )));
        }
        Ok(paths)
    }

    fn load_cache(&self, path: &Path, fingerprint: &str) -> Option<ModelSet> {
        let content = fs::read_to_string(path).ok()?;
        match serde_json::from_str::<CachedModels>(&content) {
            Ok(cached) if cached.fingerprint == fingerprint => Some(cached.models),
            Ok(_) => {
                debug!("Cache {} is stale", path.display());
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable model cache {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write_cache(&self, path: &Path, fingerprint: &str, models: &ModelSet) -> NfResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let cached = CachedModels {
            fingerprint: fingerprint.to_string(),
            models: models.clone(),
        };
        fs::write(path, serde_json::to_string(&cached)?)?;
        Ok(())
    }
}

/// SHA-256 over the name and bytes of each file, in order.
pub fn corpus_fingerprint(paths: &[PathBuf]) -> NfResult<String> {
    let mut hasher = Sha256::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(fs::read(path)?);
    }
    Ok(hex::encode(hasher.finalize()))
}

impl ModelRepository for DirectoryRepository {
    fn resolve(&self, dataset: Dataset) -> NfResult<Arc<ModelSet>> {
        if let Some(set) = memo_get(&self.memo, dataset) {
            return Ok(set);
        }

        let paths = self.corpus_paths(dataset)?;
        let fingerprint = corpus_fingerprint(&paths)?;
        let cache_path = self.cache_path(dataset);

        if !self.no_cache {
            if let Some(models) = cache_path
                .as_deref()
                .and_then(|p| self.load_cache(p, &fingerprint))
            {
                info!("Model cache hit for '{}'", dataset);
                let set = Arc::new(models);
                memo_put(&self.memo, dataset, set.clone());
                return Ok(set);
            }
        }
        debug!("Model cache miss for '{}', training", dataset);

        let mut first_names = NameList::default();
        for file in dataset.first_name_files() {
            first_names.extend(&corpus::load_names_from_file(self.corpus_dir.join(file))?);
        }
        let surnames = corpus::load_names_from_file(self.corpus_dir.join(SURNAMES_FILE))?;

        if first_names.is_empty() || surnames.is_empty() {
            return Err(NameForgeError::Validation(format!(
                "Corpus in {} has no usable names",
                self.corpus_dir.display()
            )));
        }

        info!(
            "Trained '{}' models from {}: {} first names, {} surnames",
            dataset,
            self.corpus_dir.display(),
            first_names.len(),
            surnames.len()
        );
        let models = ModelSet::from_lists(&first_names, &surnames);

        if let Some(path) = cache_path {
            if let Err(e) = self.write_cache(&path, &fingerprint, &models) {
                warn!("Could not write model cache {}: {}", path.display(), e);
            }
        }

        let set = Arc::new(models);
        memo_put(&self.memo, dataset, set.clone());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::str::FromStr;

    fn write_corpus(dir: &Path, surnames: &str) {
        let mut f = File::create(dir.join(MALE_FIRST_FILE)).unwrap();
        writeln!(f, "james\t3\nrobert\nmichael").unwrap();
        let mut f = File::create(dir.join(FEMALE_FIRST_FILE)).unwrap();
        writeln!(f, "mary\nlinda\t2\nsusan").unwrap();
        let mut f = File::create(dir.join(SURNAMES_FILE)).unwrap();
        writeln!(f, "{}", surnames).unwrap();
    }

    #[test]
    fn test_dataset_parse() {
        assert_eq!(Dataset::from_str("female").unwrap(), Dataset::Female);
        assert_eq!(Dataset::Both.to_string(), "both");
        assert_eq!(Dataset::Male.corpus_files(), vec![MALE_FIRST_FILE, SURNAMES_FILE]);
    }

    #[test]
    fn test_role_routing() {
        let set = EmbeddedRepository::new().resolve(Dataset::Both).unwrap();
        assert!(std::ptr::eq(set.model_for(SegmentRole::First, false), &set.first));
        assert!(std::ptr::eq(
            set.model_for(SegmentRole::HyphenatedLast, false),
            &set.surname
        ));
        assert!(std::ptr::eq(set.model_for(SegmentRole::Initial, false), &set.combined));
        assert!(std::ptr::eq(set.model_for(SegmentRole::First, true), &set.combined));
    }

    #[test]
    fn test_embedded_resolve_is_memoized() {
        let repo = EmbeddedRepository::new();
        let a = repo.resolve(Dataset::Male).unwrap();
        let b = repo.resolve(Dataset::Male).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_directory_cache_roundtrip_and_invalidation() {
        let corpus = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_corpus(corpus.path(), "smith\njones");

        let repo = DirectoryRepository::new(corpus.path()).with_cache_dir(cache.path());
        let first = repo.resolve(Dataset::Both).unwrap();
        let cache_file = repo.cache_path(Dataset::Both).unwrap();
        assert!(cache_file.exists());

        let again = DirectoryRepository::new(corpus.path())
            .with_cache_dir(cache.path())
            .resolve(Dataset::Both)
            .unwrap();
        assert_eq!(*first, *again);

        // Changing the corpus must retrain.
        write_corpus(corpus.path(), "smith\njones\nbrown\t5");
        let changed = DirectoryRepository::new(corpus.path())
            .with_cache_dir(cache.path())
            .resolve(Dataset::Both)
            .unwrap();
        assert_ne!(first.surname, changed.surname);
    }

    #[test]
    fn test_missing_corpus_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirectoryRepository::new(dir.path())
            .resolve(Dataset::Female)
            .unwrap_err();
        assert!(matches!(err, NameForgeError::Validation(_)));
    }
}
