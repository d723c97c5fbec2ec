//! Bounded concurrent augmentation of many annotated files held in object storage.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::conllu;
use crate::rules::Augmentor;

/// Default bound on the number of files in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 40;

/// I/O failure reported by a [Storage] backend.
#[derive(Debug, Error)]
#[error("storage: {0}")]
pub struct StorageError(pub String);

/// Object storage the batch reads input files from and writes augmented files to.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError>;
    async fn store(&self, key: &str, content: Vec<u8>) -> Result<(), StorageError>;
}

/// Failure of a single file's fetch/parse/mutate/upload sequence.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("file is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error(transparent)]
    Parse(#[from] crate::Error),
}

impl FileError {
    fn kind(&self) -> &'static str {
        match self {
            FileError::Storage(_) => "storage",
            FileError::Encoding(_) => "encoding",
            FileError::Parse(_) => "parse",
        }
    }
}

/// A key whose augmented copy was uploaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Augmented {
    pub original_key: String,
    pub augmented_key: String,
}

/// A key whose processing failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failed {
    pub original_key: String,
    pub error: String,
    pub error_type: String,
}

/// A key processed cleanly but yielding no augmented sentences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    pub original_key: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub no_augmentations: usize,
}

/// Outcome of a batch run. Every input key appears in exactly one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub successful: Vec<Augmented>,
    pub failed: Vec<Failed>,
    pub no_augmentations: Vec<Skipped>,
    pub summary: Summary,
}

/// The storage key for the augmented copy of `key`: an `aug_` prefix on the final
/// path segment, directory prefix preserved.
pub fn augmented_key(key: &str) -> String {
    match key.rsplit_once('/') {
        Some((path, filename)) => format!("{}/aug_{}", path, filename),
        None => format!("aug_{}", key),
    }
}

async fn augment_file(
    augmentor: &Augmentor,
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<String>, FileError> {
    info!("processing {}", key);

    let raw = storage.fetch(key).await?;
    let text = String::from_utf8(raw)?;
    let sentences = conllu::parse(&text)?;

    let mut rng = StdRng::from_entropy();
    let mut augmented = String::new();
    for sentence in &sentences {
        if let Some(sentence) = augmentor.augment(sentence, &mut rng) {
            augmented.push_str(&conllu::serialize(&sentence));
        }
    }

    if augmented.is_empty() {
        info!("no augmentations generated for {}", key);
        return Ok(None);
    }

    let augmented_key = augmented_key(key);
    storage.store(&augmented_key, augmented.into_bytes()).await?;
    info!("uploaded {}", augmented_key);

    Ok(Some(augmented_key))
}

/// Augments every file named in `keys`, at most `max_in_flight` at a time.
///
/// Each file's failure is contained to its own report entry; sibling tasks always
/// run to completion and the report enumerates every key exactly once.
pub async fn run(
    augmentor: Arc<Augmentor>,
    storage: Arc<dyn Storage>,
    keys: Vec<String>,
    max_in_flight: usize,
) -> BatchReport {
    let semaphore = Arc::new(Semaphore::new(max_in_flight));

    let tasks: Vec<_> = keys
        .iter()
        .map(|key| {
            let augmentor = Arc::clone(&augmentor);
            let storage = Arc::clone(&storage);
            let semaphore = Arc::clone(&semaphore);
            let key = key.clone();

            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed");
                augment_file(&augmentor, storage.as_ref(), &key).await
            })
        })
        .collect();

    let results = join_all(tasks).await;

    let mut successful = Vec::new();
    let mut failed = Vec::new();
    let mut no_augmentations = Vec::new();

    for (original_key, result) in keys.into_iter().zip(results) {
        match result {
            Ok(Ok(Some(augmented_key))) => successful.push(Augmented {
                original_key,
                augmented_key,
            }),
            Ok(Ok(None)) => no_augmentations.push(Skipped {
                original_key,
                error: "no sentences matched any augmentation rules".to_string(),
            }),
            Ok(Err(error)) => {
                warn!("error processing {}: {}", original_key, error);
                failed.push(Failed {
                    original_key,
                    error: error.to_string(),
                    error_type: error.kind().to_string(),
                });
            }
            Err(error) => {
                warn!("task for {} aborted: {}", original_key, error);
                failed.push(Failed {
                    original_key,
                    error: error.to_string(),
                    error_type: "abort".to_string(),
                });
            }
        }
    }

    let summary = Summary {
        total: successful.len() + failed.len() + no_augmentations.len(),
        successful: successful.len(),
        failed: failed.len(),
        no_augmentations: no_augmentations.len(),
    };

    BatchReport {
        successful,
        failed,
        no_augmentations,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflect::{Inflecter, Morph};
    use crate::rule::{ExactRule, Rule};
    use crate::rules::Rules;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct NoMorph;

    impl Morph for NoMorph {
        fn lemma_of(&self, form: &str) -> String {
            form.to_lowercase()
        }

        fn inflect(&self, _lemma: &str, _tag: &str) -> Option<String> {
            None
        }
    }

    /// In-memory [Storage] whose fetches fail for keys it does not hold.
    struct MemoryStorage {
        files: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryStorage {
        fn new(files: Vec<(&str, &str)>) -> Self {
            MemoryStorage {
                files: Mutex::new(
                    files
                        .into_iter()
                        .map(|(key, content)| (key.to_string(), content.as_bytes().to_vec()))
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl Storage for MemoryStorage {
        async fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError> {
            self.files
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| StorageError(format!("no such key {:?}", key)))
        }

        async fn store(&self, key: &str, content: Vec<u8>) -> Result<(), StorageError> {
            self.files.lock().unwrap().insert(key.to_string(), content);
            Ok(())
        }
    }

    fn augmentor() -> Arc<Augmentor> {
        let rules: Rules = vec![Rule::Exact(ExactRule {
            source: "dog".to_string(),
            target: "dogs".to_string(),
            pos: "NOUN".to_string(),
            tag: "NNS".to_string(),
            feats: None,
            probability: 1.0,
        })]
        .into();
        let inflecter = Inflecter::new(Box::new(NoMorph), HashMap::new(), HashMap::new());

        Arc::new(Augmentor::new(rules, inflecter).unwrap())
    }

    const MATCHING: &str = "# sent_id = 0\n1\tdog\tdog\tNOUN\tNN\t_\t0\troot\n\n";
    const UNMATCHED: &str = "# sent_id = 0\n1\tcat\tcat\tNOUN\tNN\t_\t0\troot\n\n";

    #[test]
    fn augmented_key_prefixes_the_final_segment() {
        assert_eq!(augmented_key("corpus/part0.conllu"), "corpus/aug_part0.conllu");
        assert_eq!(
            augmented_key("data/en/part1.conllu"),
            "data/en/aug_part1.conllu"
        );
        assert_eq!(augmented_key("part2.conllu"), "aug_part2.conllu");
    }

    #[tokio::test]
    async fn buckets_cover_every_key_exactly_once() {
        let storage = Arc::new(MemoryStorage::new(vec![
            ("a.conllu", MATCHING),
            ("b.conllu", UNMATCHED),
        ]));

        let report = run(
            augmentor(),
            storage,
            vec![
                "a.conllu".to_string(),
                "b.conllu".to_string(),
                "c.conllu".to_string(),
            ],
            DEFAULT_MAX_IN_FLIGHT,
        )
        .await;

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.successful, 1);
        assert_eq!(report.summary.no_augmentations, 1);
        assert_eq!(report.summary.failed, 1);

        assert_eq!(report.successful[0].original_key, "a.conllu");
        assert_eq!(report.successful[0].augmented_key, "aug_a.conllu");
        assert_eq!(report.no_augmentations[0].original_key, "b.conllu");
        assert_eq!(report.failed[0].original_key, "c.conllu");
        assert_eq!(report.failed[0].error_type, "storage");
    }

    #[tokio::test]
    async fn augmented_file_is_uploaded_under_the_derived_key() {
        let storage = Arc::new(MemoryStorage::new(vec![("dir/a.conllu", MATCHING)]));

        let report = run(
            augmentor(),
            Arc::clone(&storage) as Arc<dyn Storage>,
            vec!["dir/a.conllu".to_string()],
            DEFAULT_MAX_IN_FLIGHT,
        )
        .await;

        assert_eq!(report.summary.successful, 1);

        let files = storage.files.lock().unwrap();
        let uploaded = String::from_utf8(files.get("dir/aug_a.conllu").unwrap().clone()).unwrap();
        assert!(uploaded.contains("\tdogs\t"));
    }

    #[tokio::test]
    async fn unparseable_file_is_contained_as_a_failure() {
        let storage = Arc::new(MemoryStorage::new(vec![
            ("bad.conllu", "# sent_id = zero\n1\tdog\n\n"),
            ("good.conllu", MATCHING),
        ]));

        let report = run(
            augmentor(),
            storage,
            vec!["bad.conllu".to_string(), "good.conllu".to_string()],
            2,
        )
        .await;

        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.failed[0].error_type, "parse");
        // the sibling file still succeeds
        assert_eq!(report.summary.successful, 1);
    }

    #[tokio::test]
    async fn no_upload_happens_without_augmentations() {
        let storage = Arc::new(MemoryStorage::new(vec![("b.conllu", UNMATCHED)]));

        run(
            augmentor(),
            Arc::clone(&storage) as Arc<dyn Storage>,
            vec!["b.conllu".to_string()],
            1,
        )
        .await;

        assert!(!storage.files.lock().unwrap().contains_key("aug_b.conllu"));
    }

    #[tokio::test]
    async fn report_serializes_with_the_envelope_field_names() {
        let storage = Arc::new(MemoryStorage::new(vec![("a.conllu", MATCHING)]));
        let report = run(augmentor(), storage, vec!["a.conllu".to_string()], 1).await;

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["total"], 1);
        assert_eq!(json["successful"][0]["augmented_key"], "aug_a.conllu");
        assert!(json["no_augmentations"].as_array().unwrap().is_empty());
    }
}
