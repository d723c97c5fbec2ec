use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Clap;

use augrule::batch::{self, Storage, StorageError};
use augrule::inflect::{DictMorph, Inflecter, Morph};
use augrule::rules::{Augmentor, Rules};

#[derive(Clap)]
#[clap(version = "0.1", about = "Injects grammatical errors into CoNLL-U files.")]
struct Opts {
    /// JSON rule table.
    #[clap(long, short)]
    rules: String,
    /// Morphological dictionary dump, one form<TAB>lemma<TAB>tag entry per line.
    #[clap(long, short)]
    dictionary: Option<String>,
    /// Directory input keys are resolved against.
    #[clap(long, default_value = ".")]
    root: String,
    /// Maximum number of files processed at once.
    #[clap(long, default_value = "40")]
    max_in_flight: usize,
    /// Input files, relative to the root.
    keys: Vec<String>,
}

struct DirStorage {
    root: PathBuf,
}

#[async_trait]
impl Storage for DirStorage {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        tokio::fs::read(self.root.join(key))
            .await
            .map_err(|e| StorageError(format!("{}: {}", key, e)))
    }

    async fn store(&self, key: &str, content: Vec<u8>) -> Result<(), StorageError> {
        tokio::fs::write(self.root.join(key), content)
            .await
            .map_err(|e| StorageError(format!("{}: {}", key, e)))
    }
}

/// Stands in when no dictionary is supplied; only irregular-table rules can inflect.
struct NullMorph;

impl Morph for NullMorph {
    fn lemma_of(&self, form: &str) -> String {
        form.to_lowercase()
    }

    fn inflect(&self, _lemma: &str, _tag: &str) -> Option<String> {
        None
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let opts = Opts::parse();

    let rules = Rules::new(&opts.rules).unwrap();
    let morph: Box<dyn Morph> = match &opts.dictionary {
        Some(path) => Box::new(DictMorph::from_dump(path).unwrap()),
        None => Box::new(NullMorph),
    };
    let augmentor =
        Arc::new(Augmentor::new(rules, Inflecter::with_default_tables(morph)).unwrap());
    let storage = Arc::new(DirStorage {
        root: PathBuf::from(&opts.root),
    });

    let report = batch::run(augmentor, storage, opts.keys, opts.max_in_flight).await;
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}
