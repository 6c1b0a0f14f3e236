use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rand::Rng;
use tracing::info;

/// Configuration for the train/test partition
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Seed for the partition's random generator
    pub seed: u64,
    /// Each file draws a bucket in `0..buckets`
    pub buckets: u32,
    /// Files drawing a bucket below this go to the test set
    pub test_buckets: u32,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            seed: 72019,
            buckets: 10,
            test_buckets: 1,
        }
    }
}

/// Disjoint training and testing file lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<PathBuf>,
    pub test: Vec<PathBuf>,
}

/// Randomly assign each file to the training or testing set
pub fn partition<R: Rng + ?Sized>(files: &[PathBuf], config: &SplitConfig, rng: &mut R) -> Result<Split> {
    if config.buckets == 0 || config.test_buckets > config.buckets {
        bail!(
            "Invalid split: {} test buckets out of {}",
            config.test_buckets,
            config.buckets
        );
    }

    let mut split = Split::default();
    for file in files {
        if rng.gen_range(0..config.buckets) < config.test_buckets {
            split.test.push(file.clone());
        } else {
            split.train.push(file.clone());
        }
    }

    info!(
        "Partitioned {} files: {} train, {} test",
        files.len(),
        split.train.len(),
        split.test.len()
    );
    Ok(split)
}

/// Copy a split into training and testing directories.
///
/// An existing split is left untouched; returns whether files were copied.
pub fn copy_split(split: &Split, train_dir: &Path, test_dir: &Path) -> Result<bool> {
    if train_dir.exists() || test_dir.exists() {
        info!(
            "Split directories {:?} / {:?} already exist, keeping them",
            train_dir, test_dir
        );
        return Ok(false);
    }

    for (files, dir) in [(&split.train, train_dir), (&split.test, test_dir)] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {:?}", dir))?;
        for file in files {
            let name = file
                .file_name()
                .with_context(|| format!("Not a file path: {:?}", file))?;
            std::fs::copy(file, dir.join(name))
                .with_context(|| format!("Failed to copy {:?} into {:?}", file, dir))?;
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn files(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("sw_{:04}.utt", i))).collect()
    }

    #[test]
    fn test_partition_is_reproducible() {
        let files = files(200);
        let config = SplitConfig::default();

        let first = partition(&files, &config, &mut StdRng::seed_from_u64(config.seed)).unwrap();
        let second = partition(&files, &config, &mut StdRng::seed_from_u64(config.seed)).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.train.len() + first.test.len(), 200);
        assert!(first.test.iter().all(|f| !first.train.contains(f)));
        // Roughly one in ten goes to test
        assert!(first.test.len() > 5 && first.test.len() < 50);
    }

    #[test]
    fn test_partition_extremes() {
        let files = files(20);
        let mut rng = StdRng::seed_from_u64(1);

        let all_test = SplitConfig { seed: 1, buckets: 4, test_buckets: 4 };
        let split = partition(&files, &all_test, &mut rng).unwrap();
        assert_eq!(split.test.len(), 20);

        let no_test = SplitConfig { seed: 1, buckets: 4, test_buckets: 0 };
        let split = partition(&files, &no_test, &mut rng).unwrap();
        assert_eq!(split.train, files);

        let invalid = SplitConfig { seed: 1, buckets: 2, test_buckets: 3 };
        assert!(partition(&files, &invalid, &mut rng).is_err());
    }

    #[test]
    fn test_copy_split() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("swbd");
        std::fs::create_dir_all(&source).unwrap();
        let a = source.join("a.utt");
        let b = source.join("b.utt");
        std::fs::write(&a, "sd A.1 utt1: a /").unwrap();
        std::fs::write(&b, "sd A.1 utt1: b /").unwrap();
        let split = Split { train: vec![a], test: vec![b] };

        let train_dir = dir.path().join("train");
        let test_dir = dir.path().join("test");
        assert!(copy_split(&split, &train_dir, &test_dir).unwrap());
        assert!(train_dir.join("a.utt").exists());
        assert!(test_dir.join("b.utt").exists());

        // Second run keeps the existing split
        assert!(!copy_split(&Split::default(), &train_dir, &test_dir).unwrap());
        assert!(train_dir.join("a.utt").exists());
    }
}
