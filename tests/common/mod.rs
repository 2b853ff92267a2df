// Test utility module for dataset-health integration tests
#![allow(dead_code)]

use dataset_health::config::{HealthConfig, ParallelConfig};
use image::{GrayImage, Luma, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A dataset laid out in a temporary directory.
pub struct DatasetFixture {
    dir: TempDir,
}

impl DatasetFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).expect("Failed to create directory");
        path
    }

    pub fn bytes(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn text(&self, relative: &str, content: &str) -> PathBuf {
        self.bytes(relative, content.as_bytes())
    }

    /// A mid-gray gradient image that passes every quality rule. `seed`
    /// shifts the pattern so distinct seeds give distinct file contents.
    pub fn image(&self, relative: &str, seed: u8) -> PathBuf {
        let img = RgbImage::from_fn(32, 32, |x, y| {
            let v = (64 + ((x * 3 + y * 5 + u32::from(seed)) % 128)) as u8;
            image::Rgb([v, v.wrapping_add(seed), v])
        });
        let path = self.prepare(relative);
        img.save(&path).expect("Failed to save image");
        path
    }

    /// A uniform grayscale image of the given intensity.
    pub fn flat_image(&self, relative: &str, intensity: u8) -> PathBuf {
        let img = GrayImage::from_pixel(16, 16, Luma([intensity]));
        let path = self.prepare(relative);
        img.save(&path).expect("Failed to save image");
        path
    }

    /// `count` distinct, readable text samples in `class_dir`.
    pub fn class_with_samples(&self, class_dir: &str, count: usize) {
        for i in 0..count {
            self.text(&format!("{class_dir}/{i}.txt"), &format!("sample {class_dir} {i}"));
        }
    }

    fn prepare(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        path
    }
}

/// Small, deterministic config for tests.
pub fn test_config() -> HealthConfig {
    let mut config = HealthConfig {
        parallel: ParallelConfig {
            io_workers: 2,
            cpu_workers: Some(2),
        },
        ..Default::default()
    };
    config.tree.sort_entries = true;
    config
}
