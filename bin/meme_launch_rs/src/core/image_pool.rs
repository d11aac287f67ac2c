use std::{
    collections::HashSet,
    io,
    path::{Path, PathBuf},
};

use meme_launch_utils::constants::SUPPORTED_IMAGE_EXTENSIONS;
use rand::{seq::SliceRandom, Rng};

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| {
            let extension = extension.to_ascii_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&extension.as_str())
        })
        .unwrap_or(false)
}

/// Images handed out without repetition until every one has been used.
#[derive(Debug, Clone, Default)]
pub struct ImagePool {
    images: Vec<PathBuf>,
    used: HashSet<PathBuf>,
}

impl ImagePool {
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        let mut images: Vec<PathBuf> = paths
            .into_iter()
            .filter(|path| is_supported_image(path))
            .collect();
        images.sort();
        images.dedup();
        Self {
            images,
            used: HashSet::new(),
        }
    }

    pub fn from_dir(dir: &Path) -> io::Result<Self> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        let pool = Self::from_paths(paths);
        if pool.is_empty() {
            log::warn!(
                "[ImagePool] no images in {:?}, supported: {:?}",
                dir,
                SUPPORTED_IMAGE_EXTENSIONS
            );
        } else {
            log::info!("[ImagePool] loaded {} images from {:?}", pool.len(), dir);
        }
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn next_image<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<PathBuf> {
        if self.images.is_empty() {
            return None;
        }
        if self.used.len() >= self.images.len() {
            log::info!("[ImagePool] every image used once, starting over");
            self.used.clear();
        }

        let unused: Vec<&PathBuf> = self
            .images
            .iter()
            .filter(|image| !self.used.contains(*image))
            .collect();
        let selected = (*unused.choose(rng)?).clone();
        self.used.insert(selected.clone());
        Some(selected)
    }
}
