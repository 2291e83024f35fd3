use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use tracing::debug;

pub use drm::Device;
pub use drm::control::Device as ControlDevice;

#[derive(Debug)]
/// A simple wrapper for a device node.
pub struct Card(std::fs::File);

/// Implementing `AsFd` is a prerequisite to implementing the traits found
/// in `drm`.
impl std::os::unix::io::AsFd for Card {
    fn as_fd(&self) -> std::os::unix::io::BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl Device for Card {}
impl ControlDevice for Card {}

impl Card {
    pub fn open(path: &Path) -> io::Result<Self> {
        let mut options = std::fs::OpenOptions::new();
        options.read(true);
        options.write(true);
        Ok(Card(options.open(path)?))
    }

    /// Opens the first node in `paths` that does modesetting.
    ///
    /// Render-only nodes open fine but have no KMS resources; those are
    /// skipped like nodes that fail to open.
    pub fn open_first(paths: &[PathBuf]) -> anyhow::Result<(Self, PathBuf)> {
        for path in paths {
            let card = match Card::open(path) {
                Ok(card) => card,
                Err(e) => {
                    debug!(path = %path.display(), "skip drm node: {e}");
                    continue;
                }
            };
            match card.resource_handles() {
                Ok(_) => return Ok((card, path.clone())),
                Err(e) => debug!(path = %path.display(), "skip drm node without kms: {e}"),
            }
        }
        Err(anyhow!("no usable drm device among {paths:?}"))
    }
}
