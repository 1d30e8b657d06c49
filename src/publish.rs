use crate::config::PathsConfig;
use crate::document::{Artifact, ArtifactKind};
use crate::utils::CopyError;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone)]
enum Destination {
    Desktop,
    Dir(PathBuf),
}

/// Copies build artifacts to a fixed destination directory.
#[derive(Debug, Clone)]
pub struct Publisher {
    destination: Destination,
}

/// A published artifact and the message reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub kind: ArtifactKind,
    pub destination: PathBuf,
    pub notification: String,
}

impl Publisher {
    /// Publishes to the current user's desktop, resolved when publishing.
    pub fn desktop() -> Self {
        Self {
            destination: Destination::Desktop,
        }
    }

    pub fn to_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            destination: Destination::Dir(dir.as_ref().to_path_buf()),
        }
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        match &paths.publish_dir {
            Some(dir) => Self::to_dir(dir),
            None => Self::desktop(),
        }
    }

    fn destination_dir(&self) -> Result<PathBuf, CopyError> {
        match &self.destination {
            Destination::Dir(dir) => Ok(dir.clone()),
            Destination::Desktop => desktop_dir(),
        }
    }

    /// Copies `artifact` into the destination directory under its own file
    /// name, replacing any existing file. The directory is never created.
    pub fn publish(&self, artifact: &Artifact) -> Result<Published, CopyError> {
        let dir = self.destination_dir()?;
        self.publish_into(&dir, artifact)
    }

    fn publish_into(&self, dir: &Path, artifact: &Artifact) -> Result<Published, CopyError> {
        if !dir.is_dir() {
            return Err(CopyError::MissingDestination(dir.to_path_buf()));
        }

        let file_name = artifact
            .path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("tex.{}", artifact.kind.extension())));
        let destination = dir.join(file_name);
        // Copying a file onto itself truncates it.
        if is_same_file(&artifact.path, &destination) {
            log::debug!("{} is already in place", destination.display());
        } else {
            fs::copy(&artifact.path, &destination).map_err(|source| CopyError::Copy {
                from: artifact.path.clone(),
                to: destination.clone(),
                source,
            })?;
        }

        let notification = match self.destination {
            Destination::Desktop => format!("{} file generated on your Desktop.", artifact.kind),
            Destination::Dir(_) => format!(
                "{} file generated at {}.",
                artifact.kind,
                destination.display()
            ),
        };
        log::info!("{}", notification);

        Ok(Published {
            kind: artifact.kind,
            destination,
            notification,
        })
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn desktop_dir() -> Result<PathBuf, CopyError> {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
        .ok_or(CopyError::NoDesktop)
}
