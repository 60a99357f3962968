//! Durable copy of the last session descriptor, used to rehydrate the store on
//! startup. Rehydration is optimistic: a cached credential may already be expired, and
//! the authenticated channel recovers through the normal refresh path. Failures here are
//! logged and never surface to callers.

use crate::features::auth::{
    guards::DestinationObserver,
    state::{SessionObserver, SessionSnapshot},
    types::{Session, SessionDescriptor},
};
use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached session. Missing, unreadable or malformed files yield `None`.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        match self.try_load() {
            Ok(session) => session,
            Err(err) => {
                warn!(path = %self.path.display(), "ignoring cached session: {err:#}");
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let descriptor: SessionDescriptor =
            serde_json::from_str(&contents).context("malformed session descriptor")?;

        Ok(Some(Session::try_from(descriptor)?))
    }

    /// Writes the session, or removes the file when there is none.
    /// # Errors
    /// Returns an error if the file cannot be written or removed.
    pub fn save(&self, session: Option<&Session>) -> Result<()> {
        let Some(session) = session else {
            if self.path.exists() {
                fs::remove_file(&self.path)
                    .with_context(|| format!("failed to remove {}", self.path.display()))?;
            }
            return Ok(());
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let contents = serde_json::to_vec(&session.to_descriptor())?;
        let mut file = open_private(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        file.write_all(&contents)?;
        file.sync_all()?;

        debug!(path = %self.path.display(), "session cached");
        Ok(())
    }

    /// Observer that mirrors every store mutation into the cache file. The write is
    /// blocking and happens inline so the file order matches the mutation order.
    #[must_use]
    pub fn observer(&self) -> SessionObserver {
        let cache = self.clone();
        Arc::new(move |snapshot: &SessionSnapshot| {
            if let Err(err) = cache.save(snapshot.session.as_deref()) {
                warn!(path = %cache.path.display(), "failed to update session cache: {err:#}");
            }
        })
    }
}

impl SessionCache {
    /// Sibling file holding the destination a denied navigation asked for, so a login
    /// in a later run can continue there.
    #[must_use]
    pub fn destination_path(&self) -> PathBuf {
        self.path.with_extension("destination")
    }

    #[must_use]
    pub fn load_destination(&self) -> Option<String> {
        let path = self.destination_path();
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents.trim().to_string()).filter(|d| !d.is_empty()),
            Err(err) => {
                warn!(path = %path.display(), "ignoring remembered destination: {err}");
                None
            }
        }
    }

    /// Writes the destination, or removes the file when there is none.
    /// # Errors
    /// Returns an error if the file cannot be written or removed.
    pub fn save_destination(&self, destination: Option<&str>) -> Result<()> {
        let path = self.destination_path();
        let Some(destination) = destination else {
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("failed to remove {}", path.display()))?;
            }
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut file =
            open_private(&path).with_context(|| format!("failed to open {}", path.display()))?;
        file.write_all(destination.as_bytes())?;
        Ok(())
    }

    /// Observer that mirrors the route guard's remembered destination into its file.
    #[must_use]
    pub fn destination_observer(&self) -> DestinationObserver {
        let cache = self.clone();
        Arc::new(move |destination: Option<&str>| {
            if let Err(err) = cache.save_destination(destination) {
                warn!("failed to update remembered destination: {err:#}");
            }
        })
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
