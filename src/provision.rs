//! Filesystem-backed [`DirectoryProvisioner`].

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;

use nix::unistd::{chown, User};
use tracing::{debug, info};

use crate::command_traits::is_dry_run;
use crate::error::{Result, TimerError};
use crate::manager::{DirectoryProvisioner, DirectoryRequest};

/// Creates directories on the local filesystem. An existing directory is left
/// exactly as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectoryProvisioner;

impl FsDirectoryProvisioner {
    fn create(request: &DirectoryRequest<'_>) -> io::Result<()> {
        let user = User::from_name(request.owner)
            .map_err(io::Error::from)?
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("user {:?} does not exist", request.owner),
                )
            })?;

        if request.recursive {
            fs::create_dir_all(request.path)?;
        } else {
            fs::create_dir(request.path)?;
        }

        chown(request.path, Some(user.uid), Some(user.gid)).map_err(io::Error::from)?;
        fs::set_permissions(request.path, fs::Permissions::from_mode(request.mode))
    }
}

impl DirectoryProvisioner for FsDirectoryProvisioner {
    fn ensure_directory(&self, request: &DirectoryRequest<'_>) -> Result<()> {
        if request.path.is_dir() {
            debug!("directory {} already exists", request.path.display());
            return Ok(());
        }

        if is_dry_run() {
            info!(
                "[dry-run] would create {} (owner {}, mode {:o})",
                request.path.display(),
                request.owner,
                request.mode
            );
            return Ok(());
        }

        info!(
            "creating directory {} (owner {}, mode {:o})",
            request.path.display(),
            request.owner,
            request.mode
        );
        Self::create(request).map_err(|source| TimerError::DirectoryCreation {
            path: request.path.to_path_buf(),
            source,
        })
    }
}
