//! The `Repository` facade: locating, opening, and initializing an onyo
//! repository, and handing out the pieces (config resolver, view,
//! transactions) the rest of the crate needs.
//!
//! Grounded on the teacher's own `init` step sequence (`src/init.rs`) —
//! ensure preconditions, write scaffolding, commit — translated from maw's
//! jj/workspace domain into onyo's `.onyo/` layout, and stripped of its
//! `println!` progress reporting (that belongs in the CLI crate, which
//! prints around whatever this facade returns).

use std::path::{Path, PathBuf};

use onyo_git::GitAdapter;

use crate::config::{ConfigResolver, OnyoConfig, CURRENT_REPO_VERSION};
use crate::error::OnyoError;
use crate::model::name::NameTemplate;
use crate::transaction::Transaction;
use crate::view::RepositoryView;

/// Name of the reserved onyo-tracked config directory.
pub const ONYO_DIR: &str = ".onyo";

/// Name of the onyo-tracked config file, relative to [`ONYO_DIR`].
pub const CONFIG_FILE: &str = "config";

/// Name of the templates directory, relative to [`ONYO_DIR`].
pub const TEMPLATES_DIR: &str = "templates";

/// Name of the reserved (optional) validation directory, relative to
/// [`ONYO_DIR`].
pub const VALIDATION_DIR: &str = "validation";

/// The built-in template shipped by `onyo init`: a document with no keys.
pub const EMPTY_TEMPLATE: &str = "---\n";

/// A located onyo repository: its root, resolved config, and the adapter
/// used to reach git.
pub struct Repository<'a> {
    root: PathBuf,
    config: OnyoConfig,
    git: &'a dyn GitAdapter,
}

impl<'a> Repository<'a> {
    /// Locate and open an existing repository at or above `start`.
    ///
    /// # Errors
    /// Returns [`OnyoError::NotARepository`] if `start` is not inside a git
    /// working tree, or is inside one that has never been `onyo init`'d.
    pub fn open(git: &'a dyn GitAdapter, start: &Path) -> Result<Self, OnyoError> {
        let root = git.open(start)?;
        let onyo_dir = root.join(ONYO_DIR);
        if !onyo_dir.is_dir() {
            return Err(OnyoError::NotARepository { path: start.to_owned() });
        }
        let config = OnyoConfig::load(&onyo_dir.join(CONFIG_FILE))?;
        Ok(Self { root, config, git })
    }

    /// Initialize a new repository at (or above) `start`, which must
    /// already be a git working tree.
    ///
    /// Writes `.onyo/config`, `.onyo/templates/empty`, and `.onyo/validation/`,
    /// then commits the scaffolding.
    ///
    /// # Errors
    /// Returns [`OnyoError::AlreadyARepository`] if `.onyo/` already exists,
    /// or [`OnyoError::NotARepository`] if `start` is not a git working tree.
    pub fn init(git: &'a dyn GitAdapter, start: &Path) -> Result<Self, OnyoError> {
        let root = git.open(start)?;
        let onyo_dir = root.join(ONYO_DIR);
        if onyo_dir.is_dir() {
            return Err(OnyoError::AlreadyARepository { path: root });
        }

        std::fs::create_dir_all(onyo_dir.join(TEMPLATES_DIR))?;
        std::fs::create_dir_all(onyo_dir.join(VALIDATION_DIR))?;
        std::fs::write(onyo_dir.join(TEMPLATES_DIR).join("empty"), EMPTY_TEMPLATE)?;

        let mut config = OnyoConfig::default();
        config.repo.version = Some(CURRENT_REPO_VERSION);
        std::fs::write(onyo_dir.join(CONFIG_FILE), config.to_toml_string()?)?;

        git.stage(&onyo_dir)?;
        git.commit("onyo init", None, None)?;

        Ok(Self { root, config, git })
    }

    /// The repository's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The loaded onyo-tracked config.
    #[must_use]
    pub const fn config(&self) -> &OnyoConfig {
        &self.config
    }

    /// A layered config resolver over this repository's config and adapter.
    #[must_use]
    pub fn resolver(&self) -> ConfigResolver<'_> {
        ConfigResolver::new(&self.config, self.git)
    }

    /// The resolved asset name template (`onyo.assets.name-format`).
    ///
    /// # Errors
    /// Returns [`OnyoError::InvalidAssetName`] if the configured template
    /// string does not parse.
    pub fn name_template(&self) -> Result<NameTemplate, OnyoError> {
        let format = self.resolver().name_format();
        NameTemplate::parse(&format).map_err(|e| OnyoError::InvalidAssetName {
            name: format,
            clause: e.reason,
        })
    }

    /// Rebuild the repository view from the adapter's current tracked-file
    /// listing.
    ///
    /// # Errors
    /// Propagates the adapter's error.
    pub fn view(&self) -> Result<RepositoryView, OnyoError> {
        RepositoryView::rebuild(self.git).map_err(Into::into)
    }

    /// Returns `true` if the working tree has no uncommitted changes.
    ///
    /// # Errors
    /// Propagates the adapter's error.
    pub fn is_clean(&self) -> Result<bool, OnyoError> {
        self.git.is_clean().map_err(Into::into)
    }

    /// The `DirtyWorkingTree` precondition shared by every mutating
    /// command: fail fast if the tree isn't clean.
    ///
    /// # Errors
    /// Returns [`OnyoError::DirtyWorkingTree`] if the tree is dirty.
    pub fn require_clean(&self) -> Result<(), OnyoError> {
        if self.is_clean()? {
            Ok(())
        } else {
            Err(OnyoError::DirtyWorkingTree {
                detail: "the working tree has uncommitted changes".to_owned(),
            })
        }
    }

    /// Open a transaction over a fresh view of this repository.
    ///
    /// # Errors
    /// Propagates view-rebuild or config errors.
    pub fn transaction(&self) -> Result<Transaction<'_>, OnyoError> {
        let view = self.view()?;
        let template = self.name_template()?;
        Ok(Transaction::open(self.git, &view, template))
    }
}
