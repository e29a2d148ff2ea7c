//! Collision resolver.
//!
//! Decides the final destination of an entry from its rendered path, the
//! paths already claimed in this run and what exists on disk. Names are
//! disambiguated with the `%n` counter when the pattern has one, otherwise
//! with a `_k` suffix before the extension. The outcome only depends on the
//! order entries are resolved in.

use crate::core::duplicate;
use crate::generators::pattern::{self, RenderInput, Template};
use crate::models::candidate::Candidate;
use crate::models::config::JobConfig;
use crate::models::entry::{DetailKind, EntryDetail};
use crate::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Read-only view of the destination filesystem.
pub trait DestinationProbe {
    /// Modification time of the file at `path`, `None` if nothing is there.
    fn modified(&self, path: &Path) -> std::io::Result<Option<SystemTime>>;

    /// Whether two files hold the same content.
    fn same_content(&self, first: &Path, second: &Path) -> Result<bool>;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl DestinationProbe for FsProbe {
    fn modified(&self, path: &Path) -> std::io::Result<Option<SystemTime>> {
        crate::utils::fs::modified_time(path)
    }

    fn same_content(&self, first: &Path, second: &Path) -> Result<bool> {
        duplicate::is_duplicate(first, second)
    }
}

/// Outcome for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Use this absolute path; it is now claimed.
    Accept(PathBuf),
    /// Do not process the entry.
    Skip {
        /// Path the entry was compared against.
        final_path: PathBuf,
        detail: EntryDetail,
    },
}

/// Collision handling options.
#[derive(Debug, Clone, Copy)]
pub struct CollisionPolicy {
    /// Skip when the existing destination is not older than the source.
    pub update_only: bool,
    /// Skip when the colliding file has identical content.
    pub skip_duplicates: bool,
    /// Names tried before giving up.
    pub limit: usize,
}

impl CollisionPolicy {
    pub fn from_config(config: &JobConfig) -> Self {
        Self {
            update_only: config.update_only,
            skip_duplicates: config.skip_duplicates,
            limit: config.collision_limit,
        }
    }
}

/// Tracks claimed destinations for one run.
#[derive(Debug)]
pub struct CollisionResolver {
    destination_root: PathBuf,
    policy: CollisionPolicy,
    /// Claimed destination -> source it was claimed for.
    claimed: HashMap<PathBuf, PathBuf>,
}

impl CollisionResolver {
    /// Create a resolver with an empty claim set.
    pub fn new(destination_root: impl Into<PathBuf>, policy: CollisionPolicy) -> Self {
        Self {
            destination_root: destination_root.into(),
            policy,
            claimed: HashMap::new(),
        }
    }

    /// Whether an absolute destination path was claimed in this run.
    pub fn is_claimed(&self, path: &Path) -> bool {
        self.claimed.contains_key(path)
    }

    /// Give a claimed destination back, e.g. after its write failed.
    pub fn release(&mut self, path: &Path) -> bool {
        self.claimed.remove(path).is_some()
    }

    /// Number of claimed destinations.
    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }

    /// Resolve the final destination for a candidate.
    ///
    /// `rendered` is the first rendering (relative); `input` is reused to
    /// re-render with higher counters when the template has `%n`.
    pub fn resolve(
        &mut self,
        rendered: &Path,
        template: &Template,
        input: &RenderInput<'_>,
        candidate: &Candidate,
        probe: &dyn DestinationProbe,
    ) -> Result<Disposition> {
        let uses_counter = template.has_counter();

        for attempt in 0..self.policy.limit {
            let relative = if attempt == 0 {
                rendered.to_path_buf()
            } else if uses_counter {
                let next = RenderInput {
                    counter: Some(attempt as u64 + 1),
                    ..*input
                };
                template.render_path(&next)?
            } else {
                pattern::with_suffix(rendered, attempt)
            };
            let final_path = self.destination_root.join(&relative);

            if let Some(claimed_source) = self.claimed.get(&final_path) {
                if self.policy.skip_duplicates {
                    // After a write the claimed content lives at the destination.
                    let reference = if probe.modified(&final_path)?.is_some() {
                        Some(final_path.clone())
                    } else if probe.modified(claimed_source)?.is_some() {
                        Some(claimed_source.clone())
                    } else {
                        None
                    };
                    let duplicate = match &reference {
                        Some(reference) => probe.same_content(&candidate.source_path, reference)?,
                        None => false,
                    };
                    if duplicate {
                        let detail = EntryDetail::new(
                            DetailKind::Duplicate,
                            format!("same content as {}", claimed_source.display()),
                        );
                        return Ok(Disposition::Skip { final_path, detail });
                    }
                }
                tracing::debug!("Claimed in this run, trying next name: {}", final_path.display());
                continue;
            }

            let Some(existing_mtime) = probe.modified(&final_path)? else {
                self.claimed
                    .insert(final_path.clone(), candidate.source_path.clone());
                return Ok(Disposition::Accept(final_path));
            };

            if self.policy.skip_duplicates
                && probe.same_content(&candidate.source_path, &final_path)?
            {
                let detail = EntryDetail::new(
                    DetailKind::Duplicate,
                    format!("same content already at {}", final_path.display()),
                );
                return Ok(Disposition::Skip { final_path, detail });
            }

            if self.policy.update_only && existing_mtime >= candidate.modification_time {
                let detail = EntryDetail::new(
                    DetailKind::UpToDate,
                    format!("{} is up to date", final_path.display()),
                );
                return Ok(Disposition::Skip { final_path, detail });
            }

            tracing::debug!("Exists on disk, trying next name: {}", final_path.display());
        }

        Err(crate::Error::CollisionUnresolved {
            path: self.destination_root.join(rendered),
            attempts: self.policy.limit,
        })
    }
}
