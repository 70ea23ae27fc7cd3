//! The stream registry: named generations plus the collision state they
//! share.

use std::collections::HashMap;
use std::path::Path;

use chime_fs::Filesystem;
use chime_log::Logger;
use thiserror::Error;

use crate::collision::CollisionResolver;
use crate::engine;
use crate::generation::{GenFlags, Generation, RotationPolicy, ValidationError};

/// Errors from registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no registered stream named {0:?}")]
    UnknownStream(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Named output streams under one prefix policy regime.
///
/// Streams are looked up by exact name. The registry owns one collision
/// resolver for all of them, keeping backup names unique across every
/// rotation it performs.
#[derive(Debug, Default)]
pub struct FilegenRegistry {
    streams: HashMap<String, Generation>,
    resolver: CollisionResolver,
}

impl FilegenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with the default settings: daily rotation, link
    /// maintenance on, disabled until configured. Replaces any existing
    /// entry under that name, closing its file.
    pub fn register(&mut self, prefix: &Path, name: &str) {
        self.streams
            .insert(name.to_string(), Generation::new(prefix, name));
    }

    pub fn get(&self, name: &str) -> Option<&Generation> {
        self.streams.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Generation> {
        self.streams.get_mut(name)
    }

    /// Remove `name`, closing its file. Returns whether the stream existed.
    /// Intended for diagnostics and tests; production streams live for the
    /// life of the registry.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.streams.remove(name).is_some()
    }

    /// Registered stream names, sorted for deterministic output.
    pub fn names(&self) -> Vec<String> {
        let mut v: Vec<String> = self.streams.keys().cloned().collect();
        v.sort();
        v
    }

    /// Iterate over `(name, descriptor)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Generation)> {
        self.streams.iter().map(|(name, gen)| (name.as_str(), gen))
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Ensure `name`'s open file covers `now`, rotating if needed.
    /// Returns `false` when no such stream is registered.
    pub fn tick<F: Filesystem, L: Logger>(
        &mut self,
        name: &str,
        now: u32,
        pivot: i64,
        pid: u32,
        fs: &F,
        logger: &L,
    ) -> bool {
        match self.streams.get_mut(name) {
            Some(gen) => {
                engine::tick(gen, now, pivot, pid, fs, &mut self.resolver, logger);
                true
            }
            None => false,
        }
    }

    /// Replace `name`'s base name, policy, and flags, re-opening when the
    /// stream had a file open.
    #[allow(clippy::too_many_arguments)]
    pub fn configure<F: Filesystem, L: Logger>(
        &mut self,
        name: &str,
        base_name: &str,
        policy: RotationPolicy,
        flags: GenFlags,
        now: u32,
        pivot: i64,
        pid: u32,
        fs: &F,
        logger: &L,
    ) -> Result<(), RegistryError> {
        let gen = self
            .streams
            .get_mut(name)
            .ok_or_else(|| RegistryError::UnknownStream(name.to_string()))?;
        engine::configure(
            gen,
            base_name,
            policy,
            flags,
            now,
            pivot,
            pid,
            fs,
            &mut self.resolver,
            logger,
        )?;
        Ok(())
    }
}
