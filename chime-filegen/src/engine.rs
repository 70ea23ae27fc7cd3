//! The rotation engine: opening the generation that covers a given instant
//! and switching streams over to it.
//!
//! Nothing in here is fatal. Filesystem trouble is reported through the
//! logger and the stream keeps its previous handle, so records land in a
//! stale generation rather than being lost. Every function takes the
//! current stamp, pivot, and process id from the caller; the engine never
//! reads a clock or global state itself.

use std::path::Path;

use chime_fs::{Filesystem, FsErrorKind};
use chime_log::Logger;

use crate::collision::{CollisionAction, CollisionResolver, CollisionWarning};
use crate::generation::{
    validate_file_ref, GenFlags, Generation, OpenGeneration, RotationPolicy, ValidationError,
};
use crate::suffix::build_suffix;

/// Bytes reserved for the generation suffix on top of prefix and base name.
/// No built-in policy comes close to this; it bounds the name should a
/// degenerate suffix ever be produced.
const SUFFIX_ALLOWANCE: usize = 64;

/// Truncate an over-long suffix to the allowance, warning when it happens.
/// A clipped name is still a working log target; naming fidelity loses to
/// availability.
fn clamp_suffix<L: Logger>(gen: &Generation, mut suffix: String, logger: &L) -> String {
    if suffix.len() > SUFFIX_ALLOWANCE {
        // Suffixes are ASCII, so a byte index is a char boundary.
        suffix.truncate(SUFFIX_ALLOWANCE);
        logger.warning(&format!(
            "logfile name truncated: {:?}",
            gen.suffixed_path(&suffix)
        ));
    }
    suffix
}

/// Open the generation covering `now` and make it the stream's target.
///
/// Steps: name the generation, clear the bare path of any occupant, open
/// for append, and re-link the bare name if the stream maintains it. On an
/// open failure the previous handle and validity stay untouched so the next
/// tick retries; a failure to open inside a directory that does not exist
/// yet is expected during startup and stays quiet.
pub fn rotate<F: Filesystem, L: Logger>(
    gen: &mut Generation,
    now: u32,
    pivot: i64,
    pid: u32,
    fs: &F,
    resolver: &mut CollisionResolver,
    logger: &L,
) {
    let suffix = match build_suffix(gen.policy(), now, pivot, pid) {
        Ok(s) => s,
        Err(e) => {
            logger.warning(&format!(
                "cannot name generation {}: {}",
                gen.bare_path().display(),
                e
            ));
            return;
        }
    };
    let text = clamp_suffix(gen, suffix.text, logger);
    let target = gen.suffixed_path(&text);

    if gen.policy() != RotationPolicy::None {
        let bare = gen.bare_path();
        match resolver.resolve(fs, &bare, pid) {
            CollisionAction::Proceed => {}
            CollisionAction::RenameAside(backup) => {
                if let Err(e) = fs.rename(&bare, &backup) {
                    logger.warning(&format!("couldn't save {}: {}", bare.display(), e));
                }
            }
            CollisionAction::Unlink => {
                if let Err(e) = fs.unlink(&bare) {
                    logger.warning(&format!("couldn't unlink {}: {}", bare.display(), e));
                }
            }
            CollisionAction::WarnOnly(CollisionWarning::NotRegular(kind)) => {
                logger.warning(&format!(
                    "expected regular file for {} (found {:?})",
                    bare.display(),
                    kind
                ));
            }
            CollisionAction::WarnOnly(CollisionWarning::StatFailed(e)) => {
                logger.warning(&format!("stat({}) failed: {}", bare.display(), e));
            }
        }
    }

    logger.debug(&format!(
        "opening generation {} (policy {:?}, stamp {})",
        target.display(),
        gen.policy(),
        now
    ));

    match fs.open_append(&target) {
        Ok(file) => {
            gen.open = Some(OpenGeneration {
                file,
                validity: suffix.validity,
            });
            if gen.flags().maintain_link && gen.policy() != RotationPolicy::None {
                maintain_link(gen, &target, fs, logger);
            }
        }
        Err(e) => {
            if e.kind() != FsErrorKind::NotFound {
                logger.warning(&format!("can't open {}: {}", target.display(), e));
            }
        }
    }
}

/// Re-create the bare name as a hard link to the current generation. An
/// already existing link is fine; anything else is reported.
fn maintain_link<F: Filesystem, L: Logger>(gen: &Generation, target: &Path, fs: &F, logger: &L) {
    let bare = gen.bare_path();
    if let Err(e) = fs.hard_link(target, &bare) {
        if e.kind() != FsErrorKind::AlreadyExists {
            logger.warning(&format!(
                "can't link({}, {}): {}",
                target.display(),
                bare.display(),
                e
            ));
        }
    }
}

/// Ensure the stream's open file is the one covering `now`, rotating if it
/// is not (or if nothing is open). A disabled stream just closes.
pub fn tick<F: Filesystem, L: Logger>(
    gen: &mut Generation,
    now: u32,
    pivot: i64,
    pid: u32,
    fs: &F,
    resolver: &mut CollisionResolver,
    logger: &L,
) {
    if !gen.flags().enabled {
        gen.close();
        return;
    }
    let current = gen
        .open
        .as_ref()
        .map(|o| o.validity.is_current(now, pid))
        .unwrap_or(false);
    if !current {
        rotate(gen, now, pivot, pid, fs, resolver, logger);
    }
}

/// Replace a stream's base name, policy, and flags.
///
/// A no-op when nothing changes. The new base name is validated before any
/// state moves; on acceptance the old handle closes, and if one had been
/// open the stream immediately re-opens under the new settings so output is
/// not lost to the abandoned generation.
#[allow(clippy::too_many_arguments)]
pub fn configure<F: Filesystem, L: Logger>(
    gen: &mut Generation,
    base_name: &str,
    policy: RotationPolicy,
    flags: GenFlags,
    now: u32,
    pivot: i64,
    pid: u32,
    fs: &F,
    resolver: &mut CollisionResolver,
    logger: &L,
) -> Result<(), ValidationError> {
    if gen.base_name() == base_name && gen.policy() == policy && gen.flags() == flags {
        return Ok(());
    }
    validate_file_ref(gen.prefix(), base_name)?;

    logger.debug(&format!(
        "reconfiguring {} as {} (policy {:?})",
        gen.bare_path().display(),
        base_name,
        policy
    ));

    let was_open = gen.open.take().is_some();
    gen.base_name = base_name.to_string();
    gen.policy = policy;
    gen.flags = flags;
    if was_open {
        tick(gen, now, pivot, pid, fs, resolver, logger);
    }
    Ok(())
}
