//! Replace the running executable with the latest release, rolling back on failure.
//!
//! The backup copy is the rollback marker: once it exists, any later failure
//! restores it over the executable. The downloaded candidate is removed on every
//! path.

use crate::pipeline::{RunError, is_user_abort};
use crate::ports::{AbortSignal, ReleaseSource};
use crate::settings::SelfUpdateSettings;
use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use multiapp_edit::sha256_hex;
use std::cmp::Ordering;
use std::io::Write;
use tracing::{debug, info, warn};

const PRIVILEGES_HINT: &str = "execute the command again with elevated privileges (e.g. sudo)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate { version: String },
    Updated { from: String, to: String },
}

/// Executable container format, sniffed from the leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFormat {
    Elf,
    MachO,
    Pe,
}

impl BinaryFormat {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const MACHO: [[u8; 4]; 5] = [
            [0xfe, 0xed, 0xfa, 0xce],
            [0xfe, 0xed, 0xfa, 0xcf],
            [0xce, 0xfa, 0xed, 0xfe],
            [0xcf, 0xfa, 0xed, 0xfe],
            [0xca, 0xfe, 0xba, 0xbe],
        ];
        if bytes.starts_with(b"\x7fELF") {
            Some(BinaryFormat::Elf)
        } else if bytes.starts_with(b"MZ") {
            Some(BinaryFormat::Pe)
        } else if MACHO.iter().any(|m| bytes.starts_with(m)) {
            Some(BinaryFormat::MachO)
        } else {
            None
        }
    }
}

/// `true` when `current` is at least `latest`.
///
/// Dotted numeric versions (an optional leading `v` is ignored) compare
/// component-wise; anything else only matches on equality.
pub fn is_up_to_date(current: &str, latest: &str) -> bool {
    match (parse_version(current), parse_version(latest)) {
        (Some(c), Some(l)) => compare_versions(&c, &l) != Ordering::Less,
        _ => current.trim() == latest.trim(),
    }
}

fn parse_version(v: &str) -> Option<Vec<u64>> {
    let v = v.trim();
    let v = v.strip_prefix('v').unwrap_or(v);
    v.split('.').map(|part| part.parse::<u64>().ok()).collect()
}

fn compare_versions(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

pub fn run_self_update(
    settings: &SelfUpdateSettings,
    source: &dyn ReleaseSource,
    abort: &dyn AbortSignal,
) -> Result<UpdateOutcome, RunError> {
    let latest = source
        .latest_version()
        .context("fetch latest version")
        .map_err(|e| RunError::Setup(e).classify())?;

    if is_up_to_date(&settings.current_version, &latest) {
        info!(version = settings.current_version.as_str(), "already up to date");
        return Ok(UpdateOutcome::UpToDate {
            version: settings.current_version.clone(),
        });
    }

    check_permissions(settings).map_err(RunError::Setup)?;

    let candidate = settings.candidate_path();
    let backup = settings.backup_path();
    let mut backed_up = false;

    let result = swap(settings, source, abort, &mut backed_up);

    if candidate.exists()
        && let Err(e) = fs::remove_file(&candidate)
    {
        warn!(path = candidate.as_str(), error = %e, "candidate not removed");
    }

    match result {
        Ok(()) => {
            if let Err(e) = fs::remove_file(&backup) {
                warn!(path = backup.as_str(), error = %e, "backup not removed");
            }
            info!(from = settings.current_version.as_str(), to = latest.as_str(), "updated");
            Ok(UpdateOutcome::Updated {
                from: settings.current_version.clone(),
                to: latest,
            })
        }
        Err(err) => {
            let err = if backed_up {
                match rollback(settings) {
                    Ok(()) => err,
                    Err(restore) => err.context(format!(
                        "rollback failed ({restore:#}); a copy of the previous executable is at {backup}"
                    )),
                }
            } else {
                err
            };
            if is_user_abort(&err) {
                Err(RunError::Aborted)
            } else {
                Err(RunError::Transform(err))
            }
        }
    }
}

/// Nothing is mutated here; failures carry the privileges hint.
fn check_permissions(settings: &SelfUpdateSettings) -> anyhow::Result<()> {
    let exe = &settings.current_exe;
    let meta = fs::metadata(exe)
        .with_context(|| format!("cannot inspect the current executable {exe}"))?;
    if meta.permissions().readonly() {
        anyhow::bail!("{exe} is not writable; {PRIVILEGES_HINT}");
    }

    let exe_dir = exe.parent().unwrap_or(Utf8Path::new("."));
    for dir in [exe_dir, settings.temp_dir.as_path()] {
        tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| anyhow::anyhow!("{dir} is not writable ({e}); {PRIVILEGES_HINT}"))?;
    }
    Ok(())
}

fn swap(
    settings: &SelfUpdateSettings,
    source: &dyn ReleaseSource,
    abort: &dyn AbortSignal,
    backed_up: &mut bool,
) -> anyhow::Result<()> {
    let candidate = settings.candidate_path();
    source
        .download(&candidate, abort)
        .context("download new version")?;
    validate_candidate(settings, &candidate)?;

    abort.check()?;
    let backup = settings.backup_path();
    take_backup(&settings.current_exe, &backup).context("back up current executable")?;
    *backed_up = true;
    debug!(backup = backup.as_str(), "backup taken");

    abort.check()?;
    install(&candidate, &settings.current_exe).context("replace current executable")
}

/// Copy `exe` to `backup`; a partially written backup is removed on failure.
fn take_backup(exe: &Utf8Path, backup: &Utf8Path) -> anyhow::Result<()> {
    if let Err(e) = fs::copy(exe, backup) {
        if backup.exists()
            && let Err(rm) = fs::remove_file(backup)
        {
            warn!(path = backup.as_str(), error = %rm, "partial backup not removed");
        }
        return Err(e.into());
    }
    Ok(())
}

fn validate_candidate(settings: &SelfUpdateSettings, candidate: &Utf8Path) -> anyhow::Result<()> {
    let bytes = fs::read(candidate)?;
    if bytes.is_empty() {
        anyhow::bail!("downloaded file is empty");
    }
    if let Some(expected) = &settings.expected_sha256 {
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            anyhow::bail!("checksum mismatch: expected {expected}, got {actual}");
        }
    }

    let current = fs::read(&settings.current_exe)?;
    let Some(expected) = BinaryFormat::sniff(&current) else {
        anyhow::bail!(
            "cannot determine the executable format of {}",
            settings.current_exe
        );
    };
    match BinaryFormat::sniff(&bytes) {
        Some(found) if found == expected => Ok(()),
        Some(found) => anyhow::bail!("downloaded file is a {found:?} executable, expected {expected:?}"),
        None => anyhow::bail!("downloaded file is not a valid executable; it may be corrupted"),
    }
}

/// Write `src` next to `dest` and rename it over `dest`, keeping `dest`'s
/// permission bits. Works while `dest` is running.
fn install(src: &Utf8Path, dest: &Utf8Path) -> anyhow::Result<()> {
    let perms = fs::metadata(dest)?.permissions();
    let dir = dest.parent().unwrap_or(Utf8Path::new("."));

    let mut staging = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create staging file in {dir}"))?;
    staging.write_all(&fs::read(src)?)?;
    staging.flush()?;
    fs::set_permissions(staging.path(), perms)?;
    staging
        .persist(dest)
        .with_context(|| format!("move new executable into {dest}"))?;
    Ok(())
}

fn rollback(settings: &SelfUpdateSettings) -> anyhow::Result<()> {
    let backup = settings.backup_path();
    warn!(backup = backup.as_str(), "restoring previous executable");
    install(&backup, &settings.current_exe)?;
    fs::remove_file(&backup)?;
    Ok(())
}
