use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use emlsift_core::{
    plan_side_effects, suffixed_filename, CollisionPolicy, EmailRecord, SideEffect,
    SideEffectOptions,
};
use engine_logging::{engine_debug, engine_file_warn};

use crate::persist::{AtomicFileWriter, PersistError};

const HTML_EXTENSION: &str = "html";

#[derive(Debug, thiserror::Error)]
pub enum SideEffectError {
    #[error("{} is not under the input root {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[error("html dump to {} failed: {source}", path.display())]
    HtmlDump {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
    #[error("rename to {} failed: {source}", path.display())]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("copy into {} failed: {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
}

/// Outcome of the side effects run for one file.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<SideEffectError>,
}

/// Runs the requested file-system actions for each processed message.
///
/// Failures are logged against the source path and returned; they never
/// affect whether the record is kept.
#[derive(Debug, Clone)]
pub struct SideEffectDispatcher {
    input_root: PathBuf,
    plan: Vec<SideEffect>,
}

impl SideEffectDispatcher {
    pub fn new(input_root: impl Into<PathBuf>, options: &SideEffectOptions) -> Self {
        Self {
            input_root: input_root.into(),
            plan: plan_side_effects(options),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    pub fn dispatch(&self, source: &Path, record: &EmailRecord, html: &str) -> DispatchReport {
        let mut report = DispatchReport::default();
        for effect in &self.plan {
            let result = match effect {
                SideEffect::DumpHtml { root } => self.dump_html(root, source, html),
                SideEffect::RenameInPlace { collision } => rename_in_place(source, record, *collision),
                SideEffect::CopyRenamed { root, collision } => {
                    self.copy_renamed(root, source, record, *collision)
                }
            };
            match result {
                Ok(path) => {
                    engine_debug!("{:?} wrote {}", effect, path.display());
                    report.written.push(path);
                }
                Err(err) => {
                    engine_file_warn!(source, "{}", err);
                    report.failures.push(err);
                }
            }
        }
        report
    }

    fn relative_to_root<'p>(&self, source: &'p Path) -> Result<&'p Path, SideEffectError> {
        source
            .strip_prefix(&self.input_root)
            .map_err(|_| SideEffectError::OutsideRoot {
                path: source.to_path_buf(),
                root: self.input_root.clone(),
            })
    }

    fn dump_html(&self, root: &Path, source: &Path, html: &str) -> Result<PathBuf, SideEffectError> {
        let target = root.join(self.relative_to_root(source)?.with_extension(HTML_EXTENSION));
        let (dir, filename) = split_target(&target);
        AtomicFileWriter::new(dir)
            .write(&filename, html.as_bytes())
            .map_err(|source| SideEffectError::HtmlDump {
                path: target.clone(),
                source,
            })
    }

    fn copy_renamed(
        &self,
        root: &Path,
        source: &Path,
        record: &EmailRecord,
        collision: CollisionPolicy,
    ) -> Result<PathBuf, SideEffectError> {
        let relative_dir = self
            .relative_to_root(source)?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let target_dir = root.join(relative_dir);
        let copy_error = |err: PersistError| SideEffectError::Copy {
            path: target_dir.clone(),
            source: err,
        };

        let bytes = fs::read(source).map_err(|e| copy_error(e.into()))?;
        let writer = AtomicFileWriter::new(target_dir.clone());
        let name = record.rename_target();
        let written = match collision {
            CollisionPolicy::Overwrite => writer.write(&name, &bytes),
            CollisionPolicy::Suffix => writer.write_first_free(candidate_names(name), &bytes),
        };
        written.map_err(copy_error)
    }
}

fn rename_in_place(
    source: &Path,
    record: &EmailRecord,
    collision: CollisionPolicy,
) -> Result<PathBuf, SideEffectError> {
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    let name = record.rename_target();
    let target = dir.join(&name);
    if target == source {
        return Ok(target);
    }

    match collision {
        CollisionPolicy::Overwrite => fs::rename(source, &target)
            .map(|()| target.clone())
            .map_err(|source| SideEffectError::Rename {
                path: target,
                source,
            }),
        CollisionPolicy::Suffix => claim_by_link(source, dir, name),
    }
}

/// Hard-links the source to the first free candidate name, then drops the
/// original. The link fails if the name exists, so two workers can never
/// claim the same name.
fn claim_by_link(source: &Path, dir: &Path, name: String) -> Result<PathBuf, SideEffectError> {
    for candidate in candidate_names(name.clone()) {
        let target = dir.join(&candidate);
        if target == source {
            return Ok(target);
        }
        match fs::hard_link(source, &target) {
            Ok(()) => {
                return fs::remove_file(source)
                    .map(|()| target.clone())
                    .map_err(|source| SideEffectError::Rename {
                        path: target,
                        source,
                    });
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) if links_unavailable(&err) => {
                engine_debug!("hard links unavailable in {}: {}", dir.display(), err);
                return rename_to_first_absent(source, dir, name);
            }
            Err(source) => return Err(SideEffectError::Rename { path: target, source }),
        }
    }
    Err(no_free_name(dir))
}

fn links_unavailable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Unsupported | io::ErrorKind::PermissionDenied
    )
}

/// Renames to the first candidate that does not exist yet. Used where the
/// file system has no hard links; a concurrent claim of the same name is
/// not detected here.
fn rename_to_first_absent(source: &Path, dir: &Path, name: String) -> Result<PathBuf, SideEffectError> {
    for candidate in candidate_names(name) {
        let target = dir.join(&candidate);
        if target == source {
            return Ok(target);
        }
        if target.exists() {
            continue;
        }
        return fs::rename(source, &target)
            .map(|()| target.clone())
            .map_err(|source| SideEffectError::Rename {
                path: target,
                source,
            });
    }
    Err(no_free_name(dir))
}

fn no_free_name(dir: &Path) -> SideEffectError {
    SideEffectError::Rename {
        path: dir.to_path_buf(),
        source: io::Error::new(io::ErrorKind::AlreadyExists, "no free file name left"),
    }
}

/// `name`, then `name (1)`, `name (2)`, ...
fn candidate_names(name: String) -> impl Iterator<Item = String> {
    std::iter::once(name.clone()).chain((1..).map(move |n| suffixed_filename(&name, n)))
}

fn split_target(target: &Path) -> (PathBuf, String) {
    let dir = target.parent().map(Path::to_path_buf).unwrap_or_default();
    let filename = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_start_with_the_plain_name() {
        let names: Vec<_> = candidate_names("a.eml".to_string()).take(3).collect();
        assert_eq!(names, vec!["a.eml", "a (1).eml", "a (2).eml"]);
    }

    #[test]
    fn rename_without_links_takes_first_absent_name() {
        let temp = tempfile::TempDir::new().unwrap();
        let source = temp.path().join("source.eml");
        fs::write(&source, "new").unwrap();
        fs::write(temp.path().join("a.eml"), "taken").unwrap();

        let target = rename_to_first_absent(&source, temp.path(), "a.eml".to_string()).unwrap();

        assert_eq!(target, temp.path().join("a (1).eml"));
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(temp.path().join("a.eml")).unwrap(), "taken");
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn only_missing_link_support_triggers_plain_rename() {
        assert!(links_unavailable(&io::Error::from(io::ErrorKind::Unsupported)));
        assert!(links_unavailable(&io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(!links_unavailable(&io::Error::from(io::ErrorKind::NotFound)));
    }
}
