use std::path::PathBuf;

/// What to do when the canonical name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Last writer wins.
    #[default]
    Overwrite,
    /// Append ` (n)` with the smallest free `n`.
    Suffix,
}

/// File-system actions requested by the caller for every processed file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SideEffectOptions {
    pub html_out: Option<PathBuf>,
    pub rename_in_place: bool,
    pub copy_to: Option<PathBuf>,
    pub collision: CollisionPolicy,
}

impl SideEffectOptions {
    /// True when at least one side effect is requested; summary output is suppressed then.
    pub fn is_active(&self) -> bool {
        self.html_out.is_some() || self.rename_in_place || self.copy_to.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Write the HTML body under `root`, mirroring the input layout, as `.html`.
    DumpHtml { root: PathBuf },
    /// Rename the source within its own directory.
    RenameInPlace { collision: CollisionPolicy },
    /// Copy the source under `root`, mirroring the input layout, with the canonical name.
    CopyRenamed {
        root: PathBuf,
        collision: CollisionPolicy,
    },
}

/// Ordered side effects for one file.
///
/// The HTML dump always runs first. Copy-to takes precedence over in-place
/// rename; when both are requested only the copy is planned.
pub fn plan_side_effects(options: &SideEffectOptions) -> Vec<SideEffect> {
    let mut plan = Vec::with_capacity(2);
    if let Some(root) = &options.html_out {
        plan.push(SideEffect::DumpHtml { root: root.clone() });
    }
    if let Some(root) = &options.copy_to {
        plan.push(SideEffect::CopyRenamed {
            root: root.clone(),
            collision: options.collision,
        });
    } else if options.rename_in_place {
        plan.push(SideEffect::RenameInPlace {
            collision: options.collision,
        });
    }
    plan
}
