use crate::error::{Result, ScriptboxError};

/// Extensions a workspace file may carry. Being listed here makes a name
/// storable; whether the type is also executable is the registry's concern.
pub const ALLOWED_EXTENSIONS: &[&str] = &["js", "jsx", "py", "cpp", "txt", "css", "html"];

/// Maximum filename length in characters.
pub const MAX_NAME_LEN: usize = 64;

/// Filename validation policy for the workspace.
///
/// The standard mode enforces the rules every entry point shares: no
/// traversal, no separators, allow-listed extension, bounded length. The
/// strict mode is used by the model-facing tool adapter and additionally
/// restricts the base name to letters, digits, `-` and `_`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilenamePolicy {
    strict: bool,
}

impl FilenamePolicy {
    pub fn standard() -> Self {
        Self { strict: false }
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Validate a workspace filename. The rejection message names the rule
    /// that failed; callers surface it verbatim.
    pub fn validate(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(reject("filename is required"));
        }
        if name.contains("..") {
            return Err(reject("directory traversal is not allowed"));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(reject("path separators are not allowed"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(reject(&format!(
                "filename exceeds {MAX_NAME_LEN} characters"
            )));
        }

        let Some((stem, extension)) = split_name(name) else {
            return Err(reject(&format!(
                "filename must end with one of: {}",
                allowed_list()
            )));
        };
        if !ALLOWED_EXTENSIONS.contains(&extension) {
            return Err(reject(&format!(
                "extension '.{extension}' is not supported (allowed: {})",
                allowed_list()
            )));
        }
        if stem.is_empty() {
            return Err(reject("filename must have a base name"));
        }

        if self.strict {
            let ok = stem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !ok {
                return Err(reject(
                    "base name may only contain letters, digits, '-' and '_'",
                ));
            }
        }

        Ok(())
    }

    /// Extension of a workspace name, without the leading dot.
    pub fn extension(name: &str) -> Option<&str> {
        split_name(name).map(|(_, ext)| ext)
    }
}

fn split_name(name: &str) -> Option<(&str, &str)> {
    let (stem, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some((stem, ext))
}

fn allowed_list() -> String {
    ALLOWED_EXTENSIONS
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn reject(reason: &str) -> ScriptboxError {
    ScriptboxError::Validation {
        reason: reason.to_string(),
    }
}
