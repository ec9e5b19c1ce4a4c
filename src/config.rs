//! Config file + CLI collaborator contract (spec §4.H, §6).
//!
//! Looks up `/etc/ngprc` then `./ngprc`, parses the editor template and
//! extension/specific-filename lists, and combines them with CLI flags
//! into the immutable [`FilterSet`] the walker consumes.

use crate::cli::Cli;
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::{env, fs};

/// A filesystem node identifier, used to recognize an excluded directory
/// regardless of the path string used to reach it (spec §3: "Excluded
/// directories: a set of filesystem node identifiers (inode-equivalents)").
#[cfg(unix)]
pub type NodeId = (u64, u64);
#[cfg(not(unix))]
pub type NodeId = PathBuf;

#[cfg(unix)]
fn node_id(path: &Path) -> std::io::Result<NodeId> {
    use std::os::unix::fs::MetadataExt;
    let meta = fs::metadata(path)?;
    Ok((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn node_id(path: &Path) -> std::io::Result<NodeId> {
    path.canonicalize()
}

/// Filter sets, owned by configuration and immutable during a run
/// (spec §3).
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub extensions: HashSet<String>,
    pub specifics: HashSet<String>,
    pub excluded: HashSet<NodeId>,
    pub raw: bool,
    pub follow_symlinks: bool,
}

impl FilterSet {
    /// Whether `name` (a file's basename) is eligible for scanning.
    #[must_use]
    pub fn is_eligible(&self, name: &str) -> bool {
        if self.raw {
            return true;
        }
        if self.specifics.contains(name) {
            return true;
        }
        let lower = name.to_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    #[must_use]
    pub fn is_excluded(&self, id: &NodeId) -> bool {
        self.excluded.contains(id)
    }
}

/// Lowercases an extension and ensures it carries a leading dot.
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    let lower = ext.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

/// Contents parsed out of `ngprc` (spec §6).
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub editor_template: String,
    pub extensions: HashSet<String>,
    pub specifics: HashSet<String>,
}

/// Extracts the first double-quoted substring in `line`, or `None` if
/// there isn't a matching pair.
fn extract_quoted(line: &str) -> Option<&str> {
    let start = line.find('"')? + 1;
    let rest = &line[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

fn config_search_paths() -> [PathBuf; 2] {
    [PathBuf::from("/etc/ngprc"), PathBuf::from("./ngprc")]
}

/// Loads and parses the config file, searching `/etc/ngprc` then
/// `./ngprc`. A missing config file is fatal (spec §6: "Missing config is
/// fatal").
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] if neither path exists,
/// [`ConfigError::Read`] on an I/O failure, or
/// [`ConfigError::NoEditorTemplate`] if no line in the file names
/// `editor_basename`.
pub fn load_config_file(editor_basename: &str) -> ConfigResult<ConfigFile> {
    load_config_from(&config_search_paths(), editor_basename)
}

/// Same as [`load_config_file`], but searches an explicit candidate list
/// instead of `/etc/ngprc`/`./ngprc` — used directly by tests, which
/// would otherwise need to mutate the process's current directory (a
/// piece of global state shared by every test in the binary).
///
/// # Errors
///
/// Same as [`load_config_file`].
pub fn load_config_from(candidates: &[PathBuf], editor_basename: &str) -> ConfigResult<ConfigFile> {
    let path = candidates
        .iter()
        .find(|p| p.exists())
        .ok_or(ConfigError::Missing)?;

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    let mut file = ConfigFile::default();
    let mut found_editor = false;

    for line in contents.lines() {
        if !line.contains(';') {
            continue;
        }
        let Some(value) = extract_quoted(line) else {
            continue;
        };
        // Recognized keys are a case-sensitive substring match within the
        // line (spec §6). The editor basename is checked first since
        // "extensions"/"files" are themselves just substrings that could
        // coincidentally appear elsewhere in an editor's name or path.
        if line.contains(editor_basename) {
            file.editor_template = value.to_string();
            found_editor = true;
        } else if line.contains("extensions") {
            file.extensions
                .extend(value.split_whitespace().map(normalize_extension));
        } else if line.contains("files") {
            file.specifics.extend(value.split_whitespace().map(String::from));
        }
    }

    if !found_editor {
        return Err(ConfigError::NoEditorTemplate {
            editor: editor_basename.to_string(),
        });
    }

    Ok(file)
}

/// Reads `$EDITOR`, defaulting to `vim` if unset, and returns only its
/// basename — the part used to select the matching config line (spec §6).
#[must_use]
pub fn editor_basename() -> String {
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
    Path::new(&editor)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(editor)
}

/// Resolves each excluded-directory path to a filesystem node identifier
/// once, at startup (spec §3, §6).
///
/// # Errors
///
/// Returns [`ConfigError::ExcludedDir`] if a path cannot be stat'd.
pub fn resolve_excluded_dirs(paths: &[PathBuf]) -> ConfigResult<HashSet<NodeId>> {
    paths
        .iter()
        .map(|p| node_id(p).map_err(|source| ConfigError::ExcludedDir { path: p.clone(), source }))
        .collect()
}

/// Combines CLI flags with the parsed config file into the immutable
/// [`FilterSet`] the walker consumes.
///
/// # Errors
///
/// Propagates [`resolve_excluded_dirs`]'s error.
pub fn build_filter_set(cli: &Cli, config: &ConfigFile) -> ConfigResult<FilterSet> {
    let (mut extensions, mut specifics) = (config.extensions.clone(), config.specifics.clone());

    if let Some(only) = &cli.only_extension {
        extensions = HashSet::from([normalize_extension(only)]);
        specifics = HashSet::new();
    }
    extensions.extend(cli.add_extension.iter().map(|e| normalize_extension(e)));

    Ok(FilterSet {
        extensions,
        specifics,
        excluded: resolve_excluded_dirs(&cli.exclude)?,
        raw: cli.raw,
        follow_symlinks: cli.follow_symlinks,
    })
}

/// Escapes `/` and `'` with a preceding backslash so a pattern survives the
/// editor's own search-command syntax (spec §4.H).
#[must_use]
pub fn sanitize_pattern_for_editor(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '/' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Expands the editor template's four positional parameters: line number,
/// file path, sanitized pattern, and a case-flag suffix appended when the
/// search was case-insensitive.
#[must_use]
pub fn expand_editor_template(
    template: &str,
    line_number: u32,
    file_path: &Path,
    pattern: &str,
    case_insensitive: bool,
) -> String {
    let sanitized = sanitize_pattern_for_editor(pattern);
    let case_suffix = if case_insensitive { "\\c" } else { "" };
    template
        .replace("{line}", &line_number.to_string())
        .replace("{file}", &file_path.to_string_lossy())
        .replace("{pattern}", &sanitized)
        .replace("{case}", case_suffix)
}
