//! File discovery for WindCube file sources
//!
//! File sources describe their files with path segments and a file name
//! template. Both may contain strftime specifiers (`%Y`, `%m`, `%d`, ...)
//! that are rendered with the local begin time of a file, and glob
//! wildcards (`*`, `?`) for parts of the name that vary between instruments.

use crate::config::FileSource;
use crate::error::{Result, WindCubeError};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt::Write;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locates the physical files of a file source
pub trait FileDiscovery: Send + Sync {
    /// The single best matching file for catalog building
    fn resolve_first(&self, file_source: &FileSource) -> Result<Option<PathBuf>>;

    /// The file covering the period starting at `file_begin`
    fn resolve_for(
        &self,
        file_source: &FileSource,
        file_begin: DateTime<Utc>,
    ) -> Result<Option<PathBuf>>;
}

/// Template and glob based discovery below a data root
#[derive(Debug, Clone)]
pub struct TemplateFileDiscovery {
    root: PathBuf,
}

impl TemplateFileDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pattern_for(
        &self,
        file_source: &FileSource,
        mut render: impl FnMut(&str) -> Result<String>,
    ) -> Result<String> {
        let mut pattern = glob::Pattern::escape(&self.root.to_string_lossy());

        for part in file_source
            .path_segments
            .iter()
            .chain(std::iter::once(&file_source.file_name_template))
        {
            if !pattern.ends_with(std::path::MAIN_SEPARATOR) {
                pattern.push(std::path::MAIN_SEPARATOR);
            }
            pattern.push_str(&render(part.as_str())?);
        }

        Ok(pattern)
    }
}

impl FileDiscovery for TemplateFileDiscovery {
    fn resolve_first(&self, file_source: &FileSource) -> Result<Option<PathBuf>> {
        let pattern = self.pattern_for(file_source, |part| Ok(wildcard_specifiers(part)))?;
        let mut matches = glob_files(&pattern)?;

        debug!("Pattern {} matched {} file(s)", pattern, matches.len());
        Ok(matches.pop())
    }

    fn resolve_for(
        &self,
        file_source: &FileSource,
        file_begin: DateTime<Utc>,
    ) -> Result<Option<PathBuf>> {
        let local_begin = file_begin.naive_utc() + file_source.utc_offset;
        let pattern = self.pattern_for(file_source, |part| render_template(part, local_begin))?;
        let matches = glob_files(&pattern)?;

        Ok(matches.into_iter().next())
    }
}

/// Render strftime specifiers of `template` with `time`
pub fn render_template(template: &str, time: NaiveDateTime) -> Result<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", time.format(template)).map_err(|_| {
        WindCubeError::configuration(format!("Invalid file name template '{}'", template))
    })?;
    Ok(rendered)
}

/// Replace every strftime specifier of `template` with a `*` wildcard
pub fn wildcard_specifiers(template: &str) -> String {
    let mut pattern = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c == '*' {
            push_wildcard(&mut pattern);
            continue;
        }
        if c != '%' {
            pattern.push(c);
            continue;
        }

        match chars.next() {
            Some('%') => pattern.push('%'),
            Some('-' | '_' | '0') => {
                chars.next();
                push_wildcard(&mut pattern);
            }
            Some(_) => push_wildcard(&mut pattern),
            None => pattern.push('%'),
        }
    }

    pattern
}

fn push_wildcard(pattern: &mut String) {
    if !pattern.ends_with('*') {
        pattern.push('*');
    }
}

/// Sorted regular files matching a glob pattern
fn glob_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| {
        WindCubeError::configuration(format!("Invalid file pattern '{}': {}", pattern, e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| WindCubeError::Io(io::Error::new(e.error().kind(), e.to_string())))?;
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
