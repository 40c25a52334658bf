use anyhow::{bail, Context, Result};
use bstr::ByteSlice;
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where one input's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => f.write_str("(stdin)"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Source {
    pub fn read(&self) -> Result<String> {
        let bytes = match self {
            Source::Stdin => {
                let mut buf = Vec::new();
                io::stdin()
                    .read_to_end(&mut buf)
                    .context("failed to read stdin")?;
                buf
            }
            Source::File(path) => {
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
            }
        };
        decode(&bytes).with_context(|| format!("failed to decode {}", self))
    }
}

/// Validate `bytes` as UTF-8, dropping a leading byte order mark.
pub fn decode(bytes: &[u8]) -> Result<String> {
    match bytes.to_str() {
        Ok(text) => Ok(text.strip_prefix('\u{FEFF}').unwrap_or(text).to_string()),
        Err(err) => bail!("invalid UTF-8 at byte {}", err.valid_up_to()),
    }
}

/// Expand command-line inputs into the sources to read, in order.
pub fn collect_sources(inputs: &[String], recursive: bool) -> Result<Vec<Source>> {
    if inputs.is_empty() {
        return Ok(vec![Source::Stdin]);
    }

    let mut sources = Vec::new();
    for input in inputs {
        if input == "-" {
            sources.push(Source::Stdin);
            continue;
        }
        let path = Path::new(input);
        if path.is_dir() {
            if !recursive {
                bail!("{} is a directory (use --recursive to search it)", input);
            }
            sources.extend(walk_directory(path)?);
        } else if path.exists() {
            sources.push(Source::File(path.to_path_buf()));
        } else if is_glob(input) {
            let matched = expand_glob(input)?;
            if matched.is_empty() {
                bail!("no files match {}", input);
            }
            sources.extend(matched);
        } else {
            bail!("{}: no such file or directory", input);
        }
    }
    Ok(sources)
}

fn is_glob(input: &str) -> bool {
    input.contains(|c: char| matches!(c, '*' | '?' | '['))
}

fn expand_glob(pattern: &str) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern {}", pattern))? {
        let path = entry.with_context(|| format!("failed to expand {}", pattern))?;
        if path.is_file() {
            sources.push(Source::File(path));
        }
    }
    Ok(sources)
}

fn walk_directory(root: &Path) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_file() && has_edn_extension(entry.path()) {
            sources.push(Source::File(entry.into_path()));
        }
    }
    Ok(sources)
}

fn has_edn_extension(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("edn"))
}
