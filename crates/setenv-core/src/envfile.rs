//! `.env` file rendering.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use zeroize::Zeroizing;

/// Header written at the top of every generated file.
const HEADER: &str = "# Generated by setenv. Do not edit; re-run `setenv generate` instead.\n";

/// Whether `key` is usable as an environment variable name.
///
/// Allowed: ASCII letters, digits and underscore, not starting with a digit.
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote a value when a dotenv parser would otherwise misread it.
fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.chars().any(|c| {
            c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$' | '`' | '=')
        });
    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '$' => quoted.push_str("\\$"),
            '`' => quoted.push_str("\\`"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Render `KEY=value` lines in iteration order.
///
/// The output may contain secrets, so it is wiped when dropped.
pub fn render<'a, I>(entries: I) -> Zeroizing<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = Zeroizing::new(String::from(HEADER));
    for (key, value) in entries {
        out.push_str(key);
        out.push('=');
        out.push_str(&quote(value));
        out.push('\n');
    }
    out
}

/// Write `contents` to `path` atomically, with mode 0600 on Unix.
///
/// The temp file is created 0600 in the target's directory and removed if
/// the final rename fails.
pub fn write(path: &Path, contents: &str) -> std::io::Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
