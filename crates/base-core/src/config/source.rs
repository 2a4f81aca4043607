use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ConfigurationError;

/// A provider of raw `key -> value` configuration entries.
pub trait ConfigSource {
    /// Human-readable label used in logs and errors.
    fn name(&self) -> String;

    fn load(&self) -> Result<BTreeMap<String, String>, ConfigurationError>;
}

/// A dotenv-format file. A missing file contributes nothing.
///
/// Unquoted values run to the end of the line (minus a trailing ` # comment`),
/// so `project_name=My Bot` reads as `My Bot`.
#[derive(Debug, Clone)]
pub struct EnvFileSource {
    path: PathBuf,
}

impl EnvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn source_error(&self, reason: impl ToString) -> ConfigurationError {
        ConfigurationError::Source {
            source_name: self.name(),
            reason: reason.to_string(),
        }
    }
}

impl ConfigSource for EnvFileSource {
    fn name(&self) -> String {
        format!("env file {}", self.path.display())
    }

    fn load(&self) -> Result<BTreeMap<String, String>, ConfigurationError> {
        if !self.path.is_file() {
            debug!(path = %self.path.display(), "env file not present, skipping");
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| self.source_error(e))?;
        let normalized = quote_bare_values(&contents);
        let mut values = BTreeMap::new();
        for item in dotenvy::from_read_iter(normalized.as_bytes()) {
            let (key, value) = item.map_err(|e| self.source_error(e))?;
            values.insert(key, value);
        }
        Ok(values)
    }
}

/// Rewrite unquoted values that contain whitespace as double-quoted values,
/// which `dotenvy` otherwise rejects. Quoted and multi-line values pass through.
fn quote_bare_values(contents: &str) -> String {
    let mut out = String::with_capacity(contents.len());
    let mut open_quote: Option<char> = None;
    for line in contents.lines() {
        if let Some(quote) = open_quote {
            if has_closing_quote(line, quote) {
                open_quote = None;
            }
            out.push_str(line);
            out.push('\n');
            continue;
        }
        match split_assignment(line) {
            Some((head, value)) => {
                let value = value.trim_start();
                match value.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        if !has_closing_quote(&value[1..], quote) {
                            open_quote = Some(quote);
                        }
                        out.push_str(line);
                    }
                    Some(_) => {
                        let bare = strip_inline_comment(value).trim_end();
                        if bare.contains(char::is_whitespace) {
                            out.push_str(head);
                            out.push('"');
                            for c in bare.chars() {
                                if c == '"' || c == '\\' {
                                    out.push('\\');
                                }
                                out.push(c);
                            }
                            out.push('"');
                        } else {
                            out.push_str(line);
                        }
                    }
                    None => out.push_str(line),
                }
            }
            None => out.push_str(line),
        }
        out.push('\n');
    }
    out
}

/// `("KEY=", "value...")` for assignment lines; `None` for blanks and comments.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let eq = line.find('=')?;
    Some((&line[..=eq], &line[eq + 1..]))
}

fn has_closing_quote(text: &str, quote: char) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '\\' if quote == '"' && !escaped => escaped = true,
            c if c == quote && !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}

fn strip_inline_comment(value: &str) -> &str {
    value
        .as_bytes()
        .windows(2)
        .position(|w| matches!(w[0], b' ' | b'\t') && w[1] == b'#')
        .map_or(value, |i| &value[..i])
}

/// The live process environment. Entries that are not valid UTF-8 are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvSource;

impl ConfigSource for ProcessEnvSource {
    fn name(&self) -> String {
        "process environment".to_owned()
    }

    fn load(&self) -> Result<BTreeMap<String, String>, ConfigurationError> {
        Ok(std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect())
    }
}

/// An explicit in-memory map, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    name: String,
    values: BTreeMap<String, String>,
}

impl MapSource {
    pub fn new<I, K, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<BTreeMap<String, String>, ConfigurationError> {
        Ok(self.values.clone())
    }
}

/// Merge `sources` in order. Keys are lowercased, so matching is case-insensitive.
pub fn merge_sources(
    sources: &[&dyn ConfigSource],
) -> Result<BTreeMap<String, String>, ConfigurationError> {
    let mut merged = BTreeMap::new();
    for source in sources {
        let values = source.load()?;
        debug!(source = %source.name(), keys = values.len(), "loaded configuration source");
        for (key, value) in values {
            merged.insert(key.to_lowercase(), value);
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_env(contents: &str) -> (tempfile::TempDir, EnvFileSource) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, contents).unwrap();
        (dir, EnvFileSource::new(path))
    }

    fn value<'a>(values: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
        values.get(key).map(String::as_str)
    }

    #[test]
    fn later_source_wins() {
        let file = MapSource::new("file", [("redis_host", "file-host"), ("redis_db", "1")]);
        let env = MapSource::new("env", [("redis_host", "env-host")]);
        let merged = merge_sources(&[&file, &env]).unwrap();
        assert_eq!(value(&merged, "redis_host"), Some("env-host"));
        assert_eq!(value(&merged, "redis_db"), Some("1"));
    }

    #[test]
    fn keys_are_case_insensitive_across_sources() {
        let file = MapSource::new("file", [("postgres_host", "from-file")]);
        let env = MapSource::new("env", [("POSTGRES_HOST", "from-env")]);
        let merged = merge_sources(&[&file, &env]).unwrap();
        assert_eq!(value(&merged, "postgres_host"), Some("from-env"));
        assert!(!merged.contains_key("POSTGRES_HOST"));
    }

    #[test]
    fn env_file_is_parsed() {
        let (_dir, source) = write_env(
            "# comment\nREDIS_HOST=cache\nredis_port=6380\nBOT_TOKEN=\"quoted value\"\n",
        );
        let values = source.load().unwrap();
        assert_eq!(value(&values, "REDIS_HOST"), Some("cache"));
        assert_eq!(value(&values, "redis_port"), Some("6380"));
        assert_eq!(value(&values, "BOT_TOKEN"), Some("quoted value"));
    }

    #[test]
    fn should_read_unquoted_values_with_spaces() {
        let (_dir, source) = write_env(
            "project_name=My Bot\nPROJECT_VERSION=1.0.0\nS3_DOMAIN=cdn example # note\n",
        );
        let values = source.load().unwrap();
        assert_eq!(value(&values, "project_name"), Some("My Bot"));
        assert_eq!(value(&values, "PROJECT_VERSION"), Some("1.0.0"));
        assert_eq!(value(&values, "S3_DOMAIN"), Some("cdn example"));
    }

    #[test]
    fn should_keep_quotes_and_backslashes_in_bare_values() {
        let (_dir, source) = write_env("secret_key=a \"b\" c\\d\n");
        let values = source.load().unwrap();
        assert_eq!(value(&values, "secret_key"), Some("a \"b\" c\\d"));
    }

    #[test]
    fn should_pass_multiline_quoted_values_through() {
        let (_dir, source) = write_env("CERT=\"line one\nline two\"\nAFTER=x y\n");
        let values = source.load().unwrap();
        assert_eq!(value(&values, "CERT"), Some("line one\nline two"));
        assert_eq!(value(&values, "AFTER"), Some("x y"));
    }

    #[test]
    fn missing_env_file_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = EnvFileSource::new(dir.path().join("absent.env"));
        assert!(source.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_env_file_is_a_source_error() {
        let (_dir, source) = write_env("VALID=1\n=no key\n");
        let err = source.load().unwrap_err();
        assert_eq!(err.kind(), "SOURCE");
        assert!(err.to_string().contains(".env"));
    }

    #[test]
    fn process_env_is_readable() {
        // PATH is present in any test environment.
        let values = ProcessEnvSource.load().unwrap();
        assert!(values.contains_key("PATH"));
    }
}
