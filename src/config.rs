use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use cross_xdg::BaseDirs;
use tracing::{debug, warn};

use crate::tape::TapePolicy;

/// Run settings read from `bf.toml`. Every field is optional; anything
/// missing falls through to environment variables or built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSettings {
    pub memory: Option<usize>,
    pub tape: Option<TapePolicy>,
    pub timeout_ms: Option<u64>,
    pub max_steps: Option<usize>,
}

static SETTINGS: OnceLock<RunSettings> = OnceLock::new();

/// Settings from the config file, loaded once per process.
pub fn settings() -> &'static RunSettings {
    SETTINGS.get_or_init(|| load_from_toml().unwrap_or_default())
}

/// `$BF_CONFIG` if set, otherwise `bf.toml` in the XDG config home.
fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("BF_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

fn load_from_toml() -> Option<RunSettings> {
    let path = config_path()?;
    let content = fs::read_to_string(&path).ok()?;
    debug!(path = %path.display(), "loaded config");
    Some(parse(&content))
}

/// Parse the `[run]` section of a config file.
///
/// Very small hand-rolled parser: `key = value` pairs, values optionally
/// quoted, `#` comments. Unknown keys and unparsable values are skipped.
pub fn parse(content: &str) -> RunSettings {
    let mut in_run = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_run = line[1..line.len() - 1].trim() == "run";
            continue;
        }
        if !in_run { continue; }
        if let Some((key, val_raw)) = line.split_once('=') {
            let val_raw = val_raw.trim();
            // Accept quoted or unquoted
            let val = val_raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(val_raw);
            map.insert(key.trim().to_string(), val.to_string());
        }
    }

    let mut cfg = RunSettings::default();

    macro_rules! set {
        ($field:ident, $key:literal, $parse:expr) => {
            if let Some(raw) = map.remove($key) {
                match $parse(raw.as_str()) {
                    Some(v) => cfg.$field = Some(v),
                    None => warn!(key = $key, value = %raw, "ignoring invalid config value"),
                }
            }
        };
    }

    set!(memory, "memory", |s: &str| s.parse::<usize>().ok().filter(|&n| n > 0));
    set!(tape, "tape", |s: &str| s.parse::<TapePolicy>().ok());
    set!(timeout_ms, "timeout_ms", |s: &str| s.parse::<u64>().ok());
    set!(max_steps, "max_steps", |s: &str| s.parse::<usize>().ok());

    for key in map.keys() {
        warn!(key = %key, "ignoring unknown config key");
    }

    cfg
}

/// Resolve one setting: flag, then environment variable, then config file.
pub fn resolve<T: FromStr>(flag: Option<T>, env_key: &str, file: Option<T>) -> Option<T> {
    resolve_where(flag, env_key, file, |_| true)
}

/// Like [`resolve`], but a value rejected by `valid` at any level falls
/// through to the next one instead of shadowing it.
pub fn resolve_where<T, F>(flag: Option<T>, env_key: &str, file: Option<T>, valid: F) -> Option<T>
where
    T: FromStr,
    F: Fn(&T) -> bool,
{
    flag.filter(&valid)
        .or_else(|| from_env(env_key).filter(&valid))
        .or_else(|| file.filter(&valid))
}

fn from_env<T: FromStr>(env_key: &str) -> Option<T> {
    let raw = std::env::var(env_key).ok()?;
    let parsed = raw.trim().parse::<T>().ok();
    if parsed.is_none() {
        warn!(key = env_key, value = %raw, "ignoring invalid environment value");
    }
    parsed
}
