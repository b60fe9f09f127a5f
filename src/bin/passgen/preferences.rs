//! The saved generation preferences, and the operations on them.
//!
//! Preferences are a [`GenerationRequest`] stored as YAML. They are a convenience: a missing or
//! unreadable file just means the defaults are used. An unreadable file is left alone until the
//! user fixes or resets it.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{or_default_preferences, ProgError};
use passgen::GenerationRequest;

/// Preferences as read from disk.
pub(crate) struct Loaded {
    pub request: GenerationRequest,
    /// An existing file could not be read or parsed, and `request` holds the defaults instead.
    /// Saving over such a file would throw the user's settings away.
    pub unusable_file: bool,
}

pub(crate) fn load(path: &Path) -> Loaded {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("no preferences at {}; using defaults", path.display());
            return Loaded {
                request: GenerationRequest::default(),
                unusable_file: false,
            };
        }
        Err(err) => {
            log::warn!(
                "failed to read preferences from {}, using defaults: {}",
                path.display(),
                err
            );
            return Loaded {
                request: GenerationRequest::default(),
                unusable_file: true,
            };
        }
    };
    match serde_yaml::from_slice(&data) {
        Ok(request) => Loaded {
            request,
            unusable_file: false,
        },
        Err(err) => {
            log::warn!(
                "ignoring malformed preferences in {}, using defaults: {}",
                path.display(),
                err
            );
            Loaded {
                request: GenerationRequest::default(),
                unusable_file: true,
            }
        }
    }
}

/// Write the preferences next to their final location, then move them into place.
pub(crate) fn save(path: &Path, request: &GenerationRequest) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let temp_path = {
        let mut file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("{} is not a file path", path.display()))?
            .to_os_string();
        file_name.push(".writing");
        path.with_file_name(file_name)
    };

    let data = serde_yaml::to_string(request).context("failed to serialize preferences")?;
    fs::write(&temp_path, data)
        .with_context(|| format!("failed to write preferences to {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("failed to move preferences into place at {}", path.display()))?;
    log::debug!("saved preferences to {}", path.display());
    Ok(())
}

struct PreferenceRow {
    name: &'static str,
    value: String,
}

impl crate::table::TableDisplay for PreferenceRow {
    const COLUMNS: &'static [&'static str] = &["Preference", "Value"];

    fn cell(&self, column_index: usize) -> &str {
        match column_index {
            0 => self.name,
            _ => &self.value,
        }
    }
}

fn preference_rows(request: &GenerationRequest) -> Vec<PreferenceRow> {
    let yes_no = |b: bool| String::from(if b { "yes" } else { "no" });
    vec![
        PreferenceRow {
            name: "length",
            value: request.length.to_string(),
        },
        PreferenceRow {
            name: "use_lowercase",
            value: yes_no(request.use_lowercase),
        },
        PreferenceRow {
            name: "use_uppercase",
            value: yes_no(request.use_uppercase),
        },
        PreferenceRow {
            name: "use_digits",
            value: yes_no(request.use_digits),
        },
        PreferenceRow {
            name: "use_special",
            value: yes_no(request.use_special),
        },
        PreferenceRow {
            name: "exclude_ambiguous",
            value: yes_no(request.exclude_ambiguous),
        },
    ]
}

pub(crate) fn show_preferences(preferences_path: Option<PathBuf>) -> Result<(), ProgError> {
    let preferences_path = or_default_preferences(preferences_path)?;
    let request = load(&preferences_path).request;
    eprintln!("Preferences at {}", preferences_path.display());
    crate::table::display_table(&preference_rows(&request), io::stdout().lock())
        .context("failed to output table")?;
    Ok(())
}

pub(crate) fn edit_preferences(preferences_path: Option<PathBuf>) -> Result<(), ProgError> {
    let preferences_path = or_default_preferences(preferences_path)?;
    let request = load(&preferences_path).request;

    let mut temp_file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .context("failed to create temporary file, prior to opening it in your editor")?;
    let yaml = serde_yaml::to_string(&request).context("failed to serialize preferences")?;
    temp_file
        .write_all(PREFERENCES_HEADER.as_bytes())
        .and_then(|()| temp_file.write_all(yaml.as_bytes()))
        .and_then(|()| temp_file.flush())
        .context("failed to write preferences to temporary file")?;

    let edited = crate::editor::edit_yaml_until_valid(
        &mut temp_file,
        |request: &GenerationRequest| passgen::policy::resolve(request).map(drop),
    )?;
    save(&preferences_path, &edited)?;
    eprintln!("Preferences saved to {}", preferences_path.display());
    Ok(())
}

pub(crate) fn reset_preferences(
    preferences_path: Option<PathBuf>,
    skip_confirmation: bool,
) -> Result<(), ProgError> {
    let preferences_path = or_default_preferences(preferences_path)?;
    if !skip_confirmation {
        let confirm_reset = dialoguer::Confirm::new()
            .with_prompt("Restore the default preferences?")
            .default(false)
            .interact()
            .context("failed to prompt you, somehow")?;
        if !confirm_reset {
            return Err(ProgError::ResetAborted);
        }
    }
    save(&preferences_path, &GenerationRequest::default())?;
    eprintln!("Preferences at {} reset to defaults.", preferences_path.display());
    Ok(())
}

static PREFERENCES_HEADER: &str = "\
# Password generation preferences.
#   length: 1 to 256 characters
#   at least one of the use_* classes must be enabled
#   exclude_ambiguous leaves out i l o I O 1 0
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load(&dir.path().join("preferences.yaml"));
        assert_eq!(loaded.request, GenerationRequest::default());
        assert!(!loaded.unusable_file);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.yaml");
        fs::write(&path, "length: [not, a, number]\n").unwrap();
        let loaded = load(&path);
        assert_eq!(loaded.request, GenerationRequest::default());
        assert!(loaded.unusable_file);
    }

    #[test]
    fn saved_preferences_are_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.yaml");
        let request = GenerationRequest {
            length: 24,
            use_special: false,
            exclude_ambiguous: true,
            ..GenerationRequest::default()
        };
        save(&path, &request).unwrap();
        let loaded = load(&path);
        assert_eq!(loaded.request, request);
        assert!(!loaded.unusable_file);
        assert!(!dir.path().join("nested").join("preferences.yaml.writing").exists());
    }

    #[test]
    fn header_is_valid_yaml_comment() {
        let yaml = format!(
            "{}{}",
            PREFERENCES_HEADER,
            serde_yaml::to_string(&GenerationRequest::default()).unwrap()
        );
        let request: GenerationRequest = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(request, GenerationRequest::default());
    }

    #[test]
    fn rows_use_file_keys() {
        let rows = preference_rows(&GenerationRequest::default());
        let rendered = rows
            .iter()
            .map(|row| format!("{}={}", row.name, row.value))
            .collect::<Vec<_>>();
        assert_eq!(
            rendered,
            [
                "length=16",
                "use_lowercase=yes",
                "use_uppercase=yes",
                "use_digits=yes",
                "use_special=yes",
                "exclude_ambiguous=no",
            ]
        );
    }
}
