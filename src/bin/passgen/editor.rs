use std::borrow::Cow;
use std::env;
use std::ffi::OsStr;
use std::fmt::Display;
use std::io::{self, Seek};
use std::path::Path;
use std::process::Command;

use anyhow::Context;

pub(crate) fn run_editor(path: &Path) -> Result<(), crate::ProgError> {
    let editor = env::var_os("EDITOR")
        .map(Cow::from)
        .unwrap_or_else(|| Cow::from(OsStr::new("vim")));
    let exit_status = Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("failed to run your editor (`{}`)", editor.to_string_lossy()))?;
    if exit_status.success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "your editor (`{}`) exited with {}",
            editor.to_string_lossy(),
            exit_status
        )
        .into())
    }
}

/// Open `temp_file` in the user's editor until its contents parse as YAML and pass `validate`.
///
/// After each failed attempt the problem is shown and the user is asked whether to keep editing;
/// declining ends with [`crate::ProgError::EditingCancelled`].
pub(crate) fn edit_yaml_until_valid<T, V, E>(
    temp_file: &mut tempfile::NamedTempFile,
    validate: V,
) -> Result<T, crate::ProgError>
where
    T: serde::de::DeserializeOwned,
    V: Fn(&T) -> Result<(), E>,
    E: Display,
{
    loop {
        run_editor(temp_file.path())?;

        temp_file
            .seek(io::SeekFrom::Start(0))
            .context("failed to seek in temporary file")?;
        match serde_yaml::from_reader::<_, T>(&mut *temp_file) {
            Ok(value) => match validate(&value) {
                Ok(()) => return Ok(value),
                Err(err) => eprintln!("The result is not valid: {}", err),
            },
            Err(err) => eprintln!("Failed to parse the result: {}", err),
        }

        let edit_again = dialoguer::Confirm::new()
            .with_prompt("Edit again?")
            .default(true)
            .interact()
            .context("failed to prompt you, somehow")?;
        if !edit_again {
            return Err(crate::ProgError::EditingCancelled);
        }
    }
}
