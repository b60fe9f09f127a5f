use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::Context;
use rand::rngs::OsRng;
use serde::Serialize;

use crate::{or_default_preferences, preferences, ProgError};
use passgen::{CharacterClass, Charsets, GeneratedPassword, GenerationRequest, StrengthAssessment};

#[derive(clap::Args)]
pub(crate) struct GenerateArgs {
    #[arg(long)]
    preferences: Option<PathBuf>,
    /// Length of the password, in characters.
    #[arg(short, long)]
    length: Option<usize>,
    #[arg(long, overrides_with = "no_lowercase")]
    lowercase: bool,
    #[arg(long, overrides_with = "lowercase")]
    no_lowercase: bool,
    #[arg(long, overrides_with = "no_uppercase")]
    uppercase: bool,
    #[arg(long, overrides_with = "uppercase")]
    no_uppercase: bool,
    #[arg(long, overrides_with = "no_digits")]
    digits: bool,
    #[arg(long, overrides_with = "digits")]
    no_digits: bool,
    #[arg(long, overrides_with = "no_special")]
    special: bool,
    #[arg(long, overrides_with = "special")]
    no_special: bool,
    /// Leave out characters that are easily mistaken for one another (`i l o I O 1 0`).
    #[arg(long, overrides_with = "include_ambiguous")]
    exclude_ambiguous: bool,
    #[arg(long, overrides_with = "exclude_ambiguous")]
    include_ambiguous: bool,
    /// Use these characters as the special set, for this password only.
    #[arg(long, value_name = "CHARS")]
    special_chars: Option<String>,
    /// Copy the password to the clipboard.
    #[arg(long)]
    copy: bool,
    /// Print the password and its assessment as JSON.
    #[arg(long)]
    json: bool,
    /// Don't remember these options for next time.
    #[arg(long)]
    no_save: bool,
}

impl GenerateArgs {
    /// Layer the options given on the command line over `request`.
    fn apply(&self, request: &mut GenerationRequest) {
        if let Some(length) = self.length {
            request.length = length;
        }
        let switches = [
            (CharacterClass::Lowercase, self.lowercase, self.no_lowercase),
            (CharacterClass::Uppercase, self.uppercase, self.no_uppercase),
            (CharacterClass::Digit, self.digits, self.no_digits),
            (CharacterClass::Special, self.special, self.no_special),
        ];
        for (class, on, off) in switches {
            if let Some(enabled) = switch(on, off) {
                request.set_enabled(class, enabled);
            }
        }
        if let Some(exclude) = switch(self.exclude_ambiguous, self.include_ambiguous) {
            request.exclude_ambiguous = exclude;
        }
    }

    fn charsets(&self) -> Charsets {
        match &self.special_chars {
            Some(special) => Charsets {
                special: special.clone(),
                ..Charsets::default()
            },
            None => Charsets::default(),
        }
    }
}

fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Serialize)]
struct GeneratedJson<'a> {
    password: &'a GeneratedPassword,
    #[serde(flatten)]
    assessment: StrengthAssessment,
}

pub(crate) fn generate_password(args: GenerateArgs) -> Result<(), ProgError> {
    let preferences_path = or_default_preferences(args.preferences.clone())?;
    let loaded = preferences::load(&preferences_path);
    let mut request = loaded.request;
    args.apply(&mut request);

    let password = passgen::resolve_and_generate_with(&mut OsRng, &request, &args.charsets())?;
    let assessment = passgen::assess(password.as_str());

    if args.json {
        let output = GeneratedJson {
            password: &password,
            assessment,
        };
        let mut stdout = io::stdout().lock();
        serde_json::to_writer(&mut stdout, &output)
            .context("failed to write the password as JSON to stdout")?;
        writeln!(stdout).context("failed to write to stdout")?;
    } else {
        println!("{}", password.as_str());
        eprintln!("{}", crate::assess::render_meter(&assessment, true));
    }

    if args.copy {
        send_to_clipboard(password.as_str().as_bytes())
            .context("failed to copy the password to the clipboard")?;
        eprintln!("Copied to the clipboard.");
    }

    if args.no_save {
        log::debug!("not saving preferences, as asked");
    } else if loaded.unusable_file {
        eprintln!(
            "Not saving preferences: {} could not be read. Fix it with `passgen preferences edit`, \
             or replace it with `passgen preferences reset`.",
            preferences_path.display()
        );
    } else {
        // Not being able to remember the options shouldn't cost the user their password.
        if let Err(err) = preferences::save(&preferences_path, &request) {
            log::warn!("{err:#}");
        }
    }
    Ok(())
}

fn send_to_clipboard(data: &[u8]) -> anyhow::Result<()> {
    let mut child = clipboard_cmd()
        .stdin(Stdio::piped())
        .spawn()
        .context("failed to start the clipboard helper")?;
    child
        .stdin
        .take()
        .ok_or_else(|| anyhow::anyhow!("the clipboard helper has no stdin"))?
        .write_all(data)?;
    let status = child.wait()?;
    if !status.success() {
        anyhow::bail!("the clipboard helper exited with {}", status);
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn clipboard_cmd() -> Command {
    Command::new("pbcopy")
}

#[cfg(not(target_os = "macos"))]
fn clipboard_cmd() -> Command {
    let mut cmd = Command::new("xsel");
    cmd.arg("-b");
    cmd
}
