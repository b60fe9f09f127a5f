use std::env;
use std::path::PathBuf;
use std::process;

use clap::Parser;

mod assess;
mod editor;
mod generate;
mod preferences;
mod table;

#[derive(Parser)]
enum Args {
    /// Generate a new password. Options not given on the command line are taken from the saved
    /// preferences, and the result is saved back as the new preferences.
    Generate(generate::GenerateArgs),
    /// Score the strength of an existing password.
    Assess {
        /// The password to score. Read from the terminal, without echo, if omitted.
        password: Option<String>,
        /// Print the assessment as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Commands for dealing with the saved generation preferences.
    #[command(subcommand, alias = "prefs")]
    Preferences(PreferencesCommand),
}

#[derive(clap::Subcommand)]
enum PreferencesCommand {
    /// Show the saved preferences.
    Show {
        #[arg(long)]
        preferences: Option<PathBuf>,
    },
    /// Edit the saved preferences in your editor.
    Edit {
        #[arg(long)]
        preferences: Option<PathBuf>,
    },
    /// Restore the default preferences.
    Reset {
        #[arg(long)]
        preferences: Option<PathBuf>,
        /// Don't ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
}

fn run() -> Result<(), ProgError> {
    let args = Args::parse();

    match args {
        Args::Generate(args) => generate::generate_password(args)?,
        Args::Assess { password, json } => assess::assess_password(password, json)?,
        Args::Preferences(PreferencesCommand::Show { preferences }) => {
            preferences::show_preferences(preferences)?
        }
        Args::Preferences(PreferencesCommand::Edit { preferences }) => {
            preferences::edit_preferences(preferences)?
        }
        Args::Preferences(PreferencesCommand::Reset { preferences, yes }) => {
            preferences::reset_preferences(preferences, yes)?
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("PASSGEN_LOG", "warn")).init();

    match run() {
        Ok(()) => (),
        Err(err) => {
            log::debug!("{err:?}");
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

fn or_default_preferences(preferences_path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match preferences_path {
        Some(p) => Ok(p),
        None => default_preferences(),
    }
}

fn default_preferences() -> anyhow::Result<PathBuf> {
    if let Some(path) = env::var_os("PASSGEN_PREFERENCES") {
        return Ok(PathBuf::from(path));
    }
    let home = env::var_os("HOME")
        .ok_or_else(|| anyhow::anyhow!("HOME is not set; cannot find home directory of user"))?;
    let default_path = {
        let mut p = PathBuf::from(home);
        p.push(".passgen");
        p.push("preferences.yaml");
        p
    };
    Ok(default_path)
}

#[derive(Debug, thiserror::Error)]
enum ProgError {
    #[error("At least one character set must be selected.")]
    NoClassSelected,
    #[error("Editing cancelled; exiting.")]
    EditingCancelled,
    #[error("Reset aborted; exiting.")]
    ResetAborted,
    #[error("Could not generate a password: {0}")]
    Generation(passgen::GenerationError),
    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for ProgError {
    fn from(err: anyhow::Error) -> ProgError {
        ProgError::Other(err)
    }
}

impl From<passgen::GenerationError> for ProgError {
    fn from(err: passgen::GenerationError) -> ProgError {
        match err {
            passgen::GenerationError::Validation(passgen::ValidationError::NoClassSelected) => {
                ProgError::NoClassSelected
            }
            err => ProgError::Generation(err),
        }
    }
}
