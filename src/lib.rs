use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::Serialize;

pub mod password_generation;
pub mod policy;
pub mod strength;

pub use policy::{CharacterClass, Charsets, GenerationRequest, ResolvedPools, ValidationError};
pub use strength::{assess, Strength, StrengthAssessment};

/// Resolve `request` and generate a password from it, using the operating system's secure random
/// number generator.
pub fn resolve_and_generate(
    request: &GenerationRequest,
) -> Result<GeneratedPassword, GenerationError> {
    resolve_and_generate_with(&mut OsRng, request, &Charsets::default())
}

/// Like [`resolve_and_generate`], but with a caller-supplied random source and character sets.
pub fn resolve_and_generate_with<R>(
    rng: &mut R,
    request: &GenerationRequest,
    charsets: &Charsets,
) -> Result<GeneratedPassword, GenerationError>
where
    R: RngCore + CryptoRng,
{
    let pools = policy::resolve_with(request, charsets)?;
    let password = password_generation::generate(rng, &pools, request.length)?;
    Ok(password)
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid password request: {0}")]
    Validation(#[from] ValidationError),
    /// The secure random source failed. There is no fallback to a weaker generator.
    #[error("the secure random number generator failed: {0}")]
    RandomSource(#[from] rand::Error),
}

/// A freshly generated password. The caller owns it; its `Debug` output doesn't reveal it.
#[derive(Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeneratedPassword(String);

opaque_debug::implement!(GeneratedPassword);

impl GeneratedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
