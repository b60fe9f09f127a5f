//! Turning a generation request into the character pools a password is drawn from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shortest password that can be requested.
pub const MIN_LENGTH: usize = 1;
/// Longest password that can be requested.
pub const MAX_LENGTH: usize = 256;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SPECIAL: &str = "!@#$%^&*()_+~`|}{[]:;?><,./-=";

/// One of the four kinds of character a password can be built from.
///
/// The declaration order is significant: it is the order pools are concatenated in, and the
/// order in which classes receive a guaranteed character when the password is too short to hold
/// one of each.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    Lowercase,
    Uppercase,
    Digit,
    Special,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Lowercase,
        CharacterClass::Uppercase,
        CharacterClass::Digit,
        CharacterClass::Special,
    ];

    /// Glyphs in this class that are easily mistaken for one another.
    pub fn ambiguous(self) -> &'static [char] {
        match self {
            CharacterClass::Lowercase => &['i', 'l', 'o'],
            CharacterClass::Uppercase => &['I', 'O'],
            CharacterClass::Digit => &['1', '0'],
            CharacterClass::Special => &[],
        }
    }

    fn index(self) -> usize {
        match self {
            CharacterClass::Lowercase => 0,
            CharacterClass::Uppercase => 1,
            CharacterClass::Digit => 2,
            CharacterClass::Special => 3,
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CharacterClass::Lowercase => "lowercase",
            CharacterClass::Uppercase => "uppercase",
            CharacterClass::Digit => "digit",
            CharacterClass::Special => "special",
        };
        f.write_str(name)
    }
}

/// The base character sets each class starts from, before ambiguous characters are removed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Charsets {
    pub lowercase: String,
    pub uppercase: String,
    pub digits: String,
    pub special: String,
}

impl Charsets {
    pub fn get(&self, class: CharacterClass) -> &str {
        match class {
            CharacterClass::Lowercase => &self.lowercase,
            CharacterClass::Uppercase => &self.uppercase,
            CharacterClass::Digit => &self.digits,
            CharacterClass::Special => &self.special,
        }
    }
}

impl Default for Charsets {
    fn default() -> Charsets {
        Charsets {
            lowercase: LOWERCASE.to_owned(),
            uppercase: UPPERCASE.to_owned(),
            digits: DIGITS.to_owned(),
            special: SPECIAL.to_owned(),
        }
    }
}

/// What the caller wants a password to look like.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationRequest {
    pub length: usize,
    pub use_lowercase: bool,
    pub use_uppercase: bool,
    pub use_digits: bool,
    pub use_special: bool,
    pub exclude_ambiguous: bool,
}

impl GenerationRequest {
    pub fn is_enabled(&self, class: CharacterClass) -> bool {
        match class {
            CharacterClass::Lowercase => self.use_lowercase,
            CharacterClass::Uppercase => self.use_uppercase,
            CharacterClass::Digit => self.use_digits,
            CharacterClass::Special => self.use_special,
        }
    }

    pub fn set_enabled(&mut self, class: CharacterClass, enabled: bool) {
        let flag = match class {
            CharacterClass::Lowercase => &mut self.use_lowercase,
            CharacterClass::Uppercase => &mut self.use_uppercase,
            CharacterClass::Digit => &mut self.use_digits,
            CharacterClass::Special => &mut self.use_special,
        };
        *flag = enabled;
    }
}

impl Default for GenerationRequest {
    fn default() -> GenerationRequest {
        GenerationRequest {
            length: 16,
            use_lowercase: true,
            use_uppercase: true,
            use_digits: true,
            use_special: true,
            exclude_ambiguous: false,
        }
    }
}

/// The per-class pools for one request. Disabled classes have empty pools; enabled ones never
/// do.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedPools {
    pools: [Vec<char>; 4],
}

impl ResolvedPools {
    pub fn pool(&self, class: CharacterClass) -> &[char] {
        &self.pools[class.index()]
    }

    /// Enabled classes and their pools, in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = (CharacterClass, &[char])> + '_ {
        CharacterClass::ALL
            .into_iter()
            .map(|class| (class, self.pool(class)))
            .filter(|(_, pool)| !pool.is_empty())
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled().count()
    }

    /// Every enabled pool concatenated in class order. Characters shared between classes are kept
    /// once per class.
    pub fn combined(&self) -> Vec<char> {
        self.enabled()
            .flat_map(|(_, pool)| pool.iter().copied())
            .collect()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.pools.iter().any(|pool| pool.contains(&ch))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one character class must be selected")]
    NoClassSelected,
    #[error("no {0} characters are left to choose from")]
    EmptyClassPool(CharacterClass),
    #[error("unsupported password length {0}; it must be between 1 and 256")]
    InvalidLength(usize),
}

/// Resolve a request against the canonical character sets.
pub fn resolve(request: &GenerationRequest) -> Result<ResolvedPools, ValidationError> {
    resolve_with(request, &Charsets::default())
}

/// Resolve a request against the given character sets.
pub fn resolve_with(
    request: &GenerationRequest,
    charsets: &Charsets,
) -> Result<ResolvedPools, ValidationError> {
    if !CharacterClass::ALL.iter().any(|&c| request.is_enabled(c)) {
        return Err(ValidationError::NoClassSelected);
    }
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&request.length) {
        return Err(ValidationError::InvalidLength(request.length));
    }

    let mut pools: [Vec<char>; 4] = Default::default();
    for class in CharacterClass::ALL {
        if !request.is_enabled(class) {
            continue;
        }
        let removed: &[char] = if request.exclude_ambiguous {
            class.ambiguous()
        } else {
            &[]
        };
        let pool = charsets
            .get(class)
            .chars()
            .filter(|ch| !removed.contains(ch))
            .collect::<Vec<_>>();
        if pool.is_empty() {
            return Err(ValidationError::EmptyClassPool(class));
        }
        log::trace!("{} pool holds {} characters", class, pool.len());
        pools[class.index()] = pool;
    }
    Ok(ResolvedPools { pools })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(class: CharacterClass) -> GenerationRequest {
        let mut request = GenerationRequest {
            use_lowercase: false,
            use_uppercase: false,
            use_digits: false,
            use_special: false,
            ..GenerationRequest::default()
        };
        request.set_enabled(class, true);
        request
    }

    #[test]
    fn defaults_enable_every_class() {
        let pools = resolve(&GenerationRequest::default()).unwrap();
        assert_eq!(pools.enabled_count(), 4);
        assert_eq!(pools.pool(CharacterClass::Lowercase).len(), 26);
        assert_eq!(pools.pool(CharacterClass::Uppercase).len(), 26);
        assert_eq!(pools.pool(CharacterClass::Digit).len(), 10);
        assert_eq!(pools.pool(CharacterClass::Special).len(), SPECIAL.chars().count());
        assert_eq!(pools.combined().len(), 26 + 26 + 10 + SPECIAL.chars().count());
    }

    #[test]
    fn excluding_ambiguous_removes_confusable_glyphs() {
        let request = GenerationRequest {
            exclude_ambiguous: true,
            ..GenerationRequest::default()
        };
        let pools = resolve(&request).unwrap();
        for ch in ['i', 'l', 'o', 'I', 'O', '1', '0'] {
            assert!(!pools.contains(ch), "{ch:?} should have been removed");
        }
        assert_eq!(pools.pool(CharacterClass::Lowercase).len(), 23);
        assert_eq!(pools.pool(CharacterClass::Uppercase).len(), 24);
        assert_eq!(pools.pool(CharacterClass::Digit).len(), 8);
        assert_eq!(
            pools.pool(CharacterClass::Special).iter().collect::<String>(),
            SPECIAL
        );
        // `L` is not considered ambiguous.
        assert!(pools.contains('L'));
    }

    #[test]
    fn disabled_classes_contribute_nothing() {
        let pools = resolve(&only(CharacterClass::Digit)).unwrap();
        assert_eq!(pools.enabled_count(), 1);
        assert!(pools.pool(CharacterClass::Lowercase).is_empty());
        assert!(pools.pool(CharacterClass::Special).is_empty());
        assert_eq!(pools.combined().iter().collect::<String>(), DIGITS);
    }

    #[test]
    fn combined_pool_keeps_class_order() {
        let request = GenerationRequest {
            use_uppercase: false,
            use_special: false,
            ..GenerationRequest::default()
        };
        let combined = resolve(&request).unwrap().combined();
        assert_eq!(
            combined.iter().collect::<String>(),
            format!("{LOWERCASE}{DIGITS}")
        );
    }

    #[test]
    fn no_class_selected_is_rejected() {
        let request = GenerationRequest {
            use_lowercase: false,
            use_uppercase: false,
            use_digits: false,
            use_special: false,
            ..GenerationRequest::default()
        };
        assert_eq!(resolve(&request), Err(ValidationError::NoClassSelected));
        // Validation must not touch the request.
        assert!(!request.use_lowercase);
    }

    #[test]
    fn length_bounds() {
        for length in [0, MAX_LENGTH + 1] {
            let request = GenerationRequest {
                length,
                ..GenerationRequest::default()
            };
            assert_eq!(resolve(&request), Err(ValidationError::InvalidLength(length)));
        }
        for length in [MIN_LENGTH, MAX_LENGTH] {
            let request = GenerationRequest {
                length,
                ..GenerationRequest::default()
            };
            assert!(resolve(&request).is_ok());
        }
    }

    #[test]
    fn class_emptied_by_filtering_is_rejected() {
        let charsets = Charsets {
            digits: "10".to_owned(),
            ..Charsets::default()
        };
        let request = GenerationRequest {
            exclude_ambiguous: true,
            ..GenerationRequest::default()
        };
        assert_eq!(
            resolve_with(&request, &charsets),
            Err(ValidationError::EmptyClassPool(CharacterClass::Digit))
        );

        // The same sets are fine when the class is off.
        let request = GenerationRequest {
            use_digits: false,
            ..request
        };
        assert!(resolve_with(&request, &charsets).is_ok());
    }

    #[test]
    fn empty_custom_charset_is_rejected_even_without_filtering() {
        let charsets = Charsets {
            special: String::new(),
            ..Charsets::default()
        };
        assert_eq!(
            resolve_with(&GenerationRequest::default(), &charsets),
            Err(ValidationError::EmptyClassPool(CharacterClass::Special))
        );
    }

    #[test]
    fn request_deserializes_with_missing_fields() {
        let request: GenerationRequest =
            serde_yaml::from_str("length: 20\nuse_special: false\n").unwrap();
        assert_eq!(
            request,
            GenerationRequest {
                length: 20,
                use_special: false,
                ..GenerationRequest::default()
            }
        );
        assert!(serde_yaml::from_str::<GenerationRequest>("lenght: 20\n").is_err());
    }
}
