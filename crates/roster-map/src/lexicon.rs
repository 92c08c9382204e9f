//! Curated header keywords and value tokens.
//!
//! The default lexicon is embedded at compile time with `include_str!()` and
//! parsed once. Callers may supply their own TOML document instead; the
//! classifier only ever sees the parsed, immutable [`Lexicon`].
//!
//! # Format
//!
//! ```toml
//! [fields.gender]
//! header_keywords = ["gender", "sex"]
//!
//! [values]
//! gender = ["m", "f", "male", "female"]
//! us_states = ["AL", "AK"]
//! practice_cloud_id_prefix = "pt_"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

use roster_model::FieldKind;
use serde::Deserialize;

use crate::error::MapError;
use crate::utils::{normalize_name, normalize_token};

/// The lexicon shipped with the crate.
pub const EMBEDDED_LEXICON: &str = include_str!("../data/lexicon.toml");

static EMBEDDED: OnceLock<Lexicon> = OnceLock::new();

#[derive(Debug, Default, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    fields: BTreeMap<String, FieldSection>,
    #[serde(default)]
    values: ValueSection,
}

#[derive(Debug, Default, Deserialize)]
struct FieldSection {
    #[serde(default)]
    header_keywords: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ValueSection {
    #[serde(default)]
    gender: Vec<String>,
    #[serde(default)]
    professional_suffix: Vec<String>,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    patients_accepted: Vec<String>,
    #[serde(default)]
    us_states: Vec<String>,
    #[serde(default)]
    url_prefixes: Vec<String>,
    #[serde(default)]
    image_extensions: Vec<String>,
    #[serde(default)]
    image_keywords: Vec<String>,
    #[serde(default)]
    practice_cloud_id_prefix: Option<String>,
}

/// Immutable lookup tables consulted by the field rules.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    header_keywords: BTreeMap<FieldKind, Vec<String>>,
    gender: HashSet<String>,
    professional_suffix: HashSet<String>,
    languages: HashSet<String>,
    patients_accepted: Vec<String>,
    us_states: HashSet<String>,
    url_prefixes: Vec<String>,
    image_extensions: Vec<String>,
    image_keywords: Vec<String>,
    practice_cloud_id_prefix: String,
}

impl Lexicon {
    /// The lexicon embedded in the crate, parsed on first use.
    ///
    /// # Panics
    ///
    /// Panics if the embedded document is malformed, which is caught by the
    /// crate's own tests.
    pub fn embedded() -> &'static Lexicon {
        EMBEDDED.get_or_init(|| {
            Lexicon::from_toml_str(EMBEDDED_LEXICON).expect("embedded lexicon is valid")
        })
    }

    /// Parses a lexicon from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, MapError> {
        let file: LexiconFile =
            toml::from_str(source).map_err(|source| MapError::LexiconParse { source })?;

        let mut header_keywords = BTreeMap::new();
        for (key, section) in file.fields {
            let field: FieldKind = key
                .parse()
                .map_err(|_| MapError::UnknownLexiconField(key.clone()))?;
            let keywords = section
                .header_keywords
                .iter()
                .map(|keyword| normalize_name(keyword))
                .filter(|keyword| !keyword.is_empty())
                .collect();
            header_keywords.insert(field, keywords);
        }

        let values = file.values;
        Ok(Self {
            header_keywords,
            gender: token_set(&values.gender),
            professional_suffix: token_set(&values.professional_suffix),
            languages: token_set(&values.languages),
            patients_accepted: lowercase_list(&values.patients_accepted),
            us_states: values
                .us_states
                .iter()
                .map(|code| code.trim().to_ascii_uppercase())
                .collect(),
            url_prefixes: lowercase_list(&values.url_prefixes),
            image_extensions: lowercase_list(&values.image_extensions),
            image_keywords: lowercase_list(&values.image_keywords),
            practice_cloud_id_prefix: values
                .practice_cloud_id_prefix
                .map(|prefix| prefix.trim().to_lowercase())
                .unwrap_or_else(|| "pt_".to_string()),
        })
    }

    /// Reads and parses a lexicon file.
    pub fn from_path(path: &Path) -> Result<Self, MapError> {
        let source = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Normalised header keywords for a field; empty when the field has none.
    pub fn header_keywords(&self, field: FieldKind) -> &[String] {
        self.header_keywords
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_gender_token(&self, value: &str) -> bool {
        self.gender.contains(&normalize_token(value))
    }

    pub fn is_suffix_token(&self, token: &str) -> bool {
        self.professional_suffix.contains(&normalize_token(token))
    }

    pub fn is_language_token(&self, token: &str) -> bool {
        self.languages.contains(&normalize_token(token))
    }

    /// Literal patient-population tokens (`adult`, `both`, `pediatric`).
    pub fn patients_accepted_tokens(&self) -> &[String] {
        &self.patients_accepted
    }

    pub fn is_us_state(&self, value: &str) -> bool {
        let code = value.trim();
        code.len() == 2 && self.us_states.contains(&code.to_ascii_uppercase())
    }

    pub fn us_state_count(&self) -> usize {
        self.us_states.len()
    }

    pub fn url_prefixes(&self) -> &[String] {
        &self.url_prefixes
    }

    pub fn image_extensions(&self) -> &[String] {
        &self.image_extensions
    }

    pub fn image_keywords(&self) -> &[String] {
        &self.image_keywords
    }

    /// Lower-cased prefix of practice cloud ids.
    pub fn practice_cloud_id_prefix(&self) -> &str {
        &self.practice_cloud_id_prefix
    }
}

fn token_set(values: &[String]) -> HashSet<String> {
    values
        .iter()
        .map(|value| normalize_token(value))
        .filter(|token| !token.is_empty())
        .collect()
}

fn lowercase_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}
