//! Language utilities for ISO language code handling
//!
//! Target languages arrive as ISO 639-1 codes in any casing, sometimes with a
//! regional variant (`pt-br`, `en-US`). The translation backend expects upper
//! case, while file names and result keys use the lower-case form.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Split a code into its base language and optional region
fn split_region(code: &str) -> (String, Option<String>) {
    let normalized = code.trim().replace('_', "-");
    match normalized.split_once('-') {
        Some((base, region)) => (base.to_lowercase(), Some(region.to_uppercase())),
        None => (normalized.to_lowercase(), None),
    }
}

/// Validate that a code names a known ISO 639-1 language, region suffix allowed
pub fn validate_language_code(code: &str) -> Result<()> {
    let (base, region) = split_region(code);

    if base.len() != 2 || Language::from_639_1(&base).is_none() {
        return Err(anyhow!("Invalid language code: {}", code));
    }

    if let Some(region) = region {
        if region.is_empty() || region.len() > 4 || !region.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(anyhow!("Invalid region in language code: {}", code));
        }
    }

    Ok(())
}

/// Lower-case key used for file names and result maps (`pt-br`, `de`)
pub fn normalize_language_key(code: &str) -> Result<String> {
    validate_language_code(code)?;
    Ok(code.trim().replace('_', "-").to_lowercase())
}

/// Code in the casing the translation backend expects (`PT-BR`, `DE`)
pub fn to_backend_code(code: &str) -> Result<String> {
    validate_language_code(code)?;
    let (base, region) = split_region(code);
    Ok(match region {
        Some(region) => format!("{}-{}", base.to_uppercase(), region),
        None => base.to_uppercase(),
    })
}

/// Map a recognizer language label to ISO 639-1.
///
/// Speech APIs report either a code (`en`) or an English name (`english`).
pub fn language_label_to_code(label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    let lower = label.to_lowercase();
    if lower.len() == 2 && Language::from_639_1(&lower).is_some() {
        return Some(lower);
    }
    if lower.len() == 3 {
        if let Some(code) = Language::from_639_3(&lower).and_then(|l| l.to_639_1()) {
            return Some(code.to_string());
        }
    }

    let mut chars = lower.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => return None,
    };

    Language::from_name(&capitalized)
        .and_then(|l| l.to_639_1())
        .map(|c| c.to_string())
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let (base, _) = split_region(code);
    let lang = Language::from_639_1(&base)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}
