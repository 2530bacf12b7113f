use super::tables::Lexicon;
use crate::error::CoreError;
use std::sync::OnceLock;

static ENGLISH_LEXICON: OnceLock<Lexicon> = OnceLock::new();

fn load_embedded_lexicon() -> Result<Lexicon, CoreError> {
    let lexicon = Lexicon::from_toml(include_str!("../../configs/lexicon.toml"))?;

    if lexicon.code() != "en" {
        return Err(CoreError::InvalidLexicon(format!(
            "Lexicon code mismatch: expected en, got {}",
            lexicon.code()
        )));
    }

    Ok(lexicon)
}

/// The built-in English lexicon, compiled on first use
pub fn english_lexicon() -> &'static Lexicon {
    ENGLISH_LEXICON
        .get_or_init(|| load_embedded_lexicon().expect("Failed to load embedded lexicon"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_lexicon_loads() {
        let lexicon = english_lexicon();
        assert_eq!(lexicon.code(), "en");
        assert!(lexicon.is_honorific("Dr."));
        assert!(lexicon.is_job_role("Reporter"));
        assert!(lexicon.is_job_title_word("Tech"));
        assert!(lexicon.is_company_suffix("Inc."));
        assert!(lexicon.is_filler("Contact"));
        assert!(lexicon.locations().contains("Bay Area"));
        assert!(!lexicon.departments().suffixes.is_empty());
    }

    #[test]
    fn test_lexicon_is_shared() {
        let first = english_lexicon();
        let second = english_lexicon();
        assert!(std::ptr::eq(first, second));
    }
}
