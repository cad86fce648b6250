//! Normalizador léxico: minúsculas y tokenización, sin stemming ni eliminación
//! de acentos (las variantes acentuadas se listan tal cual en las tablas).

use super::InferenceError;

/// Texto de entrada ya normalizado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
}

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Palabras del texto, separadas por cualquier carácter no alfanumérico.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.text.contains(phrase)
    }

    pub fn contains_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.contains(p))
    }

    /// Como `contains`, pero la frase debe empezar y acabar en límite de palabra.
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        let is_word = |c: Option<char>| c.is_some_and(char::is_alphanumeric);
        self.text.match_indices(phrase).any(|(start, matched)| {
            let before = self.text[..start].chars().next_back();
            let after = self.text[start + matched.len()..].chars().next();
            !is_word(before) && !is_word(after)
        })
    }
}

/// Pasa la descripción a minúsculas. Falla si está vacía o sólo tiene espacios.
pub fn normalize(description: &str) -> Result<NormalizedText, InferenceError> {
    if description.trim().is_empty() {
        return Err(InferenceError::EmptyInput);
    }
    Ok(NormalizedText {
        text: description.to_lowercase(),
    })
}
