// src/common/national_id.rs

//! CNIC (número de identidade nacional): 13 dígitos, exibido como `ddddd-ddddddd-d`.

use std::fmt;

use serde::{Serialize, Serializer};

pub const NATIONAL_ID_DIGITS: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NationalIdError {
    Empty,
    InvalidFormat,
}

impl NationalIdError {
    /// Código usado nos detalhes de validação.
    pub fn code(&self) -> &'static str {
        match self {
            NationalIdError::Empty => "required",
            NationalIdError::InvalidFormat => "invalid_format",
        }
    }
}

/// CNIC normalizado: sempre 13 dígitos ASCII, sem separadores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationalId(String);

impl NationalId {
    pub fn parse(input: &str) -> Result<Self, NationalIdError> {
        if input.trim().is_empty() {
            return Err(NationalIdError::Empty);
        }

        let digits = strip_separators(input);
        if digits.len() != NATIONAL_ID_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NationalIdError::InvalidFormat);
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Forma de exibição: `12345-1234567-1`.
    pub fn formatted(&self) -> String {
        format!("{}-{}-{}", &self.0[..5], &self.0[5..12], &self.0[12..])
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Na API o CNIC trafega sem separadores.
impl Serialize for NationalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

pub fn strip_separators(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Formatação progressiva enquanto o operador digita.
/// Descarta não-dígitos e limita a 13 dígitos.
pub fn format_for_editing(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(NATIONAL_ID_DIGITS)
        .collect();

    let mut out = String::with_capacity(NATIONAL_ID_DIGITS + 2);
    for (i, c) in digits.iter().enumerate() {
        if i == 5 || i == 12 {
            out.push('-');
        }
        out.push(*c);
    }
    out
}

/// Reformata um CNIC armazenado para exibição. Valores fora do padrão voltam como estão.
pub fn display_form(stored: &str) -> String {
    NationalId::parse(stored)
        .map(|id| id.formatted())
        .unwrap_or_else(|_| stored.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_and_strips_round_trip() {
        let id = NationalId::parse("1234512345671").unwrap();
        assert_eq!(id.formatted(), "12345-1234567-1");

        let back = NationalId::parse("12345-1234567-1").unwrap();
        assert_eq!(back.as_str(), "1234512345671");
        assert_eq!(strip_separators("12345-1234567-1"), "1234512345671");
    }

    #[test]
    fn rejects_wrong_lengths_and_letters() {
        assert_eq!(NationalId::parse("123"), Err(NationalIdError::InvalidFormat));
        assert_eq!(NationalId::parse("12345-1234567-12"), Err(NationalIdError::InvalidFormat));
        assert_eq!(NationalId::parse("12345-12a4567-1"), Err(NationalIdError::InvalidFormat));
        assert_eq!(NationalId::parse("   "), Err(NationalIdError::Empty));
    }

    #[test]
    fn accepts_spaces_as_separators() {
        let id = NationalId::parse("12345 1234567 1").unwrap();
        assert_eq!(id.as_str(), "1234512345671");
    }

    #[test]
    fn editing_format_is_progressive() {
        assert_eq!(format_for_editing("123"), "123");
        assert_eq!(format_for_editing("123456"), "12345-6");
        assert_eq!(format_for_editing("1234512345671"), "12345-1234567-1");
        assert_eq!(format_for_editing("12345-1234567-1999"), "12345-1234567-1");
        assert_eq!(format_for_editing("ab12"), "12");
    }

    #[test]
    fn display_form_leaves_garbage_alone() {
        assert_eq!(display_form("1234512345671"), "12345-1234567-1");
        assert_eq!(display_form("n/a"), "n/a");
    }

    #[test]
    fn serializes_without_separators() {
        let id = NationalId::parse("12345-1234567-1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1234512345671\"");
    }
}
