//! Client-side validation of the administrative forms.
//!
//! Drafts are checked before any request is sent; errors are reported per
//! field so they can be shown inline.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::catalog::EntryDraft;
use crate::members::MemberDraft;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid digits regex"));

/// A validation failure on one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field errors found in a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "invalid form: {}", parts.join("; "))
    }
}

impl ValidationErrors {
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.fields.iter().find(|e| e.field == field)
    }
}

#[derive(Default)]
struct Collector {
    fields: Vec<FieldError>,
}

impl Collector {
    fn required(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.push(field, message);
        }
    }

    fn push(&mut self, field: &'static str, message: &str) {
        self.fields.push(FieldError {
            field,
            message: message.to_string(),
        });
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                fields: self.fields,
            })
        }
    }
}

/// Validate a catalog entry before create/update.
pub fn validate_entry(draft: &EntryDraft) -> Result<(), ValidationErrors> {
    let mut c = Collector::default();
    c.required("cote", &draft.cote, "La cote est obligatoire");
    c.required(
        "titreserie",
        &draft.titreserie,
        "Le titre de la série est obligatoire",
    );
    c.required("scenariste", &draft.scenariste, "Le scénariste est obligatoire");
    c.required(
        "dessinateur",
        &draft.dessinateur,
        "Le dessinateur est obligatoire",
    );

    if let Some(isbn) = draft.isbn.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if !DIGITS_RE.is_match(isbn) {
            c.push("ISBN", "L'ISBN doit contenir uniquement des chiffres");
        }
    }

    c.finish()
}

/// Validate a member before create/update.
pub fn validate_member(draft: &MemberDraft) -> Result<(), ValidationErrors> {
    let mut c = Collector::default();
    c.required("nom", &draft.nom, "Le nom est obligatoire");
    c.required("prenom", &draft.prenom, "Le prénom est obligatoire");
    if draft.caution.is_none() {
        c.push("caution", "La caution est obligatoire");
    }

    if let Some(mail) = draft.mail.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if !EMAIL_RE.is_match(mail) {
            c.push("mail", "Format d'email invalide");
        }
    }

    c.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_entry() -> EntryDraft {
        EntryDraft {
            cote: "T-001".to_string(),
            titreserie: "Tintin".to_string(),
            scenariste: "Hergé".to_string(),
            dessinateur: "Hergé".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_entry() {
        assert!(validate_entry(&valid_entry()).is_ok());
    }

    #[test]
    fn test_entry_missing_required_fields() {
        let draft = EntryDraft {
            cote: "  ".to_string(),
            ..Default::default()
        };
        let errors = validate_entry(&draft).unwrap_err();
        let fields: Vec<_> = errors.fields.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["cote", "titreserie", "scenariste", "dessinateur"]);
    }

    #[test]
    fn test_entry_isbn_must_be_digits() {
        let mut draft = valid_entry();
        draft.isbn = Some("978-2-203".to_string());
        let errors = validate_entry(&draft).unwrap_err();
        assert!(errors.for_field("ISBN").is_some());

        draft.isbn = Some("9782203001015".to_string());
        assert!(validate_entry(&draft).is_ok());

        draft.isbn = Some(String::new());
        assert!(validate_entry(&draft).is_ok());
    }

    #[test]
    fn test_member_required_fields() {
        let errors = validate_member(&MemberDraft::default()).unwrap_err();
        let fields: Vec<_> = errors.fields.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["nom", "prenom", "caution"]);
    }

    #[test]
    fn test_member_mail_format() {
        let mut draft = MemberDraft {
            nom: "Castafiore".to_string(),
            prenom: "Bianca".to_string(),
            caution: Some(0),
            mail: Some("bianca-at-milan".to_string()),
            ..Default::default()
        };
        let errors = validate_member(&draft).unwrap_err();
        assert_eq!(errors.fields.len(), 1);
        assert_eq!(errors.fields[0].field, "mail");

        draft.mail = Some("bianca@scala.it".to_string());
        assert!(validate_member(&draft).is_ok());
    }

    #[test]
    fn test_errors_display() {
        let errors = validate_member(&MemberDraft {
            nom: "X".to_string(),
            prenom: "Y".to_string(),
            caution: None,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(errors.to_string(), "invalid form: caution: La caution est obligatoire");
    }
}
