//! Request-scoped form payloads and their validation rules.

use serde::{Deserialize, Deserializer};
use std::{borrow::Cow, collections::BTreeMap, fmt};
use validator::{Validate, ValidationError, ValidationErrors};

use super::entry::GuestbookEntry;

/// Field-level validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// A single message for a single field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), vec![message.into()]);
        Self(errors)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, empty if it validated.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        for (field, field_errors) in errors.field_errors() {
            let messages = field_errors
                .iter()
                .map(|err| {
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        Self(fields)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Submission of a new entry, bound from `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GuestbookForm {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 1000, message = "must be at most 1000 characters")
    )]
    pub text: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
}

impl GuestbookForm {
    pub fn new(
        name: impl Into<String>,
        text: impl Into<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            image_url,
        }
    }

    /// Validate against the form rules, collecting messages per field.
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }

    /// Build a transient entry from the current field values.
    ///
    /// Only meaningful after [`check`](Self::check) has passed.
    pub fn to_new_entry(&self) -> GuestbookEntry {
        GuestbookEntry::new(&self.name, &self.text, self.image_url.clone())
    }
}

/// Replacement text for an existing entry.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EditForm {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 1000, message = "must be at most 1000 characters")
    )]
    pub text: String,
}

impl EditForm {
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

/// Raw vote value; decoded into [`Vote`](super::vote::Vote) by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteForm {
    #[serde(default)]
    pub vote: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("must not be blank"));
        return Err(err);
    }
    Ok(())
}

/// HTML forms submit untouched optional inputs as empty strings.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_submission() {
        let form = GuestbookForm::new("Ann", "hi", None);
        assert!(form.check().is_ok());
    }

    #[test]
    fn rejects_blank_name_and_text() {
        let form = GuestbookForm::new("   ", "", None);
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("name"), ["must not be blank".to_string()]);
        assert_eq!(errors.get("text"), ["must not be blank".to_string()]);
        assert!(!errors.has("image_url"));
    }

    #[test]
    fn rejects_overlong_fields() {
        let form = GuestbookForm::new("n".repeat(101), "t".repeat(1001), None);
        let errors = form.check().unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("text"));
    }

    #[test]
    fn rejects_malformed_image_url() {
        let form = GuestbookForm::new("Ann", "hi", Some("not a url".into()));
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("image_url"), ["must be a valid URL".to_string()]);
    }

    #[test]
    fn to_new_entry_copies_fields() {
        let form = GuestbookForm::new("Ann", "hi", Some("https://example.org/cat.png".into()));
        let entry = form.to_new_entry();
        assert_eq!(entry.id(), None);
        assert_eq!(entry.name(), "Ann");
        assert_eq!(entry.text(), "hi");
        assert_eq!(entry.image_url(), Some("https://example.org/cat.png"));
    }

    #[test]
    fn field_errors_display_lists_every_message() {
        let errors = FieldErrors::single("vote", "unknown vote");
        assert_eq!(errors.to_string(), "vote: unknown vote");
        assert!(FieldErrors::default().is_empty());
    }

    #[test]
    fn edit_form_requires_text() {
        assert!(EditForm { text: " ".into() }.check().is_err());
        assert!(EditForm { text: "updated".into() }.check().is_ok());
    }
}
