//! Pure validation of raw user input.
//!
//! Inbound adapters bind request bodies onto the plain drafts below and call
//! [`validate_new_user`] or [`validate_user_patch`]. Every failing field is
//! reported, in field order, rather than stopping at the first problem.

use std::fmt;

use serde::Serialize;

use super::{EmailAddress, PersonName, UserPatch, UserProfile, UserValidationError};

/// Raw input for creating a user. `None` means the field was not submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    /// Submitted e-mail address.
    pub email: Option<String>,
    /// Submitted given name.
    pub firstname: Option<String>,
    /// Submitted family name.
    pub lastname: Option<String>,
}

/// Raw input for a partial update.
///
/// The outer `Option` records whether the field was submitted at all; the
/// inner one distinguishes an explicit `null`, which is treated as blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatchDraft {
    /// Submitted e-mail address.
    pub email: Option<Option<String>>,
    /// Submitted given name.
    pub firstname: Option<Option<String>>,
    /// Submitted family name.
    pub lastname: Option<Option<String>>,
}

/// Machine-readable reason a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    /// Required field was not submitted.
    MissingField,
    /// Field was empty, whitespace, or `null`.
    Blank,
    /// Field is not an e-mail address.
    InvalidEmail,
    /// Field exceeds the length limit.
    TooLong,
}

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Request body key.
    pub field: &'static str,
    /// Failure category.
    pub code: FieldErrorCode,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldError {
    fn missing(field: &'static str) -> Self {
        Self {
            field,
            code: FieldErrorCode::MissingField,
            message: format!("missing required field: {field}"),
        }
    }

    fn from_value_error(field: &'static str, error: &UserValidationError) -> Self {
        let code = match error {
            UserValidationError::InvalidEmail => FieldErrorCode::InvalidEmail,
            UserValidationError::TooLong { .. } => FieldErrorCode::TooLong,
            UserValidationError::Blank | UserValidationError::InvalidId => FieldErrorCode::Blank,
        };
        Self {
            field,
            code,
            message: format!("{field}: {error}"),
        }
    }
}

/// Non-empty, ordered list of field failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Failing fields in submission order.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether `field` is among the failures.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// Consume into the underlying list.
    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.iter().map(|error| error.field).collect();
        write!(f, "validation failed for: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Collects failures while parsing individual fields.
#[derive(Default)]
struct Collector(Vec<FieldError>);

impl Collector {
    fn required<T>(
        &mut self,
        field: &'static str,
        raw: Option<&str>,
        parse: fn(&str) -> Result<T, UserValidationError>,
    ) -> Option<T> {
        let Some(raw) = raw else {
            self.0.push(FieldError::missing(field));
            return None;
        };
        self.parse(field, raw, parse)
    }

    fn optional<T>(
        &mut self,
        field: &'static str,
        raw: Option<Option<&str>>,
        parse: fn(&str) -> Result<T, UserValidationError>,
    ) -> Option<T> {
        match raw {
            None => None,
            Some(None) => {
                self.0
                    .push(FieldError::from_value_error(field, &UserValidationError::Blank));
                None
            }
            Some(Some(raw)) => self.parse(field, raw, parse),
        }
    }

    fn parse<T>(
        &mut self,
        field: &'static str,
        raw: &str,
        parse: fn(&str) -> Result<T, UserValidationError>,
    ) -> Option<T> {
        match parse(raw) {
            Ok(value) => Some(value),
            Err(error) => {
                self.0.push(FieldError::from_value_error(field, &error));
                None
            }
        }
    }

    fn into_errors(self) -> ValidationErrors {
        ValidationErrors(self.0)
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.into_errors())
        }
    }
}

fn parse_email(raw: &str) -> Result<EmailAddress, UserValidationError> {
    EmailAddress::new(raw)
}

fn parse_name(raw: &str) -> Result<PersonName, UserValidationError> {
    PersonName::new(raw)
}

/// Validate a creation draft: all three fields are required.
///
/// # Examples
/// ```
/// use user_api::domain::{UserDraft, validate_new_user};
///
/// let draft = UserDraft {
///     email: Some("mia.muster@musterfirma.de".into()),
///     firstname: Some("Mia".into()),
///     lastname: None,
/// };
/// let errors = validate_new_user(&draft).unwrap_err();
/// assert!(errors.has_field("lastname"));
/// ```
pub fn validate_new_user(draft: &UserDraft) -> Result<UserProfile, ValidationErrors> {
    let mut collector = Collector::default();
    let email = collector.required("email", draft.email.as_deref(), parse_email);
    let firstname = collector.required("firstname", draft.firstname.as_deref(), parse_name);
    let lastname = collector.required("lastname", draft.lastname.as_deref(), parse_name);

    // `required` records a failure for every `None` it returns.
    match (email, firstname, lastname) {
        (Some(email), Some(firstname), Some(lastname)) => Ok(UserProfile {
            email,
            firstname,
            lastname,
        }),
        _ => Err(collector.into_errors()),
    }
}

/// Validate a partial update draft: submitted fields follow the creation
/// rules, omitted fields are left alone.
pub fn validate_user_patch(draft: &UserPatchDraft) -> Result<UserPatch, ValidationErrors> {
    let mut collector = Collector::default();
    let email = collector.optional("email", as_inner_str(&draft.email), parse_email);
    let firstname = collector.optional("firstname", as_inner_str(&draft.firstname), parse_name);
    let lastname = collector.optional("lastname", as_inner_str(&draft.lastname), parse_name);
    collector.finish()?;

    Ok(UserPatch {
        email,
        firstname,
        lastname,
    })
}

fn as_inner_str(value: &Option<Option<String>>) -> Option<Option<&str>> {
    value.as_ref().map(Option::as_deref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn complete() -> UserDraft {
        UserDraft {
            email: Some("mia.muster@musterfirma.de".into()),
            firstname: Some("Mia".into()),
            lastname: Some("Muster".into()),
        }
    }

    #[fixture]
    fn complete_draft() -> UserDraft {
        complete()
    }

    #[rstest]
    fn complete_draft_validates(complete_draft: UserDraft) {
        let profile = validate_new_user(&complete_draft).expect("valid draft");
        assert_eq!(profile.email.as_ref(), "mia.muster@musterfirma.de");
        assert_eq!(profile.firstname.as_ref(), "Mia");
        assert_eq!(profile.lastname.as_ref(), "Muster");
    }

    #[rstest]
    fn empty_draft_reports_every_field() {
        let errors = validate_new_user(&UserDraft::default()).expect_err("invalid draft");
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["email", "firstname", "lastname"]);
        assert!(
            errors
                .errors()
                .iter()
                .all(|e| e.code == FieldErrorCode::MissingField)
        );
    }

    #[rstest]
    #[case::missing_email(
        UserDraft { email: None, ..complete() },
        "email",
        FieldErrorCode::MissingField
    )]
    #[case::malformed_email(
        UserDraft { email: Some("nope".into()), ..complete() },
        "email",
        FieldErrorCode::InvalidEmail
    )]
    #[case::blank_firstname(
        UserDraft { firstname: Some("  ".into()), ..complete() },
        "firstname",
        FieldErrorCode::Blank
    )]
    #[case::long_lastname(
        UserDraft { lastname: Some("x".repeat(300)), ..complete() },
        "lastname",
        FieldErrorCode::TooLong
    )]
    fn single_bad_field_is_reported(
        #[case] draft: UserDraft,
        #[case] field: &str,
        #[case] code: FieldErrorCode,
    ) {
        let errors = validate_new_user(&draft).expect_err("invalid draft");
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].field, field);
        assert_eq!(errors.errors()[0].code, code);
    }

    #[rstest]
    fn empty_patch_is_valid_and_empty() {
        let patch = validate_user_patch(&UserPatchDraft::default()).expect("valid patch");
        assert!(patch.is_empty());
    }

    #[rstest]
    fn patch_validates_only_submitted_fields() {
        let draft = UserPatchDraft {
            firstname: Some(Some("Maja".into())),
            ..UserPatchDraft::default()
        };
        let patch = validate_user_patch(&draft).expect("valid patch");
        assert_eq!(patch.firstname.map(String::from).as_deref(), Some("Maja"));
        assert!(patch.email.is_none());
        assert!(patch.lastname.is_none());
    }

    #[rstest]
    fn explicit_null_in_patch_is_blank() {
        let draft = UserPatchDraft {
            lastname: Some(None),
            ..UserPatchDraft::default()
        };
        let errors = validate_user_patch(&draft).expect_err("null is rejected");
        assert_eq!(errors.errors()[0].field, "lastname");
        assert_eq!(errors.errors()[0].code, FieldErrorCode::Blank);
    }

    #[rstest]
    fn patch_reports_malformed_email() {
        let draft = UserPatchDraft {
            email: Some(Some("mia@".into())),
            firstname: Some(Some(String::new())),
            ..UserPatchDraft::default()
        };
        let errors = validate_user_patch(&draft).expect_err("invalid patch");
        assert!(errors.has_field("email"));
        assert!(errors.has_field("firstname"));
        assert_eq!(
            errors.to_string(),
            "validation failed for: email, firstname"
        );
    }
}
