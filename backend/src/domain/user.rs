//! User entity and its value types.
//!
//! A [`User`] only exists with validated attributes: the newtypes below
//! reject blank, over-long, and (for e-mail) malformed input at construction.
//! Surrounding whitespace is stripped before validation, matching how form
//! input is normalised.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of any textual user attribute.
pub const USER_TEXT_MAX: usize = 255;

/// Validation errors raised by the user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifiers are positive integers.
    #[error("user id must be a positive integer")]
    InvalidId,
    /// The value was empty after trimming.
    #[error("value must not be blank")]
    Blank,
    /// The value does not look like an e-mail address.
    #[error("value is not a valid email address")]
    InvalidEmail,
    /// The value exceeds [`USER_TEXT_MAX`] characters.
    #[error("value must be at most {max} characters")]
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// Store-assigned user identifier.
///
/// # Examples
/// ```
/// use user_api::domain::UserId;
///
/// let id = UserId::new(42).expect("positive id");
/// assert_eq!(id.get(), 42);
/// assert!(UserId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Validate and wrap a raw identifier.
    pub fn new(id: i64) -> Result<Self, UserValidationError> {
        if id <= 0 {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Raw integer value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn normalise(raw: &str) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::Blank);
    }
    if trimmed.chars().count() > USER_TEXT_MAX {
        return Err(UserValidationError::TooLong {
            max: USER_TEXT_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Loose check: one `@`, no whitespace, a dot in the domain part.
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Trim and validate an e-mail address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let value = normalise(raw.as_ref())?;
        if !email_regex().is_match(&value) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated first or last name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Trim and validate a name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        normalise(raw.as_ref()).map(Self)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated attributes of a user that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Contact address.
    pub email: EmailAddress,
    /// Given name.
    pub firstname: PersonName,
    /// Family name.
    pub lastname: PersonName,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// Replacement e-mail address.
    pub email: Option<EmailAddress>,
    /// Replacement given name.
    pub firstname: Option<PersonName>,
    /// Replacement family name.
    pub lastname: Option<PersonName>,
}

impl UserPatch {
    /// Whether applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.firstname.is_none() && self.lastname.is_none()
    }
}

/// Persisted user.
///
/// ## Invariants
/// - `id` is assigned by the store and never changes.
/// - `email`, `firstname`, and `lastname` are non-blank and at most
///   [`USER_TEXT_MAX`] characters; `email` is e-mail shaped.
///
/// Serialises as `{"id", "email", "firstname", "lastname"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    email: EmailAddress,
    firstname: PersonName,
    lastname: PersonName,
}

impl User {
    /// Combine a store-assigned id with validated attributes.
    pub fn new(id: UserId, profile: UserProfile) -> Self {
        let UserProfile {
            email,
            firstname,
            lastname,
        } = profile;
        Self {
            id,
            email,
            firstname,
            lastname,
        }
    }

    /// Fallible constructor from raw parts, as read back from storage.
    pub fn try_from_parts(
        id: i64,
        email: &str,
        firstname: &str,
        lastname: &str,
    ) -> Result<Self, UserValidationError> {
        Ok(Self::new(
            UserId::new(id)?,
            UserProfile {
                email: EmailAddress::new(email)?,
                firstname: PersonName::new(firstname)?,
                lastname: PersonName::new(lastname)?,
            },
        ))
    }

    /// Stable identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Contact address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Given name.
    pub fn firstname(&self) -> &PersonName {
        &self.firstname
    }

    /// Family name.
    pub fn lastname(&self) -> &PersonName {
        &self.lastname
    }

    /// Merge a partial update over this record. The id is kept.
    ///
    /// # Examples
    /// ```
    /// use user_api::domain::{PersonName, User, UserPatch};
    ///
    /// let user = User::try_from_parts(1, "mia@example.com", "Mia", "Muster").unwrap();
    /// let patch = UserPatch {
    ///     firstname: Some(PersonName::new("Maja").unwrap()),
    ///     ..UserPatch::default()
    /// };
    /// let merged = user.apply(patch);
    /// assert_eq!(merged.firstname().as_ref(), "Maja");
    /// assert_eq!(merged.lastname().as_ref(), "Muster");
    /// ```
    #[must_use]
    pub fn apply(self, patch: UserPatch) -> Self {
        let UserPatch {
            email,
            firstname,
            lastname,
        } = patch;
        Self {
            id: self.id,
            email: email.unwrap_or(self.email),
            firstname: firstname.unwrap_or(self.firstname),
            lastname: lastname.unwrap_or(self.lastname),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct UserDto {
    id: i64,
    email: String,
    firstname: String,
    lastname: String,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            email,
            firstname,
            lastname,
        } = value;
        Self {
            id: id.get(),
            email: email.into(),
            firstname: firstname.into(),
            lastname: lastname.into(),
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        Self::try_from_parts(value.id, &value.email, &value.firstname, &value.lastname)
    }
}

#[cfg(test)]
mod tests;
