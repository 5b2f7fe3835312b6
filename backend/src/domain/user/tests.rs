//! Tests for the user entity and value types.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn mia() -> User {
    User::try_from_parts(7, "mia.muster@musterfirma.de", "Mia", "Muster").expect("valid user")
}

#[rstest]
#[case(0)]
#[case(-3)]
fn user_id_rejects_non_positive_values(#[case] raw: i64) {
    assert_eq!(UserId::new(raw), Err(UserValidationError::InvalidId));
}

#[rstest]
#[case("mia.muster@musterfirma.de")]
#[case("a+tag@sub.example.org")]
fn email_accepts_plausible_addresses(#[case] raw: &str) {
    let email = EmailAddress::new(raw).expect("valid email");
    assert_eq!(email.as_ref(), raw);
}

#[rstest]
#[case("mia", UserValidationError::InvalidEmail)]
#[case("mia@localhost", UserValidationError::InvalidEmail)]
#[case("mia muster@example.com", UserValidationError::InvalidEmail)]
#[case("   ", UserValidationError::Blank)]
fn email_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(EmailAddress::new(raw), Err(expected));
}

#[rstest]
fn names_are_trimmed() {
    let name = PersonName::new("  Mia ").expect("valid name");
    assert_eq!(name.as_ref(), "Mia");
}

#[rstest]
fn names_longer_than_limit_are_rejected() {
    let raw = "x".repeat(USER_TEXT_MAX + 1);
    assert_eq!(
        PersonName::new(raw),
        Err(UserValidationError::TooLong {
            max: USER_TEXT_MAX
        })
    );
}

#[rstest]
fn names_at_limit_are_accepted() {
    let raw = "é".repeat(USER_TEXT_MAX);
    assert!(PersonName::new(raw).is_ok());
}

#[rstest]
fn user_serialises_to_flat_json(mia: User) {
    let value = serde_json::to_value(&mia).expect("serialise user");
    assert_eq!(
        value,
        json!({
            "id": 7,
            "email": "mia.muster@musterfirma.de",
            "firstname": "Mia",
            "lastname": "Muster",
        })
    );
}

#[rstest]
fn user_deserialisation_enforces_invariants() {
    let result: Result<User, _> = serde_json::from_value(json!({
        "id": 1,
        "email": "not-an-email",
        "firstname": "Mia",
        "lastname": "Muster",
    }));
    assert!(result.is_err());
}

#[rstest]
fn apply_keeps_id_and_omitted_fields(mia: User) {
    let patch = UserPatch {
        lastname: Some(PersonName::new("Musterfrau").expect("valid name")),
        ..UserPatch::default()
    };

    let merged = mia.clone().apply(patch);

    assert_eq!(merged.id(), mia.id());
    assert_eq!(merged.email(), mia.email());
    assert_eq!(merged.firstname(), mia.firstname());
    assert_eq!(merged.lastname().as_ref(), "Musterfrau");
}

#[rstest]
fn empty_patch_is_identity(mia: User) {
    let patch = UserPatch::default();
    assert!(patch.is_empty());
    assert_eq!(mia.clone().apply(patch), mia);
}
