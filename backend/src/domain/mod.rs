//! Domain primitives, validation, ports, and the user use-case service.
//!
//! Public surface:
//! - [`User`] and its value types ([`UserId`], [`EmailAddress`],
//!   [`PersonName`], [`UserProfile`], [`UserPatch`]).
//! - [`validate_new_user`] / [`validate_user_patch`] over plain drafts.
//! - [`Error`] / [`ErrorCode`], the transport-agnostic failure payload.
//! - [`UsersService`], implementing the driving ports in [`ports`].

pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_validation;
pub mod users_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, PersonName, USER_TEXT_MAX, User, UserId, UserPatch, UserProfile,
    UserValidationError,
};
pub use self::user_validation::{
    FieldError, FieldErrorCode, UserDraft, UserPatchDraft, ValidationErrors, validate_new_user,
    validate_user_patch,
};
pub use self::users_service::UsersService;
