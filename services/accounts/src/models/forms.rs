//! Request forms and field validation

use common::error::{FieldReason, ValidationError};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// An optional request field that tells "absent" apart from present values.
///
/// An explicit JSON `null` counts as absent, so clients cannot clear a
/// field by sending `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// The field did not appear in the request
    Unset,
    /// The field appeared with this value
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Unset,
        })
    }
}

impl<T> Patch<T> {
    /// The contained value, if the field was present
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Unset => None,
        }
    }

    /// True when the field was present in the request
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }
}

/// Login and registration form
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsForm {
    /// Both fields are mandatory; all failures are reported at once
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errs = ValidationError::new();

        if self.username.is_empty() {
            errs.add("username", FieldReason::Required);
        }
        if self.password.is_empty() {
            errs.add("password", FieldReason::Required);
        }

        if errs.is_empty() { Ok(()) } else { Err(errs) }
    }
}

/// Profile update form. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub username: Patch<String>,
    #[serde(default, rename = "oldPassword")]
    pub old_password: Patch<String>,
    #[serde(default, rename = "newPassword")]
    pub new_password: Patch<String>,
    #[serde(default)]
    pub photo_uuid: Patch<String>,
}

impl UpdateForm {
    /// Structural validation of whatever fields are present.
    ///
    /// The old-password proof is not checked here; that needs the stored
    /// credentials and happens in the update flow.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errs = ValidationError::new();

        if let Some(username) = self.username.value() {
            if username.is_empty() {
                errs.add("username", FieldReason::Invalid);
            }
        }
        if let Some(new_password) = self.new_password.value() {
            if new_password.is_empty() {
                errs.add("newPassword", FieldReason::Invalid);
            }
        }
        if let Err(photo_errs) = self.parsed_photo() {
            errs.merge(photo_errs);
        }

        if errs.is_empty() { Ok(()) } else { Err(errs) }
    }

    /// The photo field parsed as a UUID, when present
    pub fn parsed_photo(&self) -> Result<Option<Uuid>, ValidationError> {
        match self.photo_uuid.value() {
            None => Ok(None),
            Some(raw) => Uuid::parse_str(raw)
                .map(Some)
                .map_err(|_| ValidationError::of("photo_uuid", FieldReason::Invalid)),
        }
    }

    /// True when the request asks for no change at all.
    ///
    /// A lone old password changes nothing, so it still counts as a no-op.
    pub fn is_noop(&self) -> bool {
        !self.username.is_set() && !self.new_password.is_set() && !self.photo_uuid.is_set()
    }
}

/// Username availability form. Deliberately unvalidated: any value,
/// including the empty string, is a name nobody is registered under.
#[derive(Debug, Clone, Deserialize)]
pub struct UsernameForm {
    #[serde(default)]
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_absent_from_present() {
        let form: UpdateForm = serde_json::from_str(r#"{"username":"kappa"}"#).unwrap();
        assert_eq!(form.username, Patch::Set("kappa".to_string()));
        assert_eq!(form.new_password, Patch::Unset);
        assert_eq!(form.photo_uuid, Patch::Unset);
    }

    #[test]
    fn patch_treats_null_as_absent() {
        let form: UpdateForm =
            serde_json::from_str(r#"{"username":null,"newPassword":null}"#).unwrap();
        assert!(!form.username.is_set());
        assert!(!form.new_password.is_set());
        assert!(form.is_noop());
    }

    #[test]
    fn credentials_require_both_fields() {
        let form: CredentialsForm = serde_json::from_str(r#"{}"#).unwrap();
        let errs = form.validate().unwrap_err();
        assert_eq!(errs.get("username"), Some(FieldReason::Required));
        assert_eq!(errs.get("password"), Some(FieldReason::Required));

        let form: CredentialsForm = serde_json::from_str(r#"{"username":"kappa"}"#).unwrap();
        let errs = form.validate().unwrap_err();
        assert_eq!(errs.get("username"), None);
        assert_eq!(errs.get("password"), Some(FieldReason::Required));
    }

    #[test]
    fn credentials_accept_filled_form() {
        let form: CredentialsForm =
            serde_json::from_str(r#"{"username":"kappa","password":"pass"}"#).unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn update_rejects_present_but_empty_fields() {
        let form: UpdateForm =
            serde_json::from_str(r#"{"username":"","newPassword":""}"#).unwrap();
        let errs = form.validate().unwrap_err();
        assert_eq!(errs.get("username"), Some(FieldReason::Invalid));
        assert_eq!(errs.get("newPassword"), Some(FieldReason::Invalid));
    }

    #[test]
    fn update_rejects_malformed_photo_uuid() {
        let form: UpdateForm = serde_json::from_str(r#"{"photo_uuid":"not-a-uuid"}"#).unwrap();
        let errs = form.validate().unwrap_err();
        assert_eq!(errs.get("photo_uuid"), Some(FieldReason::Invalid));
    }

    #[test]
    fn update_parses_valid_photo_uuid() {
        let photo = Uuid::new_v4();
        let form: UpdateForm =
            serde_json::from_str(&format!(r#"{{"photo_uuid":"{}"}}"#, photo)).unwrap();
        assert!(form.validate().is_ok());
        assert_eq!(form.parsed_photo().unwrap(), Some(photo));
    }

    #[test]
    fn lone_old_password_is_a_noop() {
        let form: UpdateForm = serde_json::from_str(r#"{"oldPassword":"pass"}"#).unwrap();
        assert!(form.validate().is_ok());
        assert!(form.is_noop());
    }

    #[test]
    fn username_form_accepts_anything() {
        let form: UsernameForm = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(form.username, "");

        let form: UsernameForm = serde_json::from_str(r#"{"username":"kappa"}"#).unwrap();
        assert_eq!(form.username, "kappa");
    }
}
