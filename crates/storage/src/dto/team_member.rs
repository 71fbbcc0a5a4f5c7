use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidateUrl, ValidationError};

use crate::models::{ACTIVE_STATUS, TeamMember};

/// Form buffer for creating or editing a team member.
///
/// Every field is plain text exactly as typed; blank optional fields are
/// only turned into `None` when the draft becomes a [`TeamMemberPayload`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct TeamMemberDraft {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[validate(custom(function = "not_blank", message = "Role is required"))]
    pub role: String,

    #[validate(custom(function = "not_blank", message = "Bio is required"))]
    pub bio: String,

    #[validate(custom(function = "not_blank", message = "Image is required"))]
    pub image_url: String,

    #[validate(custom(function = "optional_url", message = "LinkedIn URL must be a valid URL"))]
    pub linkedin_url: String,

    #[validate(custom(function = "optional_email", message = "Email must be a valid address"))]
    pub email: String,
}

/// Row written to `teams` on create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberPayload {
    pub name: String,
    pub role: String,
    pub bio: String,
    pub image_url: String,
    pub linkedin_url: Option<String>,
    pub email: Option<String>,
    pub status: String,
}

impl TeamMemberDraft {
    pub fn into_payload(self) -> TeamMemberPayload {
        TeamMemberPayload {
            name: self.name,
            role: self.role,
            bio: self.bio,
            image_url: self.image_url,
            linkedin_url: present(self.linkedin_url),
            email: present(self.email),
            status: ACTIVE_STATUS.to_string(),
        }
    }
}

impl From<&TeamMember> for TeamMemberDraft {
    fn from(member: &TeamMember) -> Self {
        Self {
            name: member.name.clone(),
            role: member.role.clone(),
            bio: member.bio.clone(),
            image_url: member.image_url.clone(),
            linkedin_url: member.linkedin_url.clone().unwrap_or_default(),
            email: member.email.clone().unwrap_or_default(),
        }
    }
}

fn present(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// Validation helpers
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

fn optional_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_url"))
    }
}

fn optional_email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> TeamMemberDraft {
        TeamMemberDraft {
            name: "Grace Hopper".to_string(),
            role: "Chair".to_string(),
            bio: "Compiler pioneer".to_string(),
            image_url: "https://cdn.example.com/grace.png".to_string(),
            linkedin_url: String::new(),
            email: String::new(),
        }
    }

    #[test]
    fn test_complete_draft_is_valid() {
        assert!(complete_draft().validate().is_ok());
    }

    #[test]
    fn test_each_required_field_is_enforced() {
        let blankers: [fn(&mut TeamMemberDraft); 4] = [
            |d| d.name.clear(),
            |d| d.role.clear(),
            |d| d.bio = "   ".to_string(),
            |d| d.image_url.clear(),
        ];
        let fields = ["name", "role", "bio", "image_url"];

        for (blank, field) in blankers.iter().zip(fields) {
            let mut draft = complete_draft();
            blank(&mut draft);
            let errors = draft.validate().unwrap_err();
            assert!(
                errors.field_errors().contains_key(field),
                "expected an error on {}",
                field
            );
        }
    }

    #[test]
    fn test_optional_fields_are_checked_when_present() {
        let mut draft = complete_draft();
        draft.email = "not-an-email".to_string();
        draft.linkedin_url = "linkedin".to_string();
        let errors = draft.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("linkedin_url"));

        draft.email = "grace@example.com".to_string();
        draft.linkedin_url = "https://www.linkedin.com/in/grace".to_string();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_blank_optionals_become_null() {
        let mut draft = complete_draft();
        draft.email = "  ".to_string();
        let payload = draft.into_payload();

        assert_eq!(payload.linkedin_url, None);
        assert_eq!(payload.email, None);
        assert_eq!(payload.status, "active");

        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["email"].is_null());
        assert!(value["linkedin_url"].is_null());
    }

    #[test]
    fn test_optionals_are_stored_trimmed() {
        let mut draft = complete_draft();
        draft.linkedin_url = " https://www.linkedin.com/in/grace ".to_string();
        draft.email = "\tgrace@example.com ".to_string();
        assert!(draft.validate().is_ok());

        let payload = draft.into_payload();
        assert_eq!(
            payload.linkedin_url.as_deref(),
            Some("https://www.linkedin.com/in/grace")
        );
        assert_eq!(payload.email.as_deref(), Some("grace@example.com"));
    }
}
