//! Request and response bodies with boundary validation

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::session::SessionDto;

/// Field-level checks run on a deserialized request body
pub trait Validate {
    /// Returns the first violation found, if any
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl ValidationError {
    fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

fn not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}

fn length_between(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::new(field, "length out of range"));
    }
    Ok(())
}

/// Loose email shape check: local part, `@`, dotted domain
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<regex_lite::Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| {
        regex_lite::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex")
    });
    re.is_match(email)
}

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        not_blank("email", &self.email)?;
        not_blank("password", &self.password)
    }
}

/// Account registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        not_blank("email", &self.email)?;
        length_between("email", &self.email, 1, 50)?;
        if !is_valid_email(&self.email) {
            return Err(ValidationError::new("email", "must be a well-formed email"));
        }
        not_blank("firstName", &self.first_name)?;
        length_between("firstName", &self.first_name, 3, 20)?;
        not_blank("lastName", &self.last_name)?;
        length_between("lastName", &self.last_name, 3, 20)?;
        not_blank("password", &self.password)?;
        length_between("password", &self.password, 6, 40)
    }
}

impl Validate for SessionDto {
    fn validate(&self) -> Result<(), ValidationError> {
        not_blank("name", &self.name)?;
        length_between("name", &self.name, 1, 50)?;
        length_between("description", &self.description, 0, 2500)
    }
}

/// Successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
}

impl JwtResponse {
    /// Bearer response for an authenticated user
    pub fn bearer(
        token: String,
        id: i64,
        username: String,
        first_name: String,
        last_name: String,
        admin: bool,
    ) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            id,
            username,
            first_name,
            last_name,
            admin,
        }
    }
}

/// Plain message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn signup() -> SignupRequest {
        SignupRequest {
            email: "yoga@studio.com".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            password: "test!1234".to_string(),
        }
    }

    fn session_dto(name: &str, description: &str) -> SessionDto {
        SessionDto {
            id: None,
            name: name.to_string(),
            date: Utc::now(),
            teacher_id: Some(1),
            description: description.to_string(),
            users: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    // Test 1: Email shape check
    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("yoga@studio.com"));
        assert!(is_valid_email("a.b+c@d.e.fr"));
        assert!(!is_valid_email("bad-email"));
        assert!(!is_valid_email("no@tld"));
        assert!(!is_valid_email("two@@at.com"));
        assert!(!is_valid_email(""));
    }

    // Test 2: Login requires both fields
    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "yoga@studio.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());

        let missing_password = LoginRequest {
            password: " ".to_string(),
            ..ok.clone()
        };
        assert_eq!(missing_password.validate().unwrap_err().field, "password");

        let missing_email = LoginRequest {
            email: String::new(),
            ..ok
        };
        assert_eq!(missing_email.validate().unwrap_err().field, "email");
    }

    // Test 3: Signup accepts a well-formed request
    #[test]
    fn test_signup_valid() {
        assert!(signup().validate().is_ok());
    }

    // Test 4: Signup rejects a malformed email
    #[test]
    fn test_signup_bad_email() {
        let req = SignupRequest {
            email: "bad-email".to_string(),
            ..signup()
        };
        assert_eq!(req.validate().unwrap_err().field, "email");
    }

    // Test 5: Signup length limits
    #[test]
    fn test_signup_length_limits() {
        let short_name = SignupRequest {
            first_name: "Jo".to_string(),
            ..signup()
        };
        assert_eq!(short_name.validate().unwrap_err().field, "firstName");

        let long_name = SignupRequest {
            last_name: "x".repeat(21),
            ..signup()
        };
        assert_eq!(long_name.validate().unwrap_err().field, "lastName");

        let short_password = SignupRequest {
            password: "12345".to_string(),
            ..signup()
        };
        assert_eq!(short_password.validate().unwrap_err().field, "password");

        let long_email = SignupRequest {
            email: format!("{}@studio.com", "a".repeat(45)),
            ..signup()
        };
        assert_eq!(long_email.validate().unwrap_err().field, "email");
    }

    // Test 6: Signup uses camelCase on the wire
    #[test]
    fn test_signup_deserialization() {
        let json = r#"{"email":"a@b.com","firstName":"John","lastName":"Doe","password":"secret1"}"#;
        let req: SignupRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.first_name, "John");
        assert_eq!(req.last_name, "Doe");
    }

    // Test 7: Session name and description limits
    #[test]
    fn test_session_validation() {
        assert!(session_dto("Yoga", "desc").validate().is_ok());
        assert!(session_dto("Yoga", "").validate().is_ok());
        assert_eq!(session_dto("  ", "d").validate().unwrap_err().field, "name");
        assert_eq!(
            session_dto(&"n".repeat(51), "d").validate().unwrap_err().field,
            "name"
        );
        assert_eq!(
            session_dto("Yoga", &"d".repeat(2501)).validate().unwrap_err().field,
            "description"
        );
    }

    // Test 8: JwtResponse wire shape
    #[test]
    fn test_jwt_response_serialization() {
        let response = JwtResponse::bearer(
            "tok".to_string(),
            1,
            "yoga@studio.com".to_string(),
            "Admin".to_string(),
            "Admin".to_string(),
            true,
        );
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["token"], "tok");
        assert_eq!(json["type"], "Bearer");
        assert_eq!(json["id"], 1);
        assert_eq!(json["username"], "yoga@studio.com");
        assert_eq!(json["firstName"], "Admin");
        assert_eq!(json["lastName"], "Admin");
        assert_eq!(json["admin"], true);
    }

    // Test 9: MessageResponse
    #[test]
    fn test_message_response() {
        let json = serde_json::to_string(&MessageResponse::new("User registered successfully!")).unwrap();
        assert_eq!(json, r#"{"message":"User registered successfully!"}"#);
    }
}
