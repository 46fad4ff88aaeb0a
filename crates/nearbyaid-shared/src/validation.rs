//! Explicit input validation.
//!
//! Every function here is pure and returns the first offending field as a
//! [`ValidationError`]. The server runs them at the HTTP boundary and the
//! store runs [`AidDraft::validate`] again before every insert.

use crate::constants::{
    MAX_CONTACT_LEN, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_TITLE_LEN, MIN_PASSWORD_LEN,
};
use crate::error::{ValidationError, ValidationReason};
use crate::protocol::{CreateAidRequest, LoginRequest, NumberOrText, RegisterRequest};
use crate::types::{Category, GeoPoint};

/// A help point that passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct AidDraft {
    pub title: String,
    pub category: Category,
    pub description: String,
    pub location: GeoPoint,
    pub contact: String,
}

impl AidDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::missing("title"));
        }
        check_len("title", &self.title, MAX_TITLE_LEN)?;
        check_len("description", &self.description, MAX_DESCRIPTION_LEN)?;
        check_len("contact", &self.contact, MAX_CONTACT_LEN)?;
        if !self.location.is_finite() {
            return Err(ValidationError::new("location", ValidationReason::NotANumber));
        }
        if !self.location.in_bounds() {
            return Err(ValidationError::new("location", ValidationReason::OutOfRange));
        }
        Ok(())
    }
}

/// Validate a `POST /api/aid` body into an [`AidDraft`].
///
/// Required fields are checked in the order `title`, `type`, `lat`, `lng`
/// before any length or range check runs.
pub fn validate_new_aid(req: &CreateAidRequest) -> Result<AidDraft, ValidationError> {
    let title = required_text("title", req.title.as_deref())?;
    let category_raw = required_text("type", req.category.as_deref())?;
    let lat = req.lat.as_ref().ok_or_else(|| ValidationError::missing("lat"))?;
    let lng = req.lng.as_ref().ok_or_else(|| ValidationError::missing("lng"))?;

    let category: Category = category_raw.parse().map_err(|_| {
        ValidationError::new("type", ValidationReason::InvalidChoice(category_raw.clone()))
    })?;
    let lat = coordinate("lat", lat)?;
    let lng = coordinate("lng", lng)?;

    let draft = AidDraft {
        title,
        category,
        description: optional_text(req.description.as_deref()),
        location: GeoPoint::from_lat_lng(lat, lng),
        contact: optional_text(req.contact.as_deref()),
    };
    draft.validate()?;
    Ok(draft)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn validate_registration(req: &RegisterRequest) -> Result<Registration, ValidationError> {
    let name = required_text("name", req.name.as_deref())?;
    let email = required_text("email", req.email.as_deref())?;
    let password = req
        .password
        .clone()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ValidationError::missing("password"))?;

    check_len("name", &name, MAX_NAME_LEN)?;
    let email = normalize_email(&email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            ValidationReason::TooShort {
                min: MIN_PASSWORD_LEN,
            },
        ));
    }

    Ok(Registration {
        name,
        email,
        password,
    })
}

/// Returns the normalized email and the password.
pub fn validate_login(req: &LoginRequest) -> Result<(String, String), ValidationError> {
    let email = required_text("email", req.email.as_deref())?;
    let password = req
        .password
        .clone()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ValidationError::missing("password"))?;
    Ok((email.to_lowercase(), password))
}

/// Parse a coordinate or distance given as text (query strings).
pub fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::new(field, ValidationReason::NotANumber))?;
    if !value.is_finite() {
        return Err(ValidationError::new(field, ValidationReason::NotANumber));
    }
    Ok(value)
}

fn coordinate(field: &'static str, value: &NumberOrText) -> Result<f64, ValidationError> {
    match value {
        NumberOrText::Number(v) if v.is_finite() => Ok(*v),
        NumberOrText::Number(_) => Err(ValidationError::new(field, ValidationReason::NotANumber)),
        NumberOrText::Text(s) if s.trim().is_empty() => Err(ValidationError::missing(field)),
        NumberOrText::Text(s) => parse_number(field, s),
    }
}

fn required_text(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::missing(field)),
    }
}

fn optional_text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(field, ValidationReason::TooLong { max }));
    }
    Ok(())
}

fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.to_lowercase();
    let malformed = || ValidationError::new("email", ValidationReason::Malformed);
    let (local, domain) = email.split_once('@').ok_or_else(malformed)?;
    if local.is_empty()
        || domain.contains('@')
        || email.contains(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(malformed());
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hospital() -> CreateAidRequest {
        CreateAidRequest {
            title: Some("City Hospital".into()),
            category: Some("medical".into()),
            description: None,
            lat: Some(25.30.into()),
            lng: Some(82.97.into()),
            contact: Some("9990001111".into()),
        }
    }

    #[test]
    fn test_valid_aid_is_stored_lon_first() {
        let draft = validate_new_aid(&hospital()).unwrap();
        assert_eq!(draft.location.coordinates(), [82.97, 25.30]);
        assert_eq!(draft.category, Category::Medical);
        assert_eq!(draft.description, "");
    }

    #[test]
    fn test_each_required_field_is_reported() {
        let cases: [(&str, fn(&mut CreateAidRequest)); 4] = [
            ("title", |r| r.title = None),
            ("type", |r| r.category = None),
            ("lat", |r| r.lat = None),
            ("lng", |r| r.lng = None),
        ];
        for (field, strip) in cases {
            let mut req = hospital();
            strip(&mut req);
            let err = validate_new_aid(&req).unwrap_err();
            assert_eq!(err.field, field);
            assert_eq!(err.reason, ValidationReason::Missing);
        }
    }

    #[test]
    fn test_blank_title_is_missing() {
        let mut req = hospital();
        req.title = Some("   ".into());
        assert_eq!(validate_new_aid(&req).unwrap_err(), ValidationError::missing("title"));
    }

    #[test]
    fn test_zero_coordinates_are_accepted() {
        let mut req = hospital();
        req.lat = Some(0.0.into());
        req.lng = Some(NumberOrText::Text("0".into()));
        let draft = validate_new_aid(&req).unwrap();
        assert_eq!(draft.location.coordinates(), [0.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut req = hospital();
        req.category = Some("hospital".into());
        let err = validate_new_aid(&req).unwrap_err();
        assert_eq!(err.field, "type");
        assert_eq!(err.to_string(), "type 'hospital' is not a valid choice");
    }

    #[test]
    fn test_length_limits() {
        let mut req = hospital();
        req.title = Some("x".repeat(101));
        assert_eq!(
            validate_new_aid(&req).unwrap_err().reason,
            ValidationReason::TooLong { max: 100 }
        );

        let mut req = hospital();
        req.contact = Some("1".repeat(21));
        assert_eq!(validate_new_aid(&req).unwrap_err().field, "contact");

        let mut req = hospital();
        req.description = Some("d".repeat(500));
        assert!(validate_new_aid(&req).is_ok());
    }

    #[test]
    fn test_out_of_bounds_location_rejected() {
        let mut req = hospital();
        req.lat = Some(91.0.into());
        let err = validate_new_aid(&req).unwrap_err();
        assert_eq!(err.field, "location");
        assert_eq!(err.reason, ValidationReason::OutOfRange);
    }

    #[test]
    fn test_non_numeric_coordinate() {
        let mut req = hospital();
        req.lng = Some(NumberOrText::Text("east".into()));
        assert_eq!(
            validate_new_aid(&req).unwrap_err(),
            ValidationError::new("lng", ValidationReason::NotANumber)
        );
        assert!(parse_number("lat", "NaN").is_err());
        assert!(parse_number("lat", "inf").is_err());
        assert_eq!(parse_number("lat", " 25.5 ").unwrap(), 25.5);
    }

    #[test]
    fn test_registration() {
        let ok = validate_registration(&RegisterRequest {
            name: Some(" Asha ".into()),
            email: Some("Asha@Example.org".into()),
            password: Some("secret1".into()),
        })
        .unwrap();
        assert_eq!(ok.name, "Asha");
        assert_eq!(ok.email, "asha@example.org");

        let bad_email = validate_registration(&RegisterRequest {
            name: Some("Asha".into()),
            email: Some("asha.example.org".into()),
            password: Some("secret1".into()),
        });
        assert_eq!(bad_email.unwrap_err().field, "email");

        let short = validate_registration(&RegisterRequest {
            name: Some("Asha".into()),
            email: Some("asha@example.org".into()),
            password: Some("abc".into()),
        });
        assert_eq!(
            short.unwrap_err().reason,
            ValidationReason::TooShort { min: 6 }
        );
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(
            validate_login(&LoginRequest::default()).unwrap_err(),
            ValidationError::missing("email")
        );
        let (email, _) = validate_login(&LoginRequest {
            email: Some("A@B.io".into()),
            password: Some("pw".into()),
        })
        .unwrap();
        assert_eq!(email, "a@b.io");
    }
}
