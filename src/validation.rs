//! Form checks that collect every problem instead of stopping at the first.

use crate::{
    dto::{
        auth::{LoginRequest, RegisterRequest},
        orders::CheckoutRequest,
    },
    error::AppError,
    models::Address,
};

pub type ValidationErrors = Vec<String>;

impl From<ValidationErrors> for AppError {
    fn from(messages: ValidationErrors) -> Self {
        AppError::Validation(messages)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn required(
    field: &'static str,
    value: &Option<String>,
    errors: &mut ValidationErrors,
) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            errors.push(format!("{field} is required"));
            String::new()
        }
    }
}

pub fn check_checkout_info(form: &CheckoutRequest) -> Result<ShippingInfo, ValidationErrors> {
    let mut errors = Vec::new();

    let first_name = required("first_name", &form.first_name, &mut errors);
    let last_name = required("last_name", &form.last_name, &mut errors);
    let street = required("street", &form.street, &mut errors);
    let postal_code = required("postal_code", &form.postal_code, &mut errors);
    let city = required("city", &form.city, &mut errors);
    let country = required("country", &form.country, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ShippingInfo {
        first_name,
        last_name,
        address: Address {
            street,
            city,
            postal_code,
            country,
        },
    })
}

pub fn check_registration(form: &RegisterRequest) -> Result<NewUser, ValidationErrors> {
    let mut errors = Vec::new();

    let first_name = form.first_name.trim();
    let last_name = form.last_name.trim();
    let email = form.email.trim();
    let username = form.username.trim();

    let fields = [
        first_name,
        last_name,
        email,
        username,
        form.password.as_str(),
        form.confirm_password.as_str(),
    ];
    if fields.iter().any(|f| f.is_empty()) {
        errors.push("All fields are required".to_string());
    }
    if form.password != form.confirm_password {
        errors.push("Passwords must match".to_string());
    }
    if form.password.chars().count() < 6 {
        errors.push("Password must be greater than or equal to 6 characters".to_string());
    }
    if username.chars().count() < 3 {
        errors.push("Username must be greater than or equal to 3 characters".to_string());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewUser {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        username: username.to_string(),
        password: form.password.clone(),
    })
}

pub fn check_login(form: &LoginRequest) -> Result<Credentials, ValidationErrors> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Err(vec!["All fields are required".to_string()]);
    }
    Ok(Credentials {
        username: username.to_string(),
        password: form.password.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form() -> CheckoutRequest {
        CheckoutRequest {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            street: Some("12 Analytical Way".into()),
            postal_code: Some("NW1".into()),
            city: Some("London".into()),
            country: Some("UK".into()),
        }
    }

    #[test]
    fn complete_checkout_form_is_trimmed_into_shipping_info() {
        let mut form = full_form();
        form.city = Some("  London ".into());
        let info = check_checkout_info(&form).unwrap();
        assert_eq!(info.address.city, "London");
        assert_eq!(info.first_name, "Ada");
    }

    #[test]
    fn every_missing_checkout_field_is_reported() {
        let form = CheckoutRequest {
            first_name: Some("Ada".into()),
            street: Some("   ".into()),
            ..Default::default()
        };
        let errors = check_checkout_info(&form).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "last_name is required",
                "street is required",
                "postal_code is required",
                "city is required",
                "country is required",
            ]
        );
    }

    #[test]
    fn registration_collects_all_messages() {
        let form = RegisterRequest {
            first_name: "Ada".into(),
            last_name: "".into(),
            email: "ada@example.com".into(),
            username: "ab".into(),
            password: "abc".into(),
            confirm_password: "abd".into(),
        };
        let errors = check_registration(&form).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0], "All fields are required");
        assert!(errors.contains(&"Passwords must match".to_string()));
    }

    #[test]
    fn valid_registration_passes() {
        let form = RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: " ada@example.com ".into(),
            username: "ada".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        };
        let user = check_registration(&form).unwrap();
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn login_requires_both_fields() {
        let form = LoginRequest {
            username: "ada".into(),
            password: String::new(),
        };
        assert_eq!(
            check_login(&form).unwrap_err(),
            vec!["All fields are required".to_string()]
        );
    }
}
