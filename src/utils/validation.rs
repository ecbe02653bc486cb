//! Utilidades de validación
//!
//! Validadores `custom` para los DTOs y helpers de formato (emails,
//! matrículas e importes).

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use validator::ValidationError;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email regex is valid")
    })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de email
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if !email_regex().is_match(value.trim()) {
        let mut error = ValidationError::new("email");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un importe no tenga más de dos decimales
pub fn validate_money(value: f64) -> Result<(), ValidationError> {
    validate_positive(value)?;
    let cents = value * 100.0;
    if (cents - cents.round()).abs() > 1e-6 {
        let mut error = ValidationError::new("money");
        error.add_param("value".into(), &value);
        error.add_param("decimal_places".into(), &2);
        return Err(error);
    }
    Ok(())
}

/// Normalizar una matrícula (sin separadores, en mayúsculas)
pub fn normalize_license_plate(value: &str) -> String {
    value.replace([' ', '-', '_'], "").to_uppercase()
}

/// Validar formato de matrícula de vehículo
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    // Formato básico: XX-123-XX o similar
    let clean_plate = normalize_license_plate(value);
    if clean_plate.len() < 5
        || clean_plate.len() > 10
        || !clean_plate.chars().all(|c| c.is_ascii_alphanumeric())
    {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("Lisboa").is_ok());
        assert!(validate_not_empty("   ").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("guide.one@tours.example.org").is_ok());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("test@").is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(5).is_ok());
        assert!(validate_positive(0).is_err());
        assert!(validate_positive(-5).is_err());
    }

    #[test]
    fn test_validate_money() {
        assert!(validate_money(1299.99).is_ok());
        assert!(validate_money(10.0).is_ok());
        assert!(validate_money(10.001).is_err());
        assert!(validate_money(0.0).is_err());
    }

    #[test]
    fn test_validate_license_plate() {
        assert!(validate_license_plate("AB-123-CD").is_ok());
        assert!(validate_license_plate("A").is_err());
        assert!(validate_license_plate("ABCDEFGHIJK").is_err());
        assert!(validate_license_plate("AB#123").is_err());
        assert_eq!(normalize_license_plate("ab-123 cd"), "AB123CD");
    }
}
