use crate::error::{HomebaseError, HomebaseResult};
use regex::Regex;
use std::sync::OnceLock;
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> HomebaseResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(HomebaseError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.message {
                Some(message) => message.to_string(),
                None => match &error.code {
                    std::borrow::Cow::Borrowed("length") => {
                        format!("Length validation failed for field '{}'", field)
                    }
                    std::borrow::Cow::Borrowed("range") => {
                        format!("Value out of range for field '{}'", field)
                    }
                    std::borrow::Cow::Borrowed("required") => {
                        format!("Field '{}' is required", field)
                    }
                    _ => format!("Validation failed for field '{}': {}", field, error.code),
                },
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

/// Returns the trimmed value, or a validation error carrying `message`.
pub fn require_non_blank<'a>(
    field: &str,
    value: Option<&'a str>,
    message: &str,
) -> HomebaseResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(HomebaseError::validation(field, message)),
    }
}

/// SQL identifiers for collection tables: lowercase, digits, underscores.
pub fn validate_identifier(name: &str) -> HomebaseResult<()> {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let re = IDENT.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("valid regex"));

    if !re.is_match(name) {
        return Err(HomebaseError::validation(
            "collection",
            format!("Invalid collection name '{}'", name),
        ));
    }

    Ok(())
}

/// Object-storage pathnames: relative, no traversal, conservative charset.
pub fn validate_storage_path(path: &str) -> HomebaseResult<()> {
    static PATH: OnceLock<Regex> = OnceLock::new();
    let re = PATH.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._\-]+(/[A-Za-z0-9._\-]+)*$").expect("valid regex")
    });

    if path.len() > 512 || !re.is_match(path) || path.split('/').any(|s| s == "..") {
        return Err(HomebaseError::validation(
            "filename",
            "Missing or invalid filename",
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> HomebaseResult<()> {
    if file_size > max_size {
        return Err(HomebaseError::validation(
            "file_size",
            format!(
                "File size {} bytes exceeds maximum allowed size {} bytes",
                file_size, max_size
            ),
        ));
    }

    Ok(())
}
