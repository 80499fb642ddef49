use crate::error::{PortalError, PortalResult};
use validator::{Validate, ValidationErrors};

/// Extensions accepted by the BOM import.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

pub fn validate_model<T: Validate>(model: &T) -> PortalResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let field = first_invalid_field(&errors).unwrap_or_else(|| "model".to_string());
            Err(PortalError::validation(field, format_validation_errors(&errors)))
        }
    }
}

fn first_invalid_field(errors: &ValidationErrors) -> Option<String> {
    let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    fields.sort_unstable();
    fields.first().map(|f| f.to_string())
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match (&error.message, &*error.code) {
                (Some(message), _) => format!("Field '{}' {}", field, message),
                (None, "email") => "Invalid email format".to_string(),
                (None, "length") => format!("Length validation failed for field '{}'", field),
                (None, "range") => format!("Value out of range for field '{}'", field),
                (None, "required") => format!("Field '{}' is required", field),
                (None, code) => format!("Validation failed for field '{}': {}", field, code),
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

pub fn validate_file_type(file_name: &str, allowed_types: &[&str]) -> PortalResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !allowed_types.contains(&extension.to_lowercase().as_str()) {
        return Err(PortalError::validation(
            "file_type",
            format!("File type '{}' not allowed. Allowed types: {}", extension, allowed_types.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> PortalResult<()> {
    if file_size > max_size {
        return Err(PortalError::validation(
            "file_size",
            format!("File size {} bytes exceeds maximum allowed size {} bytes", file_size, max_size),
        ));
    }

    Ok(())
}

/// Window width/height entered for cut length display.
pub fn validate_dimension(name: &str, value: f64) -> PortalResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PortalError::validation(name, format!("{} must be a positive number", name)));
    }

    Ok(())
}
