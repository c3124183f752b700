// utils/validation.rs
use crate::utils::error::{AppError, Result};
use validator::ValidationError;

pub const MAX_IMAGES_PER_LISTING: usize = 20;

/// Types MIME acceptés pour les justificatifs professionnels
pub const ACCEPTED_DOCUMENT_TYPES: [&str; 3] = ["application/pdf", "image/jpeg", "image/png"];

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Valider un numéro SIRET (14 chiffres, clé de Luhn)
pub fn validate_siret(siret: &str) -> std::result::Result<(), ValidationError> {
    let digits: String = siret.chars().filter(|c| !c.is_whitespace()).collect();

    if digits.len() != 14 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(error("siret", "Le SIRET doit contenir 14 chiffres"));
    }

    if !luhn_checksum_valid(&digits) {
        return Err(error("siret", "Numéro SIRET invalide"));
    }

    Ok(())
}

fn luhn_checksum_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Valider un code postal français
pub fn validate_postal_code(code: &str) -> std::result::Result<(), ValidationError> {
    if code.len() == 5 && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(error("postal_code", "Le code postal doit contenir 5 chiffres"))
    }
}

/// Valider la liste des photos d'une annonce
pub fn validate_image_urls(images: &[String]) -> std::result::Result<(), ValidationError> {
    if images.len() > MAX_IMAGES_PER_LISTING {
        return Err(error("images", "20 photos maximum par annonce"));
    }

    if images.iter().any(|url| !validator::validate_url(url.as_str())) {
        return Err(error("images", "URL de photo invalide"));
    }

    Ok(())
}

/// Valider un type de document téléversé
pub fn validate_document_type(content_type: &str) -> Result<()> {
    if ACCEPTED_DOCUMENT_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(AppError::InvalidFileFormat(format!(
            "{} (acceptés: {})",
            content_type,
            ACCEPTED_DOCUMENT_TYPES.join(", ")
        )))
    }
}

/// Valider une taille de fichier
pub fn validate_file_size(file_size: u64, max_size_bytes: u64) -> Result<()> {
    if file_size == 0 {
        return Err(AppError::Validation("Le fichier est vide".to_string()));
    }

    if file_size > max_size_bytes {
        return Err(AppError::FileTooLarge);
    }

    Ok(())
}

/// Valider un nom de fichier
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty() {
        return Err(AppError::Validation("Le nom de fichier est vide".to_string()));
    }

    if filename.len() > 255 {
        return Err(AppError::Validation(
            "Nom de fichier trop long (255 caractères max)".to_string(),
        ));
    }

    // Éviter les chemins relatifs
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(AppError::Validation(format!("Nom de fichier invalide: {}", filename)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_siret() {
        assert!(validate_siret("73282932000074").is_ok());
        assert!(validate_siret("732 829 320 00074").is_ok());
        assert!(validate_siret("73282932000075").is_err());
        assert!(validate_siret("7328293200007").is_err());
        assert!(validate_siret("7328293200007A").is_err());
    }

    #[test]
    fn test_postal_code() {
        assert!(validate_postal_code("75011").is_ok());
        assert!(validate_postal_code("7501").is_err());
        assert!(validate_postal_code("75O11").is_err());
    }

    #[test]
    fn test_image_urls() {
        assert!(validate_image_urls(&["https://cdn.example.com/a.jpg".to_string()]).is_ok());
        assert!(validate_image_urls(&["pas une url".to_string()]).is_err());
        let too_many = vec!["https://cdn.example.com/a.jpg".to_string(); 21];
        assert!(validate_image_urls(&too_many).is_err());
    }

    #[test]
    fn test_document_checks() {
        assert!(validate_document_type("application/pdf").is_ok());
        assert!(matches!(
            validate_document_type("application/zip"),
            Err(AppError::InvalidFileFormat(_))
        ));
        assert!(matches!(validate_file_size(11, 10), Err(AppError::FileTooLarge)));
        assert!(validate_file_size(0, 10).is_err());
        assert!(validate_filename("../kbis.pdf").is_err());
        assert!(validate_filename("kbis.pdf").is_ok());
    }

    #[test]
    fn test_filename_messages() {
        let message = |name: &str| match validate_filename(name) {
            Err(AppError::Validation(message)) => message,
            other => panic!("résultat inattendu: {:?}", other),
        };
        assert_eq!(message(""), "Le nom de fichier est vide");
        assert!(message(&"a".repeat(256)).starts_with("Nom de fichier trop long"));
        assert!(message("dossier/kbis.pdf").starts_with("Nom de fichier invalide"));
    }
}
