//! Pet profile entity, image locators and their public URLs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::DEFAULT_IMAGE_URL_PREFIX;
use crate::errors::{AppError, AppResult};

/// Internal reference to a stored image: a file name relative to the
/// upload root. Not a URL; see [`ImageUrls`] for the public address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageLocator(String);

impl ImageLocator {
    /// Accept a bare, non-empty file name.
    ///
    /// # Errors
    /// Returns a validation error for empty names or names that would
    /// escape the upload root.
    pub fn parse(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let escapes = value.contains('/') || value.contains('\\') || value.starts_with('.');
        if value.trim().is_empty() || escapes {
            return Err(AppError::validation("Invalid image reference."));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps locators to externally fetchable addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrls {
    prefix: String,
}

impl ImageUrls {
    /// Normalizes `prefix` to `/segment` form; an empty prefix falls back
    /// to the default mount.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_matches('/');
        let prefix = if trimmed.is_empty() {
            DEFAULT_IMAGE_URL_PREFIX.to_string()
        } else {
            format!("/{}", trimmed)
        };
        Self { prefix }
    }

    /// URL prefix the upload directory is mounted under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn public_url(&self, locator: &ImageLocator) -> String {
        format!("{}/{}", self.prefix, locator.as_str())
    }
}

/// Pet domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub class: String,
    pub breed: String,
    pub age: i32,
    pub color: String,
    pub weight: f64,
    pub birthday: NaiveDate,
    pub eye_color: String,
    pub bio: String,
    pub location: String,
    pub image: ImageLocator,
    pub created_at: DateTime<Utc>,
}

/// Validated pet fields, ready to be stored once the image is in place.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPet {
    pub name: String,
    pub class: String,
    pub breed: String,
    pub age: i32,
    pub color: String,
    pub weight: f64,
    pub birthday: NaiveDate,
    pub eye_color: String,
    pub bio: String,
    pub location: String,
}

/// Raw pet form fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetDraft {
    pub name: String,
    pub class: String,
    pub breed: String,
    pub age: String,
    pub color: String,
    pub weight: String,
    pub birthday: String,
    pub eye_color: String,
    pub bio: String,
    pub location: String,
}

impl PetDraft {
    /// True when every field carries a value.
    pub fn is_complete(&self) -> bool {
        [
            &self.name,
            &self.class,
            &self.breed,
            &self.age,
            &self.color,
            &self.weight,
            &self.birthday,
            &self.eye_color,
            &self.bio,
            &self.location,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    /// Check completeness and parse the typed fields.
    ///
    /// # Errors
    /// Returns a validation error naming the first field that does not parse.
    pub fn validate(self) -> AppResult<NewPet> {
        if !self.is_complete() {
            return Err(AppError::fields_required());
        }

        let age: i32 = self
            .age
            .trim()
            .parse()
            .ok()
            .filter(|age| *age >= 0)
            .ok_or_else(|| AppError::validation("Age must be a whole number."))?;
        let weight: f64 = self
            .weight
            .trim()
            .parse()
            .ok()
            .filter(|weight: &f64| weight.is_finite() && *weight > 0.0)
            .ok_or_else(|| AppError::validation("Weight must be a positive number."))?;
        let birthday = NaiveDate::parse_from_str(self.birthday.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::validation("Birthday must be a date (YYYY-MM-DD)."))?;

        Ok(NewPet {
            name: self.name.trim().to_string(),
            class: self.class.trim().to_string(),
            breed: self.breed.trim().to_string(),
            age,
            color: self.color.trim().to_string(),
            weight,
            birthday,
            eye_color: self.eye_color.trim().to_string(),
            bio: self.bio.trim().to_string(),
            location: self.location.trim().to_string(),
        })
    }
}

/// Pet as shown on the pet page
#[derive(Debug, Clone, Serialize)]
pub struct PetResponse {
    pub id: Uuid,
    pub name: String,
    pub class: String,
    pub breed: String,
    pub age: i32,
    pub color: String,
    pub weight: f64,
    pub birthday: NaiveDate,
    pub eye_color: String,
    pub bio: String,
    pub location: String,
    pub image_url: String,
}

impl PetResponse {
    pub fn from_pet(pet: Pet, urls: &ImageUrls) -> Self {
        Self {
            image_url: urls.public_url(&pet.image),
            id: pet.id,
            name: pet.name,
            class: pet.class,
            breed: pet.breed,
            age: pet.age,
            color: pet.color,
            weight: pet.weight,
            birthday: pet.birthday,
            eye_color: pet.eye_color,
            bio: pet.bio,
            location: pet.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PetDraft {
        PetDraft {
            name: "Biscuit".to_string(),
            class: "Dog".to_string(),
            breed: "Beagle".to_string(),
            age: "3".to_string(),
            color: "Tricolor".to_string(),
            weight: "11.5".to_string(),
            birthday: "2021-04-02".to_string(),
            eye_color: "Brown".to_string(),
            bio: "Loves naps".to_string(),
            location: "Boulder".to_string(),
        }
    }

    #[test]
    fn test_complete_draft_validates() {
        let pet = draft().validate().unwrap();
        assert_eq!(pet.age, 3);
        assert_eq!(pet.weight, 11.5);
        assert_eq!(pet.birthday, NaiveDate::from_ymd_opt(2021, 4, 2).unwrap());
    }

    #[test]
    fn test_missing_field_is_field_agnostic() {
        let incomplete = PetDraft {
            bio: String::new(),
            ..draft()
        };
        match incomplete.validate() {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "All fields are required."),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_fields() {
        let bad_age = PetDraft {
            age: "three".to_string(),
            ..draft()
        };
        assert!(matches!(bad_age.validate(), Err(AppError::Validation(m)) if m.contains("Age")));

        let bad_weight = PetDraft {
            weight: "-2".to_string(),
            ..draft()
        };
        assert!(
            matches!(bad_weight.validate(), Err(AppError::Validation(m)) if m.contains("Weight"))
        );

        let bad_birthday = PetDraft {
            birthday: "04/02/2021".to_string(),
            ..draft()
        };
        assert!(
            matches!(bad_birthday.validate(), Err(AppError::Validation(m)) if m.contains("Birthday"))
        );
    }

    #[test]
    fn test_locator_rejects_paths() {
        assert!(ImageLocator::parse("1700000000000-ab12.png").is_ok());
        assert!(ImageLocator::parse("").is_err());
        assert!(ImageLocator::parse("../etc/passwd").is_err());
        assert!(ImageLocator::parse("img/cat.png").is_err());
        assert!(ImageLocator::parse(".hidden").is_err());
    }

    #[test]
    fn test_public_url_mapping() {
        let urls = ImageUrls::new("/img/");
        let locator = ImageLocator::parse("1700000000000-ab12.png").unwrap();

        assert_eq!(urls.public_url(&locator), "/img/1700000000000-ab12.png");
        assert_ne!(urls.public_url(&locator), locator.as_str());
    }

    #[test]
    fn test_image_prefix_is_normalized() {
        assert_eq!(ImageUrls::new("uploads/").prefix(), "/uploads");
        assert_eq!(ImageUrls::new("/").prefix(), "/img");
        assert_eq!(ImageUrls::new("").prefix(), "/img");
    }
}
