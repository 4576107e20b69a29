//! Pet repository implementation.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use super::entities::pet::{self, ActiveModel, Entity as PetEntity};
use crate::domain::{ImageLocator, NewPet, Pet};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// Pet repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// Insert a pet whose image has already been stored at `image`.
    async fn create(&self, pet: NewPet, image: ImageLocator) -> AppResult<Uuid>;

    /// Oldest registered pet, if any.
    async fn find_first(&self) -> AppResult<Option<Pet>>;
}

/// Concrete implementation of PetRepository
pub struct PetStore {
    db: DatabaseConnection,
}

impl PetStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PetRepository for PetStore {
    async fn create(&self, pet: NewPet, image: ImageLocator) -> AppResult<Uuid> {
        ensure_complete(&pet, &image)?;

        let id = Uuid::new_v4();
        let active_model = ActiveModel {
            id: Set(id),
            name: Set(pet.name),
            class: Set(pet.class),
            breed: Set(pet.breed),
            age: Set(pet.age),
            color: Set(pet.color),
            weight: Set(pet.weight),
            birthday: Set(pet.birthday),
            eye_color: Set(pet.eye_color),
            bio: Set(pet.bio),
            location: Set(pet.location),
            image_locator: Set(image.as_str().to_string()),
            created_at: Set(chrono::Utc::now()),
        };

        active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(id)
    }

    async fn find_first(&self) -> AppResult<Option<Pet>> {
        let result = PetEntity::find()
            .order_by_asc(pet::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(Pet::try_from).transpose()
    }
}

/// Every text field and the locator must carry a value.
pub(crate) fn ensure_complete(pet: &NewPet, image: &ImageLocator) -> AppResult<()> {
    let text_fields = [
        &pet.name,
        &pet.class,
        &pet.breed,
        &pet.color,
        &pet.eye_color,
        &pet.bio,
        &pet.location,
    ];
    if image.as_str().is_empty() || text_fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::fields_required());
    }
    Ok(())
}
