//! Pet service - pet registration and lookup.
//!
//! The image is written before the row exists, so a stored pet never points
//! at a missing file. If the row then fails to insert, the file is removed
//! again on a best-effort basis.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Pet, PetDraft};
use crate::errors::{AppError, AppResult};
use crate::infra::{FileIntake, Repositories};

/// Uploaded image as received from the form.
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Pet service trait for dependency injection.
#[async_trait]
pub trait PetService: Send + Sync {
    /// Validate the draft, store the image, then insert the pet.
    async fn register(&self, draft: PetDraft, image: ImageUpload) -> AppResult<Uuid>;

    /// Oldest registered pet, if any.
    async fn first_pet(&self) -> AppResult<Option<Pet>>;
}

/// Concrete implementation of PetService.
pub struct PetRegistrar<R: Repositories> {
    repos: Arc<R>,
    intake: Arc<dyn FileIntake>,
}

impl<R: Repositories> PetRegistrar<R> {
    pub fn new(repos: Arc<R>, intake: Arc<dyn FileIntake>) -> Self {
        Self { repos, intake }
    }
}

#[async_trait]
impl<R: Repositories> PetService for PetRegistrar<R> {
    async fn register(&self, draft: PetDraft, image: ImageUpload) -> AppResult<Uuid> {
        if image.is_empty() || image.file_name.trim().is_empty() {
            return Err(AppError::fields_required());
        }
        let pet = draft.validate()?;

        let locator = self.intake.store(&image.bytes, &image.file_name).await?;

        match self.repos.pets().create(pet, locator.clone()).await {
            Ok(id) => {
                tracing::info!(pet_id = %id, image = %locator, "Pet registered");
                Ok(id)
            }
            Err(e) => {
                if let Err(cleanup) = self.intake.discard(&locator).await {
                    tracing::warn!(image = %locator, "Failed to discard orphaned upload: {}", cleanup);
                }
                Err(e)
            }
        }
    }

    async fn first_pet(&self) -> AppResult<Option<Pet>> {
        self.repos.pets().find_first().await
    }
}
