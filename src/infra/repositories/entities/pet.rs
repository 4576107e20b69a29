//! Pet database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{ImageLocator, Pet};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub class: String,
    pub breed: String,
    pub age: i32,
    pub color: String,
    pub weight: f64,
    pub birthday: Date,
    pub eye_color: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub location: String,
    pub image_locator: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for Pet {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let image = ImageLocator::parse(model.image_locator).map_err(|_| {
            AppError::internal(format!("Pet {} has an invalid image locator", model.id))
        })?;

        Ok(Pet {
            id: model.id,
            name: model.name,
            class: model.class,
            breed: model.breed,
            age: model.age,
            color: model.color,
            weight: model.weight,
            birthday: model.birthday,
            eye_color: model.eye_color,
            bio: model.bio,
            location: model.location,
            image,
            created_at: model.created_at,
        })
    }
}
