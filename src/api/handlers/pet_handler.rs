//! Pet registration handler (multipart form with an image).

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    routing::get,
    Router,
};

use crate::api::handlers::pages::page;
use crate::api::{AppState, FlowOutcome};
use crate::config::{MSG_PET_REGISTRATION_FAILED, PROFILE_PATH};
use crate::domain::PetDraft;
use crate::errors::{AppError, AppResult};
use crate::services::ImageUpload;

/// Create pet routes
pub fn pet_routes() -> Router<AppState> {
    Router::new().route("/register2", get(|| page("register2")).post(register_pet))
}

/// Register a pet with its picture, then show the profile page.
pub async fn register_pet(State(state): State<AppState>, multipart: Multipart) -> FlowOutcome {
    let outcome = match read_pet_form(multipart).await {
        Ok((draft, image)) => state.services.pets().register(draft, image).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(_) => FlowOutcome::redirect(PROFILE_PATH),
        Err(e) => FlowOutcome::from_error(e, MSG_PET_REGISTRATION_FAILED),
    }
}

/// Collect the known fields; unknown parts are skipped.
async fn read_pet_form(mut multipart: Multipart) -> AppResult<(PetDraft, ImageUpload)> {
    let mut draft = PetDraft::default();
    let mut image = ImageUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let slot = match name.as_str() {
            "petName" => &mut draft.name,
            "petClass" => &mut draft.class,
            "petBreed" => &mut draft.breed,
            "petAge" => &mut draft.age,
            "petColor" => &mut draft.color,
            "petWeight" => &mut draft.weight,
            "petBirthday" => &mut draft.birthday,
            "petEyecolor" => &mut draft.eye_color,
            "petBio" => &mut draft.bio,
            "petLoc" => &mut draft.location,
            "petImage" => {
                image.file_name = field.file_name().unwrap_or_default().to_string();
                image.bytes = field.bytes().await.map_err(form_error)?.to_vec();
                continue;
            }
            _ => continue,
        };
        *slot = field.text().await.map_err(form_error)?;
    }

    Ok((draft, image))
}

fn form_error(e: MultipartError) -> AppError {
    AppError::validation(e.body_text())
}
