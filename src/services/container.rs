//! Service container - one place to build and hand out application services.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, PetRegistrar, PetService, UserManager, UserService,
};
use crate::domain::CredentialHasher;
use crate::infra::{FileIntake, Repositories};

/// Shared handles to every application service.
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    pet_service: Arc<dyn PetService>,
}

impl Services {
    /// Assemble a container from already built services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        pet_service: Arc<dyn PetService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            pet_service,
        }
    }

    /// Build the standard services over one set of repositories.
    pub fn from_repositories<R: Repositories + 'static>(
        repos: Arc<R>,
        hasher: CredentialHasher,
        intake: Arc<dyn FileIntake>,
    ) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(repos.clone(), hasher)),
            user_service: Arc::new(UserManager::new(repos.clone())),
            pet_service: Arc::new(PetRegistrar::new(repos, intake)),
        }
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    pub fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    pub fn pets(&self) -> Arc<dyn PetService> {
        self.pet_service.clone()
    }
}
