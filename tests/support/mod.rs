//! Shared fixtures for integration tests: in-memory repositories, a
//! controllable file intake and request helpers.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, Response,
    },
    Router,
};
use chrono::{Duration, Utc};
use mockable::DefaultClock;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use petpals::api::{create_router, AppState, AssetDirs};
use petpals::config::{HashCost, SESSION_COOKIE_NAME};
use petpals::domain::{
    CredentialHasher, ImageLocator, ImageUrls, NewPet, NewUser, PasswordDigest, Pet, User,
};
use petpals::errors::{AppError, AppResult};
use petpals::infra::{
    FileIntake, MemorySessionStore, PetRepository, Repositories, UserRepository,
};
use petpals::services::{Services, SessionManager};

// =============================================================================
// In-memory repositories
// =============================================================================

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
    broken: AtomicBool,
}

impl InMemoryUsers {
    /// Make every insert fail as if the database went away.
    pub fn break_inserts(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn stored_hash(&self, username: &str) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.password_hash.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, user: NewUser, password_hash: PasswordDigest) -> AppResult<Uuid> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(AppError::internal("connection refused"));
        }

        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.username == user.username) {
            return Err(AppError::DuplicateUsername);
        }
        if rows.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }

        let id = Uuid::new_v4();
        rows.push(User {
            id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: password_hash.into_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryPets {
    rows: Mutex<Vec<Pet>>,
}

impl InMemoryPets {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl PetRepository for InMemoryPets {
    async fn create(&self, pet: NewPet, image: ImageLocator) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        let mut rows = self.rows.lock().unwrap();
        let created_at = Utc::now() + Duration::milliseconds(rows.len() as i64);
        rows.push(Pet {
            id,
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
            image,
            created_at,
        });
        Ok(id)
    }

    async fn find_first(&self) -> AppResult<Option<Pet>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .min_by_key(|p| p.created_at)
            .cloned())
    }
}

pub struct InMemoryRepos {
    pub users: Arc<InMemoryUsers>,
    pub pets: Arc<InMemoryPets>,
}

impl Repositories for InMemoryRepos {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn pets(&self) -> Arc<dyn PetRepository> {
        self.pets.clone()
    }
}

// =============================================================================
// File intake
// =============================================================================

/// Intake that keeps uploads in memory and can be told to fail.
#[derive(Default)]
pub struct FakeIntake {
    stored: Mutex<Vec<(ImageLocator, Vec<u8>)>>,
    counter: AtomicUsize,
    failing: AtomicBool,
}

impl FakeIntake {
    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }
}

#[async_trait]
impl FileIntake for FakeIntake {
    async fn store(&self, bytes: &[u8], _original_name: &str) -> AppResult<ImageLocator> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::intake("/srv/img: no space left on device"));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let locator = ImageLocator::parse(format!("upload-{}.jpg", n))?;
        self.stored
            .lock()
            .unwrap()
            .push((locator.clone(), bytes.to_vec()));
        Ok(locator)
    }

    async fn discard(&self, locator: &ImageLocator) -> AppResult<()> {
        self.stored.lock().unwrap().retain(|(l, _)| l != locator);
        Ok(())
    }
}

// =============================================================================
// Application
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUsers>,
    pub pets: Arc<InMemoryPets>,
    pub intake: Arc<FakeIntake>,
    pub sessions: Arc<MemorySessionStore>,
    assets: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_image_prefix("/img")
    }

    /// App whose uploaded images are published under `prefix`.
    pub fn with_image_prefix(prefix: &str) -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let pets = Arc::new(InMemoryPets::default());
        let intake = Arc::new(FakeIntake::default());
        let repos = Arc::new(InMemoryRepos {
            users: users.clone(),
            pets: pets.clone(),
        });

        let hasher = CredentialHasher::new(HashCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let services = Services::from_repositories(repos, hasher, intake.clone());
        let store = Arc::new(MemorySessionStore::new());
        let sessions = SessionManager::new(
            store.clone(),
            Arc::new(DefaultClock),
            Duration::minutes(30),
        );

        let assets = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(assets.path().join("css")).unwrap();
        std::fs::create_dir_all(assets.path().join("img")).unwrap();
        std::fs::write(assets.path().join("css/main.css"), "body {}").unwrap();

        let state = AppState::new(
            services,
            sessions,
            ImageUrls::new(prefix),
            AssetDirs {
                css: assets.path().join("css"),
                img: assets.path().join("img"),
            },
        );

        Self {
            router: create_router(state),
            users,
            pets,
            intake,
            sessions: store,
            assets,
        }
    }

    /// Directory served under the image prefix.
    pub fn image_dir(&self) -> PathBuf {
        self.assets.path().join("img")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::post(uri).header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_multipart(&self, uri: &str, form: Multipart, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::post(uri).header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.finish())).unwrap())
            .await
    }

    /// Register and log in `alice`, returning her session cookie.
    pub async fn login_alice(&self) -> String {
        self.post_form("/register", ALICE_REGISTRATION, None).await;
        let response = self
            .post_form("/login", "username=alice&password=s3cret", None)
            .await;
        session_cookie(&response).expect("login sets a session cookie")
    }
}

pub const ALICE_REGISTRATION: &str =
    "first-name=Alice&last-name=Liddell&email=a%40x.io&username=alice&password=s3cret";

// =============================================================================
// Request / response helpers
// =============================================================================

const BOUNDARY: &str = "petpals-test-boundary";

/// Minimal multipart/form-data body builder.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

/// A complete pet form for Rex.
pub fn rex_form() -> Multipart {
    Multipart::default()
        .text("petName", "Rex")
        .text("petClass", "Dog")
        .text("petBreed", "Lab")
        .text("petAge", "3")
        .text("petColor", "brown")
        .text("petWeight", "20")
        .text("petBirthday", "2021-01-01")
        .text("petEyecolor", "brown")
        .text("petBio", "good boy")
        .text("petLoc", "NYC")
        .file("petImage", "rex.jpg", b"\xff\xd8\xff jpeg bytes")
}

/// `name=value` pair of the session cookie set by `response`, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE_NAME);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with(&prefix))
        .filter_map(|value| value.split(';').next())
        .map(str::to_string)
        .next()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
