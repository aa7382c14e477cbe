// vim: tw=80
//! User persistence, mocked by the generated `mock_repository.rs` next to it.
//!
//! Regenerate the mock with
//! `understudy-gen generate-mock understudy/tests/generated/repository.rs
//! -o understudy/tests/generated`.

use std::io;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String
}

#[derive(Clone, Debug, PartialEq)]
pub struct RepoError(pub String);

/// Persistence for users
pub trait UserRepository {
    fn find_by_id(&self, id: &str) -> Result<User, RepoError>;
    fn save(&self, user: User) -> Result<(), RepoError>;
    fn delete(&self, id: &str) -> Result<(), RepoError>;
    fn counts(&self) -> (usize, Option<String>);
    /// Write every user to `path`, returning how many were written
    fn export(&self, path: &str) -> io::Result<usize>;
}

#[path = "mock_repository.rs"]
pub mod mock_repository;
