//! User management module.
//!
//! Registration, credential checks and the user listing. Passwords are
//! bcrypt-hashed on the blocking pool and never leave this module in plain
//! text or serialized form.

mod models;
mod repository;
mod service;

pub use models::{LoginRequest, NewUser, RegisterRequest, User, UserCredentials, UserInfo};
pub use repository::UserRepository;
pub use service::UserService;
