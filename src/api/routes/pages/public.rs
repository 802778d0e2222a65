//! Public types for the login, logout and register pages
use serde::Deserialize;

// Missing form fields are treated as blank so a bad submission
// re-renders the page instead of failing extraction.

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirmation: String,
}
