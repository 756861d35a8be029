//! User data models

use serde::Serialize;
use std::time::SystemTime;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: usize,
    pub handle: String,
    pub email: Option<String>,
    pub created: SystemTime,
}
