use atletica_shared::Masked;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shop customer, keyed by university student id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub student_id: String,
    pub name: String,
    pub email: Option<Masked<String>>,
    pub phone: Option<Masked<String>>,
    pub is_member: bool,
    pub favorite_team: Option<String>,
    pub home_city: Option<String>,
    pub watches_one_piece: bool,
    pub registered_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(new: NewCustomer) -> Self {
        Self {
            student_id: new.student_id,
            name: new.name,
            email: new.email.map(Masked),
            phone: new.phone.map(Masked),
            is_member: new.is_member,
            favorite_team: new.favorite_team,
            home_city: new.home_city,
            watches_one_piece: new.watches_one_piece,
            registered_at: Utc::now(),
        }
    }

    pub fn email_str(&self) -> Option<&str> {
        self.email.as_ref().map(|e| e.expose().as_str())
    }

    pub fn phone_str(&self) -> Option<&str> {
        self.phone.as_ref().map(|p| p.expose().as_str())
    }
}

/// Registration input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCustomer {
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub favorite_team: Option<String>,
    #[serde(default)]
    pub home_city: Option<String>,
    #[serde(default)]
    pub watches_one_piece: bool,
}

/// Partial update of a customer's non-key fields. `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub favorite_team: Option<String>,
    pub home_city: Option<String>,
    pub watches_one_piece: Option<bool>,
}

impl ContactUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.favorite_team.is_none()
            && self.home_city.is_none()
            && self.watches_one_piece.is_none()
    }
}
