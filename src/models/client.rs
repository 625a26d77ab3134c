use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(sqlx::Type, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "client_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    #[default]
    Prospect,
    Active,
    Inactive,
    Blocked,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 4] = [
        ClientStatus::Prospect,
        ClientStatus::Active,
        ClientStatus::Inactive,
        ClientStatus::Blocked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClientStatus::Prospect => "PROSPECT",
            ClientStatus::Active => "ACTIVE",
            ClientStatus::Inactive => "INACTIVE",
            ClientStatus::Blocked => "BLOCKED",
        }
    }
}

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "client_legal_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientLegalType {
    Individual,
    Company,
}

impl ClientLegalType {
    pub const ALL: [ClientLegalType; 2] = [ClientLegalType::Individual, ClientLegalType::Company];

    pub fn as_str(self) -> &'static str {
        match self {
            ClientLegalType::Individual => "INDIVIDUAL",
            ClientLegalType::Company => "COMPANY",
        }
    }
}

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "client_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientCategory {
    Residential,
    Commercial,
    Corporate,
    Government,
    Other,
}

impl ClientCategory {
    pub const ALL: [ClientCategory; 5] = [
        ClientCategory::Residential,
        ClientCategory::Commercial,
        ClientCategory::Corporate,
        ClientCategory::Government,
        ClientCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClientCategory::Residential => "RESIDENTIAL",
            ClientCategory::Commercial => "COMMERCIAL",
            ClientCategory::Corporate => "CORPORATE",
            ClientCategory::Government => "GOVERNMENT",
            ClientCategory::Other => "OTHER",
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub legal_type: Option<ClientLegalType>,
    pub document: Option<String>,
    pub address: Option<String>,
    pub category: Option<ClientCategory>,
    pub status: ClientStatus,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Editable client fields, as submitted by a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub legal_type: Option<ClientLegalType>,
    pub document: Option<String>,
    pub address: Option<String>,
    pub category: Option<ClientCategory>,
    pub status: ClientStatus,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl From<&Client> for ClientInput {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            website: client.website.clone(),
            legal_type: client.legal_type,
            document: client.document.clone(),
            address: client.address.clone(),
            category: client.category,
            status: client.status,
            notes: client.notes.clone(),
            tags: client.tags.clone(),
        }
    }
}
