use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PROJECT_STATUS: &str = "PLANNING";

/// Statuses offered when editing a project; the column itself is free text.
pub const PROJECT_STATUSES: [&str; 7] =
    ["PLANNING", "DESIGN", "IN_PROGRESS", "ON_HOLD", "COMPLETED", "ARCHIVED", "CANCELLED"];

/// Statuses that no longer count as active work.
pub const CLOSED_PROJECT_STATUSES: [&str; 3] = ["COMPLETED", "ARCHIVED", "CANCELLED"];

/// Kanban columns created with every new project unless others are given.
pub const DEFAULT_STAGES: [&str; 3] = ["To Do", "In Progress", "Done"];

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "architectural_style", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArchitecturalStyle {
    Modern,
    Contemporary,
    Classic,
    Colonial,
    Minimalist,
    Industrial,
    Other,
}

impl ArchitecturalStyle {
    pub const ALL: [ArchitecturalStyle; 7] = [
        ArchitecturalStyle::Modern,
        ArchitecturalStyle::Contemporary,
        ArchitecturalStyle::Classic,
        ArchitecturalStyle::Colonial,
        ArchitecturalStyle::Minimalist,
        ArchitecturalStyle::Industrial,
        ArchitecturalStyle::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArchitecturalStyle::Modern => "MODERN",
            ArchitecturalStyle::Contemporary => "CONTEMPORARY",
            ArchitecturalStyle::Classic => "CLASSIC",
            ArchitecturalStyle::Colonial => "COLONIAL",
            ArchitecturalStyle::Minimalist => "MINIMALIST",
            ArchitecturalStyle::Industrial => "INDUSTRIAL",
            ArchitecturalStyle::Other => "OTHER",
        }
    }
}

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "construction_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstructionType {
    Masonry,
    Concrete,
    Steel,
    Wood,
    Mixed,
}

impl ConstructionType {
    pub const ALL: [ConstructionType; 5] = [
        ConstructionType::Masonry,
        ConstructionType::Concrete,
        ConstructionType::Steel,
        ConstructionType::Wood,
        ConstructionType::Mixed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConstructionType::Masonry => "MASONRY",
            ConstructionType::Concrete => "CONCRETE",
            ConstructionType::Steel => "STEEL",
            ConstructionType::Wood => "WOOD",
            ConstructionType::Mixed => "MIXED",
        }
    }
}

#[derive(sqlx::Type, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "project_visibility", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectVisibility {
    Private,
    #[default]
    Team,
    Public,
}

impl ProjectVisibility {
    pub const ALL: [ProjectVisibility; 3] = [
        ProjectVisibility::Private,
        ProjectVisibility::Team,
        ProjectVisibility::Public,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectVisibility::Private => "PRIVATE",
            ProjectVisibility::Team => "TEAM",
            ProjectVisibility::Public => "PUBLIC",
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub owner_id: Uuid,
    pub client_id: Option<Uuid>,
    pub project_type: Option<String>,
    pub address: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub estimated_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub total_area: Option<f64>,
    pub planned_cost: Option<f64>,
    pub architectural_style: Option<ArchitecturalStyle>,
    pub construction_type: Option<ConstructionType>,
    pub number_of_floors: Option<i32>,
    pub parking_spots: Option<i32>,
    pub has_basement: bool,
    pub has_garage: bool,
    pub environmental_license_required: bool,
    pub visibility: ProjectVisibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub name: String,
    pub status: String,
    pub client_id: Option<Uuid>,
    pub project_type: Option<String>,
    pub address: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub estimated_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub total_area: Option<f64>,
    pub planned_cost: Option<f64>,
    pub architectural_style: Option<ArchitecturalStyle>,
    pub construction_type: Option<ConstructionType>,
    pub number_of_floors: Option<i32>,
    pub parking_spots: Option<i32>,
    pub has_basement: bool,
    pub has_garage: bool,
    pub environmental_license_required: bool,
    pub visibility: ProjectVisibility,
    /// Column names for a new project; ignored on update.
    pub stages: Vec<String>,
}

impl Default for ProjectInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            status: DEFAULT_PROJECT_STATUS.to_string(),
            client_id: None,
            project_type: None,
            address: None,
            start_date: None,
            estimated_end_date: None,
            actual_end_date: None,
            total_area: None,
            planned_cost: None,
            architectural_style: None,
            construction_type: None,
            number_of_floors: None,
            parking_spots: None,
            has_basement: false,
            has_garage: false,
            environmental_license_required: false,
            visibility: ProjectVisibility::default(),
            stages: Vec::new(),
        }
    }
}

impl From<&Project> for ProjectInput {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            status: project.status.clone(),
            client_id: project.client_id,
            project_type: project.project_type.clone(),
            address: project.address.clone(),
            start_date: project.start_date,
            estimated_end_date: project.estimated_end_date,
            actual_end_date: project.actual_end_date,
            total_area: project.total_area,
            planned_cost: project.planned_cost,
            architectural_style: project.architectural_style,
            construction_type: project.construction_type,
            number_of_floors: project.number_of_floors,
            parking_spots: project.parking_spots,
            has_basement: project.has_basement,
            has_garage: project.has_garage,
            environmental_license_required: project.environmental_license_required,
            visibility: project.visibility,
            stages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub client_id: Option<Uuid>,
    pub status: Option<String>,
}
