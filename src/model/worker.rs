use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

pub type WorkerId = u64;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    Supervisor,
    FieldWorker,
}

impl Role {
    /// Planner roles may rearrange the daily schedule and read audits.
    pub fn is_planner(&self) -> bool {
        matches!(self, Role::Admin | Role::Supervisor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Worker {
    #[schema(example = 7, value_type = u64)]
    pub id: WorkerId,

    #[schema(example = "Ada Moretti")]
    pub full_name: String,

    #[schema(example = "field_worker")]
    pub role: Role,

    #[schema(example = true)]
    pub active: bool,
}
