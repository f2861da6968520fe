use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Organization;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub company: Organization,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub description: Option<String>,
}

impl Project {
    pub fn create(input: CreateProjectInput, company: Organization) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            company,
        }
    }
}
