//! Scholarship program models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_not_blank;

/// A scholarship program offering students can apply to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Program {
    pub id: Uuid,
    pub program_name: String,
    pub program_type: Option<String>,
    pub requirements: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateProgramRequest {
    #[validate(
        length(min = 1, max = 200, message = "Program name must be 1-200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub program_name: String,
    #[validate(length(max = 100, message = "Program type must be at most 100 characters"))]
    pub program_type: Option<String>,
    #[validate(length(max = 5000, message = "Requirements must be at most 5000 characters"))]
    pub requirements: Option<String>,
}

/// Partial program update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateProgramRequest {
    #[validate(
        length(min = 1, max = 200, message = "Program name must be 1-200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub program_name: Option<String>,
    #[validate(length(max = 100, message = "Program type must be at most 100 characters"))]
    pub program_type: Option<String>,
    #[validate(length(max = 5000, message = "Requirements must be at most 5000 characters"))]
    pub requirements: Option<String>,
}

impl UpdateProgramRequest {
    pub fn apply_to(&self, program: &mut Program) {
        if let Some(name) = &self.program_name {
            program.program_name = name.trim().to_string();
        }
        if let Some(program_type) = &self.program_type {
            program.program_type = Some(program_type.clone());
        }
        if let Some(requirements) = &self.requirements {
            program.requirements = Some(requirements.clone());
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListProgramsResponse {
    pub data: Vec<Program>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_program_requires_name() {
        let ok = CreateProgramRequest {
            program_name: "City Merit Grant".to_string(),
            program_type: Some("merit".to_string()),
            requirements: None,
        };
        assert!(ok.validate().is_ok());

        let blank = CreateProgramRequest {
            program_name: "  ".to_string(),
            program_type: None,
            requirements: None,
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_update_program_apply() {
        let now = Utc::now();
        let mut program = Program {
            id: Uuid::new_v4(),
            program_name: "Old".to_string(),
            program_type: None,
            requirements: Some("Grades".to_string()),
            created_at: now,
            updated_at: now,
        };
        UpdateProgramRequest {
            program_name: Some(" New ".to_string()),
            program_type: Some("need-based".to_string()),
            requirements: None,
        }
        .apply_to(&mut program);

        assert_eq!(program.program_name, "New");
        assert_eq!(program.program_type.as_deref(), Some("need-based"));
        assert_eq!(program.requirements.as_deref(), Some("Grades"));
    }
}
