//! Scholarship application models and document aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_not_blank;

use super::common::{PageParams, Pagination};

/// Maximum number of documents attached to one application.
pub const MAX_DOCUMENTS_PER_APPLICATION: u64 = 20;

/// Review state of an application, independent of the account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatus {
    Submitted,
    Approved,
    Rejected,
}

impl RequirementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementStatus::Submitted => "submitted",
            RequirementStatus::Approved => "approved",
            RequirementStatus::Rejected => "rejected",
        }
    }

    /// Status text shown to the student next to the application.
    pub fn notification_text(&self, program_name: &str) -> String {
        match self {
            RequirementStatus::Submitted => {
                format!("Your application for {} has been submitted.", program_name)
            }
            RequirementStatus::Approved => {
                format!("Your application for {} has been approved.", program_name)
            }
            RequirementStatus::Rejected => format!(
                "Your application for {} has been rejected. Please check the remarks.",
                program_name
            ),
        }
    }
}

impl FromStr for RequirementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "submitted" => Ok(RequirementStatus::Submitted),
            "approved" => Ok(RequirementStatus::Approved),
            "rejected" => Ok(RequirementStatus::Rejected),
            _ => Err(format!("Invalid requirement status: {}", s)),
        }
    }
}

impl fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A student's application to a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Application {
    pub id: Uuid,
    pub student_id: Uuid,
    pub program_id: Uuid,
    pub requirement_status: RequirementStatus,
    pub remarks: Option<String>,
    pub notification: Option<String>,
    pub remarks_viewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A document uploaded with an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApplicationDocument {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub application_id: Uuid,
    pub doc_name: String,
    pub file_path: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Reference to a file already placed in storage.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct DocumentReference {
    #[validate(
        length(min = 1, max = 255, message = "Document name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub doc_name: String,
    #[validate(length(min = 1, max = 500, message = "File path must be 1-500 characters"))]
    pub file_path: String,
    #[validate(length(min = 1, max = 100, message = "File type must be 1-100 characters"))]
    pub file_type: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateApplicationRequest {
    pub program_id: Uuid,
    #[serde(default)]
    #[validate(
        length(max = MAX_DOCUMENTS_PER_APPLICATION, message = "Too many documents"),
        nested
    )]
    pub documents: Vec<DocumentReference>,
}

/// An application joined with the name of its program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationWithProgram {
    pub application: Application,
    pub program_name: String,
}

/// An application as the student sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StudentApplicationView {
    pub id: Uuid,
    pub program_id: Uuid,
    pub program_name: String,
    pub requirement_status: RequirementStatus,
    pub remarks: Option<String>,
    pub notification: Option<String>,
    pub remarks_viewed: bool,
    pub created_at: DateTime<Utc>,
    pub document_count: usize,
    pub documents: Vec<ApplicationDocument>,
}

/// Groups documents under the applications they belong to.
///
/// Applications keep their input order. Each application's documents are
/// ordered by upload time; documents whose application is not in `apps` are
/// dropped.
pub fn aggregate_documents(
    apps: Vec<ApplicationWithProgram>,
    docs: Vec<ApplicationDocument>,
) -> Vec<StudentApplicationView> {
    let mut by_application: HashMap<Uuid, Vec<ApplicationDocument>> = HashMap::new();
    for doc in docs {
        by_application.entry(doc.application_id).or_default().push(doc);
    }

    apps.into_iter()
        .map(|item| {
            let mut documents = by_application
                .remove(&item.application.id)
                .unwrap_or_default();
            documents.sort_by_key(|d| d.uploaded_at);

            let app = item.application;
            StudentApplicationView {
                id: app.id,
                program_id: app.program_id,
                program_name: item.program_name,
                requirement_status: app.requirement_status,
                remarks: app.remarks,
                notification: app.notification,
                remarks_viewed: app.remarks_viewed,
                created_at: app.created_at,
                document_count: documents.len(),
                documents,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ListMyApplicationsResponse {
    pub data: Vec<StudentApplicationView>,
}

/// Row of the admin application list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminApplicationItem {
    pub id: Uuid,
    pub student_id: Uuid,
    pub username: String,
    pub program_id: Uuid,
    pub program_name: String,
    pub requirement_status: RequirementStatus,
    pub remarks: Option<String>,
    pub document_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListApplicationsQuery {
    pub status: Option<RequirementStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListApplicationsQuery {
    pub fn page_params(&self) -> PageParams {
        let defaults = PageParams::default();
        PageParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListApplicationsResponse {
    pub data: Vec<AdminApplicationItem>,
    pub pagination: Pagination,
}

/// Admin approve/reject body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewApplicationRequest {
    #[validate(length(max = 2000, message = "Remarks must be at most 2000 characters"))]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewApplicationResponse {
    pub success: bool,
    pub message: String,
    pub application: Application,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn application(created_at: DateTime<Utc>) -> ApplicationWithProgram {
        ApplicationWithProgram {
            application: Application {
                id: Uuid::new_v4(),
                student_id: Uuid::new_v4(),
                program_id: Uuid::new_v4(),
                requirement_status: RequirementStatus::Submitted,
                remarks: None,
                notification: None,
                remarks_viewed: false,
                created_at,
                updated_at: created_at,
            },
            program_name: "City Merit Grant".to_string(),
        }
    }

    fn document(application_id: Uuid, name: &str, uploaded_at: DateTime<Utc>) -> ApplicationDocument {
        ApplicationDocument {
            id: Uuid::new_v4(),
            application_id,
            doc_name: name.to_string(),
            file_path: format!("uploads/{}.pdf", name),
            file_type: "application/pdf".to_string(),
            uploaded_at,
        }
    }

    #[test]
    fn test_aggregate_groups_and_counts() {
        let now = Utc::now();
        let newer = application(now);
        let older = application(now - Duration::days(3));
        let newer_id = newer.application.id;
        let older_id = older.application.id;

        let docs = vec![
            document(newer_id, "grades", now + Duration::minutes(2)),
            document(older_id, "id", now - Duration::days(3)),
            document(newer_id, "birth-cert", now + Duration::minutes(1)),
            document(Uuid::new_v4(), "orphan", now),
        ];

        let views = aggregate_documents(vec![newer, older], docs);
        assert_eq!(views.len(), 2);

        assert_eq!(views[0].id, newer_id);
        assert_eq!(views[0].document_count, 2);
        let names: Vec<_> = views[0].documents.iter().map(|d| d.doc_name.as_str()).collect();
        assert_eq!(names, vec!["birth-cert", "grades"]);

        assert_eq!(views[1].id, older_id);
        assert_eq!(views[1].document_count, 1);
        assert_eq!(views[1].program_name, "City Merit Grant");
    }

    #[test]
    fn test_aggregate_without_documents() {
        let views = aggregate_documents(vec![application(Utc::now())], Vec::new());
        assert_eq!(views[0].document_count, 0);
        assert!(views[0].documents.is_empty());
        assert!(aggregate_documents(Vec::new(), Vec::new()).is_empty());
    }

    #[test]
    fn test_notification_text() {
        assert_eq!(
            RequirementStatus::Approved.notification_text("Merit"),
            "Your application for Merit has been approved."
        );
        assert!(RequirementStatus::Rejected
            .notification_text("Merit")
            .contains("remarks"));
    }

    #[test]
    fn test_create_request_validation() {
        let request: CreateApplicationRequest = serde_json::from_value(serde_json::json!({
            "program_id": Uuid::new_v4(),
            "documents": [
                {"doc_name": "grades", "file_path": "uploads/a.pdf", "file_type": "application/pdf"}
            ]
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let bad: CreateApplicationRequest = serde_json::from_value(serde_json::json!({
            "program_id": Uuid::new_v4(),
            "documents": [{"doc_name": " ", "file_path": "x", "file_type": "y"}]
        }))
        .unwrap();
        assert!(bad.validate().is_err());

        let empty: CreateApplicationRequest =
            serde_json::from_value(serde_json::json!({ "program_id": Uuid::new_v4() })).unwrap();
        assert!(empty.documents.is_empty());
    }

    #[test]
    fn test_document_path_not_serialized_parent() {
        let doc = document(Uuid::new_v4(), "grades", Utc::now());
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("application_id").is_none());
        assert_eq!(json["doc_name"], "grades");
    }
}
