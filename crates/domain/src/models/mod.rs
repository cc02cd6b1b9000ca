//! Domain models for ScholarSync.

pub mod application;
pub mod common;
pub mod popup;
pub mod program;
pub mod student;

pub use application::{
    aggregate_documents, AdminApplicationItem, Application, ApplicationDocument,
    ApplicationWithProgram, CreateApplicationRequest, DocumentReference, ListApplicationsQuery,
    ListApplicationsResponse, ListMyApplicationsResponse, RequirementStatus,
    ReviewApplicationRequest, ReviewApplicationResponse, StudentApplicationView,
};
pub use common::{PageParams, Pagination};
pub use popup::{
    AdminPopupItem, CreatePopupRequest, ListAdminPopupsResponse, MarkPopupViewedResponse,
    NewPopup, Popup, PopupCandidate, PopupType, StudentPopupsResponse, UpdatePopupRequest,
};
pub use program::{CreateProgramRequest, ListProgramsResponse, Program, UpdateProgramRequest};
pub use student::{
    Account, AccountStatus, LifecycleChange, ListStudentsQuery, ListStudentsResponse,
    LoginRequest, LoginResponse, RegisterStudentRequest, SetStatusRequest, Student,
    StudentDecisionResponse, StudentResponse,
};
