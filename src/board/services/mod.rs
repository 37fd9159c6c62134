//! Application services for Kanban boards.

mod kanban;

pub use kanban::{
    CreateStatusListRequest, CreateTaskRequest, KanbanService, KanbanServiceError,
    KanbanServiceResult, MoveOutcome, ReorderStatusListRequest, ReorderTaskRequest,
};
