use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIORITY: u8 = 3;

// Todo struct as returned by the server
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Payload for POST /todos
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct CreateTodoInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

/// Payload for PUT /todos/{id}. Every field is omitted from the JSON body
/// when `None`, so the server only touches what is present. `description`
/// is doubly optional: `Some(None)` serializes as an explicit `null` and
/// clears the field, while `None` leaves it unchanged.
#[derive(Clone, Default, Serialize, Debug, PartialEq)]
pub struct UpdateTodoInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum TodoStatus {
    #[default]
    All,
    Open,
    Done,
}

impl TodoStatus {
    pub fn as_query(self) -> &'static str {
        match self {
            TodoStatus::All => "all",
            TodoStatus::Open => "open",
            TodoStatus::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TodoStatus::All => "All",
            TodoStatus::Open => "Open",
            TodoStatus::Done => "Done",
        }
    }

    pub fn next(self) -> Self {
        match self {
            TodoStatus::All => TodoStatus::Open,
            TodoStatus::Open => TodoStatus::Done,
            TodoStatus::Done => TodoStatus::All,
        }
    }
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum SortOption {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    PriorityDesc,
    PriorityAsc,
}

impl SortOption {
    pub fn as_query(self) -> &'static str {
        match self {
            SortOption::CreatedAtDesc => "created_at_desc",
            SortOption::CreatedAtAsc => "created_at_asc",
            SortOption::PriorityDesc => "priority_desc",
            SortOption::PriorityAsc => "priority_asc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::CreatedAtDesc => "Newest First",
            SortOption::CreatedAtAsc => "Oldest First",
            SortOption::PriorityDesc => "Priority: High to Low",
            SortOption::PriorityAsc => "Priority: Low to High",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortOption::CreatedAtDesc => SortOption::CreatedAtAsc,
            SortOption::CreatedAtAsc => SortOption::PriorityDesc,
            SortOption::PriorityDesc => SortOption::PriorityAsc,
            SortOption::PriorityAsc => SortOption::CreatedAtDesc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_deserializes_with_null_description() {
        let json = r#"{
            "id": "abc-123",
            "title": "Test",
            "description": null,
            "completed": false,
            "priority": 3,
            "created_at": "2024-01-15T10:00:00Z",
            "updated_at": "2024-01-15T10:00:00Z"
        }"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.id, "abc-123");
        assert!(todo.description.is_none());
        assert!(!todo.completed);
    }

    #[test]
    fn create_input_omits_absent_fields() {
        let input = CreateTodoInput {
            title: "Buy milk".to_string(),
            description: None,
            priority: None,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Buy milk" }));
    }

    #[test]
    fn create_input_includes_present_fields() {
        let input = CreateTodoInput {
            title: "Buy milk".to_string(),
            description: Some("2 liters".to_string()),
            priority: Some(5),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["description"], "2 liters");
        assert_eq!(json["priority"], 5);
    }

    #[test]
    fn update_input_default_serializes_to_empty_object() {
        let json = serde_json::to_value(UpdateTodoInput::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn update_input_only_completed() {
        let input = UpdateTodoInput {
            completed: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({ "completed": true }));
    }

    #[test]
    fn update_input_explicit_null_clears_description() {
        let input = UpdateTodoInput {
            description: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({ "description": null }));
    }

    #[test]
    fn update_input_omitted_description_is_absent() {
        let input = UpdateTodoInput {
            title: Some("New".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("description").is_none());
    }

    #[test]
    fn status_query_values() {
        assert_eq!(TodoStatus::All.as_query(), "all");
        assert_eq!(TodoStatus::Open.as_query(), "open");
        assert_eq!(TodoStatus::Done.as_query(), "done");
    }

    #[test]
    fn status_cycles_through_all_variants() {
        let start = TodoStatus::All;
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn sort_query_values() {
        assert_eq!(SortOption::CreatedAtDesc.as_query(), "created_at_desc");
        assert_eq!(SortOption::PriorityAsc.as_query(), "priority_asc");
    }

    #[test]
    fn sort_cycles_through_all_variants() {
        let start = SortOption::CreatedAtDesc;
        assert_eq!(start.next().next().next().next(), start);
    }
}
