//! Request and reply messages of the `TodoLists` RPC service.
//!
//! Absent fields decode to their zero value, matching how protobuf-style
//! clients leave unset scalars.

use crate::model::todo_list::{ListId, TodoList};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateListRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateListReply {
    pub id: ListId,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetListRequest {
    pub id: ListId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteListRequest {
    pub id: ListId,
}

/// Empty acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Wire projection of one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoListMessage {
    pub id: ListId,
    pub name: String,
}

impl From<TodoList> for TodoListMessage {
    fn from(value: TodoList) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListTodoListsRequest {
    /// 1-based; values below 1 select the first page.
    pub page_number: i64,
    /// Zero selects the default size; values above the ceiling are clamped.
    pub page_size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListTodoListsReply {
    /// Lists of the requested page in store order.
    pub todo_lists: Vec<TodoListMessage>,
    /// Next page number, or empty when no further page exists.
    pub next_page_number: String,
    /// Total number of lists in the store.
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::{ListTodoListsRequest, TodoListMessage};
    use crate::model::todo_list::TodoList;

    #[test]
    fn missing_fields_decode_as_zero_values() {
        let request: ListTodoListsRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.page_number, 0);
        assert_eq!(request.page_size, 0);
    }

    #[test]
    fn list_record_projects_to_message() {
        let message = TodoListMessage::from(TodoList::new(7, "groceries"));
        assert_eq!(message.id, 7);
        assert_eq!(message.name, "groceries");
    }
}
