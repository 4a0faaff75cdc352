//! Typed request/reply messages and RPC status codes.
//!
//! These are the values transports decode into and encode from; the service
//! layer never sees raw wire bytes.

pub mod messages;
pub mod status;

pub use messages::{
    CreateListReply, CreateListRequest, DeleteListRequest, Empty, GetListRequest,
    ListTodoListsReply, ListTodoListsRequest, TodoListMessage,
};
pub use status::{Code, Status};
