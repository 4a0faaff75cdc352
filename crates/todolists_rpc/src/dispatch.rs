//! Method routing from decoded frames to `TodoListService`.

use crate::frame::{decode_line, Method, RequestFrame, ResponseFrame};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use todolists_core::{ListRepository, Status, TodoListService};

/// Routes calls to the service; shared by every connection.
pub struct Dispatcher<R: ListRepository> {
    service: Arc<TodoListService<R>>,
}

impl<R: ListRepository> Dispatcher<R> {
    pub fn new(service: Arc<TodoListService<R>>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &TodoListService<R> {
        &self.service
    }

    /// Handles one raw request line.
    pub fn dispatch_line(&self, line: &str) -> ResponseFrame {
        match decode_line::<RequestFrame>(line) {
            Ok(frame) => self.dispatch(&frame),
            Err(status) => {
                warn!("event=rpc_dispatch module=rpc status=rejected reason=malformed_frame");
                ResponseFrame::error(status)
            }
        }
    }

    /// Handles one decoded request frame.
    pub fn dispatch(&self, frame: &RequestFrame) -> ResponseFrame {
        let Some(method) = Method::parse(&frame.method) else {
            warn!(
                "event=rpc_dispatch module=rpc status=rejected reason=unknown_method method={:?}",
                frame.method
            );
            return ResponseFrame::error(Status::unimplemented(format!(
                "unknown method `{}`",
                frame.method
            )));
        };

        match method {
            Method::Create => invoke(frame, |request| self.service.create(&request)),
            Method::Get => invoke(frame, |request| self.service.get(&request)),
            Method::Delete => invoke(frame, |request| self.service.delete(&request)),
            Method::List => invoke(frame, |request| self.service.list(&request)),
        }
    }
}

fn invoke<Req, Rep>(
    frame: &RequestFrame,
    handler: impl FnOnce(Req) -> Result<Rep, Status>,
) -> ResponseFrame
where
    Req: DeserializeOwned,
    Rep: Serialize,
{
    match frame.decode_body::<Req>().and_then(handler) {
        Ok(reply) => ResponseFrame::reply(&reply),
        Err(status) => ResponseFrame::error(status),
    }
}

#[cfg(test)]
mod tests {
    use super::Dispatcher;
    use crate::frame::ResponseFrame;
    use std::sync::Arc;
    use todolists_core::proto::{CreateListReply, ListTodoListsReply};
    use todolists_core::{Code, PageLimits, SqliteListRepository, StorageHandle, TodoListService};

    fn dispatcher() -> Dispatcher<SqliteListRepository> {
        let handle = StorageHandle::open_in_memory().unwrap();
        handle.create_schema().unwrap();
        let service =
            TodoListService::new(SqliteListRepository::new(handle), PageLimits::default());
        Dispatcher::new(Arc::new(service))
    }

    #[test]
    fn routes_create_and_list() {
        let dispatcher = dispatcher();

        let created: CreateListReply = dispatcher
            .dispatch_line(r#"{"method":"Create","body":{"name":"groceries"}}"#)
            .into_result()
            .unwrap();
        assert_eq!(created.name, "groceries");

        let listed: ListTodoListsReply = dispatcher
            .dispatch_line(r#"{"method":"List","body":{"page_number":1,"page_size":10}}"#)
            .into_result()
            .unwrap();
        assert_eq!(listed.count, 1);
        assert_eq!(listed.todo_lists[0].id, created.id);
    }

    #[test]
    fn unknown_method_is_unimplemented() {
        let response = dispatcher().dispatch_line(r#"{"method":"Rename","body":{}}"#);
        match response {
            ResponseFrame::Error { status } => assert_eq!(status.code, Code::Unimplemented),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn mistyped_body_is_internal() {
        let response = dispatcher().dispatch_line(r#"{"method":"Get","body":{"id":"seven"}}"#);
        match response {
            ResponseFrame::Error { status } => assert_eq!(status.code, Code::Internal),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn service_status_passes_through() {
        let response = dispatcher().dispatch_line(r#"{"method":"Delete","body":{"id":9}}"#);
        match response {
            ResponseFrame::Error { status } => {
                assert_eq!(status.code, Code::NotFound);
                assert_eq!(status.message, "List with id \"9\" not found.");
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }
}
