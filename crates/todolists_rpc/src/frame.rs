//! Wire frames: one JSON document per line.
//!
//! Request:  `{"method":"Create","body":{"name":"groceries"}}`
//! Reply:    `{"outcome":"reply","body":{"id":1,"name":"groceries"}}`
//! Error:    `{"outcome":"error","status":{"code":"NOT_FOUND","message":"..."}}`

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use todolists_core::Status;

/// Methods of the `TodoLists` service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Create,
    Get,
    Delete,
    List,
}

impl Method {
    pub const ALL: [Method; 4] = [Self::Create, Self::Get, Self::Delete, Self::List];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Get => "Get",
            Self::Delete => "Delete",
            Self::List => "List",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == value)
    }
}

/// One inbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    pub method: String,
    /// Request message; absent or `null` decodes as an empty message.
    #[serde(default)]
    pub body: Value,
}

impl RequestFrame {
    pub fn new<T: Serialize>(method: Method, request: &T) -> Result<Self, Status> {
        let body = serde_json::to_value(request)
            .map_err(|err| Status::internal(format!("failed to encode request: {err}")))?;
        Ok(Self {
            method: method.as_str().to_string(),
            body,
        })
    }

    /// Decodes the body into the method's request message.
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T, Status> {
        let body = if self.body.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            self.body.clone()
        };
        serde_json::from_value(body)
            .map_err(|err| Status::internal(format!("failed to decode request body: {err}")))
    }
}

/// Outcome of one call: a reply message or an error status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResponseFrame {
    Reply { body: Value },
    Error { status: Status },
}

impl ResponseFrame {
    pub fn reply<T: Serialize>(reply: &T) -> Self {
        match serde_json::to_value(reply) {
            Ok(body) => Self::Reply { body },
            Err(err) => Self::error(Status::internal(format!("failed to encode reply: {err}"))),
        }
    }

    pub fn error(status: Status) -> Self {
        Self::Error { status }
    }

    /// Decodes a reply into its message type, or returns the carried status.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, Status> {
        match self {
            Self::Reply { body } => serde_json::from_value(body)
                .map_err(|err| Status::internal(format!("failed to decode reply: {err}"))),
            Self::Error { status } => Err(status),
        }
    }
}

/// Serializes a frame as one line, without the trailing newline.
pub fn encode_line<T: Serialize>(frame: &T) -> Result<String, Status> {
    serde_json::to_string(frame)
        .map_err(|err| Status::internal(format!("failed to encode frame: {err}")))
}

/// Parses one line into a frame.
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Result<T, Status> {
    serde_json::from_str(line.trim_end())
        .map_err(|err| Status::internal(format!("malformed frame: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{decode_line, encode_line, Method, RequestFrame, ResponseFrame};
    use todolists_core::proto::{CreateListRequest, ListTodoListsRequest, TodoListMessage};
    use todolists_core::{Code, Status};

    #[test]
    fn method_names_parse_back() {
        for method in Method::ALL {
            assert_eq!(Method::parse(method.as_str()), Some(method));
        }
        assert_eq!(Method::parse("create"), None);
    }

    #[test]
    fn request_frame_has_documented_shape() {
        let frame = RequestFrame::new(
            Method::Create,
            &CreateListRequest {
                name: "groceries".to_string(),
            },
        )
        .unwrap();

        assert_eq!(
            encode_line(&frame).unwrap(),
            r#"{"method":"Create","body":{"name":"groceries"}}"#
        );
    }

    #[test]
    fn missing_body_decodes_as_empty_message() {
        let frame: RequestFrame = decode_line(r#"{"method":"List"}"#).unwrap();
        let request: ListTodoListsRequest = frame.decode_body().unwrap();

        assert_eq!(request, ListTodoListsRequest::default());
    }

    #[test]
    fn error_frame_carries_status() {
        let line = r#"{"outcome":"error","status":{"code":"NOT_FOUND","message":"gone"}}"#;
        let frame: ResponseFrame = decode_line(line).unwrap();

        let status = frame.into_result::<TodoListMessage>().unwrap_err();
        assert_eq!(status, Status::not_found("gone"));
    }

    #[test]
    fn reply_frame_decodes_message() {
        let frame = ResponseFrame::reply(&TodoListMessage {
            id: 3,
            name: "chores".to_string(),
        });
        let line = encode_line(&frame).unwrap();

        let message: TodoListMessage = decode_line::<ResponseFrame>(&line)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(message.id, 3);
    }

    #[test]
    fn garbage_line_is_internal_error() {
        let err = decode_line::<RequestFrame>("not json").unwrap_err();
        assert_eq!(err.code, Code::Internal);
    }
}
