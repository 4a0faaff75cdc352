//! Blocking `TodoLists` client.
//!
//! The connection is opened lazily and reopened after any I/O failure, so a
//! client outlives server restarts. Every transport failure is reported as an
//! `UNAVAILABLE` status.

use crate::frame::{decode_line, encode_line, Method, RequestFrame, ResponseFrame};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;
use todolists_core::proto::{
    CreateListReply, CreateListRequest, DeleteListRequest, Empty, GetListRequest,
    ListTodoListsReply, ListTodoListsRequest, TodoListMessage,
};
use todolists_core::{ListId, Status};

pub struct TodoListsClient {
    address: String,
    timeout: Option<Duration>,
    connection: Option<Connection>,
}

struct Connection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Connection {
    fn open(address: &str, timeout: Option<Duration>) -> io::Result<Self> {
        let stream = TcpStream::connect(address)?;
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: stream,
        })
    }
}

impl TodoListsClient {
    /// Creates a client for `host:port`; no connection is made yet.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: None,
            connection: None,
        }
    }

    /// Bounds how long one call may wait on the socket.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn create(&mut self, name: &str) -> Result<CreateListReply, Status> {
        self.call(
            Method::Create,
            &CreateListRequest {
                name: name.to_string(),
            },
        )
    }

    pub fn get(&mut self, id: ListId) -> Result<TodoListMessage, Status> {
        self.call(Method::Get, &GetListRequest { id })
    }

    pub fn delete(&mut self, id: ListId) -> Result<Empty, Status> {
        self.call(Method::Delete, &DeleteListRequest { id })
    }

    pub fn list(&mut self, page_number: i64, page_size: i64) -> Result<ListTodoListsReply, Status> {
        self.call(
            Method::List,
            &ListTodoListsRequest {
                page_number,
                page_size,
            },
        )
    }

    fn call<Req, Rep>(&mut self, method: Method, request: &Req) -> Result<Rep, Status>
    where
        Req: Serialize,
        Rep: DeserializeOwned,
    {
        let line = encode_line(&RequestFrame::new(method, request)?)?;
        let response = self.round_trip(&line).map_err(|err| {
            debug!(
                "event=rpc_call module=client status=unavailable method={} address={} error={}",
                method.as_str(),
                self.address,
                err
            );
            Status::unavailable(format!("failed to reach `{}`: {err}", self.address))
        })?;
        decode_line::<ResponseFrame>(&response)?.into_result()
    }

    fn round_trip(&mut self, line: &str) -> io::Result<String> {
        let result = self.try_round_trip(line);
        if result.is_err() {
            self.connection = None;
        }
        result
    }

    fn try_round_trip(&mut self, line: &str) -> io::Result<String> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => Connection::open(&self.address, self.timeout)?,
        };
        let connection = self.connection.insert(connection);

        connection.writer.write_all(line.as_bytes())?;
        connection.writer.write_all(b"\n")?;
        connection.writer.flush()?;

        let mut response = String::new();
        if connection.reader.read_line(&mut response)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ));
        }
        Ok(response)
    }
}
