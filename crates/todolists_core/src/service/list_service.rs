//! `TodoLists` RPC method implementations.
//!
//! # Responsibility
//! - Run each RPC as one stateless call against the list repository.
//! - Map expected repository outcomes onto RPC statuses with stable messages.
//!
//! # Invariants
//! - The service never touches storage except through `ListRepository`.
//! - `DuplicateName` maps to `INVALID_ARGUMENT`, `NotFound` to `NOT_FOUND`.
//! - Any other repository failure is logged and surfaced as `INTERNAL`.
//! - `List` normalizes its window once and uses it for both the page query
//!   and `next_page_number`.

use crate::model::todo_list::ListId;
use crate::pagination::{PageLimits, PageWindow};
use crate::proto::messages::{
    CreateListReply, CreateListRequest, DeleteListRequest, Empty, GetListRequest,
    ListTodoListsReply, ListTodoListsRequest, TodoListMessage,
};
use crate::proto::status::Status;
use crate::repo::list_repo::{ListRepository, RepoError};
use log::{error, info, warn};

const INTERNAL_FAILURE_MESSAGE: &str = "internal storage failure";

/// Service facade over a list repository implementation.
pub struct TodoListService<R: ListRepository> {
    repo: R,
    limits: PageLimits,
}

impl<R: ListRepository> TodoListService<R> {
    /// Creates a service using the provided repository and page limits.
    pub fn new(repo: R, limits: PageLimits) -> Self {
        Self { repo, limits }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Creates a list with a unique name.
    ///
    /// Fails with `INVALID_ARGUMENT` when the name is already taken.
    pub fn create(&self, request: &CreateListRequest) -> Result<CreateListReply, Status> {
        info!(
            "event=rpc_create module=service status=start name={:?}",
            request.name
        );
        match self.repo.create(&request.name) {
            Ok(id) => {
                info!("event=rpc_create module=service status=ok list_id={id}");
                Ok(CreateListReply {
                    id,
                    name: request.name.clone(),
                })
            }
            Err(RepoError::DuplicateName(name)) => {
                warn!("event=rpc_create module=service status=rejected reason=duplicate_name name={name:?}");
                Err(duplicate_name_status(&name))
            }
            Err(err) => Err(unexpected_failure("rpc_create", &err)),
        }
    }

    /// Fetches one list by id.
    pub fn get(&self, request: &GetListRequest) -> Result<TodoListMessage, Status> {
        info!(
            "event=rpc_get module=service status=start list_id={}",
            request.id
        );
        match self.repo.get(request.id) {
            Ok(list) => Ok(list.into()),
            Err(RepoError::NotFound(id)) => {
                warn!("event=rpc_get module=service status=rejected reason=not_found list_id={id}");
                Err(list_not_found_status(id))
            }
            Err(err) => Err(unexpected_failure("rpc_get", &err)),
        }
    }

    /// Deletes one list by id.
    pub fn delete(&self, request: &DeleteListRequest) -> Result<Empty, Status> {
        info!(
            "event=rpc_delete module=service status=start list_id={}",
            request.id
        );
        match self.repo.delete(request.id) {
            Ok(()) => Ok(Empty {}),
            Err(RepoError::NotFound(id)) => {
                warn!("event=rpc_delete module=service status=rejected reason=not_found list_id={id}");
                Err(list_not_found_status(id))
            }
            Err(err) => Err(unexpected_failure("rpc_delete", &err)),
        }
    }

    /// Returns one page of lists plus the total count.
    ///
    /// Out-of-range paging input is clamped, never rejected. The page and the
    /// count are separate queries, so a concurrent write may make them
    /// disagree by that write.
    pub fn list(&self, request: &ListTodoListsRequest) -> Result<ListTodoListsReply, Status> {
        let window = PageWindow::normalize(request.page_number, request.page_size, self.limits);
        info!(
            "event=rpc_list module=service status=start page_number={} page_size={} effective_page_number={} effective_page_size={}",
            request.page_number,
            request.page_size,
            window.page_number(),
            window.page_size()
        );

        let lists = self
            .repo
            .page(window.offset(), window.limit())
            .map_err(|err| unexpected_failure("rpc_list", &err))?;
        let count = self
            .repo
            .count()
            .map_err(|err| unexpected_failure("rpc_list", &err))?;

        Ok(ListTodoListsReply {
            todo_lists: lists.into_iter().map(TodoListMessage::from).collect(),
            next_page_number: window.next_page_number(count),
            count,
        })
    }
}

fn duplicate_name_status(name: &str) -> Status {
    Status::invalid_argument(format!(
        "List name must be unique, list with name \"{name}\" already exist."
    ))
}

fn list_not_found_status(id: ListId) -> Status {
    Status::not_found(format!("List with id \"{id}\" not found."))
}

fn unexpected_failure(event: &str, err: &RepoError) -> Status {
    error!("event={event} module=service status=error error={err}");
    Status::internal(INTERNAL_FAILURE_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::{duplicate_name_status, list_not_found_status};
    use crate::proto::status::Code;

    #[test]
    fn duplicate_name_message_embeds_name() {
        let status = duplicate_name_status("groceries");
        assert_eq!(status.code, Code::InvalidArgument);
        assert_eq!(
            status.message,
            "List name must be unique, list with name \"groceries\" already exist."
        );
    }

    #[test]
    fn not_found_message_embeds_id() {
        let status = list_not_found_status(666);
        assert_eq!(status.code, Code::NotFound);
        assert_eq!(status.message, "List with id \"666\" not found.");
    }
}
