//! Testing utilities.
//!
//! - [`MockTransport`]: scripted responses keyed by method and target, with
//!   per-target delays, injected failures and a request log
//! - [`RecordingHook`]: a hook that records every notification it receives
//! - [`fixtures`]: HAL documents shaped like the payroll API

use roster_core::{BoxError, Hook, HookResult, Method, Notification, Request, Response, Transport};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

#[derive(Clone)]
enum Outcome {
    Respond(Response),
    Fail(String),
}

/// A transport that answers from a script.
///
/// Routes are matched on the method and the full target, query included.
/// Unscripted requests are answered with 404.
///
/// # Example
///
/// ```rust,ignore
/// let transport = MockTransport::new();
/// transport.get_json("/api", json!({ "_links": {} }));
/// transport.respond(Method::Put, "/api/employees/1", Response::new(412, Value::Null));
/// ```
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Outcome>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<Request>>,
    answered: Mutex<Vec<String>>,
}

impl MockTransport {
    /// A transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts (or replaces) the answer for `method` on `target`.
    pub fn respond(&self, method: Method, target: &str, response: Response) {
        lock(&self.routes).insert((method, target.to_owned()), Outcome::Respond(response));
    }

    /// Scripts a 200 answer to a GET.
    pub fn get_json(&self, target: &str, entity: Value) {
        self.respond(Method::Get, target, Response::ok(entity));
    }

    /// Scripts a 200 answer to a GET, carrying an entity tag.
    pub fn get_json_with_etag(&self, target: &str, entity: Value, etag: &str) {
        self.respond(
            Method::Get,
            target,
            Response::ok(entity).with_header("ETag", etag),
        );
    }

    /// Makes `method` on `target` fail at the transport level.
    pub fn fail(&self, method: Method, target: &str, message: &str) {
        lock(&self.routes).insert((method, target.to_owned()), Outcome::Fail(message.to_owned()));
    }

    /// Holds every answer for `target` back by `delay`.
    pub fn delay(&self, target: &str, delay: Duration) {
        lock(&self.delays).insert(target.to_owned(), delay);
    }

    /// Requests in the order they were sent.
    pub fn requests(&self) -> Vec<Request> {
        lock(&self.requests).clone()
    }

    /// Number of requests sent.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Forgets the request and answer logs; the script is kept.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
        lock(&self.answered).clear();
    }

    /// Targets in the order their answers were produced.
    pub fn answered(&self) -> Vec<String> {
        lock(&self.answered).clone()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, BoxError> {
        let target = request.target();
        let (outcome, delay) = {
            let outcome = lock(&self.routes)
                .get(&(request.method, target.clone()))
                .cloned();
            let delay = lock(&self.delays).get(&target).copied();
            lock(&self.requests).push(request);
            (outcome, delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.answered).push(target);

        match outcome {
            Some(Outcome::Respond(response)) => Ok(response),
            Some(Outcome::Fail(message)) => Err(message.into()),
            None => Ok(Response::new(404, Value::Null)),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A hook that records every notification it receives.
///
/// Clones share the record.
#[derive(Clone)]
pub struct RecordingHook {
    events: Arc<Mutex<Vec<Notification>>>,
    result: HookResult,
}

impl RecordingHook {
    /// A recorder that answers `Next`.
    pub fn new() -> Self {
        Self::with_result(HookResult::Next)
    }

    /// A recorder that answers `result`.
    pub fn with_result(result: HookResult) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            result,
        }
    }

    /// Notifications received so far.
    pub fn events(&self) -> Vec<Notification> {
        lock(&self.events).clone()
    }

    /// Number of notifications received.
    pub fn count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Forgets every recorded notification.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

impl Default for RecordingHook {
    fn default() -> Self {
        Self::new()
    }
}

impl Hook<Notification> for RecordingHook {
    async fn on_event(&self, event: &Notification) -> Result<HookResult, BoxError> {
        lock(&self.events).push(event.clone());
        Ok(self.result)
    }
}

/// HAL documents shaped like the payroll API.
///
/// The API root is `/api`, the collection `/api/employees`, the profile
/// `/api/profile/employees`, and employee `n` lives at `/api/employees/n`.
pub mod fixtures {
    use super::MockTransport;
    use roster_core::Resource;
    use serde_json::{Value, json};

    /// The tag every scripted employee carries.
    pub const ETAG: &str = "\"0\"";

    /// The API root, linking the collection as a URI template.
    pub fn api_root() -> Value {
        json!({
            "_links": {
                "employees": { "href": "/api/employees{?page,size,sort}", "templated": true },
                "profile": { "href": "/api/profile" }
            }
        })
    }

    /// `firstName`, `lastName` and `description` are editable; `manager` is
    /// a reference.
    pub fn employee_schema() -> Value {
        json!({
            "title": "Employee",
            "properties": {
                "firstName": { "title": "First name", "readOnly": false, "type": "string" },
                "lastName": { "title": "Last name", "readOnly": false, "type": "string" },
                "description": { "title": "Description", "readOnly": false, "type": "string" },
                "manager": { "title": "Manager", "readOnly": false, "$ref": "#/definitions/manager" }
            },
            "definitions": {
                "manager": {
                    "type": "object",
                    "properties": { "name": { "title": "Name", "type": "string" } }
                }
            },
            "type": "object",
            "$schema": "http://json-schema.org/draft-04/schema#"
        })
    }

    /// Employee `id`, with self, employee and manager links.
    pub fn employee(id: u32, first_name: &str, manager: &str) -> Value {
        let href = format!("/api/employees/{id}");
        json!({
            "firstName": first_name,
            "lastName": "Baggins",
            "description": "ring bearer",
            "manager": { "name": manager },
            "_links": {
                "self": { "href": href },
                "employee": { "href": href },
                "manager": { "href": format!("{href}/manager") }
            }
        })
    }

    /// Scripts the individual fetch of one employee, tagged with [`ETAG`].
    pub fn serve_employee(transport: &MockTransport, id: u32, first_name: &str, manager: &str) {
        transport.get_json_with_etag(
            &format!("/api/employees/{id}"),
            employee(id, first_name, manager),
            ETAG,
        );
    }

    /// Scripts a whole roster: root, profile, every employee (managed by
    /// "greg", ids from 1), and every page at `page_size`.
    ///
    /// The unparameterized collection is one page of 20.
    pub fn serve_roster(transport: &MockTransport, names: &[&str], page_size: u32) {
        transport.get_json("/api", api_root());
        transport.get_json("/api/profile/employees", employee_schema());
        for (index, name) in (1..).zip(names) {
            serve_employee(transport, index, name, "greg");
        }

        transport.get_json("/api/employees", page(names, 20, 0, None));
        let total_pages = page_count(names.len(), page_size);
        transport.get_json(
            &format!("/api/employees?size={page_size}"),
            page(names, page_size, 0, Some(total_pages)),
        );
        for number in 0..total_pages.max(1) {
            transport.get_json(
                &format!("/api/employees?page={number}&size={page_size}"),
                page(names, page_size, number, Some(total_pages)),
            );
        }
    }

    /// The `firstName` of an employee, or `""`.
    pub fn first_name(item: &Resource) -> &str {
        item.field("firstName")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    fn page_count(total: usize, page_size: u32) -> u32 {
        let total = total as u32;
        total.div_ceil(page_size.max(1))
    }

    fn page(names: &[&str], page_size: u32, number: u32, total_pages: Option<u32>) -> Value {
        let total_pages = total_pages.unwrap_or_else(|| page_count(names.len(), page_size));
        let start = (number * page_size) as usize;
        let members: Vec<Value> = (1..)
            .zip(names)
            .skip(start)
            .take(page_size as usize)
            .map(|(id, name)| employee(id, name, "greg"))
            .collect();

        let href = |n: u32| json!({ "href": format!("/api/employees?page={n}&size={page_size}") });
        let mut links = json!({
            "first": href(0),
            "self": { "href": "/api/employees" },
            "last": href(total_pages.saturating_sub(1)),
            "profile": { "href": "/api/profile/employees" }
        });
        if number > 0 {
            links["prev"] = href(number - 1);
        }
        if number + 1 < total_pages {
            links["next"] = href(number + 1);
        }

        json!({
            "_embedded": { "employees": members },
            "_links": links,
            "page": {
                "size": page_size,
                "totalElements": names.len(),
                "totalPages": total_pages,
                "number": number
            }
        })
    }
}
