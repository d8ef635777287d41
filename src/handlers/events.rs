//! Event, student, and employee routes
//!
//! Demonstrate optional bodies, multiple body parameters, embedded
//! payloads, and nested models.

use serde_json::{json, Value};

use crate::params::ValidatedRequest;

pub fn create_event(req: &ValidatedRequest) -> Value {
    let mut response = json!({ "event_id": req.value("event_id") });
    if req.is_present("q") {
        response["q"] = req.value("q");
    }
    if req.is_present("event") {
        response["event"] = req.value("event");
    }
    response
}

pub fn create_event_v2(req: &ValidatedRequest) -> Value {
    let mut response = json!({
        "event_id": req.value("event_id"),
        "is_premium": req.value("is_premium"),
        "user": req.value("user"),
    });
    if req.is_present("q") {
        response["q"] = req.value("q");
    }
    if req.is_present("event") {
        response["event"] = req.value("event");
    }
    response
}

pub fn update_event(req: &ValidatedRequest) -> Value {
    json!({
        "event_id": req.value("event_id"),
        "event": req.value("event"),
    })
}

pub fn create_student(req: &ValidatedRequest) -> Value {
    json!({
        "student_id": req.value("student_id"),
        "student": req.value("student"),
    })
}

pub fn create_employee(req: &ValidatedRequest) -> Value {
    json!({
        "emp_id": req.value("emp_id"),
        "employee": req.value("employee"),
    })
}
