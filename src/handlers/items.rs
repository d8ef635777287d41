//! Extra data type routes
//!
//! UUID path parameters, datetime/time/duration body values with
//! temporal arithmetic, and cookie parameters.

use serde_json::{json, Value};

use crate::params::{json_datetime, json_duration, ValidatedRequest};

pub fn read_item(req: &ValidatedRequest) -> Value {
    let mut response = json!({
        "item_id": req.value("item_id"),
        "start_datetime": req.value("start_datetime"),
        "end_datetime": req.value("end_datetime"),
        "repeat_at": req.value("interval"),
        "process_after": req.value("process_after"),
        "start_process": Value::Null,
        "duration": Value::Null,
    });
    // The correlated-required check guarantees these three are present
    // together or absent together; arithmetic never sees a null operand.
    if let (Some(start), Some(end), Some(delay)) = (
        req.datetime("start_datetime"),
        req.datetime("end_datetime"),
        req.duration("process_after"),
    ) {
        let start_process = start + delay;
        response["start_process"] = json_datetime(start_process);
        response["duration"] = json_duration(end - start_process);
    }
    response
}

pub fn read_items(req: &ValidatedRequest) -> Value {
    json!({ "ads_id": req.value("ads_id") })
}
