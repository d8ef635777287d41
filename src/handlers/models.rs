//! Model schema definitions module
//!
//! Explicit schemas for the structured request bodies the demo routes
//! accept. Built once during route registration; nested schemas are
//! shared through `Arc`.

use std::sync::Arc;

use crate::params::{Constraints, FieldSpec, FieldType, Schema};

pub fn product() -> Arc<Schema> {
    Arc::new(
        Schema::new("Product")
            .field("name", FieldSpec::new(FieldType::Str))
            .field("description", FieldSpec::new(FieldType::Str).optional())
            .field("price", FieldSpec::new(FieldType::Float))
            .field("tax", FieldSpec::new(FieldType::Float).optional()),
    )
}

pub fn event() -> Arc<Schema> {
    Arc::new(
        Schema::new("Event")
            .field("title", FieldSpec::new(FieldType::Str))
            .field("details", FieldSpec::new(FieldType::Str).optional())
            .field("is_paid", FieldSpec::new(FieldType::Bool))
            .field("fee", FieldSpec::new(FieldType::Float)),
    )
}

pub fn user() -> Arc<Schema> {
    Arc::new(
        Schema::new("User")
            .field("username", FieldSpec::new(FieldType::Str))
            .field("email", FieldSpec::new(FieldType::Str))
            .field("full_name", FieldSpec::new(FieldType::Str).optional()),
    )
}

pub fn student() -> Arc<Schema> {
    Arc::new(
        Schema::new("Student")
            .field(
                "name",
                FieldSpec::new(FieldType::Str).constraints(Constraints::new().length(5, 20)),
            )
            .field(
                "total_marks",
                FieldSpec::new(FieldType::Float).constraints(Constraints::new().ge(0.0)),
            )
            .field(
                "subjects",
                FieldSpec::new(FieldType::List(Box::new(FieldType::Str))),
            ),
    )
}

pub fn image() -> Arc<Schema> {
    Arc::new(
        Schema::new("Image")
            .field("url", FieldSpec::new(FieldType::Url))
            .field(
                "name",
                FieldSpec::new(FieldType::Str).constraints(Constraints::new().length(5, 20)),
            ),
    )
}

pub fn employee(image: &Arc<Schema>) -> Arc<Schema> {
    Arc::new(
        Schema::new("Employee")
            .field("name", FieldSpec::new(FieldType::Str))
            .field("age", FieldSpec::new(FieldType::Int))
            .field(
                "teams",
                FieldSpec::new(FieldType::List(Box::new(FieldType::Str))),
            )
            .field(
                "image",
                FieldSpec::new(FieldType::Model(Arc::clone(image))).optional(),
            )
            .field(
                "doc_images",
                FieldSpec::new(FieldType::List(Box::new(FieldType::Model(Arc::clone(
                    image,
                )))))
                .optional(),
            ),
    )
}
