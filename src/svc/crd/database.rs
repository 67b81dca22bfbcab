//! # Database custom resource
//!
//! This module provide the cluster scoped database custom resource, which
//! represents a database provisioned, or bound, in response to a
//! [`DatabaseRequest`].

use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use k8s_openapi::{
    api::core::v1::ObjectReference, apimachinery::pkg::apis::meta::v1::Condition,
};
use kube::{core::ObjectList, CustomResource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::svc::{
    crd::{
        condition::{self, FAILED_TO_CREATE_DATABASE_REASON, PROVISIONED_REASON, READY_CONDITION},
        database_request::DatabaseRequest,
        validation::{self, FieldError, Validate},
    },
    k8s::resource::{self, Scope, Scoped},
};

// -----------------------------------------------------------------------------
// Error enumeration

#[derive(thiserror::Error, PartialEq, Eq, Clone, Debug)]
pub enum Error {
    #[error("failed to parse '{0}', available options are 'Retain' or 'Delete'")]
    ParseDeletionPolicy(String),
}

// -----------------------------------------------------------------------------
// DeletionPolicy enumeration

/// what happens to the database in the backend once the resource is deleted
#[derive(
    JsonSchema, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Default,
)]
pub enum DeletionPolicy {
    #[default]
    Retain,
    Delete,
}

impl FromStr for DeletionPolicy {
    type Err = Error;

    #[cfg_attr(feature = "trace", tracing::instrument)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "retain" => Self::Retain,
            "delete" => Self::Delete,
            _ => {
                return Err(Error::ParseDeletionPolicy(s.to_string()));
            }
        })
    }
}

impl Display for DeletionPolicy {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Retain => write!(f, "Retain"),
            Self::Delete => write!(f, "Delete"),
        }
    }
}

// -----------------------------------------------------------------------------
// Spec structure

#[derive(CustomResource, JsonSchema, Serialize, Deserialize, PartialEq, Clone, Debug)]
#[kube(group = "database.operator.io")]
#[kube(version = "v1alpha1")]
#[kube(kind = "Database")]
#[kube(singular = "database")]
#[kube(plural = "databases")]
#[kube(shortname = "db")]
#[kube(status = "Status")]
#[kube(derive = "PartialEq")]
#[kube(
    printcolumn = r#"{"name":"driver", "type":"string", "description":"Driver", "jsonPath":".spec.driverName"}"#
)]
#[kube(
    printcolumn = r#"{"name":"ready", "type":"boolean", "description":"Ready", "jsonPath":".status.ready"}"#
)]
#[kube(
    printcolumn = r#"{"name":"id", "type":"string", "description":"Database identifier", "jsonPath":".status.databaseID"}"#
)]
#[kube(
    printcolumn = r#"{"name":"policy", "type":"string", "description":"Deletion policy", "jsonPath":".spec.deletionPolicy"}"#
)]
pub struct Spec {
    #[serde(rename = "driverName")]
    pub driver_name: String,
    /// name of the DatabaseClass given in the DatabaseRequest
    #[serde(rename = "databaseClassName")]
    pub database_class_name: String,
    /// the DatabaseRequest which leads to the creation of this database, or
    /// the one to bind with when the database is created manually. It is
    /// required, none is only the state of a database under construction.
    #[schemars(required)]
    #[serde(rename = "databaseRequest", skip_serializing_if = "Option::is_none")]
    pub database_request: Option<ObjectReference>,
    #[serde(
        rename = "parameters",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub parameters: BTreeMap<String, String>,
    /// identifier of a database living in the backend, empty when the
    /// database is dynamically provisioned
    #[serde(
        rename = "existingBucketID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub existing_database_id: Option<String>,
    #[serde(rename = "deletionPolicy", default)]
    pub deletion_policy: DeletionPolicy,
}

// -----------------------------------------------------------------------------
// Status structure

#[derive(JsonSchema, Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
pub struct Status {
    #[serde(rename = "ready", default, skip_serializing_if = "std::ops::Not::not")]
    pub ready: bool,
    #[serde(rename = "databaseID", default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    #[serde(rename = "conditions", default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

// -----------------------------------------------------------------------------
// List type

pub type DatabaseList = ObjectList<Database>;

// -----------------------------------------------------------------------------
// Database implementation

impl Spec {
    #[cfg_attr(feature = "trace", tracing::instrument)]
    /// reference the given request as the origin of the database
    pub fn bind(&mut self, request: &DatabaseRequest) {
        self.database_request = Some(resource::object_reference(request));
    }

    /// returns if the database refers to an already existing one in the backend
    pub fn is_static(&self) -> bool {
        self.existing_database_id
            .as_deref()
            .map(|id| !validation::is_blank(id))
            .unwrap_or(false)
    }

    pub fn should_delete(&self) -> bool {
        self.deletion_policy == DeletionPolicy::Delete
    }
}

impl Database {
    #[cfg_attr(feature = "trace", tracing::instrument)]
    /// mark the database as ready with the identifier given by the backend,
    /// both are always set together
    pub fn set_provisioned(&mut self, id: String) {
        let generation = self.metadata.generation;
        let status = self.status.get_or_insert_with(Status::default);

        status.ready = true;
        status.database_id = Some(id);
        condition::set(
            &mut status.conditions,
            condition::new(
                READY_CONDITION,
                condition::Status::True,
                PROVISIONED_REASON,
                "Database is provisioned",
                generation,
            ),
        );
    }

    #[cfg_attr(feature = "trace", tracing::instrument)]
    pub fn unset_provisioned(&mut self) {
        let status = self.status.get_or_insert_with(Status::default);

        status.ready = false;
        status.database_id = None;
        condition::remove(&mut status.conditions, READY_CONDITION);
    }

    pub fn is_provisioned(&self) -> bool {
        self.status
            .as_ref()
            .map(|status| status.ready && status.database_id.is_some())
            .unwrap_or(false)
    }

    pub fn get_database_id(&self) -> Option<String> {
        self.status.to_owned().unwrap_or_default().database_id
    }

    #[cfg_attr(feature = "trace", tracing::instrument)]
    /// insert or update a condition and returns if the status changed
    pub fn set_condition(&mut self, condition: Condition) -> bool {
        let status = self.status.get_or_insert_with(Status::default);

        condition::set(&mut status.conditions, condition)
    }

    #[cfg_attr(feature = "trace", tracing::instrument)]
    /// record that the backend failed to create the database
    pub fn fail(&mut self, message: &str) -> bool {
        let generation = self.metadata.generation;

        self.set_condition(condition::new(
            READY_CONDITION,
            condition::Status::False,
            FAILED_TO_CREATE_DATABASE_REASON,
            message,
            generation,
        ))
    }
}

impl Scoped for Database {
    const SCOPE: Scope = Scope::Cluster;
}

impl Validate for Database {
    fn errors(&self) -> Vec<FieldError> {
        let mut errs = vec![];

        validation::non_empty(&mut errs, "spec.driverName", &self.spec.driver_name);
        validation::non_empty(
            &mut errs,
            "spec.databaseClassName",
            &self.spec.database_class_name,
        );

        match &self.spec.database_request {
            Some(request) => validation::non_empty(
                &mut errs,
                "spec.databaseRequest.name",
                request.name.as_deref().unwrap_or_default(),
            ),
            None => errs.push(FieldError::Empty("spec.databaseRequest")),
        }

        errs
    }
}
