//! # DatabaseRequest custom resource
//!
//! This module provide the namespaced database request custom resource, which
//! express the desire of a workload to get a database of a given engine.

use kube::{core::ObjectList, CustomResource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::svc::{
    crd::validation::{self, FieldError, Validate},
    k8s::resource::{Scope, Scoped},
};

// -----------------------------------------------------------------------------
// Spec structure

#[derive(CustomResource, JsonSchema, Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
#[kube(group = "database.operator.io")]
#[kube(version = "v1alpha1")]
#[kube(kind = "DatabaseRequest")]
#[kube(singular = "databaserequest")]
#[kube(plural = "databaserequests")]
#[kube(shortname = "dbr")]
#[kube(status = "Status")]
#[kube(namespaced)]
#[kube(derive = "PartialEq")]
#[kube(
    printcolumn = r#"{"name":"engine", "type":"string", "description":"Engine", "jsonPath":".spec.engine"}"#
)]
#[kube(
    printcolumn = r#"{"name":"class", "type":"string", "description":"Database class", "jsonPath":".spec.databaseClassName"}"#
)]
#[kube(
    printcolumn = r#"{"name":"ready", "type":"boolean", "description":"Ready", "jsonPath":".status.ready"}"#
)]
#[kube(
    printcolumn = r#"{"name":"database", "type":"string", "description":"Database", "jsonPath":".status.databaseName"}"#
)]
pub struct Spec {
    /// name of the DatabaseClass used to provision the database
    #[serde(
        rename = "databaseClassName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub database_class_name: Option<String>,
    #[serde(rename = "engine")]
    pub engine: String,
    /// name of an existing Database to bind to, no database is provisioned
    /// when it is set
    #[serde(
        rename = "existingBucketName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub existing_database_name: Option<String>,
}

// -----------------------------------------------------------------------------
// Status structure

#[derive(JsonSchema, Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct Status {
    #[serde(rename = "ready", default)]
    pub ready: bool,
    /// name of the Database provisioned or bound in response to the request
    #[serde(
        rename = "databaseName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub database_name: Option<String>,
}

// -----------------------------------------------------------------------------
// List type

pub type DatabaseRequestList = ObjectList<DatabaseRequest>;

// -----------------------------------------------------------------------------
// DatabaseRequest implementation

impl Spec {
    /// returns if a new database has to be provisioned to fulfill the request
    pub fn wants_provisioning(&self) -> bool {
        self.existing_database_name
            .as_deref()
            .map(validation::is_blank)
            .unwrap_or(true)
    }
}

impl DatabaseRequest {
    /// returns if a new database has to be provisioned to fulfill the request
    pub fn wants_provisioning(&self) -> bool {
        self.spec.wants_provisioning()
    }

    #[cfg_attr(feature = "trace", tracing::instrument)]
    /// mark the request as ready and bound to the given database
    pub fn bind(&mut self, database_name: String) {
        let status = self.status.get_or_insert_with(Status::default);

        status.ready = true;
        status.database_name = Some(database_name);
    }

    #[cfg_attr(feature = "trace", tracing::instrument)]
    pub fn unbind(&mut self) {
        let status = self.status.get_or_insert_with(Status::default);

        status.ready = false;
        status.database_name = None;
    }

    pub fn is_ready(&self) -> bool {
        self.status
            .as_ref()
            .map(|status| status.ready && status.database_name.is_some())
            .unwrap_or(false)
    }

    pub fn get_database_name(&self) -> Option<String> {
        self.status.to_owned().unwrap_or_default().database_name
    }
}

impl Scoped for DatabaseRequest {
    const SCOPE: Scope = Scope::Namespaced;
}

impl Validate for DatabaseRequest {
    fn errors(&self) -> Vec<FieldError> {
        let mut errs = vec![];

        validation::non_empty(&mut errs, "spec.engine", &self.spec.engine);

        let class = self.spec.database_class_name.as_deref().unwrap_or_default();
        let existing = self
            .spec
            .existing_database_name
            .as_deref()
            .unwrap_or_default();

        if validation::is_blank(class) && validation::is_blank(existing) {
            errs.push(FieldError::OneOf(
                "spec.databaseClassName",
                "spec.existingBucketName",
            ));
        }

        errs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> DatabaseRequest {
        serde_yaml::from_str(yaml).expect("parse database request")
    }

    #[test]
    fn dynamic_provisioning_request() {
        let request = parse(
            r#"
apiVersion: database.operator.io/v1alpha1
kind: DatabaseRequest
metadata:
  name: orders
  namespace: shop
spec:
  databaseClassName: postgresql-small
  engine: postgresql
"#,
        );

        assert_eq!(request.spec.engine, "postgresql");
        assert_eq!(
            request.spec.database_class_name,
            Some("postgresql-small".to_string())
        );
        assert!(request.wants_provisioning());
        assert!(request.status.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn existing_database_request_skips_provisioning() {
        let request = parse(
            r#"
apiVersion: database.operator.io/v1alpha1
kind: DatabaseRequest
metadata:
  name: orders
  namespace: shop
spec:
  engine: postgresql
  existingBucketName: legacy-orders
"#,
        );

        assert!(!request.wants_provisioning());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn request_without_class_nor_existing_database_is_invalid() {
        let request = DatabaseRequest::new(
            "orders",
            Spec {
                database_class_name: None,
                engine: String::new(),
                existing_database_name: Some(String::new()),
            },
        );

        assert_eq!(
            request.errors(),
            vec![
                FieldError::Empty("spec.engine"),
                FieldError::OneOf("spec.databaseClassName", "spec.existingBucketName"),
            ]
        );
    }

    #[test]
    fn bind_sets_ready_and_database_name_together() {
        let mut request = DatabaseRequest::new(
            "orders",
            Spec {
                database_class_name: Some("postgresql-small".to_string()),
                engine: "postgresql".to_string(),
                existing_database_name: None,
            },
        );

        assert!(!request.is_ready());
        request.bind("orders-7f3c".to_string());
        assert!(request.is_ready());
        assert_eq!(request.get_database_name(), Some("orders-7f3c".to_string()));

        request.unbind();
        assert!(!request.is_ready());
        assert_eq!(request.get_database_name(), None);
    }

    #[test]
    fn status_always_carries_ready() {
        let value = serde_json::to_value(Status::default()).expect("serialize status");

        assert_eq!(value, serde_json::json!({ "ready": false }));
    }

    #[test]
    fn list_of_requests() {
        let list: DatabaseRequestList = serde_yaml::from_str(
            r#"
apiVersion: database.operator.io/v1alpha1
kind: DatabaseRequestList
metadata:
  resourceVersion: "42"
items:
  - apiVersion: database.operator.io/v1alpha1
    kind: DatabaseRequest
    metadata:
      name: orders
      namespace: shop
    spec:
      engine: postgresql
      databaseClassName: postgresql-small
  - apiVersion: database.operator.io/v1alpha1
    kind: DatabaseRequest
    metadata:
      name: sessions
      namespace: shop
    spec:
      engine: redis
      existingBucketName: shared-cache
"#,
        )
        .expect("parse database request list");

        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[1].spec.engine, "redis");
        assert!(!list.items[1].wants_provisioning());
    }

    #[test]
    fn bound_request_survives_serialization() {
        let mut request = parse(
            r#"
apiVersion: database.operator.io/v1alpha1
kind: DatabaseRequest
metadata:
  name: orders
  namespace: shop
  labels:
    app: orders
spec:
  databaseClassName: postgresql-small
  engine: postgresql
  existingBucketName: legacy-orders
"#,
        );
        request.bind("legacy-orders".to_string());

        let encoded = serde_json::to_string(&request).expect("serialize database request");
        let decoded: DatabaseRequest =
            serde_json::from_str(&encoded).expect("deserialize database request");

        assert_eq!(request, decoded);
        assert!(decoded.is_ready());
    }

    #[test]
    fn blank_names_do_not_count() {
        let request = DatabaseRequest::new(
            "orders",
            Spec {
                database_class_name: Some("  ".to_string()),
                engine: "postgresql".to_string(),
                existing_database_name: Some(" ".to_string()),
            },
        );

        assert!(request.wants_provisioning());
        assert_eq!(
            request.errors(),
            vec![FieldError::OneOf(
                "spec.databaseClassName",
                "spec.existingBucketName"
            )]
        );
    }
}
