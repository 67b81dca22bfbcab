//! # DatabaseAccess custom resource
//!
//! This module provide the namespaced database access custom resource, which
//! express the desire to receive credentials of the database bound to a
//! request into a kubernetes secret.

use k8s_openapi::api::core::v1::Secret;
use kube::{core::ObjectList, CustomResource, ResourceExt};
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
#[kube(kind = "DatabaseAccess")]
#[kube(singular = "databaseaccess")]
#[kube(plural = "databaseaccesses")]
#[kube(shortname = "dba")]
#[kube(status = "Status")]
#[kube(namespaced)]
#[kube(derive = "PartialEq")]
#[kube(
    printcolumn = r#"{"name":"request", "type":"string", "description":"Database request", "jsonPath":".spec.databaseRequestName"}"#
)]
#[kube(
    printcolumn = r#"{"name":"secret", "type":"string", "description":"Credentials secret", "jsonPath":".spec.credentialsSecretName"}"#
)]
#[kube(
    printcolumn = r#"{"name":"granted", "type":"boolean", "description":"Access granted", "jsonPath":".status.accessGranted"}"#
)]
pub struct Spec {
    #[serde(rename = "databaseRequestName")]
    pub database_request_name: String,
    #[serde(rename = "bucketAccessClassName")]
    pub database_access_class_name: String,
    /// name of the secret to populate with the credentials. An existing secret
    /// with this name is considered as already generated credentials and is
    /// never overridden.
    #[serde(rename = "credentialsSecretName")]
    pub credentials_secret_name: String,
}

// -----------------------------------------------------------------------------
// Status structure

#[derive(JsonSchema, Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct Status {
    /// identifier of the account in the backend, set once access is granted
    #[serde(rename = "accountID", default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(rename = "accessGranted", default)]
    pub access_granted: bool,
}

// -----------------------------------------------------------------------------
// List type

pub type DatabaseAccessList = ObjectList<DatabaseAccess>;

// -----------------------------------------------------------------------------
// DatabaseAccess implementation

impl DatabaseAccess {
    #[cfg_attr(feature = "trace", tracing::instrument)]
    /// mark access as granted to the given backend account
    pub fn grant(&mut self, account_id: String) {
        let status = self.status.get_or_insert_with(Status::default);

        status.access_granted = true;
        status.account_id = Some(account_id);
    }

    #[cfg_attr(feature = "trace", tracing::instrument)]
    pub fn revoke(&mut self) {
        let status = self.status.get_or_insert_with(Status::default);

        status.access_granted = false;
        status.account_id = None;
    }

    pub fn is_granted(&self) -> bool {
        self.status
            .as_ref()
            .map(|status| status.access_granted)
            .unwrap_or(false)
    }

    pub fn get_account_id(&self) -> Option<String> {
        self.status.to_owned().unwrap_or_default().account_id
    }

    /// returns if credentials have to be generated, which is not the case when
    /// the given secret is the target one
    pub fn needs_credentials(&self, secret: Option<&Secret>) -> bool {
        match secret {
            Some(secret) => {
                secret.name_any() != self.spec.credentials_secret_name
                    || secret.namespace() != self.namespace()
            }
            None => true,
        }
    }
}

impl Scoped for DatabaseAccess {
    const SCOPE: Scope = Scope::Namespaced;
}

impl Validate for DatabaseAccess {
    fn errors(&self) -> Vec<FieldError> {
        let mut errs = vec![];

        validation::non_empty(
            &mut errs,
            "spec.databaseRequestName",
            &self.spec.database_request_name,
        );
        validation::non_empty(
            &mut errs,
            "spec.bucketAccessClassName",
            &self.spec.database_access_class_name,
        );
        validation::dns_subdomain(
            &mut errs,
            "spec.credentialsSecretName",
            &self.spec.credentials_secret_name,
        );

        errs
    }
}
