//! # DatabaseClass custom resource
//!
//! This module provide the cluster scoped database class custom resource, a
//! template which tells the driver and the parameters to use to provision a
//! database. Its fields are located at the top level of the object.

use std::collections::BTreeMap;

use k8s_openapi::{
    apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition,
    apimachinery::pkg::apis::meta::v1::ObjectMeta, ClusterResourceScope,
};
use kube::{
    core::{ApiResource, ObjectList, TypeMeta},
    CustomResourceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::svc::{
    crd::{
        definition::{self, Names},
        validation::{self, FieldError, Validate},
    },
    k8s::resource::{Scope, Scoped},
};

// -----------------------------------------------------------------------------
// Constants

pub const KIND: &str = "DatabaseClass";
pub const CRD_NAME: &str = "databaseclasses.database.operator.io";

pub const NAMES: Names = Names {
    kind: KIND,
    list_kind: "DatabaseClassList",
    singular: "databaseclass",
    plural: "databaseclasses",
    shortnames: &["dbc"],
};

// -----------------------------------------------------------------------------
// Spec structure

#[derive(JsonSchema, Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct Spec {
    #[serde(rename = "driverName")]
    pub driver_name: String,
    /// opaque configuration given to the driver to provision a database
    #[serde(
        rename = "parameters",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub parameters: BTreeMap<String, String>,
}

// -----------------------------------------------------------------------------
// DatabaseClass structure

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct DatabaseClass {
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    #[serde(rename = "metadata", default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub spec: Spec,
}

pub type DatabaseClassList = ObjectList<DatabaseClass>;

impl DatabaseClass {
    pub fn new(name: &str, spec: Spec) -> Self {
        Self {
            types: Some(TypeMeta {
                api_version: <Self as k8s_openapi::Resource>::API_VERSION.to_string(),
                kind: KIND.to_string(),
            }),
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec,
        }
    }
}

impl k8s_openapi::Resource for DatabaseClass {
    const API_VERSION: &'static str = "database.operator.io/v1alpha1";
    const GROUP: &'static str = "database.operator.io";
    const KIND: &'static str = KIND;
    const VERSION: &'static str = "v1alpha1";
    const URL_PATH_SEGMENT: &'static str = "databaseclasses";
    type Scope = ClusterResourceScope;
}

impl k8s_openapi::ListableResource for DatabaseClass {
    const LIST_KIND: &'static str = "DatabaseClassList";
}

impl k8s_openapi::Metadata for DatabaseClass {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}

impl CustomResourceExt for DatabaseClass {
    fn crd() -> CustomResourceDefinition {
        definition::cluster_scoped::<Spec>(
            &NAMES,
            &[("driver", "Driver", ".driverName")],
        )
    }

    fn crd_name() -> &'static str {
        CRD_NAME
    }

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }

    fn shortnames() -> &'static [&'static str] {
        NAMES.shortnames
    }
}

impl Scoped for DatabaseClass {
    const SCOPE: Scope = Scope::Cluster;
}

impl Validate for DatabaseClass {
    fn errors(&self) -> Vec<FieldError> {
        let mut errs = vec![];

        validation::non_empty(&mut errs, "driverName", &self.spec.driver_name);
        errs
    }
}
