//! # DatabaseAccessClass custom resource
//!
//! This module provide the cluster scoped database access class custom
//! resource, a template which tells the driver, the style of authentication and
//! the parameters to use to grant access to a database. Its fields are located
//! at the top level of the object.

use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

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

pub const KIND: &str = "DatabaseAccessClass";
pub const CRD_NAME: &str = "databaseaccessclasses.database.operator.io";

pub const NAMES: Names = Names {
    kind: KIND,
    list_kind: "DatabaseAccessClassList",
    singular: "databaseaccessclass",
    plural: "databaseaccessclasses",
    shortnames: &["dbac"],
};

// -----------------------------------------------------------------------------
// AuthenticationType structure

/// style of authentication used by the driver, interpreted by the driver only
#[derive(JsonSchema, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
#[serde(transparent)]
pub struct AuthenticationType(pub String);

impl From<&str> for AuthenticationType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for AuthenticationType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// Spec structure

#[derive(JsonSchema, Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct Spec {
    #[serde(rename = "driverName")]
    pub driver_name: String,
    #[serde(
        rename = "authenticationType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub authentication_type: Option<AuthenticationType>,
    /// opaque configuration given to the driver to grant access to a database
    #[serde(
        rename = "parameters",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub parameters: BTreeMap<String, String>,
}

// -----------------------------------------------------------------------------
// DatabaseAccessClass structure

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct DatabaseAccessClass {
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    #[serde(rename = "metadata", default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub spec: Spec,
}

pub type DatabaseAccessClassList = ObjectList<DatabaseAccessClass>;

impl DatabaseAccessClass {
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

impl k8s_openapi::Resource for DatabaseAccessClass {
    const API_VERSION: &'static str = "database.operator.io/v1alpha1";
    const GROUP: &'static str = "database.operator.io";
    const KIND: &'static str = KIND;
    const VERSION: &'static str = "v1alpha1";
    const URL_PATH_SEGMENT: &'static str = "databaseaccessclasses";
    type Scope = ClusterResourceScope;
}

impl k8s_openapi::ListableResource for DatabaseAccessClass {
    const LIST_KIND: &'static str = "DatabaseAccessClassList";
}

impl k8s_openapi::Metadata for DatabaseAccessClass {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}

impl CustomResourceExt for DatabaseAccessClass {
    fn crd() -> CustomResourceDefinition {
        definition::cluster_scoped::<Spec>(
            &NAMES,
            &[
                ("driver", "Driver", ".driverName"),
                ("authentication", "Authentication type", ".authenticationType"),
            ],
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

impl Scoped for DatabaseAccessClass {
    const SCOPE: Scope = Scope::Cluster;
}

impl Validate for DatabaseAccessClass {
    fn errors(&self) -> Vec<FieldError> {
        let mut errs = vec![];

        validation::non_empty(&mut errs, "driverName", &self.spec.driver_name);
        if let Some(AuthenticationType(kind)) = &self.spec.authentication_type {
            validation::non_empty(&mut errs, "authenticationType", kind);
        }

        errs
    }
}
