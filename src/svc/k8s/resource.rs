//! # Resource module
//!
//! This module provide helpers on kubernetes [`Resource`]

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use k8s_openapi::api::core::v1::ObjectReference;
use kube::{CustomResourceExt, Resource, ResourceExt};

// -----------------------------------------------------------------------------
// Error enumeration

#[derive(thiserror::Error, PartialEq, Eq, Clone, Debug)]
pub enum Error {
    #[error("failed to parse '{0}', available options are 'Namespaced' or 'Cluster'")]
    ParseScope(String),
    #[error("resource '{0}' of kind '{1}' is cluster scoped and must not set namespace '{2}'")]
    UnexpectedNamespace(String, String, String),
    #[error("resource '{0}' of kind '{1}' is namespaced and must set a namespace")]
    MissingNamespace(String, String),
    #[error("resource of kind '{0}' must have a name")]
    MissingName(String),
}

// -----------------------------------------------------------------------------
// Scope enumeration

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum Scope {
    Namespaced,
    Cluster,
}

impl FromStr for Scope {
    type Err = Error;

    #[cfg_attr(feature = "trace", tracing::instrument)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "namespaced" => Self::Namespaced,
            "cluster" => Self::Cluster,
            _ => {
                return Err(Error::ParseScope(s.to_string()));
            }
        })
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Namespaced => write!(f, "Namespaced"),
            Self::Cluster => write!(f, "Cluster"),
        }
    }
}

// -----------------------------------------------------------------------------
// Scoped trait

/// scope of a custom resource, it must match the one declared by its custom
/// resource definition
pub trait Scoped {
    const SCOPE: Scope;
}

// -----------------------------------------------------------------------------
// Helpers functions

/// returns the namespace and name of the kubernetes resource, the namespace is
/// '<none>' for cluster scoped resources.
pub fn namespaced_name<T>(obj: &T) -> (String, String)
where
    T: ResourceExt,
{
    (
        obj.namespace().unwrap_or_else(|| "<none>".to_string()),
        obj.name_any(),
    )
}

/// check that the resource has a name and that the presence of its namespace
/// matches its scope
pub fn check_scope<T>(obj: &T) -> Result<(), Error>
where
    T: ResourceExt + CustomResourceExt + Scoped,
{
    let kind = T::api_resource().kind;
    let name = match &obj.meta().name {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => return Err(Error::MissingName(kind)),
    };

    let namespace = obj.namespace().filter(|namespace| !namespace.is_empty());
    match (T::SCOPE, namespace) {
        (Scope::Cluster, Some(namespace)) => {
            Err(Error::UnexpectedNamespace(name, kind, namespace))
        }
        (Scope::Namespaced, None) => Err(Error::MissingNamespace(name, kind)),
        _ => Ok(()),
    }
}

/// returns an object reference pointing to the given resource
pub fn object_reference<T>(obj: &T) -> ObjectReference
where
    T: ResourceExt + CustomResourceExt,
{
    let api_resource = T::api_resource();

    ObjectReference {
        api_version: Some(api_resource.api_version),
        kind: Some(api_resource.kind),
        name: obj.meta().name.to_owned(),
        namespace: obj.namespace(),
        uid: obj.uid(),
        resource_version: obj.resource_version(),
        field_path: None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use super::*;
    use crate::svc::crd::{
        database::Database,
        database_access::DatabaseAccess,
        database_access_class::DatabaseAccessClass,
        database_class::{self, DatabaseClass},
        database_request::{self, DatabaseRequest},
    };

    fn request(namespace: Option<&str>) -> DatabaseRequest {
        let mut request = DatabaseRequest::new(
            "orders",
            database_request::Spec {
                database_class_name: Some("postgresql-small".to_string()),
                engine: "postgresql".to_string(),
                existing_database_name: None,
            },
        );

        request.metadata.namespace = namespace.map(ToString::to_string);
        request.metadata.uid = Some("5c1f0e4e-7d8a-4c1b-9a53-3f0f4b1d2e6a".to_string());
        request
    }

    fn class(namespace: Option<&str>) -> DatabaseClass {
        let mut class = DatabaseClass::new(
            "postgresql-small",
            database_class::Spec {
                driver_name: "postgresql.database.operator.io".to_string(),
                parameters: BTreeMap::new(),
            },
        );

        class.metadata.namespace = namespace.map(ToString::to_string);
        class
    }

    #[test]
    fn parse_scope() {
        assert_eq!(Scope::from_str("Namespaced"), Ok(Scope::Namespaced));
        assert_eq!(Scope::from_str("cluster"), Ok(Scope::Cluster));
        assert_eq!(
            Scope::from_str("global"),
            Err(Error::ParseScope("global".to_string()))
        );
    }

    fn declared<T>() -> Scope
    where
        T: CustomResourceExt,
    {
        Scope::from_str(&T::crd().spec.scope).expect("known scope")
    }

    #[test]
    fn scope_matches_definitions() {
        assert_eq!(Database::SCOPE, Scope::Cluster);
        assert_eq!(declared::<Database>(), Database::SCOPE);
        assert_eq!(declared::<DatabaseAccess>(), DatabaseAccess::SCOPE);
        assert_eq!(declared::<DatabaseClass>(), DatabaseClass::SCOPE);
        assert_eq!(declared::<DatabaseAccessClass>(), DatabaseAccessClass::SCOPE);
        assert_eq!(DatabaseRequest::SCOPE, Scope::Namespaced);
        assert_eq!(declared::<DatabaseRequest>(), DatabaseRequest::SCOPE);
    }

    #[test]
    fn namespaced_resource_requires_namespace() {
        assert_eq!(check_scope(&request(Some("shop"))), Ok(()));
        assert_eq!(
            check_scope(&request(None)),
            Err(Error::MissingNamespace(
                "orders".to_string(),
                "DatabaseRequest".to_string()
            ))
        );
        assert_eq!(
            check_scope(&request(Some(""))),
            Err(Error::MissingNamespace(
                "orders".to_string(),
                "DatabaseRequest".to_string()
            ))
        );
    }

    #[test]
    fn cluster_scoped_resource_rejects_namespace() {
        assert_eq!(check_scope(&class(None)), Ok(()));
        assert_eq!(
            check_scope(&class(Some("shop"))),
            Err(Error::UnexpectedNamespace(
                "postgresql-small".to_string(),
                "DatabaseClass".to_string(),
                "shop".to_string()
            ))
        );
    }

    #[test]
    fn resource_requires_name() {
        let mut class = class(None);
        class.metadata = ObjectMeta::default();

        assert_eq!(
            check_scope(&class),
            Err(Error::MissingName("DatabaseClass".to_string()))
        );
    }

    #[test]
    fn namespaced_name_of_cluster_scoped_resource() {
        assert_eq!(
            namespaced_name(&class(None)),
            ("<none>".to_string(), "postgresql-small".to_string())
        );
        assert_eq!(
            namespaced_name(&request(Some("shop"))),
            ("shop".to_string(), "orders".to_string())
        );
    }

    #[test]
    fn reference_to_request() {
        let reference = object_reference(&request(Some("shop")));

        assert_eq!(
            reference.api_version.as_deref(),
            Some("database.operator.io/v1alpha1")
        );
        assert_eq!(reference.kind.as_deref(), Some("DatabaseRequest"));
        assert_eq!(reference.name.as_deref(), Some("orders"));
        assert_eq!(reference.namespace.as_deref(), Some("shop"));
        assert_eq!(
            reference.uid.as_deref(),
            Some("5c1f0e4e-7d8a-4c1b-9a53-3f0f4b1d2e6a")
        );
    }
}
