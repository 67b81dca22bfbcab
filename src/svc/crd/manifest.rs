//! # Manifest module
//!
//! This module provide a parser of multi-document yaml manifests which
//! dispatches each document on its 'apiVersion' and 'kind' to the matching
//! custom resource, then checks its scope and validates it.

use kube::core::TypeMeta;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::svc::{
    crd::{
        database::Database,
        database_access::DatabaseAccess,
        database_access_class::DatabaseAccessClass,
        database_class::DatabaseClass,
        database_request::DatabaseRequest,
        validation::{self, Validate},
        Kind, GROUP, VERSION,
    },
    k8s::resource::{self, Scoped},
};

// -----------------------------------------------------------------------------
// Error enumeration

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to parse document #{0}, {1}")]
    Parse(usize, serde_yaml::Error),
    #[error("failed to read 'apiVersion' and 'kind' of document #{0}, {1}")]
    TypeMeta(usize, serde_yaml::Error),
    #[error("document #{0} has unknown kind '{2}' in api version '{1}'")]
    UnknownKind(usize, String, String),
    #[error("failed to deserialize document #{0} of kind '{1}', {2}")]
    Deserialize(usize, Kind, serde_yaml::Error),
    #[error("document #{0} is not correctly scoped, {1}")]
    Scope(usize, resource::Error),
    #[error("document #{0} named '{1}' is invalid, {2}")]
    Invalid(usize, String, validation::Error),
}

impl Error {
    /// returns the index of the document in the manifest, starting at zero
    pub fn index(&self) -> usize {
        match self {
            Self::Parse(index, _)
            | Self::TypeMeta(index, _)
            | Self::UnknownKind(index, _, _)
            | Self::Deserialize(index, _, _)
            | Self::Scope(index, _)
            | Self::Invalid(index, _, _) => *index,
        }
    }
}

// -----------------------------------------------------------------------------
// Resource enumeration

#[derive(PartialEq, Clone, Debug)]
pub enum Resource {
    Database(Box<Database>),
    DatabaseAccess(Box<DatabaseAccess>),
    DatabaseClass(Box<DatabaseClass>),
    DatabaseAccessClass(Box<DatabaseAccessClass>),
    DatabaseRequest(Box<DatabaseRequest>),
}

impl Resource {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Database(_) => Kind::Database,
            Self::DatabaseAccess(_) => Kind::DatabaseAccess,
            Self::DatabaseClass(_) => Kind::DatabaseClass,
            Self::DatabaseAccessClass(_) => Kind::DatabaseAccessClass,
            Self::DatabaseRequest(_) => Kind::DatabaseRequest,
        }
    }

    /// returns the namespace and name of the resource
    pub fn namespaced_name(&self) -> (String, String) {
        match self {
            Self::Database(obj) => resource::namespaced_name(obj.as_ref()),
            Self::DatabaseAccess(obj) => resource::namespaced_name(obj.as_ref()),
            Self::DatabaseClass(obj) => resource::namespaced_name(obj.as_ref()),
            Self::DatabaseAccessClass(obj) => resource::namespaced_name(obj.as_ref()),
            Self::DatabaseRequest(obj) => resource::namespaced_name(obj.as_ref()),
        }
    }
}

// -----------------------------------------------------------------------------
// Helper functions

/// returns the typed and checked resource of the document
fn check<T>(index: usize, kind: Kind, value: serde_yaml::Value) -> Result<T, Error>
where
    T: DeserializeOwned + Validate + Scoped + kube::ResourceExt + kube::CustomResourceExt,
{
    let obj: T = serde_yaml::from_value(value).map_err(|err| Error::Deserialize(index, kind, err))?;

    resource::check_scope(&obj).map_err(|err| Error::Scope(index, err))?;
    obj.validate()
        .map_err(|err| Error::Invalid(index, obj.name_any(), err))?;

    Ok(obj)
}

/// returns the kind of the document, or none if it is not served by this crate
fn kind_of(types: &TypeMeta) -> Option<Kind> {
    if types.api_version != format!("{}/{}", GROUP, VERSION) {
        return None;
    }

    Kind::all().into_iter().find(|kind| kind.kind() == types.kind)
}

/// parses every document of the yaml manifest. Empty documents are ignored.
/// Documents of unknown kind are skipped with a warning, unless strict is set
/// in which case they are reported as errors.
#[cfg_attr(feature = "trace", tracing::instrument(skip(content)))]
pub fn parse(content: &str, strict: bool) -> Vec<Result<Resource, Error>> {
    let mut resources = vec![];

    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = match serde_yaml::Value::deserialize(document) {
            Ok(serde_yaml::Value::Null) => {
                debug!(index = index, "skip empty document");
                continue;
            }
            Ok(value) => value,
            Err(err) => {
                // the stream is not usable after a syntax error
                resources.push(Err(Error::Parse(index, err)));
                break;
            }
        };

        let types: TypeMeta = match serde_yaml::from_value(value.to_owned()) {
            Ok(types) => types,
            Err(err) => {
                resources.push(Err(Error::TypeMeta(index, err)));
                continue;
            }
        };

        let kind = match kind_of(&types) {
            Some(kind) => kind,
            None if strict => {
                resources.push(Err(Error::UnknownKind(index, types.api_version, types.kind)));
                continue;
            }
            None => {
                warn!(
                    index = index,
                    api_version = types.api_version,
                    kind = types.kind,
                    "skip document of unknown kind"
                );
                continue;
            }
        };

        debug!(index = index, kind = kind.to_string(), "check document");
        let resource = match kind {
            Kind::Database => check(index, kind, value).map(|obj| Resource::Database(Box::new(obj))),
            Kind::DatabaseAccess => {
                check(index, kind, value).map(|obj| Resource::DatabaseAccess(Box::new(obj)))
            }
            Kind::DatabaseClass => {
                check(index, kind, value).map(|obj| Resource::DatabaseClass(Box::new(obj)))
            }
            Kind::DatabaseAccessClass => check(index, kind, value)
                .map(|obj| Resource::DatabaseAccessClass(Box::new(obj))),
            Kind::DatabaseRequest => {
                check(index, kind, value).map(|obj| Resource::DatabaseRequest(Box::new(obj)))
            }
        };

        resources.push(resource);
    }

    resources
}
