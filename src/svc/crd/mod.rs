//! # Custom resource definition module
//!
//! This module provide custom resources describing databases, the classes
//! used to provision them and the requests and accesses emitted by workloads.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::CustomResourceExt;

use crate::svc::{
    crd::{
        database::Database, database_access::DatabaseAccess,
        database_access_class::DatabaseAccessClass, database_class::DatabaseClass,
        database_request::DatabaseRequest,
    },
    k8s::resource::{Scope, Scoped},
};

pub mod condition;
pub mod database;
pub mod database_access;
pub mod database_access_class;
pub mod database_class;
pub mod database_request;
pub mod definition;
pub mod manifest;
pub mod validation;

// -----------------------------------------------------------------------------
// Constants

pub const GROUP: &str = "database.operator.io";
pub const VERSION: &str = "v1alpha1";

// -----------------------------------------------------------------------------
// Error enumeration

#[derive(thiserror::Error, PartialEq, Eq, Clone, Debug)]
pub enum Error {
    #[error("failed to parse '{0}', available options are 'database', 'database-access', 'database-class', 'database-access-class' or 'database-request'")]
    ParseKind(String),
}

// -----------------------------------------------------------------------------
// Kind enumeration

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum Kind {
    Database,
    DatabaseAccess,
    DatabaseClass,
    DatabaseAccessClass,
    DatabaseRequest,
}

impl FromStr for Kind {
    type Err = Error;

    #[cfg_attr(feature = "trace", tracing::instrument)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "database" | "databases" | "db" => Self::Database,
            "database-access" | "databaseaccess" | "databaseaccesses" | "dba" => {
                Self::DatabaseAccess
            }
            "database-class" | "databaseclass" | "databaseclasses" | "dbc" => {
                Self::DatabaseClass
            }
            "database-access-class"
            | "databaseaccessclass"
            | "databaseaccessclasses"
            | "dbac" => Self::DatabaseAccessClass,
            "database-request" | "databaserequest" | "databaserequests" | "dbr" => {
                Self::DatabaseRequest
            }
            _ => {
                return Err(Error::ParseKind(s.to_string()));
            }
        })
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}

impl Kind {
    /// returns every kind in the order in which definitions are emitted
    pub fn all() -> [Self; 5] {
        [
            Self::Database,
            Self::DatabaseAccess,
            Self::DatabaseClass,
            Self::DatabaseAccessClass,
            Self::DatabaseRequest,
        ]
    }

    /// returns the kind as written in the 'kind' field of objects
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database => "Database",
            Self::DatabaseAccess => "DatabaseAccess",
            Self::DatabaseClass => database_class::KIND,
            Self::DatabaseAccessClass => database_access_class::KIND,
            Self::DatabaseRequest => "DatabaseRequest",
        }
    }

    pub fn crd(&self) -> CustomResourceDefinition {
        match self {
            Self::Database => Database::crd(),
            Self::DatabaseAccess => DatabaseAccess::crd(),
            Self::DatabaseClass => DatabaseClass::crd(),
            Self::DatabaseAccessClass => DatabaseAccessClass::crd(),
            Self::DatabaseRequest => DatabaseRequest::crd(),
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            Self::Database => Database::SCOPE,
            Self::DatabaseAccess => DatabaseAccess::SCOPE,
            Self::DatabaseClass => DatabaseClass::SCOPE,
            Self::DatabaseAccessClass => DatabaseAccessClass::SCOPE,
            Self::DatabaseRequest => DatabaseRequest::SCOPE,
        }
    }
}

// -----------------------------------------------------------------------------
// Helper functions

/// returns the custom resource definitions of every kind
pub fn definitions() -> Vec<CustomResourceDefinition> {
    Kind::all().iter().map(Kind::crd).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kind() {
        assert_eq!(Kind::from_str("database"), Ok(Kind::Database));
        assert_eq!(Kind::from_str("Databases"), Ok(Kind::Database));
        assert_eq!(Kind::from_str("DatabaseAccess"), Ok(Kind::DatabaseAccess));
        assert_eq!(
            Kind::from_str("database-access-class"),
            Ok(Kind::DatabaseAccessClass)
        );
        assert_eq!(Kind::from_str("dbc"), Ok(Kind::DatabaseClass));
        assert_eq!(
            Kind::from_str("databaserequests"),
            Ok(Kind::DatabaseRequest)
        );
        assert_eq!(
            Kind::from_str("bucket"),
            Err(Error::ParseKind("bucket".to_string()))
        );
    }

    #[test]
    fn display_is_parseable() {
        for kind in Kind::all() {
            assert_eq!(Kind::from_str(&kind.to_string()), Ok(kind));
        }
    }

    #[test]
    fn scopes() {
        assert_eq!(Kind::Database.scope(), Scope::Cluster);
        assert_eq!(Kind::DatabaseClass.scope(), Scope::Cluster);
        assert_eq!(Kind::DatabaseAccessClass.scope(), Scope::Cluster);
        assert_eq!(Kind::DatabaseAccess.scope(), Scope::Namespaced);
        assert_eq!(Kind::DatabaseRequest.scope(), Scope::Namespaced);
    }

    #[test]
    fn definitions_are_ordered_and_grouped() {
        let names: Vec<_> = definitions()
            .into_iter()
            .map(|crd| {
                assert_eq!(crd.spec.group, GROUP);
                assert_eq!(crd.spec.versions[0].name, VERSION);
                crd.metadata.name.unwrap_or_default()
            })
            .collect();

        assert_eq!(
            names,
            vec![
                "databases.database.operator.io",
                "databaseaccesses.database.operator.io",
                "databaseclasses.database.operator.io",
                "databaseaccessclasses.database.operator.io",
                "databaserequests.database.operator.io",
            ]
        );
    }

    #[test]
    fn kinds_match_definitions() {
        for kind in Kind::all() {
            assert_eq!(kind.crd().spec.names.kind, kind.kind());
        }
    }
}
