//! # Command module
//!
//! This module provide command line interface structures and helpers
use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use clap::{ArgAction, Parser, Subcommand};

use crate::svc::cfg::Configuration;

pub mod crd;

// -----------------------------------------------------------------------------
// Executor trait

#[async_trait]
pub trait Executor {
    type Error;

    async fn execute(&self, config: Arc<Configuration>) -> Result<(), Self::Error>;
}

// -----------------------------------------------------------------------------
// Error enum

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to execute command '{0}', {1}")]
    Execution(String, Arc<Error>),
    #[error("failed to execute command, {0}")]
    CustomResourceDefinition(crd::Error),
}

// -----------------------------------------------------------------------------
// Command enum

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Interact with custom resource definition
    #[clap(name = "custom-resource-definition", aliases = &["crd"], subcommand)]
    CustomResourceDefinition(crd::CustomResourceDefinition),
}

#[async_trait]
impl Executor for Command {
    type Error = Error;

    #[cfg_attr(feature = "trace", tracing::instrument(skip(config)))]
    async fn execute(&self, config: Arc<Configuration>) -> Result<(), Self::Error> {
        match self {
            Self::CustomResourceDefinition(crd) => crd
                .execute(config)
                .await
                .map_err(Error::CustomResourceDefinition)
                .map_err(|err| Error::Execution("custom-resource-definition".into(), Arc::new(err))),
        }
    }
}

// -----------------------------------------------------------------------------
// Args struct

#[derive(Parser, Clone, Debug)]
#[clap(author, version, about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Args {
    /// Increase log verbosity
    #[clap(short = 'v', global = true, action = ArgAction::Count)]
    pub verbosity: u8,
    /// Specify location of configuration
    #[clap(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Check if configuration is healthy
    #[clap(short = 't', long = "check", global = true)]
    pub check: bool,
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::svc::crd::Kind;

    #[test]
    fn arguments_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parse_view_with_aliases() {
        let args = Args::try_parse_from(["database-apis", "-vv", "crd", "v", "dbac"])
            .expect("parse arguments");

        assert_eq!(args.verbosity, 2);
        assert!(matches!(
            args.command,
            Some(Command::CustomResourceDefinition(
                crd::CustomResourceDefinition::View {
                    custom_resource: Some(Kind::DatabaseAccessClass)
                }
            ))
        ));
    }

    #[test]
    fn parse_validate() {
        let args = Args::try_parse_from([
            "database-apis",
            "custom-resource-definition",
            "validate",
            "a.yaml",
            "b.yaml",
        ])
        .expect("parse arguments");

        match args.command {
            Some(Command::CustomResourceDefinition(crd::CustomResourceDefinition::Validate {
                files,
            })) => assert_eq!(files, vec![PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]),
            other => panic!("expected validate command, got {:?}", other),
        }
    }

    #[test]
    fn validate_requires_a_file() {
        assert!(Args::try_parse_from(["database-apis", "crd", "validate"]).is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(Args::try_parse_from(["database-apis", "crd", "view", "bucket"]).is_err());
    }
}
