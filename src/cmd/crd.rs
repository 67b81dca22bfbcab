//! # Custom resource definition module
//!
//! This module provides custom resource module command line interface function
//! implementation

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use clap::Subcommand;
use tracing::{error, info};

use crate::{
    cmd::Executor,
    svc::{
        cfg::Configuration,
        crd::{self, manifest, Kind},
    },
};

// -----------------------------------------------------------------------------
// Error enum

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to serialize custom resource definition, {0}")]
    Serialize(serde_yaml::Error),
    #[error("failed to read manifest '{0:?}', {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to validate manifests, {0} document(s) are invalid")]
    Invalid(usize),
}

// -----------------------------------------------------------------------------
// CustomResourceDefinition enum

#[derive(Subcommand, Clone, Debug)]
pub enum CustomResourceDefinition {
    /// View custom resource definition
    #[clap(name = "view", aliases = &["v"])]
    View {
        #[clap(name = "custom-resource")]
        custom_resource: Option<Kind>,
    },
    /// Validate manifests of custom resources
    #[clap(name = "validate", aliases = &["c"])]
    Validate {
        #[clap(name = "file", required = true)]
        files: Vec<PathBuf>,
    },
}

#[async_trait]
impl Executor for CustomResourceDefinition {
    type Error = Error;

    #[cfg_attr(feature = "trace", tracing::instrument(skip(config)))]
    async fn execute(&self, config: Arc<Configuration>) -> Result<(), Self::Error> {
        match self {
            Self::View { custom_resource } => view(config, custom_resource).await,
            Self::Validate { files } => validate(config, files).await,
        }
    }
}

// -----------------------------------------------------------------------------
// view function

/// returns the custom resource definitions of the given kind, or of every
/// kind, as a yaml stream
pub fn render(kind: &Option<Kind>) -> Result<String, Error> {
    let crds = match kind {
        Some(kind) => vec![kind.crd()],
        None => crd::definitions(),
    };

    Ok(crds
        .iter()
        .map(serde_yaml::to_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::Serialize)?
        .join("---\n"))
}

#[cfg_attr(feature = "trace", tracing::instrument(skip(_config)))]
pub async fn view(_config: Arc<Configuration>, custom_resource: &Option<Kind>) -> Result<(), Error> {
    print!("{}", render(custom_resource)?);
    Ok(())
}

// -----------------------------------------------------------------------------
// validate function

#[cfg_attr(feature = "trace", tracing::instrument(skip(config)))]
pub async fn validate(config: Arc<Configuration>, files: &[PathBuf]) -> Result<(), Error> {
    let mut failures = 0;

    for path in files {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| Error::Read(path.to_owned(), err))?;

        for result in manifest::parse(&content, config.validation.strict) {
            match result {
                Ok(resource) => {
                    let (namespace, name) = resource.namespaced_name();

                    info!(
                        path = path.display().to_string(),
                        kind = resource.kind().to_string(),
                        namespace = namespace,
                        name = name,
                        "resource is valid"
                    );
                    println!(
                        "{}: {} {}/{} is valid",
                        path.display(),
                        resource.kind(),
                        namespace,
                        name
                    );
                }
                Err(err) => {
                    failures += 1;
                    error!(
                        path = path.display().to_string(),
                        index = err.index(),
                        error = err.to_string(),
                        "resource is invalid"
                    );
                    eprintln!("{}: {}", path.display(), err);
                }
            }
        }
    }

    if failures > 0 {
        return Err(Error::Invalid(failures));
    }

    Ok(())
}
