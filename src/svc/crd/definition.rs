//! # Definition module
//!
//! This module provide helpers to generate the custom resource definition of
//! resources whose fields live at the top level of the object instead of
//! being nested in a `spec` field. Those could not be derived using
//! [`kube::CustomResource`].

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::core::schema::StructuralSchemaRewriter;
use schemars::{gen::SchemaSettings, JsonSchema};
use serde_json::{json, Value};

use crate::svc::crd::{GROUP, VERSION};

// -----------------------------------------------------------------------------
// Names structure

/// names under which the custom resource is served by the api server
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Names {
    pub kind: &'static str,
    pub list_kind: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    pub shortnames: &'static [&'static str],
}

impl Names {
    pub fn crd_name(&self) -> String {
        format!("{}.{}", self.plural, GROUP)
    }
}

// -----------------------------------------------------------------------------
// Helper functions

/// returns the openapi v3 structural schema of the object, which is the schema
/// of T extended with the 'apiVersion', 'kind' and 'metadata' fields
pub fn schema<T>() -> Value
where
    T: JsonSchema,
{
    let gen = SchemaSettings::openapi3()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .with_visitor(StructuralSchemaRewriter)
        .into_generator();

    let mut schema = serde_json::to_value(gen.into_root_schema_for::<T>())
        .expect("schema generated by schemars to be serializable");

    if let Value::Object(obj) = &mut schema {
        obj.remove("title");

        let properties = obj
            .entry("properties")
            .or_insert_with(|| json!({}));

        if let Value::Object(properties) = properties {
            properties.insert("apiVersion".into(), json!({ "type": "string" }));
            properties.insert("kind".into(), json!({ "type": "string" }));
            properties.insert("metadata".into(), json!({ "type": "object" }));
        }
    }

    schema
}

/// returns the custom resource definition of a cluster scoped resource without
/// status whose fields are described by T
pub fn cluster_scoped<T>(
    names: &Names,
    columns: &[(&'static str, &'static str, &'static str)],
) -> CustomResourceDefinition
where
    T: JsonSchema,
{
    let columns: Vec<Value> = columns
        .iter()
        .map(|(name, description, path)| {
            json!({
                "name": name,
                "type": "string",
                "description": description,
                "jsonPath": path,
            })
        })
        .collect();

    serde_json::from_value(json!({
        "apiVersion": "apiextensions.k8s.io/v1",
        "kind": "CustomResourceDefinition",
        "metadata": {
            "name": names.crd_name(),
        },
        "spec": {
            "group": GROUP,
            "scope": "Cluster",
            "names": {
                "categories": [],
                "kind": names.kind,
                "listKind": names.list_kind,
                "plural": names.plural,
                "singular": names.singular,
                "shortNames": names.shortnames,
            },
            "versions": [{
                "name": VERSION,
                "served": true,
                "storage": true,
                "additionalPrinterColumns": columns,
                "schema": {
                    "openAPIV3Schema": schema::<T>(),
                },
                "subresources": {},
            }],
        },
    }))
    .expect("custom resource definition to be valid")
}
