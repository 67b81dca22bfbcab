//! # Database apis
//!
//! Kubernetes custom resource definitions to request, provision and grant
//! access to databases.
//!
//! Cluster scoped [`Database`](svc::crd::database::Database),
//! [`DatabaseClass`](svc::crd::database_class::DatabaseClass) and
//! [`DatabaseAccessClass`](svc::crd::database_access_class::DatabaseAccessClass)
//! describe what exists and how to provision it, while namespaced
//! [`DatabaseRequest`](svc::crd::database_request::DatabaseRequest) and
//! [`DatabaseAccess`](svc::crd::database_access::DatabaseAccess) are emitted by
//! workloads.
pub mod cmd;
pub mod logging;
pub mod svc;
