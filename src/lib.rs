//! # Ingreso
//!
//! Entry registration for a university campus. A person identifies with their
//! DNI, authenticates, picks how they are coming in (on foot or by car),
//! optionally registers a vehicle, has a photo taken and submits the entry to
//! the access-control backend.
//!
//! The workflow is a small state machine:
//!
//! - [`ingreso::session`] keeps one record per workflow instance under
//!   `session_{id}` in a pluggable [`ingreso::session::Storage`].
//! - [`ingreso::workflow`] holds one handler per screen and a router that
//!   carries the session id forward and removes the record when the workflow
//!   finishes or is abandoned.
//! - [`ingreso::api`] talks to the REST backend.
//!
//! The `ingreso` binary drives the workflow from a terminal kiosk.

pub mod cli;
pub mod ingreso;
