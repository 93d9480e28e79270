//! Error taxonomy of the diff and plan pipeline.
//!
//! Every fatal condition aborts the current call and carries the structural context it
//! was raised in. An irreversible step is not an error: it only clears
//! [`Plan::reversible`](crate::migrate::Plan::reversible).

use thiserror::Error;

use crate::catalog::ObjectId;

#[derive(Debug, Error)]
pub enum DiffError {
    /// Case-insensitive matching found more than one candidate for a name.
    #[error("ambiguous match for {kind} {name:?} in {scope}: candidates {}", .candidates.join(", "))]
    AmbiguousMatch {
        kind: &'static str,
        name: String,
        scope: String,
        candidates: Vec<String>,
    },

    /// The driver cannot classify a column type.
    #[error("unsupported type {ty:?} for {id} (driver {driver})")]
    UnsupportedType {
        driver: String,
        id: ObjectId,
        ty: String,
    },

    /// The driver cannot compare an attribute.
    #[error("unsupported attribute {attr} on {id} (driver {driver})")]
    UnsupportedAttr {
        driver: String,
        id: ObjectId,
        attr: String,
    },

    #[error("failed to normalize {id}: {reason}")]
    Normalize { id: ObjectId, reason: String },
}

#[derive(Debug, Error)]
pub enum OrderError {
    /// A dependency cycle remains after every foreign key edge has been detached.
    #[error(
        "unresolvable dependency cycle between {}: {}",
        .tables.join(", "),
        .changes.join(" -> ")
    )]
    UnresolvableCycle {
        tables: Vec<String>,
        changes: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The dialect collaborator failed to render a change.
    #[error("failed to render {change}")]
    Render {
        change: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The plan contains irreversible steps and the caller asked for a reversible plan.
    #[error("plan {name:?} is not reversible: {}", .steps.join("; "))]
    Irreversible { name: String, steps: Vec<String> },
}
