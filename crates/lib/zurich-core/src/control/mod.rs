use std::{error::Error, fmt};

use zurich_model::registry::TOURISM_CATEGORIES;

use crate::adapters::{CatalogAdapter, GeoAdapter, JsonAdapter, RecordsAdapter, SparqlAdapter};
use crate::classify::classify;
use crate::error::BackendError;
use crate::transport::Endpoints;

pub mod catalog;
pub mod geo;
pub mod linked;
pub mod parliament;
pub mod realtime;
pub mod tourism;

pub use catalog::{
    AnalyzedDataset, CatalogStats, DatasetAnalysis, DatasetDetails, DatasetSearch,
    DatastoreQuery, DatastoreStructure, SchoolData,
};
pub use geo::GeoFeatures;
pub use parliament::{
    Business, BusinessResults, BusinessSearch, Mandate, Member, MemberResults, MemberSearch,
};
pub use realtime::{MeasurementQuery, WaterReadings, WaterStation};
pub use tourism::{TourismResults, TourismSearch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    Backend(BackendError),
    UnknownLayer {
        id: String,
        available: Vec<&'static str>,
    },
    UnknownCategory {
        name: String,
    },
    /// The SPARQL text does not start with `SELECT` or `PREFIX`.
    QueryRejected,
}

impl ControlError {
    /// User-facing text. Backend failures go through the classifier with
    /// `context`; the other variants carry their own wording.
    #[must_use]
    pub fn message(&self, context: &str) -> String {
        match self {
            Self::Backend(err) => classify(err, context),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "{err}"),
            Self::UnknownLayer { id, available } => {
                write!(f, "Unbekannter Layer `{id}`. Verfügbar: {}", available.join(", "))
            }
            Self::UnknownCategory { name } => {
                let available = TOURISM_CATEGORIES
                    .iter()
                    .map(|(key, id)| format!("`{key}` ({id})"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Unbekannte Kategorie `{name}`. Verfügbar:\n{available}")
            }
            Self::QueryRejected => write!(f, "Nur SELECT-Abfragen sind erlaubt."),
        }
    }
}

impl Error for ControlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for ControlError {
    fn from(err: BackendError) -> Self {
        Self::Backend(err)
    }
}

/// Entry point for every open data operation.
///
/// Holds one adapter per backend, each bound to its configured endpoint.
/// The plane keeps no mutable state; clones are cheap and independent.
#[derive(Debug, Clone)]
pub struct OpenDataControlPlane {
    endpoints: Endpoints,
    catalog: CatalogAdapter,
    geo: GeoAdapter,
    records: RecordsAdapter,
    sparql: SparqlAdapter,
    json: JsonAdapter,
}

impl OpenDataControlPlane {
    #[must_use]
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            catalog: CatalogAdapter::new(endpoints.catalog.clone()),
            geo: GeoAdapter::new(endpoints.geodata.clone()),
            records: RecordsAdapter::new(endpoints.records.clone()),
            sparql: SparqlAdapter::new(endpoints.sparql.clone()),
            json: JsonAdapter,
            endpoints,
        }
    }

    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Web root of the catalog, used for canonical dataset links.
    #[must_use]
    pub fn catalog_site(&self) -> &str {
        &self.endpoints.catalog_site
    }
}

impl Default for OpenDataControlPlane {
    fn default() -> Self {
        Self::new(Endpoints::default())
    }
}
