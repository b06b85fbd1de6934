#![doc = "sitefill public API"]
mod boundary;
mod common;
mod config;
mod geocode;
mod inspect;
mod io;
mod lookup;
mod pipeline;
mod reconcile;
mod site;

#[doc(inline)]
pub use boundary::{BoundaryAttributes, BoundaryLayer};

#[doc(inline)]
pub use config::{BoundaryFields, ColumnMap, Config, Mode};

#[doc(inline)]
pub use geocode::{
    ApiError, CallBudget, GeocodeRequest, GeocodeResponse, Geocoded, GeocodingApi,
    resolve_admin, resolve_coordinates,
};

#[cfg(feature = "http")]
#[doc(inline)]
pub use geocode::HttpGeocoder;

#[doc(inline)]
pub use inspect::{LayerSummary, inspect_layer};

#[doc(inline)]
pub use lookup::AdminLookup;

#[doc(inline)]
pub use pipeline::{Pipeline, PipelineReport};

#[doc(inline)]
pub use reconcile::Precedence;

#[doc(inline)]
pub use site::{ChangeSet, SiteId, SiteRecord, SiteTable, is_unset, parse_coordinates};
