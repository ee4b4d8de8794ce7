//! Source merging
//!
//! Builds the merged mapping for a construction call: a copy of the explicit
//! values, overlaid by each source in order.

use std::sync::Arc;

use crate::error::Result;
use crate::loaders::{get_loader, Loader, LoaderRegistry};
use crate::mapping::Mapping;
use crate::source::{ConfigSource, ConfigSources};

/// Merge `sources` over `base` using the process-wide loader registry.
///
/// Every loader is resolved before any of them runs, so an unknown source
/// kind fails without reading anything. A loader error aborts the merge;
/// values written by earlier loaders are discarded with the working copy.
pub fn populate(base: &Mapping, sources: &ConfigSources) -> Result<Mapping> {
    let loaders = sources
        .iter()
        .map(|source| get_loader(source.kind()).map(|loader| (loader, source)))
        .collect::<Result<Vec<_>>>()?;
    run_loaders(base, loaders)
}

/// Same as [`populate`], against an explicit registry.
pub fn populate_with(
    registry: &LoaderRegistry,
    base: &Mapping,
    sources: &ConfigSources,
) -> Result<Mapping> {
    let loaders = sources
        .iter()
        .map(|source| registry.get(source.kind()).map(|loader| (loader, source)))
        .collect::<Result<Vec<_>>>()?;
    run_loaders(base, loaders)
}

fn run_loaders(base: &Mapping, loaders: Vec<(Arc<dyn Loader>, &ConfigSource)>) -> Result<Mapping> {
    let mut config = base.clone();
    for (loader, source) in loaders {
        tracing::debug!(kind = source.kind(), "Populating config from source");
        loader.populate_config(&mut config, source)?;
    }
    Ok(config)
}
