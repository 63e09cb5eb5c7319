pub mod build;
pub mod measure;
pub mod topology;

use crate::error::Result;
use mpnerf::core::topology::TopologyTable;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// The table named on the command line, or the built-in one.
pub(crate) fn load_topology(path: Option<&Path>) -> Result<Cow<'static, TopologyTable>> {
    match path {
        Some(path) => {
            info!("Loading side-chain topology from {:?}.", path);
            Ok(Cow::Owned(TopologyTable::load(path)?))
        }
        None => Ok(Cow::Borrowed(TopologyTable::builtin())),
    }
}
