use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::geo::Coordinate;

pub type SiteId = u64;

/// Job-site reference data, owned by the facility-management side and
/// treated as read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Site {
    #[schema(example = 3, value_type = u64)]
    pub id: SiteId,

    #[schema(example = "Via Emilia depot")]
    pub name: String,

    #[schema(example = true)]
    pub active: bool,

    /// Reference position for GPS compliance; sites without one simply skip
    /// classification.
    pub position: Option<Coordinate>,
}

/// Read-only snapshot of all known sites, passed into the core operations
/// that need to resolve or validate site ids.
#[derive(Debug, Clone, Default)]
pub struct SiteDirectory {
    sites: HashMap<SiteId, Site>,
}

impl SiteDirectory {
    pub fn new(sites: impl IntoIterator<Item = Site>) -> Self {
        SiteDirectory {
            sites: sites.into_iter().map(|site| (site.id, site)).collect(),
        }
    }

    pub fn contains(&self, id: SiteId) -> bool {
        self.sites.contains_key(&id)
    }

    pub fn get(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(&id)
    }

    pub fn name_of(&self, id: SiteId) -> Option<&str> {
        self.sites.get(&id).map(|site| site.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }
}
