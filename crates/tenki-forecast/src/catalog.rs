//! In-memory index over the area-definition document.
//!
//! Built once at startup and read-only afterwards; share it behind an `Arc`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ForecastError;
use crate::types::{AreaDocument, AreaEntry};

/// Name returned for codes that appear in neither `class10s` nor `offices`
pub const UNKNOWN_AREA_NAME: &str = "unknown";

/// A sidebar section: one center and the offices it groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CenterGroup {
    pub code: String,
    pub name: String,
    pub offices: Vec<OfficeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfficeEntry {
    pub code: String,
    pub name: String,
}

/// One choice in the area picker shown after an office is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaOption {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AreaCatalog {
    centers: BTreeMap<String, AreaEntry>,
    offices: BTreeMap<String, AreaEntry>,
    class10s: BTreeMap<String, AreaEntry>,
}

impl AreaCatalog {
    /// Build the catalog, failing if any of the three collections is absent.
    ///
    /// Dangling references (a center listing an unknown office, a class10 area
    /// that no office claims) are kept and logged; lookups treat them as
    /// best-effort.
    pub fn build(doc: AreaDocument) -> Result<Self, ForecastError> {
        let centers = doc.centers.ok_or(ForecastError::MalformedCatalog("centers"))?;
        let offices = doc.offices.ok_or(ForecastError::MalformedCatalog("offices"))?;
        let class10s = doc.class10s.ok_or(ForecastError::MalformedCatalog("class10s"))?;

        let catalog = Self {
            centers,
            offices,
            class10s,
        };
        catalog.log_dangling_references();

        tracing::info!(
            "Area catalog built: {} centers, {} offices, {} class10 areas",
            catalog.centers.len(),
            catalog.offices.len(),
            catalog.class10s.len()
        );
        Ok(catalog)
    }

    fn log_dangling_references(&self) {
        for (center_code, center) in &self.centers {
            for office_code in &center.children {
                if !self.offices.contains_key(office_code) {
                    tracing::warn!(
                        "Center {} lists unknown office {}",
                        center_code,
                        office_code
                    );
                }
            }
        }

        for code in self.class10s.keys() {
            if self.resolve_office_for(code).is_err() {
                tracing::debug!("Class10 area {} has no owning office", code);
            }
        }
    }

    pub fn is_office(&self, code: &str) -> bool {
        self.offices.contains_key(code)
    }

    pub fn office_name(&self, code: &str) -> Option<&str> {
        self.offices.get(code).map(|o| o.name.as_str())
    }

    /// The office that owns `area_code`.
    ///
    /// An office owns itself. Otherwise the first office (in code order) whose
    /// children list the area wins; uniqueness is not checked.
    pub fn resolve_office_for(&self, area_code: &str) -> Result<&str, ForecastError> {
        if let Some((code, _)) = self.offices.get_key_value(area_code) {
            return Ok(code.as_str());
        }

        self.offices
            .iter()
            .find(|(_, office)| office.children.iter().any(|c| c == area_code))
            .map(|(code, _)| code.as_str())
            .ok_or_else(|| ForecastError::UnknownArea(area_code.to_string()))
    }

    /// Sub-areas of an office. An office without children (or one the catalog
    /// does not know) stands for itself, so the result is never empty.
    pub fn child_areas_of<'a>(&'a self, office_code: &'a str) -> Vec<&'a str> {
        match self.offices.get(office_code) {
            Some(office) if !office.children.is_empty() => {
                office.children.iter().map(String::as_str).collect()
            }
            _ => vec![office_code],
        }
    }

    /// Display name for any area code: class10 first, then office, else
    /// [`UNKNOWN_AREA_NAME`].
    pub fn display_name_of(&self, code: &str) -> &str {
        self.class10s
            .get(code)
            .or_else(|| self.offices.get(code))
            .map(|entry| entry.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_AREA_NAME)
    }

    /// Picker entries for an office's sub-areas.
    pub fn area_options(&self, office_code: &str) -> Result<Vec<AreaOption>, ForecastError> {
        if !self.is_office(office_code) {
            return Err(ForecastError::UnknownArea(office_code.to_string()));
        }

        Ok(self
            .child_areas_of(office_code)
            .into_iter()
            .map(|code| AreaOption {
                code: code.to_string(),
                name: self.display_name_of(code).to_string(),
            })
            .collect())
    }

    /// Centers in order, each with the offices it lists that actually exist.
    pub fn sidebar(&self) -> Vec<CenterGroup> {
        self.centers
            .iter()
            .map(|(code, center)| CenterGroup {
                code: code.clone(),
                name: center.name.clone(),
                offices: center
                    .children
                    .iter()
                    .filter_map(|office_code| {
                        self.offices.get(office_code).map(|office| OfficeEntry {
                            code: office_code.clone(),
                            name: office.name.clone(),
                        })
                    })
                    .collect(),
            })
            .collect()
    }
}
