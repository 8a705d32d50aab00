use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::{ReconConfig, RegistryConfig, WellNameConfig};
use crate::error::ReconError;
use crate::model::{CanonicalWell, MatchedAttributes};
use crate::tokenize::{composite_key, normalize_registry_number, normalize_well_name};

/// Where the canonical registry comes from (database, exported file, ...).
///
/// Implementations must fail with [`ReconError::SourceUnavailable`] rather
/// than return a partial registry.
pub trait RegistrySource {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    fn load_wells(&self, registry: &RegistryConfig) -> Result<Vec<CanonicalWell>, ReconError>;
}

/// All registry rows sharing one registry number, collapsed.
#[derive(Debug, Clone)]
pub struct RegistryGroup {
    pub wells: Vec<usize>,
    pub attributes: MatchedAttributes,
}

/// Read-only lookup structures over one registry snapshot.
#[derive(Debug, Clone, Default)]
pub struct CanonicalIndex {
    wells: Vec<CanonicalWell>,
    by_registry: BTreeMap<String, RegistryGroup>,
    /// registry number -> composite key -> well positions
    by_composite: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl CanonicalIndex {
    /// Load the registry from `source` and index it. A source failure is fatal.
    pub fn build(source: &dyn RegistrySource, config: &ReconConfig) -> Result<Self, ReconError> {
        let wells = source.load_wells(&config.registry)?;
        log::info!("loaded {} registry rows from {}", wells.len(), source.describe());
        Ok(Self::from_wells(wells, &config.well_name))
    }

    pub fn from_wells(wells: Vec<CanonicalWell>, names: &WellNameConfig) -> Self {
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut kept: Vec<CanonicalWell> = Vec::with_capacity(wells.len());
        for mut well in wells {
            if !seen_ids.insert(well.well_id.clone()) {
                log::warn!("duplicate registry well id '{}' ignored", well.well_id);
                continue;
            }
            well.registry_number = well.registry_number.as_deref().and_then(normalize_registry_number);
            kept.push(well);
        }

        let mut members: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_composite: HashMap<String, HashMap<String, Vec<usize>>> = HashMap::new();

        for (i, well) in kept.iter().enumerate() {
            let Some(registry) = well.registry_number.clone() else {
                continue;
            };
            members.entry(registry.clone()).or_default().push(i);

            if let Some(name) = well.well_name.as_deref() {
                let name = normalize_well_name(name, &names.strip_chars, &names.replacements);
                let key = composite_key(&name, well.well_number.as_deref());
                by_composite
                    .entry(registry)
                    .or_default()
                    .entry(key)
                    .or_default()
                    .push(i);
            }
        }

        let by_registry = members
            .into_iter()
            .map(|(registry, wells)| {
                let attributes = MatchedAttributes::collapse(wells.iter().map(|&i| &kept[i]));
                (registry, RegistryGroup { wells, attributes })
            })
            .collect::<BTreeMap<_, _>>();

        log::debug!(
            "indexed {} wells: {} registry numbers, {} composite keys",
            kept.len(),
            by_registry.len(),
            by_composite.values().map(HashMap::len).sum::<usize>(),
        );

        Self {
            wells: kept,
            by_registry,
            by_composite,
        }
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn well(&self, idx: usize) -> &CanonicalWell {
        &self.wells[idx]
    }

    pub fn registry_count(&self) -> usize {
        self.by_registry.len()
    }

    /// Exact (composite key, registry number) lookup.
    pub fn lookup_composite(&self, key: &str, registry_number: &str) -> &[usize] {
        self.by_composite
            .get(registry_number)
            .and_then(|keys| keys.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Registry-number-only lookup.
    pub fn registry_group(&self, registry_number: &str) -> Option<&RegistryGroup> {
        self.by_registry.get(registry_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;

    fn well(id: &str, rrc: Option<&str>, name: Option<&str>, number: Option<&str>) -> CanonicalWell {
        CanonicalWell {
            well_id: id.into(),
            api10: Some(format!("42{id}")),
            registry_number: rrc.map(String::from),
            well_name: name.map(String::from),
            well_number: number.map(String::from),
            county: Some("REEVES".into()),
            ..Default::default()
        }
    }

    struct FailingSource;

    impl RegistrySource for FailingSource {
        fn describe(&self) -> String {
            "nowhere".into()
        }

        fn load_wells(&self, _: &RegistryConfig) -> Result<Vec<CanonicalWell>, ReconError> {
            Err(ReconError::SourceUnavailable("connection refused".into()))
        }
    }

    #[test]
    fn groups_by_registry_number() {
        let index = CanonicalIndex::from_wells(
            vec![
                well("1", Some("100"), Some("SMITH"), Some("1")),
                well("2", Some("#100"), Some("SMITH"), Some("2")),
                well("3", None, Some("JONES"), Some("1")),
            ],
            &WellNameConfig::default(),
        );
        assert_eq!(index.len(), 3);
        assert_eq!(index.registry_count(), 1);

        let group = index.registry_group("100").unwrap();
        assert_eq!(group.wells, vec![0, 1]);
        assert_eq!(group.attributes.well_id.joined().as_deref(), Some("1 | 2"));
        assert_eq!(group.attributes.county, FieldValue::Single("REEVES".into()));
        assert!(index.registry_group("200").is_none());
    }

    #[test]
    fn composite_lookup_requires_registry_number() {
        let index = CanonicalIndex::from_wells(
            vec![
                well("1", Some("100"), Some("Smith Gas Unit"), Some("1")),
                well("2", Some("200"), Some("SMITH GU"), Some("1")),
                well("3", Some("100"), Some("SMITH GU"), None),
            ],
            &WellNameConfig::default(),
        );
        assert_eq!(index.lookup_composite("SMITH GU 1", "100"), &[0]);
        assert_eq!(index.lookup_composite("SMITH GU 1", "200"), &[1]);
        assert_eq!(index.lookup_composite("SMITH GU", "100"), &[2]);
        assert!(index.lookup_composite("SMITH GU 1", "300").is_empty());
    }

    #[test]
    fn duplicate_well_ids_keep_first() {
        let index = CanonicalIndex::from_wells(
            vec![
                well("1", Some("100"), Some("SMITH"), Some("1")),
                well("1", Some("100"), Some("OTHER"), Some("9")),
            ],
            &WellNameConfig::default(),
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.well(0).well_name.as_deref(), Some("SMITH"));
    }

    #[test]
    fn unavailable_source_is_fatal() {
        let err = CanonicalIndex::build(&FailingSource, &ReconConfig::default()).unwrap_err();
        assert!(matches!(err, ReconError::SourceUnavailable(_)));
    }
}
