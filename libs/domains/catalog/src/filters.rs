use regex::Regex;

use crate::error::CatalogResult;
use crate::models::ResourceKind;

/// Enablement patterns restricting which catalog entries are considered
/// valid, both during merge (entries failing a pattern are skipped entirely)
/// and during lookup (types outside the patterns are not candidates).
///
/// `None` means "no restriction". Patterns are anchored implicitly: a
/// pattern must match the full token.
#[derive(Debug, Clone, Default)]
pub struct EnablementFilters {
    os: Option<Regex>,
    region: Option<Regex>,
    instance_type: Option<Regex>,
    database_type: Option<Regex>,
    engine: Option<Regex>,
}

impl EnablementFilters {
    /// Compile filters from optional pattern strings.
    pub fn from_patterns(
        os: Option<&str>,
        region: Option<&str>,
        instance_type: Option<&str>,
        database_type: Option<&str>,
        engine: Option<&str>,
    ) -> CatalogResult<Self> {
        Ok(Self {
            os: compile(os)?,
            region: compile(region)?,
            instance_type: compile(instance_type)?,
            database_type: compile(database_type)?,
            engine: compile(engine)?,
        })
    }

    /// Filters that allow everything.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn allows_region(&self, code: &str) -> bool {
        matches(&self.region, code)
    }

    pub fn allows_os(&self, os: &str) -> bool {
        matches(&self.os, os)
    }

    pub fn allows_engine(&self, engine: &str) -> bool {
        matches(&self.engine, engine)
    }

    /// Type enablement. Instances and databases each have their own pattern;
    /// other kinds are unrestricted by type name.
    pub fn allows_type(&self, kind: ResourceKind, type_code: &str) -> bool {
        match kind {
            ResourceKind::Instance | ResourceKind::Container => {
                matches(&self.instance_type, type_code)
            }
            ResourceKind::Database => matches(&self.database_type, type_code),
            _ => true,
        }
    }
}

fn compile(pattern: Option<&str>) -> CatalogResult<Option<Regex>> {
    match pattern {
        Some(p) if !p.trim().is_empty() => {
            // Anchor so the pattern must cover the whole token
            let anchored = format!("^(?:{})$", p);
            Ok(Some(Regex::new(&anchored)?))
        }
        _ => Ok(None),
    }
}

fn matches(pattern: &Option<Regex>, value: &str) -> bool {
    match pattern {
        Some(re) => re.is_match(value),
        None => true,
    }
}
