//! Named subscription presets.
//!
//! Listing a destination's subscriptions annotates every pattern that is
//! one of these presets with its human-readable name, so `structs.guild.>`
//! shows up as "Guild updates".

use crate::topic::{TopicPattern, WILDCARD_MULTI};

/// Domains that have a namespace-wide preset, with their display name.
const DOMAIN_PRESETS: &[(&str, &str)] = &[
    ("grid", "Grid"),
    ("guild", "Guild"),
    ("inventory", "Inventory"),
    ("planet", "Planet"),
    ("player", "Player"),
    ("provider", "Provider"),
    ("consensus", "Block"),
];

/// A named preset pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub pattern: String,
}

/// All fixed presets for a namespace.
pub fn presets(namespace: &str) -> Vec<Preset> {
    let mut all = Vec::with_capacity(DOMAIN_PRESETS.len() + 1);
    all.push(Preset {
        name: "All updates".to_owned(),
        pattern: format!("{namespace}.{WILDCARD_MULTI}"),
    });
    all.extend(DOMAIN_PRESETS.iter().map(|(domain, label)| Preset {
        name: format!("{label} updates"),
        pattern: format!("{namespace}.{domain}.{WILDCARD_MULTI}"),
    }));
    all
}

/// Human-readable preset name for `pattern`, if it is one.
///
/// Besides the fixed presets, entity-scoped patterns of the form
/// `<namespace>.<domain>.<id>.>` are named after the entity.
pub fn preset_name(namespace: &str, pattern: &TopicPattern) -> Option<String> {
    if let Some(preset) = presets(namespace)
        .into_iter()
        .find(|preset| preset.pattern == pattern.as_str())
    {
        return Some(preset.name);
    }

    if !pattern.is_wildcard() {
        return None;
    }
    let fixed: Vec<&str> = pattern.fixed_segments().collect();
    match fixed.as_slice() {
        [ns, domain, id] if *ns == namespace => DOMAIN_PRESETS
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, label)| format!("{label} {id} updates")),
        _ => None,
    }
}
