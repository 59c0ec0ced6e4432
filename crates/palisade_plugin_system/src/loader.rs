//! Dependency-order resolution for a pool of discovered plugins.

use crate::descriptor::PluginDescriptor;
use crate::RESERVED_NAMES;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Orders discovered plugins into a valid load sequence.
///
/// The resolver works by iterative constraint relaxation rather than a
/// strict topological sort: each round prunes satisfied hard dependencies,
/// permanently drops candidates whose hard dependency was never discovered,
/// discards soft dependencies that can no longer matter, and loads every
/// candidate left with no constraints. When a round makes no progress, one
/// candidate with no hard dependencies left is loaded anyway (sacrificing
/// soft-dependency ordering to guarantee forward progress); if even that is
/// impossible, the entire remaining pool is cyclic or blocked and is
/// abandoned wholesale.
///
/// Candidates are visited in name order each round, so the output is
/// deterministic for a given input set.
pub struct PluginLoader {
    api_version: i32,
}

impl PluginLoader {
    pub fn new(api_version: i32) -> Self {
        Self { api_version }
    }

    /// Resolve a load order for `discovered`, carrying an arbitrary payload
    /// (the plugin instance) alongside each descriptor.
    ///
    /// Plugins that are filtered out or abandoned are excluded from the
    /// result, never an error: partial failure of the batch is isolated to
    /// the plugins involved.
    pub fn resolve<P>(&self, discovered: Vec<(P, PluginDescriptor)>) -> Vec<(P, PluginDescriptor)> {
        let mut candidates: BTreeMap<String, (P, PluginDescriptor)> = BTreeMap::new();
        let mut hard: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut soft: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (payload, descriptor) in discovered {
            if RESERVED_NAMES.contains(&descriptor.name.to_lowercase().as_str()) {
                warn!("Refusing reserved plugin name {}", descriptor.name);
                continue;
            }
            if !descriptor.supports_api(self.api_version) {
                warn!(
                    "Skipping plugin {}: no compatible API version (host offers {})",
                    descriptor.name, self.api_version
                );
                continue;
            }

            let name = descriptor.name.clone();
            if !descriptor.depend.is_empty() {
                hard.insert(name.clone(), descriptor.depend.clone());
            }
            if !descriptor.softdepend.is_empty() {
                soft.entry(name.clone())
                    .or_default()
                    .extend(descriptor.softdepend.iter().cloned());
            }
            // A load-before declaration naming B becomes a soft dependency
            // of B on this plugin.
            for target in &descriptor.loadbefore {
                soft.entry(target.clone()).or_default().push(name.clone());
            }

            if candidates.insert(name.clone(), (payload, descriptor)).is_some() {
                warn!("Duplicate plugin name {}; keeping the last discovered copy", name);
            }
        }

        let mut ordered = Vec::new();
        let mut loaded: Vec<String> = Vec::new();

        while !candidates.is_empty() {
            let mut progress = false;
            let round: Vec<String> = candidates.keys().cloned().collect();

            for name in round {
                if let Some(deps) = hard.get_mut(&name) {
                    deps.retain(|dep| !loaded.contains(dep));
                }
                let missing = hard.get(&name).and_then(|deps| {
                    deps.iter()
                        .find(|dep| !candidates.contains_key(dep.as_str()))
                        .cloned()
                });
                if let Some(missing) = missing {
                    // Neither loaded nor still pending: this dependency can
                    // never be satisfied, so the candidate is unloadable.
                    warn!("Skipping plugin {}: unresolvable dependency {}", name, missing);
                    candidates.remove(&name);
                    hard.remove(&name);
                    soft.remove(&name);
                    progress = true;
                    continue;
                }
                if hard.get(&name).is_some_and(|deps| deps.is_empty()) {
                    hard.remove(&name);
                }

                if let Some(softs) = soft.get_mut(&name) {
                    // A soft dependency that is no longer a candidate is
                    // either already loaded or gone; both count as satisfied.
                    softs.retain(|dep| candidates.contains_key(dep));
                }
                if soft.get(&name).is_some_and(|softs| softs.is_empty()) {
                    soft.remove(&name);
                }

                if !hard.contains_key(&name) && !soft.contains_key(&name) {
                    if let Some((payload, descriptor)) = candidates.remove(&name) {
                        debug!("Resolved load position {} for {}", ordered.len(), name);
                        loaded.push(name);
                        ordered.push((payload, descriptor));
                        progress = true;
                    }
                }
            }

            if !progress {
                let stall_break = candidates
                    .keys()
                    .find(|name| !hard.contains_key(name.as_str()))
                    .cloned();
                if let Some(name) = stall_break {
                    warn!(
                        "Breaking load-order stall: loading {} ahead of its soft dependencies",
                        name
                    );
                    soft.remove(&name);
                    if let Some((payload, descriptor)) = candidates.remove(&name) {
                        loaded.push(name);
                        ordered.push((payload, descriptor));
                    }
                } else {
                    // Every remaining candidate has an unmet hard dependency:
                    // a cycle or a fully blocked set. Abandon the lot.
                    warn!(
                        "Abandoning {} plugins with unresolvable dependency cycle: {:?}",
                        candidates.len(),
                        candidates.keys().collect::<Vec<_>>()
                    );
                    candidates.clear();
                    hard.clear();
                    soft.clear();
                }
            }
        }

        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::API_VERSION;
    use std::collections::BTreeMap;

    fn desc(name: &str, depend: &[&str], softdepend: &[&str], loadbefore: &[&str]) -> PluginDescriptor {
        PluginDescriptor {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            api_versions: vec![API_VERSION],
            depend: depend.iter().map(|s| s.to_string()).collect(),
            softdepend: softdepend.iter().map(|s| s.to_string()).collect(),
            loadbefore: loadbefore.iter().map(|s| s.to_string()).collect(),
            commands: BTreeMap::new(),
        }
    }

    fn resolve_names(descriptors: Vec<PluginDescriptor>) -> Vec<String> {
        PluginLoader::new(API_VERSION)
            .resolve(descriptors.into_iter().map(|d| ((), d)).collect())
            .into_iter()
            .map(|(_, d)| d.name)
            .collect()
    }

    #[test]
    fn hard_dependencies_precede_dependents() {
        let order = resolve_names(vec![
            desc("zoning", &["core_lib"], &[], &[]),
            desc("core_lib", &[], &[], &[]),
            desc("gates", &["zoning", "core_lib"], &[], &[]),
        ]);
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert_eq!(order.len(), 3);
        assert!(pos("core_lib") < pos("zoning"));
        assert!(pos("zoning") < pos("gates"));
    }

    #[test]
    fn missing_hard_dependency_excludes_plugin() {
        // A: no deps, B: depends on A, C: depends on undiscovered Z.
        let order = resolve_names(vec![
            desc("a", &[], &[], &[]),
            desc("b", &["a"], &[], &[]),
            desc("c", &["z"], &[], &[]),
        ]);
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn transitive_dependents_of_missing_plugin_are_dropped() {
        let order = resolve_names(vec![
            desc("b", &["z"], &[], &[]),
            desc("c", &["b"], &[], &[]),
        ]);
        assert!(order.is_empty());
    }

    #[test]
    fn pure_cycle_loads_nothing() {
        let order = resolve_names(vec![
            desc("a", &["b"], &[], &[]),
            desc("b", &["a"], &[], &[]),
        ]);
        assert!(order.is_empty());
    }

    #[test]
    fn self_dependency_loads_nothing() {
        let order = resolve_names(vec![desc("a", &["a"], &[], &[])]);
        assert!(order.is_empty());
    }

    #[test]
    fn cycle_does_not_block_unrelated_plugins() {
        let order = resolve_names(vec![
            desc("a", &["b"], &[], &[]),
            desc("b", &["a"], &[], &[]),
            desc("standalone", &[], &[], &[]),
        ]);
        assert_eq!(order, vec!["standalone"]);
    }

    #[test]
    fn soft_dependency_orders_when_satisfiable() {
        // "alpha" sorts first but soft-depends on "beta".
        let order = resolve_names(vec![
            desc("alpha", &[], &["beta"], &[]),
            desc("beta", &[], &[], &[]),
        ]);
        assert_eq!(order, vec!["beta", "alpha"]);
    }

    #[test]
    fn soft_dependency_on_undiscovered_plugin_is_ignored() {
        let order = resolve_names(vec![desc("a", &[], &["ghost"], &[])]);
        assert_eq!(order, vec!["a"]);
    }

    #[test]
    fn loadbefore_becomes_reverse_soft_edge() {
        // "zeta" sorts last but declares it must load before "alpha".
        let order = resolve_names(vec![
            desc("alpha", &[], &[], &[]),
            desc("zeta", &[], &[], &["alpha"]),
        ]);
        assert_eq!(order, vec!["zeta", "alpha"]);
    }

    #[test]
    fn soft_cycle_is_broken_by_stall_rule() {
        // Mutual soft dependency stalls; the first name-sorted candidate
        // with no hard dependencies loads anyway.
        let order = resolve_names(vec![
            desc("a", &[], &["b"], &[]),
            desc("b", &[], &["a"], &[]),
        ]);
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn stall_break_never_violates_hard_ordering() {
        // "early" soft-depends on "late" which hard-depends on "early":
        // soft ordering must give way, hard ordering must hold.
        let order = resolve_names(vec![
            desc("early", &[], &["late"], &[]),
            desc("late", &["early"], &[], &[]),
        ]);
        assert_eq!(order, vec!["early", "late"]);
    }

    #[test]
    fn reserved_names_are_refused() {
        let order = resolve_names(vec![
            desc("Minecraft", &[], &[], &[]),
            desc("mojang", &[], &[], &[]),
            desc("palisade", &[], &[], &[]),
            desc("mine", &[], &[], &[]),
        ]);
        assert_eq!(order, vec!["mine"]);
    }

    #[test]
    fn incompatible_api_version_is_skipped() {
        let mut stale = desc("stale", &[], &[], &[]);
        stale.api_versions = vec![API_VERSION - 1];
        let order = resolve_names(vec![stale, desc("fresh", &[], &[], &[])]);
        assert_eq!(order, vec!["fresh"]);
    }

    #[test]
    fn duplicate_name_keeps_last_discovered() {
        let mut first = desc("dup", &[], &[], &[]);
        first.version = "1.0.0".to_string();
        let mut second = desc("dup", &[], &[], &[]);
        second.version = "2.0.0".to_string();

        let resolved = PluginLoader::new(API_VERSION)
            .resolve(vec![((), first), ((), second)]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].1.version, "2.0.0");
    }
}
