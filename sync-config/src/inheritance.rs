//! # Target Inheritance
//!
//! Targets inherit from each other through `imports`. The resulting graph must
//! be acyclic; this module validates that and derives the order in which
//! targets can be processed (every target after the targets it imports).
//!
//! The traversal is an explicit-stack depth-first search with per-node state,
//! so deep inheritance chains do not grow the call stack.

use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    OnStack,
    Resolved
}

struct Frame<'a> {
    name: &'a str,
    next_import: usize
}

impl Config {
    /// Checks that target inheritance declarations form a DAG.
    ///
    /// Every declared target is used as an entry point, so cycles that are not
    /// reachable from any root are still reported.
    pub fn validate_target_inheritance(&self) -> ConfigResult<()> {
        self.walk_targets().map(|_| ())
    }

    /// Returns all target names ordered so that each target follows every
    /// target it imports. Declaration order breaks ties.
    pub fn target_processing_order(&self) -> ConfigResult<Vec<String>> {
        self.walk_targets()
    }

    /// True when `name` is a declared target importing at least one other target.
    pub fn is_inherited_target(&self, name: &str) -> bool {
        self.targets.get(name).is_some_and(|target| {
            target
                .imports
                .iter()
                .any(|import| self.targets.contains_key(import))
        })
    }

    /// Imports of `name` that are themselves targets, in import order.
    pub fn target_parents(&self, name: &str) -> Vec<&str> {
        self.targets
            .get(name)
            .map(|target| {
                target
                    .imports
                    .iter()
                    .filter(|import| self.targets.contains_key(import.as_str()))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn walk_targets(&self) -> ConfigResult<Vec<String>> {
        let mut state: HashMap<&str, VisitState> = HashMap::with_capacity(self.targets.len());
        let mut order = Vec::with_capacity(self.targets.len());

        for root in self.targets.keys() {
            if state.contains_key(root.as_str()) {
                continue;
            }
            self.walk_from(root, &mut state, &mut order)?;
        }

        debug!(targets = order.len(), "Target inheritance graph is acyclic");
        Ok(order)
    }

    fn walk_from<'a>(
        &'a self,
        root: &'a str,
        state: &mut HashMap<&'a str, VisitState>,
        order: &mut Vec<String>
    ) -> ConfigResult<()> {
        let mut stack = vec![Frame {
            name: root,
            next_import: 0
        }];
        state.insert(root, VisitState::OnStack);

        while let Some(frame) = stack.last_mut() {
            let current = frame.name;
            let imports = self
                .targets
                .get(current)
                .map(|target| target.imports.as_slice())
                .unwrap_or_default();

            let Some(import) = imports.get(frame.next_import) else {
                state.insert(current, VisitState::Resolved);
                order.push(current.to_string());
                stack.pop();
                continue;
            };
            frame.next_import += 1;

            // Sources and undeclared names are not inheritance edges.
            let Some((parent, _)) = self.targets.get_key_value(import.as_str()) else {
                continue;
            };
            let parent = parent.as_str();

            if parent == current {
                return Err(ConfigError::SelfReference {
                    target: current.to_string()
                });
            }

            match state.get(parent) {
                None => {
                    state.insert(parent, VisitState::OnStack);
                    stack.push(Frame {
                        name: parent,
                        next_import: 0
                    });
                }
                Some(VisitState::OnStack) => {
                    let path: Vec<&str> = stack.iter().map(|f| f.name).collect();
                    return Err(ConfigError::CycleDetected {
                        path: build_cycle_path(&path, parent)
                    });
                }
                Some(VisitState::Resolved) => {}
            }
        }

        Ok(())
    }
}

/// Builds `A -> B -> C -> A` style cycle paths from the traversal stack.
///
/// If `repeated` is not on the stack only the closing edge is returned.
fn build_cycle_path(path: &[&str], repeated: &str) -> Vec<String> {
    match path.iter().position(|name| *name == repeated) {
        Some(start) => path[start..]
            .iter()
            .chain(std::iter::once(&repeated))
            .map(|name| name.to_string())
            .collect(),
        None => match path.last() {
            Some(last) => vec![last.to_string(), repeated.to_string()],
            None => vec![repeated.to_string()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Source, Target, VaultMount};
    use proptest::prelude::*;

    /// `imports` is a comma-separated list of names.
    fn config_with(targets: &[(&str, &str)]) -> Config {
        let mut config = Config::default();
        for (name, imports) in targets {
            config.targets.insert(
                name.to_string(),
                Target {
                    imports: imports
                        .split(',')
                        .filter(|s| !s.is_empty())
                        .map(|s| s.to_string())
                        .collect(),
                    ..Default::default()
                }
            );
        }
        config
    }

    #[test]
    fn test_acyclic_graph_is_valid() {
        let config = config_with(&[
            ("base", "shared-secrets"),
            ("staging", "base"),
            ("prod", "base,staging")
        ]);
        assert!(config.validate_target_inheritance().is_ok());
    }

    #[test]
    fn test_self_reference_detected() {
        let config = config_with(&[("loop", "loop")]);
        let err = config.validate_target_inheritance().unwrap_err();
        assert!(matches!(err, ConfigError::SelfReference { ref target } if target == "loop"));
        assert!(err.to_string().contains("loop -> loop"));
        assert!(err.to_string().contains("self-reference"));
    }

    #[test]
    fn test_three_node_cycle_path() {
        let config = config_with(&[("A", "B"), ("B", "C"), ("C", "A")]);
        let err = config.validate_target_inheritance().unwrap_err();
        assert_eq!(
            err.to_string(),
            "circular dependency detected in target inheritance: A -> B -> C -> A"
        );
    }

    #[test]
    fn test_cycle_path_starts_at_repeated_node() {
        let config = config_with(&[("entry", "A"), ("A", "B"), ("B", "A")]);
        let err = config.validate_target_inheritance().unwrap_err();
        assert_eq!(
            err.cycle_path().unwrap(),
            vec!["A".to_string(), "B".to_string(), "A".to_string()]
        );
    }

    #[test]
    fn test_disconnected_cycle_detected() {
        let config = config_with(&[
            ("standalone", ""),
            ("child", "standalone"),
            ("P", "Q"),
            ("Q", "P")
        ]);
        let err = config.validate_target_inheritance().unwrap_err();
        assert_eq!(
            err.cycle_path().unwrap(),
            vec!["P".to_string(), "Q".to_string(), "P".to_string()]
        );
    }

    #[test]
    fn test_source_and_unknown_imports_are_not_edges() {
        let mut config = config_with(&[("app", "app-source,nowhere")]);
        config.sources.insert(
            "app-source".to_string(),
            Source {
                vault: Some(VaultMount {
                    mount: "secret/app".to_string()
                })
            }
        );
        assert!(config.validate_target_inheritance().is_ok());
        assert!(!config.is_inherited_target("app"));
        assert!(config.target_parents("app").is_empty());
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let config = config_with(&[
            ("top", "left,right"),
            ("left", "bottom"),
            ("right", "bottom"),
            ("bottom", "")
        ]);
        let order = config.target_processing_order().unwrap();
        let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
        assert!(pos("bottom") < pos("left"));
        assert!(pos("bottom") < pos("right"));
        assert!(pos("left") < pos("top"));
        assert!(pos("right") < pos("top"));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn test_processing_order_keeps_declaration_order_for_roots() {
        let config = config_with(&[("a", ""), ("b", ""), ("c", "a")]);
        assert_eq!(config.target_processing_order().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_inherited_target_detection() {
        let config = config_with(&[("base", ""), ("child", "base")]);
        assert!(config.is_inherited_target("child"));
        assert!(!config.is_inherited_target("base"));
        assert!(!config.is_inherited_target("missing"));
        assert_eq!(config.target_parents("child"), vec!["base"]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut config = Config::default();
        let depth = 20_000;
        for i in 0..depth {
            let imports = if i + 1 < depth {
                vec![format!("t{}", i + 1)]
            } else {
                Vec::new()
            };
            config.targets.insert(
                format!("t{i}"),
                Target {
                    imports,
                    ..Default::default()
                }
            );
        }
        let order = config.target_processing_order().unwrap();
        assert_eq!(order.first().map(String::as_str), Some("t19999"));
        assert_eq!(order.last().map(String::as_str), Some("t0"));
    }

    #[test]
    fn test_build_cycle_path_fallback() {
        assert_eq!(build_cycle_path(&["A", "B"], "Z"), vec!["B", "Z"]);
        assert_eq!(build_cycle_path(&[], "Z"), vec!["Z"]);
        assert_eq!(build_cycle_path(&["A", "B"], "A"), vec!["A", "B", "A"]);
    }

    proptest! {
        #[test]
        fn test_forward_only_graphs_are_acyclic(
            edges in proptest::collection::vec(proptest::collection::vec(any::<prop::sample::Index>(), 0..4), 1..24)
        ) {
            // Node i may only import nodes with a smaller index.
            let mut config = Config::default();
            for (i, picks) in edges.iter().enumerate() {
                let imports = if i == 0 {
                    Vec::new()
                } else {
                    picks.iter().map(|p| format!("n{}", p.index(i))).collect()
                };
                config.targets.insert(format!("n{i}"), Target { imports, ..Default::default() });
            }

            let order = config.target_processing_order().unwrap();
            prop_assert_eq!(order.len(), config.targets.len());
            for (name, target) in &config.targets {
                let own = order.iter().position(|n| n == name).unwrap();
                for import in &target.imports {
                    let dep = order.iter().position(|n| n == import).unwrap();
                    prop_assert!(dep < own);
                }
            }
        }

        #[test]
        fn test_back_edge_always_reports_cycle(len in 2usize..12) {
            let mut config = Config::default();
            for i in 0..len {
                let next = (i + 1) % len;
                config.targets.insert(
                    format!("n{i}"),
                    Target { imports: vec![format!("n{next}")], ..Default::default() }
                );
            }
            let err = config.validate_target_inheritance().unwrap_err();
            let path = err.cycle_path().unwrap();
            prop_assert_eq!(path.len(), len + 1);
            prop_assert_eq!(path.first(), path.last());
        }
    }
}
