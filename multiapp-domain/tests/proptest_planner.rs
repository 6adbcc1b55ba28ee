//! Property-based tests for the planner.
//!
//! - Planning is deterministic.
//! - Every app gets exactly the five per-app stages, in insertion order.
//! - Per-app targets never collide between apps.

use camino::Utf8PathBuf;
use multiapp_domain::Planner;
use multiapp_types::ops::Stage;
use multiapp_types::{AppSet, CoreModuleName, LayoutFlavor, ScaffoldConfig};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn arb_apps() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9]{1,6}", 1..5)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

fn arb_layout() -> impl Strategy<Value = LayoutFlavor> {
    prop_oneof![Just(LayoutFlavor::Modern), Just(LayoutFlavor::Legacy)]
}

fn config(apps: &[String], layout: LayoutFlavor) -> Option<ScaffoldConfig> {
    let apps = AppSet::parse(apps).ok()?;
    ScaffoldConfig::new(
        Utf8PathBuf::from("/p"),
        apps,
        CoreModuleName::parse("shared").ok()?,
        layout,
    )
    .ok()
}

proptest! {
    #[test]
    fn plan_is_deterministic(apps in arb_apps(), layout in arb_layout()) {
        let Some(config) = config(&apps, layout) else { return Ok(()); };
        prop_assume!(!apps.iter().any(|a| a == "app" || a == "console"));

        let a = Planner::new().plan(&config).unwrap();
        let b = Planner::new().plan(&config).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn every_app_gets_all_per_app_stages(apps in arb_apps(), layout in arb_layout()) {
        prop_assume!(!apps.iter().any(|a| a == "app" || a == "console" || a == "shared"));
        let Some(config) = config(&apps, layout) else { return Ok(()); };
        let plan = Planner::new().plan(&config).unwrap();

        prop_assert_eq!(plan.steps.len(), 3 + apps.len() * Stage::PER_APP.len());
        for (i, app) in apps.iter().enumerate() {
            let start = 2 + i * Stage::PER_APP.len();
            for (j, stage) in Stage::PER_APP.iter().enumerate() {
                let step = &plan.steps[start + j];
                prop_assert_eq!(step.stage, *stage);
                prop_assert_eq!(step.app.as_ref().map(|a| a.as_str()), Some(app.as_str()));
            }
        }
    }

    #[test]
    fn per_app_targets_are_disjoint(apps in arb_apps(), layout in arb_layout()) {
        prop_assume!(!apps.iter().any(|a| a == "app" || a == "console" || a == "shared"));
        let Some(config) = config(&apps, layout) else { return Ok(()); };
        let plan = Planner::new().plan(&config).unwrap();

        let mut seen: BTreeSet<String> = BTreeSet::new();
        for app in &apps {
            let mine: BTreeSet<String> = plan
                .steps
                .iter()
                .filter(|s| s.app.as_ref().map(|a| a.as_str()) == Some(app.as_str()))
                .flat_map(|s| s.ops.iter().flat_map(|op| op.targets()))
                .map(|p| p.to_string())
                .collect();
            prop_assert!(seen.is_disjoint(&mine));
            seen.extend(mine);
        }
    }
}
