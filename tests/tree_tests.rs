// Tests for the report tree - public API only

use std::sync::Arc;

use stepreport::report::ReportTree;
use stepreport::state::{NodeKind, ReportStatus};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_feature_creation_yields_one_node() {
    // Arrange
    let tree = Arc::new(ReportTree::new("run"));

    // Act
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tree = tree.clone();
            tokio::spawn(async move { tree.get_or_create_feature("Checkout") })
        })
        .collect();
    let mut nodes = Vec::new();
    for handle in handles {
        nodes.push(handle.await.unwrap());
    }

    // Assert
    assert!(nodes.iter().all(|n| Arc::ptr_eq(n, &nodes[0])));
    assert_eq!(tree.feature_count(), 1);
    assert_eq!(tree.root().child_count(), 1);
}

#[test]
fn test_concurrent_feature_creation_from_threads() {
    // Arrange
    let tree = Arc::new(ReportTree::new("run"));

    // Act
    let nodes: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tree = &tree;
                s.spawn(move || tree.get_or_create_feature(if i % 2 == 0 { "A" } else { "B" }))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Assert
    assert_eq!(tree.feature_count(), 2);
    assert_eq!(tree.root().child_count(), 2);
    for node in &nodes {
        let same = tree.feature(node.label()).unwrap();
        assert!(Arc::ptr_eq(node, &same));
    }
}

#[test]
fn test_steps_fold_into_worst_status() {
    // Arrange
    let tree = ReportTree::new("run");
    let feature = tree.get_or_create_feature("Checkout");
    let scenario = tree.create_scenario(&feature, "Pay by card", ["@smoke"]);

    // Act
    tree.append_step(&scenario, "I add an item", ReportStatus::Pass, None);
    tree.append_step(&scenario, "I pay", ReportStatus::Fail, Some("card declined"));
    tree.append_step(&scenario, "I see a receipt", ReportStatus::Pass, None);

    // Assert
    assert_eq!(scenario.status(), ReportStatus::Fail);
    assert_eq!(feature.status(), ReportStatus::Fail);
    assert_eq!(tree.root().status(), ReportStatus::Fail);

    let steps = scenario.children();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[1].kind(), NodeKind::Step);
    assert_eq!(steps[1].error().as_deref(), Some("card declined"));
    assert_eq!(steps[0].error(), None);
}

#[test]
fn test_error_detail_dropped_for_passing_steps() {
    // Arrange
    let tree = ReportTree::new("run");
    let feature = tree.get_or_create_feature("F");
    let scenario = tree.create_scenario(&feature, "S", Vec::<String>::new());

    // Act
    let step = tree.append_step(&scenario, "ok", ReportStatus::Pass, Some("noise"));

    // Assert
    assert_eq!(step.error(), None);
    assert!(step.finished_at().is_some());
}

#[test]
fn test_status_never_improves() {
    // Arrange
    let tree = ReportTree::new("run");
    let feature = tree.get_or_create_feature("F");
    let failing = tree.create_scenario(&feature, "failing", Vec::<String>::new());
    let passing = tree.create_scenario(&feature, "passing", Vec::<String>::new());

    // Act
    tree.append_step(&failing, "boom", ReportStatus::Fail, None);
    tree.append_step(&passing, "fine", ReportStatus::Pass, None);
    tree.append_step(&failing, "later", ReportStatus::Skip, None);

    // Assert
    assert_eq!(failing.status(), ReportStatus::Fail);
    assert_eq!(passing.status(), ReportStatus::Pass);
    assert_eq!(feature.status(), ReportStatus::Fail);
}

#[test]
fn test_scenario_paths_and_tags() {
    // Arrange
    let tree = ReportTree::new("run");
    let feature = tree.get_or_create_feature("ParcelShop.feature");

    // Act
    let scenario = tree.create_scenario(&feature, "Search by city", ["@api", "@api", "@slow"]);

    // Assert
    assert_eq!(scenario.kind(), NodeKind::Scenario);
    assert_eq!(scenario.path(), ["ParcelShop.feature", "Search by city"]);
    assert_eq!(scenario.tags(), vec!["@api", "@api", "@slow"]);
    assert!(Arc::ptr_eq(&scenario.parent().unwrap(), &feature));
}

#[test]
fn test_snapshot_summary() {
    // Arrange
    let tree = ReportTree::new("run");
    let checkout = tree.get_or_create_feature("Checkout");
    let search = tree.get_or_create_feature("Search");
    let a = tree.create_scenario(&checkout, "a", Vec::<String>::new());
    let b = tree.create_scenario(&search, "b", Vec::<String>::new());
    tree.append_step(&a, "x", ReportStatus::Pass, None);
    tree.append_step(&b, "y", ReportStatus::Skip, None);
    tree.append_step(&b, "z", ReportStatus::Skip, None);

    // Act
    let report = tree.snapshot();

    // Assert
    assert_eq!(report.summary.features(), 2);
    assert_eq!(report.summary.scenarios(), 2);
    assert_eq!(report.summary.steps(), 3);
    assert_eq!(report.summary.passed(), 1);
    assert_eq!(report.summary.skipped(), 1);
    assert_eq!(report.status(), ReportStatus::Skip);
    assert_eq!(report.features()[0].label, "Checkout");
}
