mod common;
use common::*;

use std::sync::Arc;
use std::time::Duration;

use strainer::{
    CompositePredicate, CompositePredicateBuilder, DataChange, FieldFilter, FilterChangeKind, FilterMode, FilterRegistry, FilteredDataSource,
    ListDataSource, RegistryChange, Subscribe,
};

#[tokio::test]
async fn test_registry_changes_over_channel() -> anyhow::Result<()> {
    let registry = FilterRegistry::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<RegistryChange>();
    let _guard = registry.on_change(tx);

    let age = FieldFilter::numeric("age");
    registry.add(age.clone());
    age.set_value(18)?;
    age.set_mode(FilterMode::GreaterOrEqual);
    registry.clear();

    let mut received = Vec::new();
    while let Ok(Some(change)) = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await {
        received.push(change);
    }
    assert_eq!(received.len(), 4);
    assert_eq!(received[0], RegistryChange::Inserted { name: "age".into() });
    assert!(matches!(&received[1], RegistryChange::Filter { change, .. } if matches!(change.kind, FilterChangeKind::Value { .. })));
    assert!(matches!(&received[2], RegistryChange::Filter { change, .. } if matches!(change.kind, FilterChangeKind::Mode { .. })));
    assert_eq!(received[3], RegistryChange::Cleared { names: vec!["age".into()] });
    Ok(())
}

#[tokio::test]
async fn test_predicates_pushed_to_subscribers() -> anyhow::Result<()> {
    let registry = FilterRegistry::new();
    let builder = CompositePredicateBuilder::new(&registry);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<CompositePredicate>();
    let _guard = builder.subscribe(tx);

    let name = FieldFilter::string("name").with_mode(FilterMode::Contains);
    registry.add(name.clone());
    name.set_value("li")?;

    let first = rx.recv().await.expect("predicate after insert");
    assert_eq!(first.len(), 1);
    assert!(first.test(&people()[1])?);

    let second = rx.recv().await.expect("predicate after edit");
    assert!(second.test(&people()[0])?);
    assert!(!second.test(&people()[1])?);
    Ok(())
}

#[test]
fn test_data_source_announces_each_install() -> anyhow::Result<()> {
    let filtered = FilteredDataSource::new(ListDataSource::new(people()));
    let changes = Arc::new(std::sync::Mutex::new(Vec::new()));
    let _guard = {
        let changes = changes.clone();
        filtered.source().subscribe(move |change: DataChange| changes.lock().unwrap().push(change))
    };

    let age = FieldFilter::numeric("age").with_mode(FilterMode::Smaller);
    filtered.add_property_filter(age.clone());
    age.set_value(35)?;
    assert_eq!(filtered.count()?, 1);
    filtered.clear_filters();

    assert_eq!(*changes.lock().unwrap(), vec![DataChange::Refresh; 3]);
    Ok(())
}

#[test]
fn test_dropping_subscription_stops_delivery() -> anyhow::Result<()> {
    let registry = FilterRegistry::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<RegistryChange>();
    let guard = registry.subscribe(tx);

    registry.add(FieldFilter::string("name"));
    drop(guard);
    registry.remove("name");

    assert_eq!(rx.try_recv().ok(), Some(RegistryChange::Inserted { name: "name".into() }));
    assert!(rx.try_recv().is_err());
    Ok(())
}
