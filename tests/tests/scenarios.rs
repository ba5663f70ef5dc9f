mod common;
use common::*;

use std::sync::Arc;

use strainer::{CompositePredicateBuilder, FieldFilter, FilterMode, FilterRegistry, ListDataSource};

fn person_names(people: &[Person]) -> Vec<&str> { names(people, |p| p.name.as_str()) }

#[test]
fn test_empty_registry_passes_everything() -> anyhow::Result<()> {
    let source = ListDataSource::new(people());
    let registry = FilterRegistry::new();
    let builder = CompositePredicateBuilder::with_sink(&registry, Arc::new(source.clone()));
    assert!(builder.current_predicate().is_identity());
    assert_eq!(person_names(&source.fetch()?), vec!["Alice", "bob"]);
    Ok(())
}

#[test]
fn test_name_equals_with_and_without_case() -> anyhow::Result<()> {
    let source = ListDataSource::new(people());
    let registry = FilterRegistry::new();
    let _builder = CompositePredicateBuilder::with_sink(&registry, Arc::new(source.clone()));

    let name = FieldFilter::string("name").with_value("alice")?;
    registry.put_if_absent("name", name.clone());
    assert_eq!(person_names(&source.fetch()?), vec!["Alice"]);

    name.set_ignore_case(false);
    assert!(source.fetch()?.is_empty());
    Ok(())
}

#[test]
fn test_age_at_least() -> anyhow::Result<()> {
    let source = ListDataSource::new(people());
    let registry = FilterRegistry::new();
    let _builder = CompositePredicateBuilder::with_sink(&registry, Arc::new(source.clone()));

    registry.put_if_absent("age", FieldFilter::numeric("age").with_value(35)?.with_mode(FilterMode::GreaterOrEqual));
    assert_eq!(person_names(&source.fetch()?), vec!["bob"]);
    Ok(())
}

#[test]
fn test_contains_and_smaller_then_remove() -> anyhow::Result<()> {
    let source = ListDataSource::new(people());
    let registry = FilterRegistry::new();
    let builder = CompositePredicateBuilder::with_sink(&registry, Arc::new(source.clone()));

    registry.put_if_absent("name", FieldFilter::string("name").with_value("o")?.with_mode(FilterMode::Contains));
    registry.put_if_absent("age", FieldFilter::numeric("age").with_value(50)?.with_mode(FilterMode::Smaller));
    assert_eq!(person_names(&source.fetch()?), vec!["bob"]);

    let rebuilds = builder.rebuild_count();
    registry.remove("age");
    assert_eq!(builder.rebuild_count(), rebuilds + 1);
    assert_eq!(person_names(&source.fetch()?), vec!["bob"]);
    Ok(())
}

#[test]
fn test_first_registration_wins() -> anyhow::Result<()> {
    let source = ListDataSource::new(people());
    let registry = FilterRegistry::new();
    let _builder = CompositePredicateBuilder::with_sink(&registry, Arc::new(source.clone()));

    assert!(registry.put_if_absent("who", FieldFilter::string("name").with_value("bob")?));
    assert!(!registry.put_if_absent("who", FieldFilter::string("name").with_value("alice")?));
    assert_eq!(person_names(&source.fetch()?), vec!["bob"]);
    Ok(())
}

#[test]
fn test_album_catalogue() -> anyhow::Result<()> {
    let source = ListDataSource::new(albums());
    let registry = FilterRegistry::new();
    let _builder = CompositePredicateBuilder::with_sink(&registry, Arc::new(source.clone()));
    let album_names = |albums: &[Album]| names(albums, |a| a.name.as_str()).into_iter().map(str::to_string).collect::<Vec<_>>();

    let country = FieldFilter::string("artist.country.code").with_value("gb")?;
    registry.add(country.clone());
    // the anonymous artist has no country, so the filter is inert for it
    assert_eq!(album_names(&source.fetch()?), vec!["Showbiz", "Origin of Symmetry", "Untitled"]);

    registry.add(FieldFilter::numeric("rating").with_value(3)?.with_mode(FilterMode::Greater));
    assert_eq!(album_names(&source.fetch()?), vec!["Showbiz", "Origin of Symmetry"]);

    registry.add(FieldFilter::numeric("year").with_value(2000)?.with_mode(FilterMode::SmallerOrEqual));
    assert_eq!(album_names(&source.fetch()?), vec!["Showbiz"]);

    registry.clear();
    assert_eq!(source.fetch()?.len(), 4);
    Ok(())
}
