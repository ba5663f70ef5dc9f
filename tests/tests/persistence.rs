mod common;
use common::*;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use strainer::{DataSourceError, FieldFilter, FilterMode, FilteredDataSource, ListDataSource, Repository, Value, ValueType};

/// Rows stored as JSON documents, the way a document store would hold them
#[derive(Default)]
struct JsonRepository {
    documents: Mutex<Vec<String>>,
}

impl JsonRepository {
    fn seeded(people: &[Person]) -> anyhow::Result<Arc<Self>> {
        let documents = people.iter().map(serde_json::to_string).collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(Self { documents: Mutex::new(documents) }))
    }
}

impl Repository<Person> for JsonRepository {
    fn find_all(&self) -> anyhow::Result<Vec<Person>> {
        self.documents.lock().unwrap().iter().map(|doc| serde_json::from_str(doc).map_err(anyhow::Error::from)).collect()
    }

    fn save(&self, item: &Person) -> anyhow::Result<()> {
        let document = serde_json::to_string(item)?;
        let mut documents = self.documents.lock().unwrap();
        for existing in documents.iter_mut() {
            let person: Person = serde_json::from_str(existing)?;
            if person.name == item.name {
                *existing = document;
                return Ok(());
            }
        }
        documents.push(document);
        Ok(())
    }

    fn delete(&self, item: &Person) -> anyhow::Result<()> {
        let document = serde_json::to_string(item)?;
        self.documents.lock().unwrap().retain(|existing| *existing != document);
        Ok(())
    }
}

/// Filter settings as a UI layer would persist them
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct SavedFilter {
    property: String,
    value_type: ValueType,
    mode: FilterMode,
    value: Option<Value>,
    ignore_case: bool,
}

impl SavedFilter {
    fn of(filter: &FieldFilter) -> Self {
        Self {
            property: filter.property_name().to_string(),
            value_type: filter.value_type(),
            mode: filter.mode(),
            value: filter.filter_value(),
            ignore_case: filter.ignore_case(),
        }
    }

    fn restore(self) -> anyhow::Result<FieldFilter> {
        let filter = match self.value_type {
            ValueType::String => FieldFilter::string(self.property),
            ValueType::F64 | ValueType::I64 => FieldFilter::numeric(self.property),
            ValueType::Bool => FieldFilter::boolean(self.property),
            ValueType::Ordinal => FieldFilter::ordinal(self.property),
        };
        filter.set_filter_value(self.value)?;
        Ok(filter.with_mode(self.mode).with_ignore_case(self.ignore_case))
    }
}

#[test]
fn test_repository_backed_source() -> anyhow::Result<()> {
    let repository = JsonRepository::seeded(&people())?;
    let filtered = FilteredDataSource::new(ListDataSource::<Person>::from_repository(repository.clone())?);
    filtered.add_property_filter(FieldFilter::numeric("age").with_value(35)?.with_mode(FilterMode::Smaller));

    filtered.source().add_item(Person { name: "Carol".into(), age: 25 })?;
    assert_eq!(repository.documents.lock().unwrap().len(), 3);
    assert_eq!(names(&filtered.fetch()?, |p| p.name.as_str()), vec!["Alice", "Carol"]);

    filtered.source().delete_item(&Person { name: "Alice".into(), age: 30 })?;
    assert_eq!(names(&filtered.fetch()?, |p| p.name.as_str()), vec!["Carol"]);
    Ok(())
}

#[test]
fn test_corrupt_document_surfaces_as_backend_error() -> anyhow::Result<()> {
    let repository = JsonRepository::seeded(&people())?;
    let source = ListDataSource::<Person>::from_repository(repository.clone())?;
    repository.documents.lock().unwrap().push("{not json".into());

    match source.fetch() {
        Err(DataSourceError::Backend { operation, .. }) => assert_eq!(operation, "find_all"),
        other => panic!("expected a backend error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_filter_settings_round_trip_through_json() -> anyhow::Result<()> {
    let original = FieldFilter::string("name").with_value("bob")?.with_mode(FilterMode::NotContains).with_ignore_case(false);
    let json = serde_json::to_string(&SavedFilter::of(&original))?;
    assert!(json.contains(r#""mode":"NOT_CONTAINS""#));

    let restored = serde_json::from_str::<SavedFilter>(&json)?.restore()?;
    assert_eq!(SavedFilter::of(&restored), SavedFilter::of(&original));
    assert!(!restored.ptr_eq(&original));
    Ok(())
}
