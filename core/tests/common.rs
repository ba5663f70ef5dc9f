use std::sync::{Arc, Mutex, OnceLock};

use strainer_core::{Accessors, Field, FieldType, Property, Record};
use tracing::Level;

#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    pub name: String,
    pub age: i64,
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Owner {
    pub name: String,
    pub city: String,
}

impl Pet {
    #[allow(unused)]
    pub fn new(name: &str, age: i64) -> Self { Self { name: name.to_string(), age, owner: None } }

    #[allow(unused)]
    pub fn owned_by(mut self, name: &str, city: &str) -> Self {
        self.owner = Some(Owner { name: name.to_string(), city: city.to_string() });
        self
    }
}

impl Record for Pet {
    fn accessors() -> &'static Accessors<Self> {
        static ACCESSORS: OnceLock<Accessors<Pet>> = OnceLock::new();
        ACCESSORS.get_or_init(|| {
            Accessors::new("Pet").property("name", |p: &Pet| &p.name).property("age", |p: &Pet| &p.age).property("owner", |p: &Pet| &p.owner)
        })
    }
}

impl Record for Owner {
    fn accessors() -> &'static Accessors<Self> {
        static ACCESSORS: OnceLock<Accessors<Owner>> = OnceLock::new();
        ACCESSORS.get_or_init(|| Accessors::new("Owner").property("name", |o: &Owner| &o.name).property("city", |o: &Owner| &o.city))
    }
}

impl Property for Owner {
    fn field_type() -> FieldType { FieldType::record::<Owner>() }
    fn to_field(&self) -> Field<'_> { Field::Record(self) }
}

#[allow(unused)]
pub fn pets() -> Vec<Pet> {
    vec![
        Pet::new("Rex", 3).owned_by("Alice", "Lisbon"),
        Pet::new("Tom", 7).owned_by("bob", "Porto"),
        Pet::new("Kitty", 12),
    ]
}

#[allow(unused)]
pub fn names(pets: &[Pet]) -> Vec<&str> { pets.iter().map(|p| p.name.as_str()).collect() }

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() { tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init(); }

#[allow(unused)]
pub fn change_watcher<T: Send + Sync + 'static>() -> (Box<dyn Fn(T) + Send + Sync>, Box<dyn Fn() -> Vec<T> + Send + Sync>) {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let watcher = {
        let changes = changes.clone();
        Box::new(move |value: T| {
            changes.lock().unwrap().push(value);
        })
    };

    let check = Box::new(move || {
        let changes: Vec<T> = changes.lock().unwrap().drain(..).collect();
        changes
    });

    (watcher, check)
}
