use indexmap::IndexMap;
use tybundle_core::{DeclId, Declaration};

/// Every declaration registered so far, keyed by id, in registration order.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    declarations: IndexMap<DeclId, Declaration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration. A second registration under the same id is
    /// ignored; files are resolved once, so this only happens for duplicate
    /// names inside one file, where the first declaration wins.
    pub fn insert(&mut self, declaration: Declaration) -> bool {
        if self.declarations.contains_key(&declaration.id) {
            return false;
        }
        self.declarations
            .insert(declaration.id.clone(), declaration);
        true
    }

    pub fn get(&self, id: &DeclId) -> Option<&Declaration> {
        self.declarations.get(id)
    }

    pub fn contains(&self, id: &DeclId) -> bool {
        self.declarations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }
}
