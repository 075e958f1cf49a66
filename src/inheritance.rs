use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use tracing::debug;

use crate::project::{ClassId, DeclarationQuery};

/// Collects instance property names along a class's base-class chain.
///
/// Results are memoized per class identity for the lifetime of the resolver,
/// which the driver scopes to a single run.
#[derive(Debug, Default)]
pub struct InheritancePropertyResolver {
    memo: HashMap<ClassId, IndexSet<String>>,
}

impl InheritancePropertyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Own properties first, then each base in turn; names collapse.
    /// The walk stops at an unresolvable base or a revisited class.
    pub fn instance_properties<Q: DeclarationQuery>(
        &mut self,
        query: &mut Q,
        class: &ClassId,
    ) -> IndexSet<String> {
        if let Some(hit) = self.memo.get(class) {
            return hit.clone();
        }

        let mut properties = IndexSet::new();
        let mut visited = HashSet::new();
        let mut current = Some(class.clone());

        while let Some(id) = current.take() {
            if !visited.insert(id.clone()) {
                debug!(class = %id.name, "inheritance cycle; stopping walk");
                break;
            }
            if let Some(cached) = self.memo.get(&id) {
                properties.extend(cached.iter().cloned());
                break;
            }
            let Some(decl) = query.class(&id.module, &id.name) else {
                break;
            };
            properties.extend(decl.instance_properties);
            current = query.base_class(&id);
        }

        self.memo.insert(class.clone(), properties.clone());
        properties
    }

    pub fn cached_classes(&self) -> usize {
        self.memo.len()
    }
}
