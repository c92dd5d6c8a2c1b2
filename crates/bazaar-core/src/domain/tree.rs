//! Arena representation of the category taxonomy.
//!
//! Categories are stored flat, keyed by id. The children index is derived
//! from `parent_id` when the arena is built, so the nested view handed to
//! clients never depends on insertion order.

use crate::{sort_questions, Category, CategoryId, Question};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// A category with its questions and nested children, as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CategoryNode {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub questions: Vec<Question>,
    #[cfg_attr(feature = "openapi", schema(no_recursion))]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Depth-first search for a node by id.
    #[must_use]
    pub fn find(&self, id: CategoryId) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Flat arena of categories with a derived children index.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: BTreeMap<CategoryId, Category>,
    children: BTreeMap<CategoryId, Vec<CategoryId>>,
    roots: Vec<CategoryId>,
    questions: BTreeMap<CategoryId, Vec<Question>>,
}

impl CategoryTree {
    /// Builds the arena from a full load of the store.
    ///
    /// A category whose parent is missing is promoted to a root. Questions
    /// pointing at an unknown category are dropped.
    #[must_use]
    pub fn build(categories: Vec<Category>, questions: Vec<Question>) -> Self {
        let nodes: BTreeMap<CategoryId, Category> =
            categories.into_iter().map(|c| (c.id, c)).collect();

        let mut children: BTreeMap<CategoryId, Vec<CategoryId>> = BTreeMap::new();
        let mut roots = Vec::new();
        for category in nodes.values() {
            match category.parent_id {
                Some(parent) if nodes.contains_key(&parent) => {
                    children.entry(parent).or_default().push(category.id);
                }
                Some(parent) => {
                    warn!(category_id = %category.id, parent_id = %parent, "Category parent missing, treating as root");
                    roots.push(category.id);
                }
                None => roots.push(category.id),
            }
        }

        let mut grouped: BTreeMap<CategoryId, Vec<Question>> = BTreeMap::new();
        for question in questions {
            if nodes.contains_key(&question.category_id) {
                grouped.entry(question.category_id).or_default().push(question);
            } else {
                warn!(question_id = %question.id, category_id = %question.category_id, "Question references unknown category");
            }
        }
        for list in grouped.values_mut() {
            sort_questions(list);
        }

        Self {
            nodes,
            children,
            roots,
            questions: grouped,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.nodes.get(&id)
    }

    /// Root ids in ascending order.
    #[must_use]
    pub fn roots(&self) -> &[CategoryId] {
        &self.roots
    }

    /// Direct children of `id` in ascending order.
    #[must_use]
    pub fn children_of(&self, id: CategoryId) -> &[CategoryId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Questions owned by `id`, ordered.
    #[must_use]
    pub fn questions_of(&self, id: CategoryId) -> &[Question] {
        self.questions.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Parent chain of `id`, nearest first. Stops at a repeated id.
    #[must_use]
    pub fn ancestors(&self, id: CategoryId) -> Vec<CategoryId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.nodes.get(&id).and_then(|c| c.parent_id);
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.nodes.get(&parent).and_then(|c| c.parent_id);
        }
        chain
    }

    /// Whether making `new_parent` the parent of `id` would close a loop.
    #[must_use]
    pub fn would_create_cycle(&self, id: CategoryId, new_parent: CategoryId) -> bool {
        new_parent == id || self.ancestors(new_parent).contains(&id)
    }

    /// Materializes the nested view, roots first.
    ///
    /// Nodes only reachable through a parent loop are left out.
    #[must_use]
    pub fn to_nodes(&self) -> Vec<CategoryNode> {
        let mut visited = HashSet::with_capacity(self.nodes.len());
        let nodes: Vec<CategoryNode> = self
            .roots
            .iter()
            .filter_map(|id| self.materialize(*id, &mut visited))
            .collect();

        if visited.len() < self.nodes.len() {
            warn!(
                skipped = self.nodes.len() - visited.len(),
                "Categories unreachable from any root were omitted"
            );
        }
        nodes
    }

    fn materialize(&self, id: CategoryId, visited: &mut HashSet<CategoryId>) -> Option<CategoryNode> {
        if !visited.insert(id) {
            return None;
        }
        let category = self.nodes.get(&id)?;
        let children = self
            .children_of(id)
            .iter()
            .filter_map(|child| self.materialize(*child, visited))
            .collect();

        Some(CategoryNode {
            id,
            name: category.name.clone(),
            parent_id: category.parent_id,
            questions: self.questions_of(id).to_vec(),
            children,
        })
    }
}
