//! Demo taxonomy seeding.

use bazaar_core::{BazaarResult, CategoryId, NewCategory, NewQuestion, QuestionKind};
use bazaar_repository::{CategoryRepository, QuestionRepository};
use std::sync::Arc;
use tracing::{debug, info};

struct SeedCategory {
    path: &'static [&'static str],
    questions: &'static [(&'static str, SeedKind)],
}

#[derive(Clone, Copy)]
enum SeedKind {
    Select(&'static [&'static str]),
    Number,
    Text,
    Boolean,
}

impl SeedKind {
    fn to_kind(self) -> QuestionKind {
        match self {
            Self::Select(options) => QuestionKind::Select {
                options: options.iter().map(ToString::to_string).collect(),
            },
            Self::Number => QuestionKind::Number,
            Self::Text => QuestionKind::Text,
            Self::Boolean => QuestionKind::Boolean,
        }
    }
}

const DEMO_CATALOG: &[SeedCategory] = &[
    SeedCategory {
        path: &["Electronics", "Smartphones", "Android"],
        questions: &[("Brand?", SeedKind::Select(&["A", "B", "C"]))],
    },
    SeedCategory {
        path: &["Electronics", "Smartphones", "iOS"],
        questions: &[("Storage (GB)?", SeedKind::Number)],
    },
    SeedCategory {
        path: &["Electronics", "Laptops"],
        questions: &[
            ("Screen size (inches)?", SeedKind::Number),
            ("Touchscreen?", SeedKind::Boolean),
        ],
    },
    SeedCategory {
        path: &["Fashion", "Shoes"],
        questions: &[
            ("Size?", SeedKind::Number),
            ("Colour?", SeedKind::Text),
        ],
    },
];

/// Counts of rows a seeding run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub questions: usize,
}

/// Seeds the demo taxonomy. Running it again only fills in what is missing.
pub struct CatalogSeeder {
    category_repository: Arc<dyn CategoryRepository>,
    question_repository: Arc<dyn QuestionRepository>,
}

impl CatalogSeeder {
    #[must_use]
    pub fn new(
        category_repository: Arc<dyn CategoryRepository>,
        question_repository: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            category_repository,
            question_repository,
        }
    }

    pub async fn seed(&self) -> BazaarResult<SeedReport> {
        let mut report = SeedReport::default();

        for entry in DEMO_CATALOG {
            let mut parent = None;
            for name in entry.path {
                parent = Some(self.ensure_category(name, parent, &mut report).await?);
            }
            if let Some(category_id) = parent {
                self.ensure_questions(category_id, entry.questions, &mut report)
                    .await?;
            }
        }

        info!(
            categories = report.categories,
            questions = report.questions,
            "Catalog seed complete"
        );
        Ok(report)
    }

    async fn ensure_category(
        &self,
        name: &str,
        parent_id: Option<CategoryId>,
        report: &mut SeedReport,
    ) -> BazaarResult<CategoryId> {
        if let Some(existing) = self.category_repository.find_by_name(name, parent_id).await? {
            return Ok(existing.id);
        }

        let created = self
            .category_repository
            .save(&NewCategory {
                name: name.to_string(),
                parent_id,
            })
            .await?;
        debug!("Seeded category: {} ({})", created.name, created.id);
        report.categories += 1;
        Ok(created.id)
    }

    async fn ensure_questions(
        &self,
        category_id: CategoryId,
        questions: &[(&'static str, SeedKind)],
        report: &mut SeedReport,
    ) -> BazaarResult<()> {
        let existing = self.question_repository.find_by_category(category_id).await?;

        for (position, (text, kind)) in (0_i32..).zip(questions) {
            if existing.iter().any(|q| q.question == *text) {
                continue;
            }
            self.question_repository
                .save(&NewQuestion {
                    category_id,
                    question: (*text).to_string(),
                    kind: kind.to_kind(),
                    position,
                })
                .await?;
            report.questions += 1;
        }
        Ok(())
    }
}

impl std::fmt::Debug for CatalogSeeder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSeeder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCacheService, StampedeGuard};
    use crate::catalog_service::CatalogService;
    use crate::impls::catalog_service_impl::{CatalogServiceImpl, CATEGORY_TREE_TTL};
    use crate::test_support::InMemoryCatalog;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = Arc::new(InMemoryCatalog::new());
        let seeder = CatalogSeeder::new(store.clone(), store.clone());

        let first = seeder.seed().await.unwrap();
        assert_eq!(first, SeedReport { categories: 7, questions: 6 });

        let second = seeder.seed().await.unwrap();
        assert_eq!(second, SeedReport::default());
    }

    #[tokio::test]
    async fn test_seeded_android_is_three_levels_deep() {
        let store = Arc::new(InMemoryCatalog::new());
        CatalogSeeder::new(store.clone(), store.clone()).seed().await.unwrap();
        let service = CatalogServiceImpl::new(
            store.clone(),
            store,
            Arc::new(MemoryCacheService::new()),
            StampedeGuard::default(),
            CATEGORY_TREE_TTL,
        );

        let tree = service.get_categories_with_questions().await.unwrap();
        let json = serde_json::to_value(&tree).unwrap();

        let electronics = &json[0];
        assert_eq!(electronics["name"], "Electronics");
        let smartphones = &electronics["children"][0];
        assert_eq!(smartphones["name"], "Smartphones");
        let android = &smartphones["children"][0];
        assert_eq!(android["name"], "Android");
        assert_eq!(
            android["questions"][0],
            serde_json::json!({
                "id": android["questions"][0]["id"],
                "category_id": android["id"],
                "question": "Brand?",
                "type": "select",
                "options": ["A", "B", "C"],
            })
        );
    }
}
