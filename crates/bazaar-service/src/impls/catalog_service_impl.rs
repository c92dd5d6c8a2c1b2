//! Catalog service implementation.

use crate::cache::{cache_keys, CacheExt, CacheInterface, StampedeGuard};
use crate::catalog_service::CatalogService;
use crate::dto::{
    CreateCategoryRequest, CreateQuestionRequest, UpdateCategoryRequest, UpdateQuestionRequest,
};
use async_trait::async_trait;
use bazaar_core::{
    BazaarError, BazaarResult, Category, CategoryId, CategoryNode, CategoryTree, NewCategory,
    NewQuestion, Question, QuestionId, ValidateExt,
};
use bazaar_repository::{CategoryRepository, QuestionRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default lifetime of the category tree snapshot (1 hour).
pub const CATEGORY_TREE_TTL: Duration = Duration::from_secs(3600);

/// Catalog service over the category and question repositories.
pub struct CatalogServiceImpl {
    category_repository: Arc<dyn CategoryRepository>,
    question_repository: Arc<dyn QuestionRepository>,
    cache: Arc<dyn CacheInterface>,
    guard: StampedeGuard,
    tree_ttl: Duration,
}

impl CatalogServiceImpl {
    #[must_use]
    pub fn new(
        category_repository: Arc<dyn CategoryRepository>,
        question_repository: Arc<dyn QuestionRepository>,
        cache: Arc<dyn CacheInterface>,
        guard: StampedeGuard,
        tree_ttl: Duration,
    ) -> Self {
        Self {
            category_repository,
            question_repository,
            cache,
            guard,
            tree_ttl,
        }
    }

    async fn load_tree(&self) -> BazaarResult<Vec<CategoryNode>> {
        debug!("Building category tree from store");

        let categories = self.category_repository.find_all().await?;
        let questions = self.question_repository.find_all().await?;
        let tree = CategoryTree::build(categories, questions);

        info!(categories = tree.len(), "Category tree rebuilt");
        Ok(tree.to_nodes())
    }

    async fn require_category(&self, id: CategoryId) -> BazaarResult<Category> {
        self.category_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| BazaarError::not_found("Category", id))
    }

    async fn ensure_unique_name(
        &self,
        name: &str,
        parent_id: Option<CategoryId>,
        except: Option<CategoryId>,
    ) -> BazaarResult<()> {
        match self.category_repository.find_by_name(name, parent_id).await? {
            Some(existing) if Some(existing.id) != except => Err(BazaarError::Conflict(format!(
                "Category '{name}' already exists at this level"
            ))),
            _ => Ok(()),
        }
    }

    async fn ensure_acyclic(&self, id: CategoryId, new_parent: CategoryId) -> BazaarResult<()> {
        if id == new_parent {
            return Err(BazaarError::BusinessRule(
                "A category cannot be its own parent".to_string(),
            ));
        }

        let categories = self.category_repository.find_all().await?;
        let tree = CategoryTree::build(categories, Vec::new());
        if tree.would_create_cycle(id, new_parent) {
            return Err(BazaarError::BusinessRule(format!(
                "Moving category {id} under {new_parent} would create a cycle"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn get_categories_with_questions(&self) -> BazaarResult<Vec<CategoryNode>> {
        debug!("Getting categories with questions");

        self.cache
            .remember(
                cache_keys::CATEGORIES_WITH_QUESTIONS,
                self.tree_ttl,
                &self.guard,
                || self.load_tree(),
            )
            .await
    }

    async fn get_questions_by_category(&self, category_id: CategoryId) -> BazaarResult<Vec<Question>> {
        debug!("Getting questions for category: {}", category_id);
        self.question_repository.find_by_category(category_id).await
    }

    async fn get_category(&self, id: CategoryId) -> BazaarResult<Category> {
        self.require_category(id).await
    }

    async fn create_category(&self, request: CreateCategoryRequest) -> BazaarResult<Category> {
        debug!("Creating category: {}", request.name);

        request.validate_request()?;

        if let Some(parent_id) = request.parent_id {
            self.require_category(parent_id).await?;
        }
        let name = request.name.trim().to_string();
        self.ensure_unique_name(&name, request.parent_id, None).await?;

        let category = self
            .category_repository
            .save(&NewCategory {
                name,
                parent_id: request.parent_id,
            })
            .await?;

        info!("Category created: {} ({})", category.id, category.name);
        Ok(category)
    }

    async fn update_category(&self, id: CategoryId, request: UpdateCategoryRequest) -> BazaarResult<Category> {
        debug!("Updating category: {}", id);

        request.validate_request()?;

        let mut category = self.require_category(id).await?;

        if let Some(parent_id) = request.parent_id {
            if let Some(new_parent) = parent_id {
                self.require_category(new_parent).await?;
                self.ensure_acyclic(id, new_parent).await?;
            }
            category.parent_id = parent_id;
        }
        if let Some(name) = request.name {
            category.name = name.trim().to_string();
        }
        self.ensure_unique_name(&category.name, category.parent_id, Some(id))
            .await?;

        let updated = self.category_repository.update(&category).await?;

        info!("Category updated: {}", id);
        Ok(updated)
    }

    async fn delete_category(&self, id: CategoryId) -> BazaarResult<()> {
        debug!("Deleting category: {}", id);

        let children = self.category_repository.count_children(id).await?;
        if children > 0 {
            return Err(BazaarError::Conflict(format!(
                "Category {id} still has {children} subcategories"
            )));
        }

        if !self.category_repository.delete(id).await? {
            return Err(BazaarError::not_found("Category", id));
        }

        info!("Category deleted: {}", id);
        Ok(())
    }

    async fn create_question(
        &self,
        category_id: CategoryId,
        request: CreateQuestionRequest,
    ) -> BazaarResult<Question> {
        debug!("Creating question for category: {}", category_id);

        request.validate_request()?;
        let kind = request.question_kind()?;

        self.require_category(category_id).await?;

        let position = match request.position {
            Some(position) => position,
            None => match self
                .question_repository
                .find_by_category(category_id)
                .await?
                .iter()
                .map(|q| q.position)
                .max()
            {
                Some(last) => last.checked_add(1).ok_or_else(|| {
                    BazaarError::validation("No position left after the last question; pass one explicitly")
                })?,
                None => 0,
            },
        };

        let question = self
            .question_repository
            .save(&NewQuestion {
                category_id,
                question: request.question.trim().to_string(),
                kind,
                position,
            })
            .await?;

        info!("Question created: {} in category {}", question.id, category_id);
        Ok(question)
    }

    async fn update_question(&self, id: QuestionId, request: UpdateQuestionRequest) -> BazaarResult<Question> {
        debug!("Updating question: {}", id);

        request.validate_request()?;

        let mut question = self
            .question_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| BazaarError::not_found("Question", id))?;

        question.kind = request.merge_kind(&question.kind)?;
        if let Some(text) = &request.question {
            question.question = text.trim().to_string();
        }
        if let Some(position) = request.position {
            question.position = position;
        }

        let updated = self.question_repository.update(&question).await?;

        info!("Question updated: {}", id);
        Ok(updated)
    }

    async fn delete_question(&self, id: QuestionId) -> BazaarResult<()> {
        debug!("Deleting question: {}", id);

        if !self.question_repository.delete(id).await? {
            return Err(BazaarError::not_found("Question", id));
        }

        info!("Question deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for CatalogServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogServiceImpl")
            .field("tree_ttl", &self.tree_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheService;
    use crate::test_support::{InMemoryCatalog, UnreachableCache};
    use bazaar_core::QuestionKind;

    struct Fixture {
        store: Arc<InMemoryCatalog>,
        cache: Arc<MemoryCacheService>,
        service: CatalogServiceImpl,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryCatalog::new());
        let cache = Arc::new(MemoryCacheService::new());
        let service = CatalogServiceImpl::new(
            store.clone(),
            store.clone(),
            cache.clone(),
            StampedeGuard::default(),
            CATEGORY_TREE_TTL,
        );
        Fixture {
            store,
            cache,
            service,
        }
    }

    fn category(name: &str, parent_id: Option<CategoryId>) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            parent_id,
        }
    }

    fn select_question(text: &str, options: &[&str]) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question: text.to_string(),
            kind: "select".to_string(),
            options: Some(options.iter().map(ToString::to_string).collect()),
            position: None,
        }
    }

    fn typed_question(text: &str, kind: &str) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question: text.to_string(),
            kind: kind.to_string(),
            options: None,
            position: None,
        }
    }

    #[tokio::test]
    async fn test_nested_tree_carries_questions() {
        let f = fixture();
        let electronics = f.service.create_category(category("Electronics", None)).await.unwrap();
        let phones = f
            .service
            .create_category(category("Smartphones", Some(electronics.id)))
            .await
            .unwrap();
        let android = f
            .service
            .create_category(category("Android", Some(phones.id)))
            .await
            .unwrap();
        f.service
            .create_question(android.id, select_question("Brand?", &["A", "B", "C"]))
            .await
            .unwrap();

        let tree = f.service.get_categories_with_questions().await.unwrap();

        assert_eq!(tree.len(), 1);
        let node = &tree[0].children[0].children[0];
        assert_eq!(node.name, "Android");
        assert_eq!(node.questions.len(), 1);
        assert_eq!(node.questions[0].question, "Brand?");
        assert_eq!(
            node.questions[0].kind,
            QuestionKind::Select {
                options: vec!["A".into(), "B".into(), "C".into()]
            }
        );
    }

    #[tokio::test]
    async fn test_tree_is_served_from_snapshot_until_ttl() {
        let f = fixture();
        f.service.create_category(category("Books", None)).await.unwrap();

        let first = serde_json::to_string(&f.service.get_categories_with_questions().await.unwrap()).unwrap();
        f.service.create_category(category("Garden", None)).await.unwrap();
        let second = serde_json::to_string(&f.service.get_categories_with_questions().await.unwrap()).unwrap();

        assert_eq!(first, second);
        assert_eq!(f.store.loads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tree_reflects_store_after_ttl() {
        let f = fixture();
        f.service.create_category(category("Books", None)).await.unwrap();
        assert_eq!(f.service.get_categories_with_questions().await.unwrap().len(), 1);

        f.service.create_category(category("Garden", None)).await.unwrap();
        tokio::time::advance(CATEGORY_TREE_TTL).await;

        let tree = f.service.get_categories_with_questions().await.unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(f.store.loads(), 2);
    }

    #[tokio::test]
    async fn test_questions_by_category_is_uncached_and_ordered() {
        let f = fixture();
        let shoes = f.service.create_category(category("Shoes", None)).await.unwrap();

        assert!(f.service.get_questions_by_category(shoes.id).await.unwrap().is_empty());
        assert!(f
            .service
            .get_questions_by_category(CategoryId(9_999))
            .await
            .unwrap()
            .is_empty());

        f.service
            .create_question(shoes.id, typed_question("Size?", "number"))
            .await
            .unwrap();
        let mut first = typed_question("Waterproof?", "boolean");
        first.position = Some(-1);
        f.service.create_question(shoes.id, first).await.unwrap();

        let questions = f.service.get_questions_by_category(shoes.id).await.unwrap();
        let texts: Vec<_> = questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, ["Waterproof?", "Size?"]);
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_question_wire_shape() {
        let f = fixture();
        let shoes = f.service.create_category(category("Shoes", None)).await.unwrap();
        let question = f
            .service
            .create_question(shoes.id, select_question("Brand?", &["A", "B"]))
            .await
            .unwrap();
        let text = f
            .service
            .create_question(shoes.id, typed_question("Notes", "text"))
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&question).unwrap(),
            serde_json::json!({
                "id": question.id.value(),
                "category_id": shoes.id.value(),
                "question": "Brand?",
                "type": "select",
                "options": ["A", "B"],
            })
        );
        assert!(serde_json::to_value(&text).unwrap().get("options").is_none());
    }

    #[tokio::test]
    async fn test_create_category_requires_existing_parent() {
        let f = fixture();
        let err = f
            .service
            .create_category(category("Orphan", Some(CategoryId(42))))
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_sibling_name_conflicts() {
        let f = fixture();
        let root = f.service.create_category(category("Home", None)).await.unwrap();
        f.service.create_category(category("Kitchen", Some(root.id))).await.unwrap();

        let err = f
            .service
            .create_category(category("Kitchen", Some(root.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::Conflict(_)));

        // Same name elsewhere in the tree is fine.
        f.service.create_category(category("Kitchen", None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_reparenting_rejects_cycles() {
        let f = fixture();
        let a = f.service.create_category(category("A", None)).await.unwrap();
        let b = f.service.create_category(category("B", Some(a.id))).await.unwrap();
        let c = f.service.create_category(category("C", Some(b.id))).await.unwrap();

        let under_grandchild = UpdateCategoryRequest {
            parent_id: Some(Some(c.id)),
            ..Default::default()
        };
        let err = f.service.update_category(a.id, under_grandchild).await.unwrap_err();
        assert!(matches!(err, BazaarError::BusinessRule(_)));

        let under_self = UpdateCategoryRequest {
            parent_id: Some(Some(b.id)),
            ..Default::default()
        };
        let err = f.service.update_category(b.id, under_self).await.unwrap_err();
        assert!(matches!(err, BazaarError::BusinessRule(_)));

        let to_root = UpdateCategoryRequest {
            name: Some("C prime".to_string()),
            parent_id: Some(None),
        };
        let moved = f.service.update_category(c.id, to_root).await.unwrap();
        assert!(moved.is_root());
        assert_eq!(moved.name, "C prime");
    }

    #[tokio::test]
    async fn test_delete_category_with_children_conflicts() {
        let f = fixture();
        let parent = f.service.create_category(category("Parent", None)).await.unwrap();
        let child = f
            .service
            .create_category(category("Child", Some(parent.id)))
            .await
            .unwrap();
        f.service
            .create_question(child.id, typed_question("Colour?", "text"))
            .await
            .unwrap();

        let err = f.service.delete_category(parent.id).await.unwrap_err();
        assert!(matches!(err, BazaarError::Conflict(_)));

        f.service.delete_category(child.id).await.unwrap();
        assert!(f.service.get_questions_by_category(child.id).await.unwrap().is_empty());
        f.service.delete_category(parent.id).await.unwrap();

        let err = f.service.delete_category(parent.id).await.unwrap_err();
        assert!(matches!(err, BazaarError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_question_validation() {
        let f = fixture();
        let cat = f.service.create_category(category("Cars", None)).await.unwrap();

        let err = f
            .service
            .create_question(cat.id, select_question("Make?", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::Validation(_)));

        let mut with_options = typed_question("Mileage?", "number");
        with_options.options = Some(vec!["low".to_string()]);
        let err = f.service.create_question(cat.id, with_options).await.unwrap_err();
        assert!(matches!(err, BazaarError::Validation(_)));

        let err = f
            .service
            .create_question(cat.id, typed_question("Colour?", "colour"))
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::Validation(_)));

        let err = f
            .service
            .create_question(CategoryId(777), typed_question("Year?", "number"))
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_and_delete_question() {
        let f = fixture();
        let cat = f.service.create_category(category("Bikes", None)).await.unwrap();
        let question = f
            .service
            .create_question(cat.id, typed_question("Frame size?", "number"))
            .await
            .unwrap();

        let updated = f
            .service
            .update_question(
                question.id,
                UpdateQuestionRequest {
                    kind: Some("select".to_string()),
                    options: Some(vec!["S".into(), "M".into(), "L".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.question, "Frame size?");
        assert_eq!(updated.kind.options().map(<[String]>::len), Some(3));

        f.service.delete_question(question.id).await.unwrap();
        let err = f.service.delete_question(question.id).await.unwrap_err();
        assert!(matches!(err, BazaarError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_default_position_past_the_end_is_rejected() {
        let f = fixture();
        let cat = f.service.create_category(category("Boats", None)).await.unwrap();
        let mut last = typed_question("Length?", "number");
        last.position = Some(i32::MAX);
        f.service.create_question(cat.id, last).await.unwrap();

        let err = f
            .service
            .create_question(cat.id, typed_question("Engine?", "text"))
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::Validation(_)));

        let mut explicit = typed_question("Engine?", "text");
        explicit.position = Some(5);
        let question = f.service.create_question(cat.id, explicit).await.unwrap();
        assert_eq!(question.position, 5);
    }

    #[tokio::test]
    async fn test_tree_is_served_from_store_when_cache_is_down() {
        let store = Arc::new(InMemoryCatalog::new());
        let service = CatalogServiceImpl::new(
            store.clone(),
            store.clone(),
            Arc::new(UnreachableCache),
            StampedeGuard::default(),
            CATEGORY_TREE_TTL,
        );
        let root = service.create_category(category("Garden", None)).await.unwrap();
        service
            .create_question(root.id, typed_question("Area?", "number"))
            .await
            .unwrap();

        let first = service.get_categories_with_questions().await.unwrap();
        let second = service.get_categories_with_questions().await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "Garden");
        assert_eq!(first[0].questions.len(), 1);
        assert_eq!(first, second);
        assert_eq!(store.loads(), 2);
    }
}
