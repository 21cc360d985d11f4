//! Integration tests for the category tree.
//!
//! Exercises the repository layer against a real database:
//! - Level derivation on create (roots at 0, children below their parent)
//! - Re-parenting, including whole-subtree level recomputation
//! - Cycle refusal on update and cycle detection during path resolution
//! - Root-first path assembly
//! - Referential delete policy (children and products block deletion)

use assert_matches::assert_matches;
use sqlx::PgPool;
use storefront_core::error::CoreError;
use storefront_db::models::category::{CreateCategory, UpdateCategory};
use storefront_db::models::product::CreateProduct;
use storefront_db::repositories::{CategoryRepo, ProductRepo};
use storefront_db::DbError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_category(name: &str, parent_id: Option<i64>) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        parent_id,
        image_url: None,
    }
}

fn new_product(name: &str, category_id: i64) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        price: 9.99,
        category_id,
        is_new: None,
        image_url: None,
    }
}

// ---------------------------------------------------------------------------
// Test: Create and level derivation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_root_category(pool: PgPool) {
    let root = CategoryRepo::create(
        &pool,
        &CreateCategory {
            name: "Electronics".to_string(),
            parent_id: None,
            image_url: Some("/img/electronics.png".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(root.name, "Electronics");
    assert_eq!(root.parent_id, None);
    assert_eq!(root.level, 0);
    assert_eq!(root.image_url.as_deref(), Some("/img/electronics.png"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_child_derives_level(pool: PgPool) {
    let root = CategoryRepo::create(&pool, &new_category("Electronics", None))
        .await
        .unwrap();
    let child = CategoryRepo::create(&pool, &new_category("Computers", Some(root.id)))
        .await
        .unwrap();
    let grandchild = CategoryRepo::create(&pool, &new_category("Laptops", Some(child.id)))
        .await
        .unwrap();

    assert_eq!(root.level, 0);
    assert_eq!(child.level, 1);
    assert_eq!(child.parent_id, Some(root.id));
    assert_eq!(grandchild.level, 2);
    assert_eq!(grandchild.parent_id, Some(child.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_unknown_parent_rejected(pool: PgPool) {
    let err = CategoryRepo::create(&pool, &new_category("Orphan", Some(999_999)))
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { entity: "category", .. }));
}

// ---------------------------------------------------------------------------
// Test: Update, re-parenting, and cycle refusal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rename_keeps_parent_and_level(pool: PgPool) {
    let root = CategoryRepo::create(&pool, &new_category("Electronics", None))
        .await
        .unwrap();
    let child = CategoryRepo::create(&pool, &new_category("Computers", Some(root.id)))
        .await
        .unwrap();

    let renamed = CategoryRepo::update(
        &pool,
        child.id,
        &UpdateCategory {
            name: Some("PCs".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(renamed.name, "PCs");
    assert_eq!(renamed.parent_id, Some(root.id), "parent should be unchanged");
    assert_eq!(renamed.level, 1, "level should be unchanged");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reparent_recomputes_descendant_levels(pool: PgPool) {
    let electronics = CategoryRepo::create(&pool, &new_category("Electronics", None))
        .await
        .unwrap();
    let computers = CategoryRepo::create(&pool, &new_category("Computers", Some(electronics.id)))
        .await
        .unwrap();
    let laptops = CategoryRepo::create(&pool, &new_category("Laptops", Some(computers.id)))
        .await
        .unwrap();
    let gaming = CategoryRepo::create(&pool, &new_category("Gaming", Some(laptops.id)))
        .await
        .unwrap();

    let clearance = CategoryRepo::create(&pool, &new_category("Clearance", None))
        .await
        .unwrap();
    let tech = CategoryRepo::create(&pool, &new_category("Tech", Some(clearance.id)))
        .await
        .unwrap();

    // Move Computers (level 1) under Clearance > Tech (level 1).
    let moved = CategoryRepo::update(
        &pool,
        computers.id,
        &UpdateCategory {
            parent_id: Some(Some(tech.id)),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(moved.parent_id, Some(tech.id));
    assert_eq!(moved.level, 2);

    let laptops_after = CategoryRepo::find_by_id(&pool, laptops.id)
        .await
        .unwrap()
        .expect("laptops should still exist");
    assert_eq!(laptops_after.level, 3, "child should follow the move");

    let gaming_after = CategoryRepo::find_by_id(&pool, gaming.id)
        .await
        .unwrap()
        .expect("gaming should still exist");
    assert_eq!(gaming_after.level, 4, "grandchild should follow the move");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_detach_to_root(pool: PgPool) {
    let apparel = CategoryRepo::create(&pool, &new_category("Apparel", None))
        .await
        .unwrap();
    let shoes = CategoryRepo::create(&pool, &new_category("Shoes", Some(apparel.id)))
        .await
        .unwrap();
    let sneakers = CategoryRepo::create(&pool, &new_category("Sneakers", Some(shoes.id)))
        .await
        .unwrap();

    let detached = CategoryRepo::update(
        &pool,
        shoes.id,
        &UpdateCategory {
            parent_id: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(detached.parent_id, None);
    assert_eq!(detached.level, 0);

    let sneakers_after = CategoryRepo::find_by_id(&pool, sneakers.id)
        .await
        .unwrap()
        .expect("sneakers should still exist");
    assert_eq!(sneakers_after.level, 1);
    assert_eq!(sneakers_after.parent_id, Some(shoes.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reparent_to_self_rejected(pool: PgPool) {
    let root = CategoryRepo::create(&pool, &new_category("Electronics", None))
        .await
        .unwrap();

    let err = CategoryRepo::update(
        &pool,
        root.id,
        &UpdateCategory {
            parent_id: Some(Some(root.id)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, DbError::Core(CoreError::CycleDetected { at }) if at == root.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reparent_under_own_descendant_rejected(pool: PgPool) {
    let a = CategoryRepo::create(&pool, &new_category("A", None))
        .await
        .unwrap();
    let b = CategoryRepo::create(&pool, &new_category("B", Some(a.id)))
        .await
        .unwrap();
    let c = CategoryRepo::create(&pool, &new_category("C", Some(b.id)))
        .await
        .unwrap();

    let err = CategoryRepo::update(
        &pool,
        a.id,
        &UpdateCategory {
            parent_id: Some(Some(c.id)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, DbError::Core(CoreError::CycleDetected { at }) if at == a.id);

    // The refused move must leave the tree untouched.
    let a_after = CategoryRepo::find_by_id(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(a_after.parent_id, None);
    assert_eq!(a_after.level, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_unknown_category_rejected(pool: PgPool) {
    let err = CategoryRepo::update(
        &pool,
        999_999,
        &UpdateCategory {
            name: Some("Ghost".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Test: Path resolution
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_path_is_root_first(pool: PgPool) {
    let root = CategoryRepo::create(&pool, &new_category("Electronics", None))
        .await
        .unwrap();
    let child = CategoryRepo::create(&pool, &new_category("Computers", Some(root.id)))
        .await
        .unwrap();
    let leaf = CategoryRepo::create(&pool, &new_category("Laptops", Some(child.id)))
        .await
        .unwrap();

    let path = CategoryRepo::find_path(&pool, leaf.id).await.unwrap();
    let ids: Vec<i64> = path.iter().map(|n| n.id).collect();
    let names: Vec<&str> = path.iter().map(|n| n.name.as_str()).collect();

    assert_eq!(ids, vec![root.id, child.id, leaf.id]);
    assert_eq!(names, vec!["Electronics", "Computers", "Laptops"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_path_unknown_category(pool: PgPool) {
    let err = CategoryRepo::find_path(&pool, 999_999).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { entity: "category", .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_path_detects_forged_cycle(pool: PgPool) {
    let a = CategoryRepo::create(&pool, &new_category("A", None))
        .await
        .unwrap();
    let b = CategoryRepo::create(&pool, &new_category("B", Some(a.id)))
        .await
        .unwrap();

    // Forge a parent loop behind the repository's back.
    sqlx::query("UPDATE categories SET parent_id = $2, level = 1 WHERE id = $1")
        .bind(a.id)
        .bind(b.id)
        .execute(&pool)
        .await
        .unwrap();

    let err = CategoryRepo::find_path(&pool, b.id).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::CycleDetected { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_with_path(pool: PgPool) {
    let root = CategoryRepo::create(&pool, &new_category("Apparel", None))
        .await
        .unwrap();
    let child = CategoryRepo::create(&pool, &new_category("Shoes", Some(root.id)))
        .await
        .unwrap();

    let detail = CategoryRepo::get_with_path(&pool, child.id).await.unwrap();
    assert_eq!(detail.category.id, child.id);
    assert_eq!(detail.category.name, "Shoes");
    assert_eq!(detail.path.len(), 2);
    assert_eq!(detail.path[0].name, "Apparel");
    assert_eq!(detail.path[1].name, "Shoes");

    let err = CategoryRepo::get_with_path(&pool, 999_999).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Test: Listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_orders_by_level_then_name(pool: PgPool) {
    let books = CategoryRepo::create(&pool, &new_category("Books", None))
        .await
        .unwrap();
    CategoryRepo::create(&pool, &new_category("Apparel", None))
        .await
        .unwrap();
    CategoryRepo::create(&pool, &new_category("Novels", Some(books.id)))
        .await
        .unwrap();
    CategoryRepo::create(&pool, &new_category("Comics", Some(books.id)))
        .await
        .unwrap();

    let all = CategoryRepo::list(&pool).await.unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Apparel", "Books", "Comics", "Novels"]);

    let levels: Vec<i32> = all.iter().map(|c| c.level).collect();
    assert_eq!(levels, vec![0, 0, 1, 1]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_roots_respects_limit(pool: PgPool) {
    for name in ["Gamma", "Alpha", "Beta"] {
        CategoryRepo::create(&pool, &new_category(name, None))
            .await
            .unwrap();
    }

    let roots = CategoryRepo::list_roots(&pool, 2).await.unwrap();
    let names: Vec<&str> = roots.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
}

// ---------------------------------------------------------------------------
// Test: Delete policy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_leaf_category(pool: PgPool) {
    let root = CategoryRepo::create(&pool, &new_category("Electronics", None))
        .await
        .unwrap();
    let leaf = CategoryRepo::create(&pool, &new_category("Computers", Some(root.id)))
        .await
        .unwrap();

    CategoryRepo::delete(&pool, leaf.id).await.unwrap();
    assert!(CategoryRepo::find_by_id(&pool, leaf.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_with_children_rejected(pool: PgPool) {
    let root = CategoryRepo::create(&pool, &new_category("Electronics", None))
        .await
        .unwrap();
    CategoryRepo::create(&pool, &new_category("Computers", Some(root.id)))
        .await
        .unwrap();

    let err = CategoryRepo::delete(&pool, root.id).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));

    assert!(CategoryRepo::find_by_id(&pool, root.id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_with_products_rejected(pool: PgPool) {
    let category = CategoryRepo::create(&pool, &new_category("Electronics", None))
        .await
        .unwrap();
    ProductRepo::create_with_characteristics(&pool, &new_product("Widget", category.id), &[])
        .await
        .unwrap();

    let err = CategoryRepo::delete(&pool, category.id).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_unknown_category(pool: PgPool) {
    let err = CategoryRepo::delete(&pool, 999_999).await.unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { .. }));
}
