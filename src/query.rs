use diesel::prelude::*;

use crate::error::DbError;
use crate::models::{DishComponent, DishList, Item, Product, PurchaseList, Recipe, RecordId};

// products

pub(crate) fn all_products(conn: &SqliteConnection) -> Result<Vec<Product>, DbError> {
    use crate::schema::products::dsl::*;

    Ok(products.order(name.asc()).load::<Product>(conn)?)
}

pub(crate) fn insert_product(product: &Product, conn: &SqliteConnection) -> Result<(), DbError> {
    use crate::schema::products::dsl::*;

    diesel::insert_into(products).values(product).execute(conn)?;
    Ok(())
}

/// Full-record replace by id. Returns the number of rows touched.
pub(crate) fn update_product(product: &Product, conn: &SqliteConnection) -> Result<usize, DbError> {
    use crate::schema::products::dsl::*;

    Ok(diesel::update(products.find(product.id))
        .set(product)
        .execute(conn)?)
}

pub(crate) fn delete_product(
    product_id: RecordId,
    conn: &SqliteConnection,
) -> Result<usize, DbError> {
    use crate::schema::products::dsl::*;

    Ok(diesel::delete(products.find(product_id)).execute(conn)?)
}

// purchase lists and their items

pub(crate) fn all_purchase_lists(conn: &SqliteConnection) -> Result<Vec<PurchaseList>, DbError> {
    use crate::schema::purchase_lists::dsl::*;

    Ok(purchase_lists
        .order((created_on.desc(), name.asc()))
        .load::<PurchaseList>(conn)?)
}

pub(crate) fn find_purchase_list(
    list_id: RecordId,
    conn: &SqliteConnection,
) -> Result<Option<PurchaseList>, DbError> {
    use crate::schema::purchase_lists::dsl::*;

    Ok(purchase_lists
        .find(list_id)
        .first::<PurchaseList>(conn)
        .optional()?)
}

pub(crate) fn insert_purchase_list(
    list: &PurchaseList,
    conn: &SqliteConnection,
) -> Result<(), DbError> {
    use crate::schema::purchase_lists::dsl::*;

    diesel::insert_into(purchase_lists)
        .values(list)
        .execute(conn)?;
    Ok(())
}

pub(crate) fn update_purchase_list(
    list: &PurchaseList,
    conn: &SqliteConnection,
) -> Result<usize, DbError> {
    use crate::schema::purchase_lists::dsl::*;

    Ok(diesel::update(purchase_lists.find(list.id))
        .set(list)
        .execute(conn)?)
}

/// Removes the list's items, then the list, in one transaction.
pub(crate) fn delete_purchase_list(
    list_id: RecordId,
    conn: &SqliteConnection,
) -> Result<usize, DbError> {
    use crate::schema::{items, purchase_lists};

    let deleted = conn.transaction::<_, diesel::result::Error, _>(|| {
        diesel::delete(items::table.filter(items::list_id.eq(list_id)))
            .execute(conn)?;
        diesel::delete(purchase_lists::table.find(list_id))
            .execute(conn)
    })?;
    Ok(deleted)
}

pub(crate) fn items_for(list: RecordId, conn: &SqliteConnection) -> Result<Vec<Item>, DbError> {
    use crate::schema::items::dsl::*;

    Ok(items
        .filter(list_id.eq(list))
        .order(name.asc())
        .load::<Item>(conn)?)
}

pub(crate) fn find_item(
    item_id: RecordId,
    conn: &SqliteConnection,
) -> Result<Option<Item>, DbError> {
    use crate::schema::items::dsl::*;

    Ok(items.find(item_id).first::<Item>(conn).optional()?)
}

pub(crate) fn insert_item(item: &Item, conn: &SqliteConnection) -> Result<(), DbError> {
    use crate::schema::items::dsl::*;

    diesel::insert_into(items).values(item).execute(conn)?;
    Ok(())
}

pub(crate) fn update_item(item: &Item, conn: &SqliteConnection) -> Result<usize, DbError> {
    use crate::schema::items::dsl::*;

    Ok(diesel::update(items.find(item.id)).set(item).execute(conn)?)
}

pub(crate) fn set_item_bought(
    item_id: RecordId,
    flag: bool,
    conn: &SqliteConnection,
) -> Result<usize, DbError> {
    use crate::schema::items::dsl::*;

    Ok(diesel::update(items.find(item_id))
        .set(bought.eq(flag))
        .execute(conn)?)
}

pub(crate) fn delete_item(item_id: RecordId, conn: &SqliteConnection) -> Result<usize, DbError> {
    use crate::schema::items::dsl::*;

    Ok(diesel::delete(items.find(item_id)).execute(conn)?)
}

// dish lists, recipes and components

pub(crate) fn all_dish_lists(conn: &SqliteConnection) -> Result<Vec<DishList>, DbError> {
    use crate::schema::dish_lists::dsl::*;

    Ok(dish_lists
        .order((created_on.desc(), name.asc()))
        .load::<DishList>(conn)?)
}

pub(crate) fn find_dish_list(
    list_id: RecordId,
    conn: &SqliteConnection,
) -> Result<Option<DishList>, DbError> {
    use crate::schema::dish_lists::dsl::*;

    Ok(dish_lists
        .find(list_id)
        .first::<DishList>(conn)
        .optional()?)
}

pub(crate) fn insert_dish_list(list: &DishList, conn: &SqliteConnection) -> Result<(), DbError> {
    use crate::schema::dish_lists::dsl::*;

    diesel::insert_into(dish_lists).values(list).execute(conn)?;
    Ok(())
}

pub(crate) fn update_dish_list(list: &DishList, conn: &SqliteConnection) -> Result<usize, DbError> {
    use crate::schema::dish_lists::dsl::*;

    Ok(diesel::update(dish_lists.find(list.id))
        .set(list)
        .execute(conn)?)
}

/// Removes components of every recipe in the list, the recipes, then the list.
pub(crate) fn delete_dish_list(
    list_id: RecordId,
    conn: &SqliteConnection,
) -> Result<usize, DbError> {
    use crate::schema::{dish_components, dish_lists, recipes};

    let deleted = conn.transaction::<_, diesel::result::Error, _>(|| {
        let recipe_ids = recipes::table
            .filter(recipes::dish_list_id.eq(list_id))
            .select(recipes::id)
            .load::<RecordId>(conn)?;
        diesel::delete(
            dish_components::table.filter(dish_components::recipe_id.eq_any(recipe_ids)),
        )
        .execute(conn)?;
        diesel::delete(recipes::table.filter(recipes::dish_list_id.eq(list_id)))
            .execute(conn)?;
        diesel::delete(dish_lists::table.find(list_id))
            .execute(conn)
    })?;
    Ok(deleted)
}

pub(crate) fn recipes_for(list: RecordId, conn: &SqliteConnection) -> Result<Vec<Recipe>, DbError> {
    use crate::schema::recipes::dsl::*;

    Ok(recipes
        .filter(dish_list_id.eq(list))
        .order(name.asc())
        .load::<Recipe>(conn)?)
}

pub(crate) fn find_recipe(
    recipe_id: RecordId,
    conn: &SqliteConnection,
) -> Result<Option<Recipe>, DbError> {
    use crate::schema::recipes::dsl::*;

    Ok(recipes.find(recipe_id).first::<Recipe>(conn).optional()?)
}

pub(crate) fn insert_recipe(recipe: &Recipe, conn: &SqliteConnection) -> Result<(), DbError> {
    use crate::schema::recipes::dsl::*;

    diesel::insert_into(recipes).values(recipe).execute(conn)?;
    Ok(())
}

pub(crate) fn update_recipe(recipe: &Recipe, conn: &SqliteConnection) -> Result<usize, DbError> {
    use crate::schema::recipes::dsl::*;

    Ok(diesel::update(recipes.find(recipe.id))
        .set(recipe)
        .execute(conn)?)
}

/// Removes the recipe's components, then the recipe, in one transaction.
pub(crate) fn delete_recipe(
    recipe_id: RecordId,
    conn: &SqliteConnection,
) -> Result<usize, DbError> {
    use crate::schema::{dish_components, recipes};

    let deleted = conn.transaction::<_, diesel::result::Error, _>(|| {
        diesel::delete(dish_components::table.filter(dish_components::recipe_id.eq(recipe_id)))
            .execute(conn)?;
        diesel::delete(recipes::table.find(recipe_id)).execute(conn)
    })?;
    Ok(deleted)
}

pub(crate) fn components_for(
    recipe: RecordId,
    conn: &SqliteConnection,
) -> Result<Vec<DishComponent>, DbError> {
    use crate::schema::dish_components::dsl::*;

    Ok(dish_components
        .filter(recipe_id.eq(recipe))
        .order(name.asc())
        .load::<DishComponent>(conn)?)
}

pub(crate) fn find_component(
    component_id: RecordId,
    conn: &SqliteConnection,
) -> Result<Option<DishComponent>, DbError> {
    use crate::schema::dish_components::dsl::*;

    Ok(dish_components
        .find(component_id)
        .first::<DishComponent>(conn)
        .optional()?)
}

pub(crate) fn insert_component(
    component: &DishComponent,
    conn: &SqliteConnection,
) -> Result<(), DbError> {
    use crate::schema::dish_components::dsl::*;

    diesel::insert_into(dish_components)
        .values(component)
        .execute(conn)?;
    Ok(())
}

pub(crate) fn update_component(
    component: &DishComponent,
    conn: &SqliteConnection,
) -> Result<usize, DbError> {
    use crate::schema::dish_components::dsl::*;

    Ok(diesel::update(dish_components.find(component.id))
        .set(component)
        .execute(conn)?)
}

pub(crate) fn delete_component(
    component_id: RecordId,
    conn: &SqliteConnection,
) -> Result<usize, DbError> {
    use crate::schema::dish_components::dsl::*;

    Ok(diesel::delete(dish_components.find(component_id))
        .execute(conn)?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use diesel::connection::SimpleConnection;

    use super::*;
    use crate::models::WeightUnit;
    use crate::schema::CREATE_TABLES;

    fn connection() -> SqliteConnection {
        let conn = SqliteConnection::establish(":memory:").unwrap();
        conn.batch_execute(CREATE_TABLES).unwrap();
        conn
    }

    fn purchase_list(name: &str) -> PurchaseList {
        PurchaseList {
            id: RecordId::new(),
            name: name.into(),
            size: 2,
            created_on: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
        }
    }

    fn item(list: &PurchaseList, name: &str, total: f64) -> Item {
        Item {
            id: RecordId::new(),
            list_id: list.id,
            name: name.into(),
            weight: 1.0,
            weight_unit: WeightUnit::Kilogram,
            price: total,
            total,
            bought: false,
        }
    }

    #[test]
    fn purchase_list_round_trips_through_sqlite() {
        let conn = connection();
        let list = purchase_list("Ашан");
        insert_purchase_list(&list, &conn).unwrap();

        assert_eq!(
            find_purchase_list(list.id, &conn).unwrap(),
            Some(list.clone())
        );
        assert_eq!(all_purchase_lists(&conn).unwrap(), vec![list]);
    }

    #[test]
    fn update_replaces_the_whole_record() {
        let conn = connection();
        let list = purchase_list("Ашан");
        insert_purchase_list(&list, &conn).unwrap();
        let mut stored = item(&list, "Хлеб", 45.0);
        insert_item(&stored, &conn).unwrap();

        stored.total = 90.0;
        stored.weight_unit = WeightUnit::Piece;
        assert_eq!(update_item(&stored, &conn).unwrap(), 1);
        assert_eq!(find_item(stored.id, &conn).unwrap(), Some(stored));
    }

    #[test]
    fn update_of_missing_row_touches_nothing() {
        let conn = connection();
        assert_eq!(
            update_purchase_list(&purchase_list("нет"), &conn).unwrap(),
            0
        );
    }

    #[test]
    fn bought_flag_toggles() {
        let conn = connection();
        let list = purchase_list("Магнит");
        insert_purchase_list(&list, &conn).unwrap();
        let stored = item(&list, "Сыр", 300.0);
        insert_item(&stored, &conn).unwrap();

        assert_eq!(set_item_bought(stored.id, true, &conn).unwrap(), 1);
        assert!(find_item(stored.id, &conn).unwrap().unwrap().bought);
    }

    #[test]
    fn deleting_a_purchase_list_removes_its_items() {
        let conn = connection();
        let doomed = purchase_list("Ашан");
        let kept = purchase_list("Магнит");
        insert_purchase_list(&doomed, &conn).unwrap();
        insert_purchase_list(&kept, &conn).unwrap();
        insert_item(&item(&doomed, "Хлеб", 45.0), &conn).unwrap();
        insert_item(&item(&doomed, "Масло", 150.0), &conn).unwrap();
        insert_item(&item(&kept, "Сыр", 300.0), &conn).unwrap();

        assert_eq!(delete_purchase_list(doomed.id, &conn).unwrap(), 1);
        assert!(items_for(doomed.id, &conn).unwrap().is_empty());
        assert_eq!(items_for(kept.id, &conn).unwrap().len(), 1);
        assert_eq!(find_purchase_list(doomed.id, &conn).unwrap(), None);
    }

    #[test]
    fn deleting_a_dish_list_removes_recipes_and_components() {
        let conn = connection();
        let list = DishList {
            id: RecordId::new(),
            name: "Ужин".into(),
            size: 1,
            created_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        insert_dish_list(&list, &conn).unwrap();
        let recipe = Recipe {
            id: RecordId::new(),
            dish_list_id: list.id,
            name: "Борщ".into(),
            portions: 4,
        };
        insert_recipe(&recipe, &conn).unwrap();
        let component = DishComponent {
            id: RecordId::new(),
            recipe_id: recipe.id,
            name: "Свёкла".into(),
            weight: 300.0,
            weight_unit: WeightUnit::Gram,
        };
        insert_component(&component, &conn).unwrap();

        assert_eq!(delete_dish_list(list.id, &conn).unwrap(), 1);
        assert!(recipes_for(list.id, &conn).unwrap().is_empty());
        assert_eq!(find_component(component.id, &conn).unwrap(), None);
        assert!(all_dish_lists(&conn).unwrap().is_empty());
    }
}
