//! Async repositories over the store. Every call runs on the blocking pool.

use crate::error::Error;
use crate::models::{
    ComponentForm, DishComponent, DishList, DishListForm, Item, ItemForm, Product, ProductForm,
    PurchaseList, PurchaseListForm, Recipe, RecipeForm, RecordId,
};
use crate::query;
use crate::store::Store;

fn expect_one(rows: usize, kind: &'static str, id: RecordId) -> Result<(), Error> {
    if rows == 0 {
        return Err(Error::not_found(kind, id));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ProductRepository {
    store: Store,
}

impl ProductRepository {
    pub fn new(store: Store) -> Self {
        ProductRepository { store }
    }

    pub async fn all(&self) -> Result<Vec<Product>, Error> {
        log::debug!("loading products");
        self.store.run(|conn| Ok(query::all_products(conn)?)).await
    }

    pub async fn add(&self, form: ProductForm) -> Result<Product, Error> {
        form.validate()?;
        let product = form.into_product(RecordId::new());
        let record = product.clone();
        self.store
            .run(move |conn| Ok(query::insert_product(&record, conn)?))
            .await?;
        log::info!("added product {} ({})", product.id, product.name);
        Ok(product)
    }

    pub async fn update(&self, id: RecordId, form: ProductForm) -> Result<Product, Error> {
        form.validate()?;
        let product = form.into_product(id);
        let record = product.clone();
        let rows = self
            .store
            .run(move |conn| Ok(query::update_product(&record, conn)?))
            .await?;
        expect_one(rows, "product", id)?;
        log::info!("updated product {}", id);
        Ok(product)
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), Error> {
        let rows = self
            .store
            .run(move |conn| Ok(query::delete_product(id, conn)?))
            .await?;
        expect_one(rows, "product", id)?;
        log::info!("deleted product {}", id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct PurchaseRepository {
    store: Store,
}

impl PurchaseRepository {
    pub fn new(store: Store) -> Self {
        PurchaseRepository { store }
    }

    pub async fn all_lists(&self) -> Result<Vec<PurchaseList>, Error> {
        log::debug!("loading purchase lists");
        self.store
            .run(|conn| Ok(query::all_purchase_lists(conn)?))
            .await
    }

    pub async fn add_list(&self, form: PurchaseListForm) -> Result<PurchaseList, Error> {
        form.validate()?;
        let list = form.into_list(RecordId::new());
        let record = list.clone();
        self.store
            .run(move |conn| Ok(query::insert_purchase_list(&record, conn)?))
            .await?;
        log::info!("added purchase list {} ({})", list.id, list.name);
        Ok(list)
    }

    /// Replaces the list's name and size; an omitted date keeps the stored one.
    pub async fn update_list(
        &self,
        id: RecordId,
        form: PurchaseListForm,
    ) -> Result<PurchaseList, Error> {
        form.validate()?;
        let list = self
            .store
            .run(move |conn| {
                let existing = query::find_purchase_list(id, conn)?
                    .ok_or_else(|| Error::not_found("purchase list", id))?;
                let list = form.into_replacement(&existing);
                query::update_purchase_list(&list, conn)?;
                Ok(list)
            })
            .await?;
        log::info!("updated purchase list {}", id);
        Ok(list)
    }

    /// Deletes the list together with its items.
    pub async fn delete_list(&self, id: RecordId) -> Result<(), Error> {
        let rows = self
            .store
            .run(move |conn| Ok(query::delete_purchase_list(id, conn)?))
            .await?;
        expect_one(rows, "purchase list", id)?;
        log::info!("deleted purchase list {} and its items", id);
        Ok(())
    }

    pub async fn items_for(&self, list_id: RecordId) -> Result<Vec<Item>, Error> {
        log::debug!("loading items of {}", list_id);
        self.store
            .run(move |conn| Ok(query::items_for(list_id, conn)?))
            .await
    }

    pub async fn add_item(&self, list_id: RecordId, form: ItemForm) -> Result<Item, Error> {
        form.validate()?;
        let item = form.into_item(RecordId::new(), list_id);
        let record = item.clone();
        self.store
            .run(move |conn| {
                if query::find_purchase_list(list_id, conn)?.is_none() {
                    return Err(Error::not_found("purchase list", list_id));
                }
                Ok(query::insert_item(&record, conn)?)
            })
            .await?;
        log::info!("added item {} to purchase list {}", item.id, list_id);
        Ok(item)
    }

    /// Replaces the item; it stays in the list it already belongs to.
    pub async fn update_item(&self, id: RecordId, form: ItemForm) -> Result<Item, Error> {
        form.validate()?;
        let item = self
            .store
            .run(move |conn| {
                let existing =
                    query::find_item(id, conn)?.ok_or_else(|| Error::not_found("item", id))?;
                let item = form.into_item(id, existing.list_id);
                query::update_item(&item, conn)?;
                Ok(item)
            })
            .await?;
        log::info!("updated item {}", id);
        Ok(item)
    }

    pub async fn set_bought(&self, id: RecordId, bought: bool) -> Result<(), Error> {
        let rows = self
            .store
            .run(move |conn| Ok(query::set_item_bought(id, bought, conn)?))
            .await?;
        expect_one(rows, "item", id)?;
        log::info!("marked item {} bought={}", id, bought);
        Ok(())
    }

    pub async fn delete_item(&self, id: RecordId) -> Result<(), Error> {
        let rows = self
            .store
            .run(move |conn| Ok(query::delete_item(id, conn)?))
            .await?;
        expect_one(rows, "item", id)?;
        log::info!("deleted item {}", id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct DishRepository {
    store: Store,
}

impl DishRepository {
    pub fn new(store: Store) -> Self {
        DishRepository { store }
    }

    pub async fn all_lists(&self) -> Result<Vec<DishList>, Error> {
        log::debug!("loading dish lists");
        self.store.run(|conn| Ok(query::all_dish_lists(conn)?)).await
    }

    pub async fn add_list(&self, form: DishListForm) -> Result<DishList, Error> {
        form.validate()?;
        let list = form.into_list(RecordId::new());
        let record = list.clone();
        self.store
            .run(move |conn| Ok(query::insert_dish_list(&record, conn)?))
            .await?;
        log::info!("added dish list {} ({})", list.id, list.name);
        Ok(list)
    }

    /// Replaces the list's name and size; an omitted date keeps the stored one.
    pub async fn update_list(&self, id: RecordId, form: DishListForm) -> Result<DishList, Error> {
        form.validate()?;
        let list = self
            .store
            .run(move |conn| {
                let existing = query::find_dish_list(id, conn)?
                    .ok_or_else(|| Error::not_found("dish list", id))?;
                let list = form.into_replacement(&existing);
                query::update_dish_list(&list, conn)?;
                Ok(list)
            })
            .await?;
        log::info!("updated dish list {}", id);
        Ok(list)
    }

    /// Deletes the list, its recipes and their components.
    pub async fn delete_list(&self, id: RecordId) -> Result<(), Error> {
        let rows = self
            .store
            .run(move |conn| Ok(query::delete_dish_list(id, conn)?))
            .await?;
        expect_one(rows, "dish list", id)?;
        log::info!("deleted dish list {} with its recipes", id);
        Ok(())
    }

    pub async fn recipes_for(&self, list_id: RecordId) -> Result<Vec<Recipe>, Error> {
        log::debug!("loading recipes of {}", list_id);
        self.store
            .run(move |conn| Ok(query::recipes_for(list_id, conn)?))
            .await
    }

    pub async fn add_recipe(&self, list_id: RecordId, form: RecipeForm) -> Result<Recipe, Error> {
        form.validate()?;
        let recipe = form.into_recipe(RecordId::new(), list_id);
        let record = recipe.clone();
        self.store
            .run(move |conn| {
                if query::find_dish_list(list_id, conn)?.is_none() {
                    return Err(Error::not_found("dish list", list_id));
                }
                Ok(query::insert_recipe(&record, conn)?)
            })
            .await?;
        log::info!("added recipe {} to dish list {}", recipe.id, list_id);
        Ok(recipe)
    }

    pub async fn update_recipe(&self, id: RecordId, form: RecipeForm) -> Result<Recipe, Error> {
        form.validate()?;
        let recipe = self
            .store
            .run(move |conn| {
                let existing =
                    query::find_recipe(id, conn)?.ok_or_else(|| Error::not_found("recipe", id))?;
                let recipe = form.into_recipe(id, existing.dish_list_id);
                query::update_recipe(&recipe, conn)?;
                Ok(recipe)
            })
            .await?;
        log::info!("updated recipe {}", id);
        Ok(recipe)
    }

    /// Deletes the recipe and its components.
    pub async fn delete_recipe(&self, id: RecordId) -> Result<(), Error> {
        let rows = self
            .store
            .run(move |conn| Ok(query::delete_recipe(id, conn)?))
            .await?;
        expect_one(rows, "recipe", id)?;
        log::info!("deleted recipe {} and its components", id);
        Ok(())
    }

    pub async fn components_for(
        &self,
        recipe_id: RecordId,
    ) -> Result<Vec<DishComponent>, Error> {
        log::debug!("loading components of {}", recipe_id);
        self.store
            .run(move |conn| Ok(query::components_for(recipe_id, conn)?))
            .await
    }

    pub async fn add_component(
        &self,
        recipe_id: RecordId,
        form: ComponentForm,
    ) -> Result<DishComponent, Error> {
        form.validate()?;
        let component = form.into_component(RecordId::new(), recipe_id);
        let record = component.clone();
        self.store
            .run(move |conn| {
                if query::find_recipe(recipe_id, conn)?.is_none() {
                    return Err(Error::not_found("recipe", recipe_id));
                }
                Ok(query::insert_component(&record, conn)?)
            })
            .await?;
        log::info!("added component {} to recipe {}", component.id, recipe_id);
        Ok(component)
    }

    pub async fn update_component(
        &self,
        id: RecordId,
        form: ComponentForm,
    ) -> Result<DishComponent, Error> {
        form.validate()?;
        let component = self
            .store
            .run(move |conn| {
                let existing = query::find_component(id, conn)?
                    .ok_or_else(|| Error::not_found("component", id))?;
                let component = form.into_component(id, existing.recipe_id);
                query::update_component(&component, conn)?;
                Ok(component)
            })
            .await?;
        log::info!("updated component {}", id);
        Ok(component)
    }

    pub async fn delete_component(&self, id: RecordId) -> Result<(), Error> {
        let rows = self
            .store
            .run(move |conn| Ok(query::delete_component(id, conn)?))
            .await?;
        expect_one(rows, "component", id)?;
        log::info!("deleted component {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn product_form(name: &str) -> ProductForm {
        ProductForm {
            name: name.into(),
            carbohydrates: 0.0,
            fats: 0.0,
            proteins: 0.0,
            calories: 0.0,
        }
    }

    #[actix_web::test]
    async fn invalid_product_is_not_saved() {
        let repo = ProductRepository::new(Store::open_in_memory().unwrap());
        let mut form = product_form("Сахар");
        form.calories = -5.0;

        assert!(matches!(
            repo.add(form).await,
            Err(Error::Validation {
                field: "calories",
                ..
            })
        ));
        assert!(repo.all().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn missing_records_are_not_found() {
        let store = Store::open_in_memory().unwrap();
        let products = ProductRepository::new(store.clone());
        let purchases = PurchaseRepository::new(store);
        let ghost = RecordId::new();

        assert!(matches!(
            products.update(ghost, product_form("Соль")).await,
            Err(Error::NotFound {
                kind: "product",
                ..
            })
        ));
        assert!(matches!(
            products.delete(ghost).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            purchases.set_bought(ghost, true).await,
            Err(Error::NotFound { .. })
        ));
        let item = ItemForm {
            name: "Хлеб".into(),
            weight: 1.0,
            weight_unit: Default::default(),
            price: 40.0,
            total: None,
            bought: false,
        };
        assert!(matches!(
            purchases.add_item(ghost, item).await,
            Err(Error::NotFound {
                kind: "purchase list",
                ..
            })
        ));
    }

    #[actix_web::test]
    async fn item_update_keeps_its_list() {
        let purchases = PurchaseRepository::new(Store::open_in_memory().unwrap());
        let list = purchases
            .add_list(PurchaseListForm {
                name: "Пятёрочка".into(),
                size: 1,
                created_on: None,
            })
            .await
            .unwrap();
        let form = ItemForm {
            name: "Кефир".into(),
            weight: 1.0,
            weight_unit: Default::default(),
            price: 80.0,
            total: Some(80.0),
            bought: false,
        };
        let item = purchases.add_item(list.id, form.clone()).await.unwrap();

        let updated = purchases
            .update_item(
                item.id,
                ItemForm {
                    total: Some(160.0),
                    ..form
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.list_id, list.id);
        assert_eq!(purchases.items_for(list.id).await.unwrap(), vec![updated]);
    }

    #[actix_web::test]
    async fn renaming_a_list_keeps_its_creation_date() {
        let store = Store::open_in_memory().unwrap();
        let purchases = PurchaseRepository::new(store.clone());
        let dishes = DishRepository::new(store);
        let created_on = NaiveDate::from_ymd_opt(2020, 1, 2);

        let list = purchases
            .add_list(PurchaseListForm {
                name: "A".into(),
                size: 1,
                created_on,
            })
            .await
            .unwrap();
        let renamed = purchases
            .update_list(
                list.id,
                PurchaseListForm {
                    name: "B".into(),
                    size: 2,
                    created_on: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(Some(renamed.created_on), created_on);
        assert_eq!(purchases.all_lists().await.unwrap(), vec![renamed]);

        let menu = dishes
            .add_list(DishListForm {
                name: "Меню".into(),
                size: 1,
                created_on,
            })
            .await
            .unwrap();
        let renamed = dishes
            .update_list(
                menu.id,
                DishListForm {
                    name: "Праздник".into(),
                    size: 3,
                    created_on: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(Some(renamed.created_on), created_on);
        assert_eq!(dishes.all_lists().await.unwrap(), vec![renamed]);

        assert!(matches!(
            purchases
                .update_list(
                    RecordId::new(),
                    PurchaseListForm {
                        name: "C".into(),
                        size: 0,
                        created_on: None,
                    },
                )
                .await,
            Err(Error::NotFound {
                kind: "purchase list",
                ..
            })
        ));
    }

    #[actix_web::test]
    async fn deleting_a_recipe_removes_its_components() {
        let dishes = DishRepository::new(Store::open_in_memory().unwrap());
        let list = dishes
            .add_list(DishListForm {
                name: "Обед".into(),
                size: 2,
                created_on: None,
            })
            .await
            .unwrap();
        let recipe = dishes
            .add_recipe(
                list.id,
                RecipeForm {
                    name: "Плов".into(),
                    portions: 6,
                },
            )
            .await
            .unwrap();
        dishes
            .add_component(
                recipe.id,
                ComponentForm {
                    name: "Рис".into(),
                    weight: 500.0,
                    weight_unit: Default::default(),
                },
            )
            .await
            .unwrap();

        dishes.delete_recipe(recipe.id).await.unwrap();
        assert!(dishes.components_for(recipe.id).await.unwrap().is_empty());
        assert!(dishes.recipes_for(list.id).await.unwrap().is_empty());
    }
}
