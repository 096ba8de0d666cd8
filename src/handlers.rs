use std::collections::HashMap;

use actix_web::{delete, get, post, put, web, Error, HttpResponse};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::models::{
    ComponentForm, DishListForm, ItemForm, ProductForm, PurchaseListForm, RecipeForm, RecordId,
};
use crate::numerals;
use crate::ranking::{self, ListCost};
use crate::repository::{DishRepository, ProductRepository, PurchaseRepository};
use crate::state::UiState;
use crate::store::Store;
use crate::voice::{self, Route, VoiceCommand};

// products

#[get("/apis/products")]
async fn get_products(repo: web::Data<ProductRepository>) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.all().await?))
}

#[post("/apis/products")]
async fn add_product(
    repo: web::Data<ProductRepository>,
    form: web::Json<ProductForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Created().json(repo.add(form.into_inner()).await?))
}

#[put("/apis/products/{id}")]
async fn update_product(
    repo: web::Data<ProductRepository>,
    id: web::Path<RecordId>,
    form: web::Json<ProductForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.update(id.into_inner(), form.into_inner()).await?))
}

#[delete("/apis/products/{id}")]
async fn delete_product(
    repo: web::Data<ProductRepository>,
    id: web::Path<RecordId>,
) -> Result<HttpResponse, Error> {
    repo.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// purchase lists

#[get("/apis/purchases")]
async fn get_purchase_lists(repo: web::Data<PurchaseRepository>) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.all_lists().await?))
}

#[post("/apis/purchases")]
async fn add_purchase_list(
    repo: web::Data<PurchaseRepository>,
    form: web::Json<PurchaseListForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Created().json(repo.add_list(form.into_inner()).await?))
}

#[put("/apis/purchases/{id}")]
async fn update_purchase_list(
    repo: web::Data<PurchaseRepository>,
    id: web::Path<RecordId>,
    form: web::Json<PurchaseListForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.update_list(id.into_inner(), form.into_inner()).await?))
}

#[delete("/apis/purchases/{id}")]
async fn delete_purchase_list(
    repo: web::Data<PurchaseRepository>,
    id: web::Path<RecordId>,
) -> Result<HttpResponse, Error> {
    repo.delete_list(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/apis/purchases/{id}/items")]
async fn get_items(
    repo: web::Data<PurchaseRepository>,
    id: web::Path<RecordId>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.items_for(id.into_inner()).await?))
}

#[post("/apis/purchases/{id}/items")]
async fn add_item(
    repo: web::Data<PurchaseRepository>,
    id: web::Path<RecordId>,
    form: web::Json<ItemForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Created().json(repo.add_item(id.into_inner(), form.into_inner()).await?))
}

#[put("/apis/items/{id}")]
async fn update_item(
    repo: web::Data<PurchaseRepository>,
    id: web::Path<RecordId>,
    form: web::Json<ItemForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.update_item(id.into_inner(), form.into_inner()).await?))
}

#[derive(Debug, Deserialize)]
struct BoughtFlag {
    bought: bool,
}

#[put("/apis/items/{id}/bought")]
async fn set_item_bought(
    repo: web::Data<PurchaseRepository>,
    id: web::Path<RecordId>,
    flag: web::Json<BoughtFlag>,
) -> Result<HttpResponse, Error> {
    repo.set_bought(id.into_inner(), flag.bought).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/apis/items/{id}")]
async fn delete_item(
    repo: web::Data<PurchaseRepository>,
    id: web::Path<RecordId>,
) -> Result<HttpResponse, Error> {
    repo.delete_item(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// dish lists, recipes, components

#[get("/apis/dishes")]
async fn get_dish_lists(repo: web::Data<DishRepository>) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.all_lists().await?))
}

#[post("/apis/dishes")]
async fn add_dish_list(
    repo: web::Data<DishRepository>,
    form: web::Json<DishListForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Created().json(repo.add_list(form.into_inner()).await?))
}

#[put("/apis/dishes/{id}")]
async fn update_dish_list(
    repo: web::Data<DishRepository>,
    id: web::Path<RecordId>,
    form: web::Json<DishListForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.update_list(id.into_inner(), form.into_inner()).await?))
}

#[delete("/apis/dishes/{id}")]
async fn delete_dish_list(
    repo: web::Data<DishRepository>,
    id: web::Path<RecordId>,
) -> Result<HttpResponse, Error> {
    repo.delete_list(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/apis/dishes/{id}/recipes")]
async fn get_recipes(
    repo: web::Data<DishRepository>,
    id: web::Path<RecordId>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.recipes_for(id.into_inner()).await?))
}

#[post("/apis/dishes/{id}/recipes")]
async fn add_recipe(
    repo: web::Data<DishRepository>,
    id: web::Path<RecordId>,
    form: web::Json<RecipeForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Created().json(repo.add_recipe(id.into_inner(), form.into_inner()).await?))
}

#[put("/apis/recipes/{id}")]
async fn update_recipe(
    repo: web::Data<DishRepository>,
    id: web::Path<RecordId>,
    form: web::Json<RecipeForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.update_recipe(id.into_inner(), form.into_inner()).await?))
}

#[delete("/apis/recipes/{id}")]
async fn delete_recipe(
    repo: web::Data<DishRepository>,
    id: web::Path<RecordId>,
) -> Result<HttpResponse, Error> {
    repo.delete_recipe(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/apis/recipes/{id}/components")]
async fn get_components(
    repo: web::Data<DishRepository>,
    id: web::Path<RecordId>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.components_for(id.into_inner()).await?))
}

#[post("/apis/recipes/{id}/components")]
async fn add_component(
    repo: web::Data<DishRepository>,
    id: web::Path<RecordId>,
    form: web::Json<ComponentForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Created().json(repo.add_component(id.into_inner(), form.into_inner()).await?))
}

#[put("/apis/components/{id}")]
async fn update_component(
    repo: web::Data<DishRepository>,
    id: web::Path<RecordId>,
    form: web::Json<ComponentForm>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(repo.update_component(id.into_inner(), form.into_inner()).await?))
}

#[delete("/apis/components/{id}")]
async fn delete_component(
    repo: web::Data<DishRepository>,
    id: web::Path<RecordId>,
) -> Result<HttpResponse, Error> {
    repo.delete_component(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// graphs

/// Fetches every list's items concurrently, then computes each list's cost.
async fn spending(repo: &PurchaseRepository) -> Result<Vec<ListCost>, crate::error::Error> {
    let lists = repo.all_lists().await?;
    let items = try_join_all(lists.iter().map(|list| repo.items_for(list.id))).await?;
    let by_list: HashMap<RecordId, _> = lists.iter().map(|list| list.id).zip(items).collect();
    ranking::list_costs(&lists, |id| {
        Ok(by_list.get(id).cloned().unwrap_or_default())
    })
}

// failures are reported in the body, the way the graph screen shows them

#[get("/apis/graphs/top")]
async fn get_top_lists(repo: web::Data<PurchaseRepository>) -> HttpResponse {
    let ranked = spending(&repo)
        .await
        .map(|costs| ranking::rank(costs, ranking::TOP_LIST_LIMIT));
    HttpResponse::Ok().json(UiState::from(ranked))
}

#[get("/apis/graphs/spending")]
async fn get_spending(repo: web::Data<PurchaseRepository>) -> HttpResponse {
    HttpResponse::Ok().json(UiState::from(spending(&repo).await))
}

// voice

#[derive(Debug, Deserialize)]
struct Transcript {
    transcript: String,
}

#[derive(Debug, Serialize)]
struct Interpretation {
    command: VoiceCommand,
    route: Option<Route>,
}

#[post("/apis/voice")]
async fn interpret_voice(body: web::Json<Transcript>) -> HttpResponse {
    let command = voice::interpret(&body.transcript);
    log::debug!("voice transcript {:?} -> {:?}", body.transcript, command);
    HttpResponse::Ok().json(Interpretation {
        command,
        route: command.route(),
    })
}

#[derive(Debug, Deserialize)]
struct NumeralText {
    text: String,
}

#[post("/apis/numerals")]
async fn parse_numeral(body: web::Json<NumeralText>) -> HttpResponse {
    match numerals::parse(&body.text) {
        Ok(value) => HttpResponse::Ok().json(serde_json::json!({ "value": value })),
        Err(err) => HttpResponse::UnprocessableEntity()
            .json(serde_json::json!({ "error": err.to_string() })),
    }
}

/// Registers the repositories and every route on an `App`.
pub fn routes(store: Store) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(ProductRepository::new(store.clone())))
            .app_data(web::Data::new(PurchaseRepository::new(store.clone())))
            .app_data(web::Data::new(DishRepository::new(store)))
            .service(get_products)
            .service(add_product)
            .service(update_product)
            .service(delete_product)
            .service(get_purchase_lists)
            .service(add_purchase_list)
            .service(update_purchase_list)
            .service(delete_purchase_list)
            .service(get_items)
            .service(add_item)
            .service(update_item)
            .service(set_item_bought)
            .service(delete_item)
            .service(get_dish_lists)
            .service(add_dish_list)
            .service(update_dish_list)
            .service(delete_dish_list)
            .service(get_recipes)
            .service(add_recipe)
            .service(update_recipe)
            .service(delete_recipe)
            .service(get_components)
            .service(add_component)
            .service(update_component)
            .service(delete_component)
            .service(get_top_lists)
            .service(get_spending)
            .service(interpret_voice)
            .service(parse_numeral);
    }
}
