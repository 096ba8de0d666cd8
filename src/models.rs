use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::NaiveDate;
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::schema::{dish_components, dish_lists, items, products, purchase_lists, recipes};

/// 128-bit row identifier, stored as hyphenated text.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsExpression,
    FromSqlRow,
)]
#[serde(transparent)]
#[sql_type = "Text"]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        RecordId(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hyphenated())
    }
}

impl ToSql<Text, Sqlite> for RecordId {
    fn to_sql<W: Write>(&self, out: &mut Output<W, Sqlite>) -> serialize::Result {
        out.write_all(self.to_string().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for RecordId {
    fn from_sql(value: Option<&<Sqlite as Backend>::RawValue>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(RecordId(Uuid::parse_str(&text)?))
    }
}

/// Unit tag carried next to every weight.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[sql_type = "Text"]
pub enum WeightUnit {
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "pcs")]
    Piece,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Gram => "g",
            WeightUnit::Kilogram => "kg",
            WeightUnit::Milliliter => "ml",
            WeightUnit::Liter => "l",
            WeightUnit::Piece => "pcs",
        }
    }
}

impl Default for WeightUnit {
    fn default() -> Self {
        WeightUnit::Gram
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "g" => Ok(WeightUnit::Gram),
            "kg" => Ok(WeightUnit::Kilogram),
            "ml" => Ok(WeightUnit::Milliliter),
            "l" => Ok(WeightUnit::Liter),
            "pcs" => Ok(WeightUnit::Piece),
            other => Err(format!("unknown weight unit `{}`", other)),
        }
    }
}

impl ToSql<Text, Sqlite> for WeightUnit {
    fn to_sql<W: Write>(&self, out: &mut Output<W, Sqlite>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for WeightUnit {
    fn from_sql(value: Option<&<Sqlite as Backend>::RawValue>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        text.parse().map_err(Into::into)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[table_name = "products"]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    pub carbohydrates: f64,
    pub fats: f64,
    pub proteins: f64,
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[table_name = "purchase_lists"]
pub struct PurchaseList {
    pub id: RecordId,
    pub name: String,
    pub size: i32,
    pub created_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[table_name = "items"]
pub struct Item {
    pub id: RecordId,
    pub list_id: RecordId,
    pub name: String,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub price: f64,
    /// Caller-supplied and authoritative; not re-derived from price and weight.
    pub total: f64,
    pub bought: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[table_name = "dish_lists"]
pub struct DishList {
    pub id: RecordId,
    pub name: String,
    pub size: i32,
    pub created_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[table_name = "recipes"]
pub struct Recipe {
    pub id: RecordId,
    pub dish_list_id: RecordId,
    pub name: String,
    pub portions: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[table_name = "dish_components"]
pub struct DishComponent {
    pub id: RecordId,
    pub recipe_id: RecordId,
    pub name: String,
    pub weight: f64,
    pub weight_unit: WeightUnit,
}

// user input, checked before any record is built

fn check_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::validation("name", "must not be empty"));
    }
    Ok(())
}

fn check_quantity(field: &'static str, value: f64) -> Result<(), Error> {
    if !value.is_finite() {
        return Err(Error::validation(field, "must be a number"));
    }
    if value < 0.0 {
        return Err(Error::validation(field, "must not be negative"));
    }
    Ok(())
}

fn check_count(field: &'static str, value: i32) -> Result<(), Error> {
    if value < 0 {
        return Err(Error::validation(field, "must not be negative"));
    }
    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub carbohydrates: f64,
    pub fats: f64,
    pub proteins: f64,
    pub calories: f64,
}

impl ProductForm {
    pub fn validate(&self) -> Result<(), Error> {
        check_name(&self.name)?;
        check_quantity("carbohydrates", self.carbohydrates)?;
        check_quantity("fats", self.fats)?;
        check_quantity("proteins", self.proteins)?;
        check_quantity("calories", self.calories)
    }

    pub fn into_product(self, id: RecordId) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            carbohydrates: self.carbohydrates,
            fats: self.fats,
            proteins: self.proteins,
            calories: self.calories,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseListForm {
    pub name: String,
    pub size: i32,
    #[serde(default)]
    pub created_on: Option<NaiveDate>,
}

impl PurchaseListForm {
    pub fn validate(&self) -> Result<(), Error> {
        check_name(&self.name)?;
        check_count("size", self.size)
    }

    pub fn into_list(self, id: RecordId) -> PurchaseList {
        let created_on = self.created_on.unwrap_or_else(today);
        self.dated(id, created_on)
    }

    /// Replacement for `existing`; an omitted date keeps the stored one.
    pub fn into_replacement(self, existing: &PurchaseList) -> PurchaseList {
        let created_on = self.created_on.unwrap_or(existing.created_on);
        self.dated(existing.id, created_on)
    }

    fn dated(self, id: RecordId, created_on: NaiveDate) -> PurchaseList {
        PurchaseList {
            id,
            name: self.name.trim().to_string(),
            size: self.size,
            created_on,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemForm {
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    pub price: f64,
    /// Falls back to `price * weight` when omitted.
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub bought: bool,
}

impl ItemForm {
    pub fn validate(&self) -> Result<(), Error> {
        check_name(&self.name)?;
        check_quantity("weight", self.weight)?;
        check_quantity("price", self.price)?;
        // a derived total is checked like a supplied one
        let total = self.total.unwrap_or(self.price * self.weight);
        check_quantity("total", total)
    }

    pub fn into_item(self, id: RecordId, list_id: RecordId) -> Item {
        let total = self.total.unwrap_or(self.price * self.weight);
        Item {
            id,
            list_id,
            name: self.name.trim().to_string(),
            weight: self.weight,
            weight_unit: self.weight_unit,
            price: self.price,
            total,
            bought: self.bought,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishListForm {
    pub name: String,
    pub size: i32,
    #[serde(default)]
    pub created_on: Option<NaiveDate>,
}

impl DishListForm {
    pub fn validate(&self) -> Result<(), Error> {
        check_name(&self.name)?;
        check_count("size", self.size)
    }

    pub fn into_list(self, id: RecordId) -> DishList {
        let created_on = self.created_on.unwrap_or_else(today);
        self.dated(id, created_on)
    }

    /// Replacement for `existing`; an omitted date keeps the stored one.
    pub fn into_replacement(self, existing: &DishList) -> DishList {
        let created_on = self.created_on.unwrap_or(existing.created_on);
        self.dated(existing.id, created_on)
    }

    fn dated(self, id: RecordId, created_on: NaiveDate) -> DishList {
        DishList {
            id,
            name: self.name.trim().to_string(),
            size: self.size,
            created_on,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeForm {
    pub name: String,
    pub portions: i32,
}

impl RecipeForm {
    pub fn validate(&self) -> Result<(), Error> {
        check_name(&self.name)?;
        check_count("portions", self.portions)
    }

    pub fn into_recipe(self, id: RecordId, dish_list_id: RecordId) -> Recipe {
        Recipe {
            id,
            dish_list_id,
            name: self.name.trim().to_string(),
            portions: self.portions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentForm {
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub weight_unit: WeightUnit,
}

impl ComponentForm {
    pub fn validate(&self) -> Result<(), Error> {
        check_name(&self.name)?;
        check_quantity("weight", self.weight)
    }

    pub fn into_component(self, id: RecordId, recipe_id: RecordId) -> DishComponent {
        DishComponent {
            id,
            recipe_id,
            name: self.name.trim().to_string(),
            weight: self.weight,
            weight_unit: self.weight_unit,
        }
    }
}
