table! {
    products (id) {
        id -> Text,
        name -> Text,
        carbohydrates -> Double,
        fats -> Double,
        proteins -> Double,
        calories -> Double,
    }
}

table! {
    purchase_lists (id) {
        id -> Text,
        name -> Text,
        size -> Integer,
        created_on -> Date,
    }
}

table! {
    items (id) {
        id -> Text,
        list_id -> Text,
        name -> Text,
        weight -> Double,
        weight_unit -> Text,
        price -> Double,
        total -> Double,
        bought -> Bool,
    }
}

table! {
    dish_lists (id) {
        id -> Text,
        name -> Text,
        size -> Integer,
        created_on -> Date,
    }
}

table! {
    recipes (id) {
        id -> Text,
        dish_list_id -> Text,
        name -> Text,
        portions -> Integer,
    }
}

table! {
    dish_components (id) {
        id -> Text,
        recipe_id -> Text,
        name -> Text,
        weight -> Double,
        weight_unit -> Text,
    }
}

joinable!(items -> purchase_lists (list_id));
joinable!(recipes -> dish_lists (dish_list_id));
joinable!(dish_components -> recipes (recipe_id));

allow_tables_to_appear_in_same_query!(
    products,
    purchase_lists,
    items,
    dish_lists,
    recipes,
    dish_components,
);

/// DDL applied to every pooled connection when it is first handed out.
pub(crate) const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    carbohydrates DOUBLE NOT NULL,
    fats DOUBLE NOT NULL,
    proteins DOUBLE NOT NULL,
    calories DOUBLE NOT NULL
);
CREATE TABLE IF NOT EXISTS purchase_lists (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    size INTEGER NOT NULL,
    created_on TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY NOT NULL,
    list_id TEXT NOT NULL REFERENCES purchase_lists (id),
    name TEXT NOT NULL,
    weight DOUBLE NOT NULL,
    weight_unit TEXT NOT NULL,
    price DOUBLE NOT NULL,
    total DOUBLE NOT NULL,
    bought BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS items_list_id ON items (list_id);
CREATE TABLE IF NOT EXISTS dish_lists (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    size INTEGER NOT NULL,
    created_on TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS recipes (
    id TEXT PRIMARY KEY NOT NULL,
    dish_list_id TEXT NOT NULL REFERENCES dish_lists (id),
    name TEXT NOT NULL,
    portions INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS recipes_dish_list_id ON recipes (dish_list_id);
CREATE TABLE IF NOT EXISTS dish_components (
    id TEXT PRIMARY KEY NOT NULL,
    recipe_id TEXT NOT NULL REFERENCES recipes (id),
    name TEXT NOT NULL,
    weight DOUBLE NOT NULL,
    weight_unit TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS dish_components_recipe_id ON dish_components (recipe_id);
";
