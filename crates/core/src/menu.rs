//! Transformation functions for store menus
//!
//! A store menu arrives as one large JSON document. Its `Variants` are the
//! orderable codes, `Products`, `Coupons` and `PreconfiguredProducts` describe
//! the items, and `Categorization` arranges those items in a tree. The tree is
//! held in two arenas (`items`, `categories`) linked by index, so an item can
//! list every category it appears in and a category can walk up to its root.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// One orderable menu entry, kept exactly as the API sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variant(Map<String, Value>);

impl Variant {
    pub fn code(&self) -> String {
        self.text("Code")
    }

    pub fn name(&self) -> String {
        self.text("Name")
    }

    pub fn price(&self) -> String {
        self.text("Price")
    }

    /// Field rendered as text; missing or structured fields are empty
    pub fn text(&self, field: &str) -> String {
        match self.0.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Parse `Tags.DefaultToppings` (`"X=1,C=1"`) into topping code → amount
    pub fn toppings(&self) -> BTreeMap<String, String> {
        let defaults = self
            .0
            .get("Tags")
            .and_then(|tags| tags.get("DefaultToppings"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        defaults
            .split(',')
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((code, amount)) => (code.to_string(), amount.to_string()),
                None => (entry.to_string(), String::new()),
            })
            .collect()
    }

    /// True when every `(field, needle)` condition holds
    ///
    /// The `Toppings` field matches a default topping code; any other field
    /// matches when its text contains the needle.
    pub fn matches(&self, conditions: &[(String, String)]) -> bool {
        conditions.iter().all(|(field, needle)| {
            if field == "Toppings" {
                self.toppings().contains_key(needle)
            } else {
                self.text(field).contains(needle.as_str())
            }
        })
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

pub type ItemId = usize;
pub type CategoryId = usize;

/// A product, coupon or preconfigured product
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub code: String,
    pub name: String,
    pub data: Value,
    pub categories: Vec<CategoryId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuCategory {
    pub code: String,
    pub name: String,
    pub parent: Option<CategoryId>,
    pub subcategories: Vec<CategoryId>,
    pub products: Vec<ItemId>,
}

/// Parsed store menu
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Menu {
    pub variants: BTreeMap<String, Variant>,
    pub items: Vec<MenuItem>,
    pub categories: Vec<MenuCategory>,
    pub products: Vec<ItemId>,
    pub coupons: Vec<ItemId>,
    pub preconfigured: Vec<ItemId>,
    /// Root category per `Categorization` key, in the API's order
    pub root_categories: Vec<(String, CategoryId)>,
    by_code: HashMap<String, ItemId>,
}

impl Menu {
    /// Build a menu from the store menu endpoint's response
    ///
    /// A response without variants produces an empty menu.
    pub fn from_json(data: &Value) -> Result<Self, Error> {
        let mut menu = Menu::default();

        let Some(variants) = data.get("Variants").and_then(Value::as_object) else {
            return Ok(menu);
        };
        if variants.is_empty() {
            return Ok(menu);
        }

        for (code, variant) in variants {
            let variant: Variant = serde_json::from_value(variant.clone())
                .map_err(|e| Error::Shape(format!("variant {code}: {e}")))?;
            menu.variants.insert(code.clone(), variant);
        }

        menu.products = menu.parse_items(data.get("Products"))?;
        menu.coupons = menu.parse_items(data.get("Coupons"))?;
        menu.preconfigured = menu.parse_items(data.get("PreconfiguredProducts"))?;

        if let Some(categorization) = data.get("Categorization").and_then(Value::as_object) {
            for (key, value) in categorization {
                let root = menu.build_category(value, None)?;
                menu.root_categories.push((key.clone(), root));
            }
        }

        Ok(menu)
    }

    fn parse_items(&mut self, parent: Option<&Value>) -> Result<Vec<ItemId>, Error> {
        let Some(entries) = parent.and_then(Value::as_object) else {
            return Ok(Vec::new());
        };

        let mut ids = Vec::with_capacity(entries.len());
        for (key, data) in entries {
            let code = required_str(data, "Code", key)?;
            let name = data
                .get("Name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let id = self.items.len();
            self.items.push(MenuItem {
                code: code.clone(),
                name,
                data: data.clone(),
                categories: Vec::new(),
            });
            self.by_code.insert(code, id);
            ids.push(id);
        }

        Ok(ids)
    }

    fn build_category(&mut self, data: &Value, parent: Option<CategoryId>) -> Result<CategoryId, Error> {
        let code = required_str(data, "Code", "category")?;
        let name = data
            .get("Name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let id = self.categories.len();
        self.categories.push(MenuCategory {
            code: code.clone(),
            name,
            parent,
            subcategories: Vec::new(),
            products: Vec::new(),
        });

        for subcategory in array_of(data, "Categories") {
            let child = self.build_category(subcategory, Some(id))?;
            self.categories[id].subcategories.push(child);
        }

        for product in array_of(data, "Products") {
            let product_code = product.as_str().unwrap_or_default();
            let item = *self
                .by_code
                .get(product_code)
                .ok_or_else(|| Error::ProductNotFound {
                    product: product_code.to_string(),
                    category: code.clone(),
                })?;
            self.categories[id].products.push(item);
            self.items[item].categories.push(id);
        }

        Ok(id)
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variant(&self, code: &str) -> Option<&Variant> {
        self.variants.get(code)
    }

    pub fn item(&self, code: &str) -> Option<&MenuItem> {
        self.by_code.get(code).map(|id| &self.items[*id])
    }

    pub fn is_coupon(&self, code: &str) -> bool {
        self.coupons.iter().any(|id| self.items[*id].code == code)
    }

    pub fn root(&self, key: &str) -> Option<CategoryId> {
        self.root_categories
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, id)| *id)
    }

    /// Codes from the root category down to `id`, concatenated
    pub fn category_path(&self, id: CategoryId) -> String {
        let category = &self.categories[id];
        match category.parent {
            Some(parent) => format!("{}{}", self.category_path(parent), category.code),
            None => category.code.clone(),
        }
    }

    /// Variants satisfying every condition, ordered by code
    pub fn search(&self, conditions: &[(String, String)]) -> Vec<&Variant> {
        self.variants
            .values()
            .filter(|variant| variant.matches(conditions))
            .collect()
    }
}

fn required_str(data: &Value, field: &str, context: &str) -> Result<String, Error> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Shape(format!("{context} is missing \"{field}\"")))
}

fn array_of<'a>(data: &'a Value, field: &str) -> impl Iterator<Item = &'a Value> {
    data.get(field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Menu sections in display order: (title, categorization key)
pub const MENU_SECTIONS: [(&str, &str); 3] = [
    ("Coupon Menu", "Coupons"),
    ("Preconfigured Menu", "PreconfiguredProducts"),
    ("Regular Menu", "Food"),
];

/// Render the menu as an indented text listing
pub fn render_menu(menu: &Menu) -> String {
    let mut out = String::new();

    for (title, key) in MENU_SECTIONS {
        let Some(root) = menu.root(key) else {
            continue;
        };
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("************ {title} ************\n"));
        render_category(menu, root, 1, &mut out);
    }

    out
}

fn render_category(menu: &Menu, id: CategoryId, depth: usize, out: &mut String) {
    let category = &menu.categories[id];
    if category.products.is_empty() && category.subcategories.is_empty() {
        return;
    }

    let indent = "  ".repeat(depth + 1);
    out.push_str(&format!("{indent}{}\n", category.name));

    for subcategory in &category.subcategories {
        render_category(menu, *subcategory, depth + 1, out);
    }
    for product in &category.products {
        let item = &menu.items[*product];
        out.push_str(&format!("{indent}  [{}] {}\n", item.code, item.name));
    }
}

/// Category tree output for JSON rendering
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CategoryOutput {
    pub code: String,
    pub name: String,
    pub path: String,
    pub products: Vec<ProductOutput>,
    pub subcategories: Vec<CategoryOutput>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProductOutput {
    pub code: String,
    pub name: String,
}

/// One menu section with its category tree
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SectionOutput {
    pub title: String,
    pub key: String,
    pub category: CategoryOutput,
}

/// Transform the parsed menu into serializable sections
pub fn transform_menu(menu: &Menu) -> Vec<SectionOutput> {
    MENU_SECTIONS
        .iter()
        .filter_map(|(title, key)| {
            menu.root(key).map(|root| SectionOutput {
                title: title.to_string(),
                key: key.to_string(),
                category: category_output(menu, root),
            })
        })
        .collect()
}

fn category_output(menu: &Menu, id: CategoryId) -> CategoryOutput {
    let category = &menu.categories[id];
    CategoryOutput {
        code: category.code.clone(),
        name: category.name.clone(),
        path: menu.category_path(id),
        products: category
            .products
            .iter()
            .map(|item| ProductOutput {
                code: menu.items[*item].code.clone(),
                name: menu.items[*item].name.clone(),
            })
            .collect(),
        subcategories: category
            .subcategories
            .iter()
            .map(|child| category_output(menu, *child))
            .collect(),
    }
}

/// Search result output
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SearchHit {
    pub code: String,
    pub name: String,
    pub price: String,
    pub product_code: String,
    pub size_code: String,
    pub toppings: BTreeMap<String, String>,
}

pub fn transform_search(hits: &[&Variant]) -> Vec<SearchHit> {
    hits.iter()
        .map(|variant| SearchHit {
            code: variant.code(),
            name: variant.name(),
            price: variant.price(),
            product_code: variant.text("ProductCode"),
            size_code: variant.text("SizeCode"),
            toppings: variant.toppings(),
        })
        .collect()
}

/// Parse `FIELD=TEXT` search conditions
pub fn parse_conditions(raw: &[String]) -> Result<Vec<(String, String)>, Error> {
    raw.iter()
        .map(|condition| {
            condition
                .split_once('=')
                .map(|(field, needle)| (field.trim().to_string(), needle.trim().to_string()))
                .ok_or_else(|| Error::Shape(format!("search condition {condition:?} is not FIELD=TEXT")))
        })
        .collect()
}
