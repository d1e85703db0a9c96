use std::fmt::{self, Display};

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::error::TypeError;
use crate::constants::{PRICE_DECIMAL_PLACES, PRICE_MAX_DIGITS};

pub type Id = i64;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.to_owned(),
            name: user.name.to_owned(),
        }
    }
}

/// Monetary amount held as hundredths, exposed as a two-place decimal string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Price(i64);

impl Price {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::new("A valid number is required.");

        let input = input.trim();
        let (negative, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let significant = format!("{whole}{fraction}");
        let significant = significant.trim_start_matches('0');
        let total_digits = significant.len().max(fraction.len()).max(1);
        let whole_digits = total_digits - fraction.len().min(total_digits);

        if total_digits > PRICE_MAX_DIGITS {
            return Err(TypeError::new(&format!(
                "Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."
            )));
        }
        if fraction.len() > PRICE_DECIMAL_PLACES {
            return Err(TypeError::new(&format!(
                "Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."
            )));
        }
        if whole_digits > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
            return Err(TypeError::new(&format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
            )));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction: i64 = format!("{fraction:0<2}").parse().map_err(|_| invalid())?;

        let cents = whole * 100 + fraction;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl TryFrom<Value> for Price {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(value) => Price::parse(&value),
            Value::Number(value) => Price::parse(&value.to_string()),
            _ => Err(TypeError::new("A valid number is required.")),
        }
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Recipe {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub description: String,
}

/// Tags and ingredients share one shape and one set of handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    pub fn table(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tags",
            AttributeKind::Ingredient => "ingredients",
        }
    }

    pub fn link_table(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "recipe_tags",
            AttributeKind::Ingredient => "recipe_ingredients",
        }
    }

    pub fn link_column(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tag_id",
            AttributeKind::Ingredient => "ingredient_id",
        }
    }

    /// Name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tag",
            AttributeKind::Ingredient => "ingredient",
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub id: Id,
    pub name: String,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct LinkedAttribute {
    pub recipe_id: Id,
    pub id: Id,
    pub name: String,
}

/// Compact recipe shape used by list responses.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeRow {
    pub id: Id,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<Attribute>,
    pub ingredients: Vec<Attribute>,
}

impl RecipeRow {
    pub fn from_parts(recipe: &Recipe, tags: Vec<Attribute>, ingredients: Vec<Attribute>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.to_owned(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.to_owned(),
            tags,
            ingredients,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub row: RecipeRow,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn price_accepts_numbers_and_strings() {
        assert_eq!(Price::try_from(json!("5.00")).unwrap(), Price::from_cents(500));
        assert_eq!(Price::try_from(json!(5)).unwrap(), Price::from_cents(500));
        assert_eq!(Price::try_from(json!(4.5)).unwrap(), Price::from_cents(450));
        assert_eq!(Price::try_from(json!("0.99")).unwrap(), Price::from_cents(99));
        assert_eq!(Price::try_from(json!("-1.25")).unwrap(), Price::from_cents(-125));
        assert_eq!(Price::try_from(json!(".5")).unwrap(), Price::from_cents(50));
    }

    #[test]
    fn price_enforces_precision() {
        let message = |value: Value| Price::try_from(value).unwrap_err().to_string();

        assert_eq!(
            message(json!("1.234")),
            "Ensure that there are no more than 2 decimal places."
        );
        assert_eq!(
            message(json!("123456")),
            "Ensure that there are no more than 5 digits in total."
        );
        assert_eq!(
            message(json!("1000.0")),
            "Ensure that there are no more than 3 digits before the decimal point."
        );
        assert_eq!(message(json!("abc")), "A valid number is required.");
        assert_eq!(message(json!(true)), "A valid number is required.");
        assert_eq!(message(json!("")), "A valid number is required.");
    }

    #[test]
    fn price_renders_two_places() {
        assert_eq!(Price::from_cents(500).to_string(), "5.00");
        assert_eq!(Price::from_cents(7).to_string(), "0.07");
        assert_eq!(Price::from_cents(-150).to_string(), "-1.50");
        assert_eq!(serde_json::to_value(Price::from_cents(1999)).unwrap(), json!("19.99"));
    }

    #[test]
    fn detail_shape_flattens_row() {
        let recipe = Recipe {
            id: 3,
            user_id: 1,
            title: "Soup".into(),
            time_minutes: 20,
            price: Price::from_cents(350),
            link: String::new(),
            description: "Hot".into(),
        };
        let detail = RecipeDetail {
            row: RecipeRow::from_parts(&recipe, vec![], vec![]),
            description: recipe.description.to_owned(),
        };

        assert_eq!(
            serde_json::to_value(detail).unwrap(),
            json!({
                "id": 3,
                "title": "Soup",
                "time_minutes": 20,
                "price": "3.50",
                "link": "",
                "tags": [],
                "ingredients": [],
                "description": "Hot",
            })
        );
    }
}
