//! Nutrition lookups against Open Food Facts, and meal plans built from them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::NutritionConfig;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// Products every meal plan is assembled from.
pub const SAMPLE_BARCODES: [&str; 2] = ["3274080005003", "3017620425035"];

/// Per-100 g nutrition facts for one product. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub barcode: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealPlan {
    pub user_id: i64,
    pub goal: String,
    pub foods: Vec<FoodItem>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum NutritionError {
    #[error("product {0} not found")]
    NotFound(String),
    #[error("nutrition service failed: {0}")]
    Upstream(String),
}

impl From<NutritionError> for AppError {
    fn from(e: NutritionError) -> Self {
        match e {
            NutritionError::NotFound(barcode) => AppError::not_found(
                ErrorCode::ProductNotFound,
                format!("No product found for barcode {barcode}"),
            ),
            NutritionError::Upstream(_) => {
                AppError::upstream("Nutrition service is unavailable, try again later")
            }
        }
    }
}

#[async_trait]
pub trait NutritionClient: Send + Sync {
    async fn lookup(&self, barcode: &str) -> Result<FoodItem, NutritionError>;
}

/// Barcodes are EAN/UPC style digit strings; anything else never reaches the wire.
pub fn is_valid_barcode(barcode: &str) -> bool {
    (4..=32).contains(&barcode.len()) && barcode.bytes().all(|b| b.is_ascii_digit())
}

pub struct OpenFoodFactsClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(config: &NutritionConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("fittrack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v2/product/{barcode}.json", self.base_url)
    }
}

#[async_trait]
impl NutritionClient for OpenFoodFactsClient {
    async fn lookup(&self, barcode: &str) -> Result<FoodItem, NutritionError> {
        let url = self.product_url(barcode);
        debug!(barcode, "nutrition_lookup=start");

        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!(barcode, error = %e, "nutrition_lookup=transport_failed");
            NutritionError::Upstream(e.to_string())
        })?;

        let status = response.status();
        // OFF answers unknown products with 404 and a status-0 body.
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            warn!(barcode, status = status.as_u16(), "nutrition_lookup=bad_status");
            return Err(NutritionError::Upstream(format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| NutritionError::Upstream(e.to_string()))?;
        parse_product(barcode, &body)
    }
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    nutriments: serde_json::Map<String, Value>,
}

/// OFF mixes numbers and numeric strings; anything unusable counts as 0.
fn nutriment(map: &serde_json::Map<String, Value>, key: &str) -> f64 {
    match map.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Decode an OFF v2 product document.
pub fn parse_product(barcode: &str, body: &[u8]) -> Result<FoodItem, NutritionError> {
    let envelope: ProductEnvelope = serde_json::from_slice(body)
        .map_err(|e| NutritionError::Upstream(format!("unreadable response: {e}")))?;

    let found = match &envelope.status {
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s == "1" || s == "success",
        _ => false,
    };
    let product = match envelope.product {
        Some(product) if found => product,
        _ => return Err(NutritionError::NotFound(barcode.to_string())),
    };

    let n = &product.nutriments;
    Ok(FoodItem {
        name: product.product_name.unwrap_or_default(),
        barcode: barcode.to_string(),
        calories: nutriment(n, "energy-kcal_100g"),
        protein: nutriment(n, "proteins_100g"),
        carbs: nutriment(n, "carbohydrates_100g"),
        fat: nutriment(n, "fat_100g"),
    })
}

/// Look up the sample products and total them. Failed lookups are skipped.
pub async fn build_meal_plan(client: &dyn NutritionClient, user_id: i64, goal: String) -> MealPlan {
    let mut foods = Vec::with_capacity(SAMPLE_BARCODES.len());
    for barcode in SAMPLE_BARCODES {
        match client.lookup(barcode).await {
            Ok(food) => foods.push(food),
            Err(e) => warn!(barcode, error = %e, "meal_plan=skip_product"),
        }
    }

    MealPlan {
        user_id,
        goal,
        total_calories: foods.iter().map(|f| f.calories).sum(),
        total_protein: foods.iter().map(|f| f.protein).sum(),
        total_carbs: foods.iter().map(|f| f.carbs).sum(),
        total_fat: foods.iter().map(|f| f.fat).sum(),
        foods,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Fixed(HashMap<&'static str, FoodItem>);

    #[async_trait]
    impl NutritionClient for Fixed {
        async fn lookup(&self, barcode: &str) -> Result<FoodItem, NutritionError> {
            self.0
                .get(barcode)
                .cloned()
                .ok_or_else(|| NutritionError::Upstream("offline".into()))
        }
    }

    fn food(barcode: &str, calories: f64) -> FoodItem {
        FoodItem {
            name: format!("item {barcode}"),
            barcode: barcode.to_string(),
            calories,
            protein: 1.5,
            carbs: 10.0,
            fat: 2.0,
        }
    }

    #[test]
    fn parses_numbers_and_numeric_strings() {
        let body = br#"{
            "code": "3017620425035",
            "status": 1,
            "product": {
                "product_name": "Nutella",
                "nutriments": {
                    "energy-kcal_100g": 539,
                    "proteins_100g": "6.3",
                    "carbohydrates_100g": 57.5,
                    "fat_100g": "n/a"
                }
            }
        }"#;
        let item = parse_product("3017620425035", body).unwrap();
        assert_eq!(item.name, "Nutella");
        assert_eq!(item.calories, 539.0);
        assert_eq!(item.protein, 6.3);
        assert_eq!(item.carbs, 57.5);
        assert_eq!(item.fat, 0.0);
    }

    #[test]
    fn status_zero_is_not_found() {
        let body = br#"{"code":"000","status":0,"status_verbose":"product not found"}"#;
        assert_eq!(
            parse_product("0000", body),
            Err(NutritionError::NotFound("0000".into()))
        );
    }

    #[test]
    fn garbage_is_upstream_failure() {
        assert!(matches!(
            parse_product("1234", b"<html>busy</html>"),
            Err(NutritionError::Upstream(_))
        ));
    }

    #[test]
    fn barcode_shape() {
        assert!(is_valid_barcode("3017620425035"));
        assert!(!is_valid_barcode(""));
        assert!(!is_valid_barcode("12"));
        assert!(!is_valid_barcode("../../etc"));
        assert!(!is_valid_barcode("30176204250 35"));
    }

    #[test]
    fn product_url_has_no_double_slash() {
        let client = OpenFoodFactsClient::new(&NutritionConfig {
            base_url: "http://localhost:9000/".into(),
            ..NutritionConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.product_url("123456"),
            "http://localhost:9000/api/v2/product/123456.json"
        );
    }

    #[tokio::test]
    async fn meal_plan_totals_and_skips_failures() {
        let client = Fixed(HashMap::from([
            ("3274080005003", food("3274080005003", 100.0)),
            ("3017620425035", food("3017620425035", 539.0)),
        ]));
        let plan = build_meal_plan(&client, 9, "hypertrophy".into()).await;
        assert_eq!(plan.foods.len(), 2);
        assert_eq!(plan.total_calories, 639.0);
        assert_eq!(plan.total_protein, 3.0);
        assert_eq!(plan.total_carbs, 20.0);
        assert_eq!(plan.total_fat, 4.0);

        let partial = Fixed(HashMap::from([("3017620425035", food("3017620425035", 539.0))]));
        let plan = build_meal_plan(&partial, 9, "lose_weight".into()).await;
        assert_eq!(plan.foods.len(), 1);
        assert_eq!(plan.total_calories, 539.0);
        assert_eq!(plan.goal, "lose_weight");
    }

    #[test]
    fn errors_map_to_problem_codes() {
        let nf: AppError = NutritionError::NotFound("1234".into()).into();
        assert_eq!(nf.code(), ErrorCode::ProductNotFound);
        let up: AppError = NutritionError::Upstream("boom".into()).into();
        assert_eq!(up.code(), ErrorCode::NutritionUpstream);
    }
}
