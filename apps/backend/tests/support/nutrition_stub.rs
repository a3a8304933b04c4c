use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fittrack::services::nutrition::{FoodItem, NutritionClient, NutritionError};

/// In-process stand-in for Open Food Facts.
#[derive(Default)]
pub struct StubNutrition {
    products: HashMap<String, FoodItem>,
    broken: HashSet<String>,
    calls: AtomicUsize,
}

impl StubNutrition {
    /// Both meal-plan products, with easy-to-sum values.
    pub fn with_sample_products() -> Self {
        Self::default()
            .with_product("3274080005003", "Spring water", 0.0, 0.0, 0.0, 0.0)
            .with_product("3017620425035", "Hazelnut spread", 539.0, 6.3, 57.5, 30.9)
    }

    pub fn with_product(
        mut self,
        barcode: &str,
        name: &str,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
    ) -> Self {
        self.products.insert(
            barcode.to_string(),
            FoodItem {
                name: name.to_string(),
                barcode: barcode.to_string(),
                calories,
                protein,
                carbs,
                fat,
            },
        );
        self
    }

    /// Lookups for `barcode` fail as if the upstream timed out.
    pub fn with_outage(mut self, barcode: &str) -> Self {
        self.products.remove(barcode);
        self.broken.insert(barcode.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NutritionClient for StubNutrition {
    async fn lookup(&self, barcode: &str) -> Result<FoodItem, NutritionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.contains(barcode) {
            return Err(NutritionError::Upstream("timed out".to_string()));
        }
        self.products
            .get(barcode)
            .cloned()
            .ok_or_else(|| NutritionError::NotFound(barcode.to_string()))
    }
}
