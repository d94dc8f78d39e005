//! Checkout and checkin records

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::checkout::{Checkin, Checkout},
};

#[derive(Clone)]
pub struct CheckoutsRepository {
    checkouts: Arc<DashMap<Uuid, Checkout>>,
    /// Keyed by checkout id: at most one checkin per checkout
    checkins: Arc<DashMap<Uuid, Checkin>>,
}

impl CheckoutsRepository {
    pub fn new() -> Self {
        Self {
            checkouts: Arc::new(DashMap::new()),
            checkins: Arc::new(DashMap::new()),
        }
    }

    /// Get checkout by ID
    pub fn get(&self, id: Uuid) -> AppResult<Checkout> {
        self.checkouts
            .get(&id)
            .map(|c| c.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("Checkout {} not found", id)))
    }

    /// Insert or replace a checkout
    pub fn save(&self, checkout: Checkout) {
        self.checkouts.insert(checkout.id, checkout);
    }

    pub fn save_checkin(&self, checkin: Checkin) {
        self.checkins.insert(checkin.checkout_id, checkin);
    }

    pub fn get_checkin(&self, checkout_id: Uuid) -> Option<Checkin> {
        self.checkins.get(&checkout_id).map(|c| c.value().clone())
    }

    /// All active checkouts, oldest expected return first
    pub fn active(&self) -> Vec<Checkout> {
        let mut active: Vec<Checkout> = self
            .checkouts
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.value().clone())
            .collect();
        active.sort_by_key(|c| (c.expected_return_date, c.id));
        active
    }

    pub fn active_for_user(&self, user_id: &str) -> Vec<Checkout> {
        self.active()
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .collect()
    }

    pub fn active_for_asset(&self, asset_id: Uuid) -> Option<Checkout> {
        self.checkouts
            .iter()
            .find(|c| c.asset_id == asset_id && c.is_active())
            .map(|c| c.value().clone())
    }
}

impl Default for CheckoutsRepository {
    fn default() -> Self {
        Self::new()
    }
}
