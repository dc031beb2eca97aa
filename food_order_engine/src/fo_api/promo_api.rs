use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewPromo, Promo},
    fo_api::{errors::PromoError, promo_redemption},
    traits::{FoodOrderDatabase, Page, Pagination, PromoStore, StorageError, UnitOfWork},
};

/// `PromoApi` manages promo codes: creating and removing them, listing them, and checking whether a customer may use
/// one.
///
/// Promos are consumed by [`crate::OrderFlowApi::place_order`], never through this API.
pub struct PromoApi<B> {
    db: B,
}

impl<B> Debug for PromoApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PromoApi")
    }
}

impl<B> PromoApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> PromoApi<B>
where B: FoodOrderDatabase
{
    pub async fn create_promo(&self, promo: NewPromo) -> Result<Promo, PromoError> {
        promo_redemption::validate_new_promo(&promo, Utc::now())?;
        let code = promo.promo_code.clone();
        let mut tx = self.db.begin().await?;
        let promo = tx.insert_promo(promo).await.map_err(|e| match e {
            StorageError::AlreadyExists(_) => PromoError::PromoAlreadyExists(code.clone()),
            e => e.into(),
        })?;
        tx.commit().await?;
        info!("🎟️ Promo {} ({}) created by {}", promo.promo_code, promo.discount(), promo.employee_id);
        Ok(promo)
    }

    pub async fn delete_promo(&self, id: i64) -> Result<(), PromoError> {
        let mut tx = self.db.begin().await?;
        if !tx.delete_promo(id).await? {
            return Err(PromoError::PromoNotFound(format!("#{id}")));
        }
        tx.commit().await?;
        info!("🎟️ Promo #{id} deleted");
        Ok(())
    }

    pub async fn promo_by_code(&self, code: &str) -> Result<Option<Promo>, PromoError> {
        let mut tx = self.db.begin().await?;
        let promo = tx.fetch_promo_by_code(code).await?;
        tx.commit().await?;
        Ok(promo)
    }

    /// Checks whether the customer could use the promo code right now, without consuming it.
    pub async fn check_promo(&self, code: &str, customer_id: &str) -> Result<Promo, PromoError> {
        let mut tx = self.db.begin().await?;
        let promo = promo_redemption::redeem(&mut tx, code, customer_id, Utc::now()).await?;
        tx.commit().await?;
        Ok(promo)
    }

    /// All promos, newest first.
    pub async fn all_promos(&self, page: Pagination) -> Result<Page<Promo>, PromoError> {
        let mut tx = self.db.begin().await?;
        let total_rows = tx.count_promos().await?;
        let promos = tx.promos(page).await?;
        tx.commit().await?;
        Ok(Page::new(promos, page.paging(total_rows)))
    }

    /// Promos the customer has not used yet, newest first.
    pub async fn promos_available_for_customer(
        &self,
        customer_id: &str,
        page: Pagination,
    ) -> Result<Page<Promo>, PromoError> {
        let mut tx = self.db.begin().await?;
        let total_rows = tx.count_promos_available_for_customer(customer_id).await?;
        let promos = tx.promos_available_for_customer(customer_id, page).await?;
        tx.commit().await?;
        Ok(Page::new(promos, page.paging(total_rows)))
    }
}
