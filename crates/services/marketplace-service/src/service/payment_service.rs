//! Payment service - recording payments on hires and following up over WhatsApp.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{
    format_amount, normalize_currency, validate_price, HireStatus, NewPayment, Payment,
    PaymentChanges, PaymentMethod, PaymentStatus, WhatsAppLink, DEFAULT_CURRENCY,
};
use notification_service_lib::{NotificationHub, Severity};

use super::access::HireParties;
use super::Actor;
use crate::repository::{HireRepository, ListingRepository, PaymentRepository, ProviderRepository};

/// Input for paying a hire. Amount and currency fall back to the
/// listing price and the default currency.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub hire_id: Uuid,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn list_payments(&self, actor: Actor) -> AppResult<Vec<Payment>>;

    async fn get_payment(&self, actor: Actor, id: Uuid) -> AppResult<Payment>;

    /// Only the hire's client may pay for it
    async fn create_payment(&self, actor: Actor, input: CreatePayment) -> AppResult<Payment>;

    async fn update_payment(
        &self,
        actor: Actor,
        id: Uuid,
        changes: PaymentChanges,
    ) -> AppResult<Payment>;

    async fn delete_payment(&self, actor: Actor, id: Uuid) -> AppResult<()>;

    /// Click-to-chat link from the client to the provider about this payment
    async fn whatsapp_link(&self, actor: Actor, id: Uuid) -> AppResult<WhatsAppLink>;
}

pub struct PaymentManager {
    payments: Arc<dyn PaymentRepository>,
    hires: Arc<dyn HireRepository>,
    listings: Arc<dyn ListingRepository>,
    providers: Arc<dyn ProviderRepository>,
    notifications: NotificationHub,
}

struct PaymentContext {
    payment: Payment,
    client_id: Uuid,
    parties: HireParties,
}

impl PaymentManager {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        hires: Arc<dyn HireRepository>,
        listings: Arc<dyn ListingRepository>,
        providers: Arc<dyn ProviderRepository>,
        notifications: NotificationHub,
    ) -> Self {
        Self {
            payments,
            hires,
            listings,
            providers,
            notifications,
        }
    }

    /// Load a payment the actor is allowed to see.
    async fn visible(&self, actor: &Actor, id: Uuid) -> AppResult<PaymentContext> {
        let payment = self.payments.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        let hire = self
            .hires
            .find_by_id(payment.hire_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Payment {} has no hire", payment.id)))?;
        let parties =
            HireParties::load(self.listings.as_ref(), self.providers.as_ref(), &hire).await?;
        parties.require_party(&hire, actor)?;

        Ok(PaymentContext {
            payment,
            client_id: hire.client_id,
            parties,
        })
    }
}

fn status_severity(status: PaymentStatus) -> Severity {
    match status {
        PaymentStatus::Paid => Severity::Success,
        PaymentStatus::Failed => Severity::Error,
        PaymentStatus::Refunded => Severity::Warning,
        PaymentStatus::Pending => Severity::Info,
    }
}

#[async_trait]
impl PaymentService for PaymentManager {
    async fn list_payments(&self, actor: Actor) -> AppResult<Vec<Payment>> {
        if actor.is_admin() {
            self.payments.list_all().await
        } else {
            self.payments.list_for_user(actor.id).await
        }
    }

    async fn get_payment(&self, actor: Actor, id: Uuid) -> AppResult<Payment> {
        Ok(self.visible(&actor, id).await?.payment)
    }

    async fn create_payment(&self, actor: Actor, input: CreatePayment) -> AppResult<Payment> {
        let hire = self
            .hires
            .find_by_id(input.hire_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if hire.client_id != actor.id {
            return Err(AppError::Forbidden);
        }
        if hire.status == HireStatus::Cancelled {
            return Err(AppError::validation("Cannot pay for a cancelled hire"));
        }

        let parties =
            HireParties::load(self.listings.as_ref(), self.providers.as_ref(), &hire).await?;
        let amount_cents =
            validate_price(input.amount_cents.unwrap_or(parties.listing.price_cents))?;
        let currency = match input.currency.as_deref() {
            Some(code) => normalize_currency(code)?,
            None => DEFAULT_CURRENCY.to_string(),
        };

        let payment = self
            .payments
            .create(NewPayment {
                hire_id: hire.id,
                amount_cents,
                currency,
                method: input.method,
                reference: input.reference,
            })
            .await?;

        tracing::info!(payment_id = %payment.id, hire_id = %hire.id, "Payment created");
        self.notifications.notify(
            parties.provider_user_id(),
            format!(
                "Payment of {} started for '{}'",
                format_amount(payment.amount_cents, &payment.currency),
                parties.listing.title
            ),
            Severity::Info,
        );

        Ok(payment)
    }

    async fn update_payment(
        &self,
        actor: Actor,
        id: Uuid,
        mut changes: PaymentChanges,
    ) -> AppResult<Payment> {
        let ctx = self.visible(&actor, id).await?;
        let current = ctx.payment.status;

        let status_change = match changes.status {
            Some(next) => {
                let next = current.transition(next)?;
                (next != current).then_some(next)
            }
            None => None,
        };
        changes.status = status_change;

        let updated = self.payments.update(id, changes).await?;

        if let Some(next) = status_change {
            tracing::info!(payment_id = %id, from = %current, to = %next, "Payment status changed");
            self.notifications.notify(
                ctx.client_id,
                format!(
                    "Payment of {} for '{}' is {}",
                    format_amount(updated.amount_cents, &updated.currency),
                    ctx.parties.listing.title,
                    next
                ),
                status_severity(next),
            );
        }

        Ok(updated)
    }

    async fn delete_payment(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        actor.require_admin()?;
        self.payments.delete(id).await
    }

    async fn whatsapp_link(&self, actor: Actor, id: Uuid) -> AppResult<WhatsAppLink> {
        let ctx = self.visible(&actor, id).await?;
        let phone = ctx
            .parties
            .provider
            .phone
            .as_deref()
            .ok_or_else(|| AppError::validation("Provider has no phone number"))?;

        let message = format!(
            "Hello {}, this is about payment {} of {} for '{}'.",
            ctx.parties.provider.display_name,
            ctx.payment.id,
            format_amount(ctx.payment.amount_cents, &ctx.payment.currency),
            ctx.parties.listing.title
        );

        Ok(WhatsAppLink::new(phone, &message)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_severity() {
        assert_eq!(status_severity(PaymentStatus::Paid), Severity::Success);
        assert_eq!(status_severity(PaymentStatus::Failed), Severity::Error);
        assert_eq!(status_severity(PaymentStatus::Refunded), Severity::Warning);
    }
}
