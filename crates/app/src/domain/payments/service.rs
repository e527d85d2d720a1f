//! Payments service.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        notifications::{NotificationsService, PgNotificationsService},
        orders::{
            PgOrdersRepository,
            records::{OrderRecord, OrderUuid, PaymentMethod, PaymentStatus},
        },
        payments::{
            errors::PaymentsServiceError,
            gateway::{PaymentGateway, PaymentRequest},
        },
        users::records::UserUuid,
    },
};

/// Result of processing a provider callback.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// The callback signature did not verify.
    Rejected,
    /// The signature held but the referenced order does not exist.
    OrderNotFound,
    /// The provider reported a failed or abandoned payment.
    Failed(OrderRecord),
    /// The payment settled and the order was marked paid.
    Succeeded(OrderRecord),
}

#[derive(Clone)]
pub struct PgPaymentsService {
    db: Db,
    orders: PgOrdersRepository,
    notifications: PgNotificationsService,
    gateway: Arc<dyn PaymentGateway>,
}

impl std::fmt::Debug for PgPaymentsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgPaymentsService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, gateway: Arc<dyn PaymentGateway>) -> Self {
        let notifications = PgNotificationsService::new(db.clone());

        Self {
            db,
            orders: PgOrdersRepository::new(),
            notifications,
            gateway,
        }
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn create_payment_url(
        &self,
        user: UserUuid,
        order: OrderUuid,
        client_ip: &str,
    ) -> Result<String, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.get_order_for_user(&mut tx, order, user).await?;

        let url = self.gateway.build_payment_url(&PaymentRequest {
            order_uuid: record.uuid,
            amount_minor: record.total_price,
            client_ip: client_ip.to_string(),
        })?;

        // Issuing a redirect URL commits the order to online payment.
        self.orders
            .set_payment_method(&mut tx, order, PaymentMethod::Vnpay)
            .await?;

        tx.commit().await?;

        Ok(url)
    }

    async fn handle_callback(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<PaymentOutcome, PaymentsServiceError> {
        let verification = self.gateway.verify_callback(params)?;

        if !verification.valid {
            return Ok(PaymentOutcome::Rejected);
        }

        let Some(order_uuid) = verification.order_uuid else {
            return Ok(PaymentOutcome::OrderNotFound);
        };

        let mut tx = self.db.begin().await?;

        let order = match self.orders.get_order(&mut tx, order_uuid).await {
            Ok(order) => order,
            Err(sqlx::Error::RowNotFound) => return Ok(PaymentOutcome::OrderNotFound),
            Err(error) => return Err(error.into()),
        };

        if !verification.succeeded {
            return Ok(PaymentOutcome::Failed(order));
        }

        let paid = self
            .orders
            .set_payment_status(&mut tx, order_uuid, PaymentStatus::Success)
            .await?;

        tx.commit().await?;

        info!(order = %paid.uuid, amount = paid.total_price, "payment settled");

        if let Err(error) = self
            .notifications
            .notify(paid.user_uuid, "Your payment has been received")
            .await
        {
            warn!(user = %paid.user_uuid, %error, "failed to deliver notification");
        }

        Ok(PaymentOutcome::Succeeded(paid))
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Builds a signed redirect URL for an order the user owns and
    /// switches the order to online payment.
    async fn create_payment_url(
        &self,
        user: UserUuid,
        order: OrderUuid,
        client_ip: &str,
    ) -> Result<String, PaymentsServiceError>;

    /// Processes a provider callback, marking the order paid on
    /// success. Invalid signatures are rejected without touching any
    /// order.
    async fn handle_callback(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<PaymentOutcome, PaymentsServiceError>;
}

#[cfg(test)]
mod tests {
    use mockall::predicate::always;
    use testresult::TestResult;

    use crate::{
        domain::{
            orders::OrdersService,
            payments::gateway::{CallbackVerification, MockPaymentGateway},
        },
        test::{TestContext, helpers},
    };

    use super::*;

    fn service(ctx: &TestContext, gateway: MockPaymentGateway) -> PgPaymentsService {
        PgPaymentsService::new(ctx.app.clone(), Arc::new(gateway))
    }

    #[tokio::test]
    async fn create_payment_url_switches_order_to_online_payment() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx).await?;
        let total = order.total_price;

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_build_payment_url()
            .withf(move |request| request.amount_minor == total)
            .return_once(|_| Ok("https://pay.example/redirect?signed=1".to_string()));

        let payments = service(&ctx, gateway);
        let url = payments
            .create_payment_url(order.user_uuid, order.uuid, "203.0.113.7")
            .await?;

        assert_eq!(url, "https://pay.example/redirect?signed=1");

        let details = ctx.orders.get_order(order.uuid).await?;
        assert_eq!(details.order.payment_method, PaymentMethod::Vnpay);
        assert_eq!(details.order.payment_status, PaymentStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn create_payment_url_for_another_users_order_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let intruder = helpers::create_user(&ctx).await?;
        let order = helpers::place_order(&ctx).await?;

        let payments = service(&ctx, MockPaymentGateway::new());
        let result = payments
            .create_payment_url(intruder.uuid, order.uuid, "203.0.113.7")
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn successful_callback_marks_the_order_paid_and_notifies() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx).await?;
        let order_uuid = order.uuid;

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_verify_callback()
            .with(always())
            .return_once(move |_| {
                Ok(CallbackVerification {
                    valid: true,
                    order_uuid: Some(order_uuid),
                    succeeded: true,
                    transaction_ref: Some("14422574".to_string()),
                })
            });

        let payments = service(&ctx, gateway);
        let outcome = payments.handle_callback(&HashMap::new()).await?;

        let paid = match outcome {
            PaymentOutcome::Succeeded(paid) => paid,
            other => return Err(format!("expected Succeeded, got {other:?}").into()),
        };
        assert_eq!(paid.payment_status, PaymentStatus::Success);

        // One notification from placing the order, one from the payment.
        assert_eq!(ctx.notifications.unread_count(order.user_uuid).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_signature_is_rejected_without_touching_the_order() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx).await?;

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_verify_callback().return_once(|_| {
            Ok(CallbackVerification {
                valid: false,
                order_uuid: None,
                succeeded: false,
                transaction_ref: None,
            })
        });

        let payments = service(&ctx, gateway);
        let outcome = payments.handle_callback(&HashMap::new()).await?;

        assert!(matches!(outcome, PaymentOutcome::Rejected));

        let details = ctx.orders.get_order(order.uuid).await?;
        assert_eq!(details.order.payment_status, PaymentStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn failed_payment_leaves_the_order_unpaid() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::place_order(&ctx).await?;
        let order_uuid = order.uuid;

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_verify_callback().return_once(move |_| {
            Ok(CallbackVerification {
                valid: true,
                order_uuid: Some(order_uuid),
                succeeded: false,
                transaction_ref: Some("14422575".to_string()),
            })
        });

        let payments = service(&ctx, gateway);
        let outcome = payments.handle_callback(&HashMap::new()).await?;

        assert!(matches!(outcome, PaymentOutcome::Failed(_)));

        let details = ctx.orders.get_order(order.uuid).await?;
        assert_eq!(details.order.payment_status, PaymentStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn callback_for_unknown_order_reports_order_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_verify_callback().return_once(|_| {
            Ok(CallbackVerification {
                valid: true,
                order_uuid: Some(OrderUuid::new()),
                succeeded: true,
                transaction_ref: None,
            })
        });

        let payments = service(&ctx, gateway);
        let outcome = payments.handle_callback(&HashMap::new()).await?;

        assert!(matches!(outcome, PaymentOutcome::OrderNotFound));

        Ok(())
    }
}
