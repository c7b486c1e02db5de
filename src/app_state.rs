use std::sync::Arc;

use crate::{
    api::PaymentGateway,
    auth::{Argon2Encoder, JwtService, PasswordEncoder},
    repositories::Repositories,
    services::{
        AddonsService, OrdersService, PaymentsService, SlotsService, TheatresService, UsersService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrdersService>,
    pub payments: Arc<PaymentsService>,
    pub theatres: Arc<TheatresService>,
    pub slots: Arc<SlotsService>,
    pub addons: Arc<AddonsService>,
    pub users: Arc<UsersService>,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(
        repositories: Repositories,
        gateway: Arc<dyn PaymentGateway>,
        jwt: JwtService,
        payment_secret: String,
    ) -> Self {
        Self::with_encoder(
            repositories,
            gateway,
            jwt,
            payment_secret,
            Arc::new(Argon2Encoder),
        )
    }

    pub fn with_encoder(
        repositories: Repositories,
        gateway: Arc<dyn PaymentGateway>,
        jwt: JwtService,
        payment_secret: String,
        encoder: Arc<dyn PasswordEncoder>,
    ) -> Self {
        let jwt = Arc::new(jwt);
        let payments = Arc::new(PaymentsService::new(
            gateway,
            repositories.payments,
            payment_secret,
        ));

        Self {
            orders: Arc::new(OrdersService::new(repositories.orders, payments.clone())),
            payments,
            theatres: Arc::new(TheatresService::new(repositories.theatres)),
            slots: Arc::new(SlotsService::new(repositories.slots)),
            addons: Arc::new(AddonsService::new(repositories.addons)),
            users: Arc::new(UsersService::new(repositories.users, encoder, jwt.clone())),
            jwt,
        }
    }
}
