use std::sync::Arc;

use crate::config::Config;
use crate::payments::PaymentClient;
use crate::utils::types::Pool;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
    pub payments: PaymentClient,
}
