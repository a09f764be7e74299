use policy_clerk::Clerk;
use std::sync::Arc;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub clerk: Arc<Clerk>,
}
