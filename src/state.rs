use crate::{config::AppConfig, error::AppError, services::supabase::SupabaseClient};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub trips: SupabaseClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let trips = SupabaseClient::new(&config)?;
        Ok(Self { config, trips })
    }
}
