use std::sync::Arc;

use iir_service::ResolverService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ResolverService>,
}
impl AppState {
	pub async fn new(config: iir_config::Config) -> color_eyre::Result<Self> {
		let service = ResolverService::connect(config).await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: ResolverService) -> Self {
		Self { service: Arc::new(service) }
	}
}
